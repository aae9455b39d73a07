use crate::crocodile::DEFAULT_SLOT_COUNT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameTypeConfig {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Teeth per round for slot-based games.
    #[serde(default)]
    pub slot_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Teeth per crocodile round when the game type does not say.
    pub default_slot_count: u32,
    /// Smallest roster a game may start with.
    pub min_participants: usize,
    pub invite_code_len: usize,
    pub game_types: Vec<GameTypeConfig>,
}

impl LedgerConfig {
    /// Load from a JSON file.
    /// In tests, use LedgerConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: LedgerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.default_slot_count == 0 {
            anyhow::bail!("{path}: default_slot_count must be >= 1");
        }
        if let Some(g) = config.game_types.iter().find(|g| g.slot_count == Some(0)) {
            anyhow::bail!("{path}: game type '{}' has slot_count 0, must be >= 1", g.slug);
        }
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            default_slot_count: DEFAULT_SLOT_COUNT,
            min_participants: 2,
            invite_code_len: 8,
            game_types: vec![
                GameTypeConfig {
                    slug: "crocodile".into(),
                    name: "Crocodile Teeth".into(),
                    description: Some("Press a tooth; whoever hits the trap loses.".into()),
                    slot_count: Some(DEFAULT_SLOT_COUNT),
                },
                GameTypeConfig {
                    slug: "random-pick".into(),
                    name: "Random Pick".into(),
                    description: Some("One participant is drawn at random to lose.".into()),
                    slot_count: None,
                },
            ],
        }
    }

    pub fn game_type(&self, slug: &str) -> Option<&GameTypeConfig> {
        self.game_types.iter().find(|g| g.slug == slug)
    }

    /// Teeth count for a slot game, falling back to the default.
    pub fn slot_count_for(&self, slug: &str) -> u32 {
        self.game_type(slug)
            .and_then(|g| g.slot_count)
            .unwrap_or(self.default_slot_count)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::default_test()
    }
}
