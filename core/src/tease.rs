//! Share-card text: signed balance labels and teasing one-liners.
//!
//! Message choice is `balance mod list length`, so the same balance
//! always produces the same message.

use crate::{stats::MemberStats, types::Dopamine};
use serde::{Deserialize, Serialize};

const LOSS_MESSAGES: [&str; 5] = [
    "Certified pushover of this station",
    "A walking ATM",
    "Luck left the building",
    "Dopamine donor of the year",
    "Dug through the floor into the basement",
];

const WIN_MESSAGES: [&str; 5] = [
    "Dopamine villain",
    "Wallet destroyer",
    "Free dopamine injector",
    "The shark of this station",
    "Sits on the dopamine throne",
];

const NEUTRAL_MESSAGES: [&str; 2] = [
    "God of balance",
    "Loves to play, plays perfectly average",
];

pub fn tease_message(total_balance: Dopamine) -> &'static str {
    if total_balance < 0 {
        let idx = (total_balance.unsigned_abs() % LOSS_MESSAGES.len() as u64) as usize;
        LOSS_MESSAGES[idx]
    } else if total_balance > 0 {
        let idx = (total_balance as u64 % WIN_MESSAGES.len() as u64) as usize;
        WIN_MESSAGES[idx]
    } else {
        NEUTRAL_MESSAGES[0]
    }
}

pub fn tease_emoji(total_balance: Dopamine) -> &'static str {
    if total_balance < 0 {
        "🔥"
    } else if total_balance > 0 {
        "😎"
    } else {
        "⚖️"
    }
}

/// Signed, comma-grouped label: `+1,000`, `-500`, `0`.
pub fn format_dopamine(value: Dopamine) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = match value.signum() {
        1  => "+",
        -1 => "-",
        _  => "",
    };
    format!("{sign}{grouped}")
}

/// Everything a share card renders for one member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareCard {
    pub station_title: String,
    pub nickname:      String,
    pub total_balance: Dopamine,
    pub balance_label: String,
    pub message:       String,
    pub emoji:         String,
}

impl ShareCard {
    pub fn from_stats(station_title: impl Into<String>, stats: &MemberStats) -> Self {
        Self {
            station_title: station_title.into(),
            nickname:      stats.nickname.clone(),
            total_balance: stats.total_balance,
            balance_label: format_dopamine(stats.total_balance),
            message:       tease_message(stats.total_balance).to_string(),
            emoji:         tease_emoji(stats.total_balance).to_string(),
        }
    }
}
