//! Random draws for trap placement and random-pick games.
//!
//! RULE: Game code never touches a platform RNG directly.
//! Every draw goes through a `SlotDraw`, so tests and demo runs can
//! inject a seeded stream while live play uses OS entropy.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A source of uniform draws in `[0, n)`.
pub trait SlotDraw {
    /// Draw a value in `[0, n)`. `n` must be > 0; `n == 1` always yields 0.
    fn draw_below(&mut self, n: u32) -> u32;
}

impl<F: FnMut(u32) -> u32> SlotDraw for F {
    fn draw_below(&mut self, n: u32) -> u32 {
        self(n)
    }
}

/// OS entropy, with a clock-seeded PCG stream as fallback when the
/// OS source is unavailable.
pub struct SecureDraw {
    fallback: Option<Pcg64Mcg>,
}

impl SecureDraw {
    pub fn new() -> Self {
        Self { fallback: None }
    }

    fn next_u32(&mut self) -> u32 {
        if self.fallback.is_none() {
            let mut buf = [0u8; 4];
            match rand::rngs::OsRng.try_fill_bytes(&mut buf) {
                Ok(()) => return u32::from_le_bytes(buf),
                Err(e) => {
                    log::warn!("OS random source unavailable ({e}); falling back to PCG");
                    self.fallback = Some(Pcg64Mcg::seed_from_u64(clock_seed()));
                }
            }
        }
        match self.fallback.as_mut() {
            Some(pcg) => pcg.next_u32(),
            None => 0,
        }
    }
}

impl Default for SecureDraw {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotDraw for SecureDraw {
    fn draw_below(&mut self, n: u32) -> u32 {
        assert!(n > 0, "n must be > 0");
        self.next_u32() % n
    }
}

/// A deterministic draw stream. Same seed, same sequence.
pub struct SeededDraw {
    name:  &'static str,
    inner: Pcg64Mcg,
}

impl SeededDraw {
    pub fn new(seed: u64) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl SlotDraw for SeededDraw {
    fn draw_below(&mut self, n: u32) -> u32 {
        assert!(n > 0, "n must be > 0");
        let value = (self.inner.next_u64() % u64::from(n)) as u32;
        log::trace!("{}: draw_below({n}) = {value}", self.name);
        value
    }
}

/// Pick one index in `[0, len)`. Used to choose the random-pick loser.
pub fn pick_index<D: SlotDraw + ?Sized>(len: usize, draw: &mut D) -> usize {
    let n = u32::try_from(len).unwrap_or(u32::MAX);
    draw.draw_below(n) as usize
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9e37_79b9_7f4a_7c15)
}
