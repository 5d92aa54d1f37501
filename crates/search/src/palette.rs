//! Session color palette.
//!
//! The palette is shuffled once when the session starts and stays fixed
//! afterwards, so colors are stable for the session but vary between
//! sessions. Its length caps how many searches can be active at once.

use rand::seq::SliceRandom;
use rand::Rng;

/// A fixed, session-shuffled list of entry colors.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Shuffle `colors` once with the given RNG.
    pub fn shuffled<R: Rng>(mut colors: Vec<String>, rng: &mut R) -> Self {
        colors.shuffle(rng);
        Self { colors }
    }

    /// Use `colors` in the given order. Tests and fixed-color setups.
    pub fn fixed(colors: Vec<String>) -> Self {
        Self { colors }
    }

    /// Maximum number of simultaneously active entries.
    pub fn max_entries(&self) -> usize {
        self.colors.len()
    }

    /// Color at slot `i` (initialization order).
    pub fn color(&self, i: usize) -> Option<&str> {
        self.colors.get(i).map(String::as_str)
    }

    /// First palette color not present in `used`.
    pub fn first_unused<'a>(&'a self, used: &[&str]) -> Option<&'a str> {
        self.colors
            .iter()
            .map(String::as_str)
            .find(|c| !used.contains(c))
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}
