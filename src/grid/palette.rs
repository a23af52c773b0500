use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BoxColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness, used to pick a readable label color.
    pub fn is_light(&self) -> bool {
        let luma = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        luma > 150_000
    }
}

impl fmt::Display for BoxColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Steel blue and powder blue each appear twice.
pub const PALETTE: [BoxColor; 28] = [
    BoxColor::new(0x3B, 0x9E, 0x9A),
    BoxColor::new(0x46, 0x82, 0xB4),
    BoxColor::new(0x5F, 0x9E, 0xA0),
    BoxColor::new(0x2E, 0x8B, 0x57),
    BoxColor::new(0x2F, 0x4F, 0x4F),
    BoxColor::new(0x6A, 0x5A, 0xCD),
    BoxColor::new(0x8A, 0x2B, 0xE2),
    BoxColor::new(0x20, 0xB2, 0xAA),
    BoxColor::new(0x32, 0xCD, 0x32),
    BoxColor::new(0x5F, 0x9E, 0xAD),
    BoxColor::new(0x6B, 0x8E, 0x23),
    BoxColor::new(0x4B, 0x00, 0x82),
    BoxColor::new(0x80, 0x00, 0x80),
    BoxColor::new(0x3C, 0xB3, 0x71),
    BoxColor::new(0xB0, 0xC4, 0xDE),
    BoxColor::new(0xA9, 0xA9, 0xA9),
    BoxColor::new(0x70, 0x80, 0x90),
    BoxColor::new(0x5C, 0x40, 0x33),
    BoxColor::new(0x6B, 0x42, 0x26),
    BoxColor::new(0x8F, 0xBC, 0x8F),
    BoxColor::new(0xC0, 0xC0, 0xC0),
    BoxColor::new(0xB0, 0xE0, 0xE6),
    BoxColor::new(0x8A, 0x9A, 0x5B),
    BoxColor::new(0x7F, 0xFF, 0xD4),
    BoxColor::new(0x46, 0x82, 0xB4),
    BoxColor::new(0x7B, 0x68, 0xEE),
    BoxColor::new(0xD8, 0xBF, 0xD8),
    BoxColor::new(0xB0, 0xE0, 0xE6),
];

/// Hands out palette colors without repeating a value until every value has
/// been drawn once.
#[derive(Debug)]
pub struct ColorAllocator {
    palette: &'static [BoxColor],
    used: HashSet<BoxColor>,
    rng: StdRng,
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            palette: &PALETTE,
            used: HashSet::new(),
            rng,
        }
    }

    pub fn next(&mut self) -> BoxColor {
        let mut available = self.available();
        if available.is_empty() {
            tracing::debug!("color palette exhausted, resetting");
            self.used.clear();
            available = self.available();
        }

        // The palette is a non-empty constant, so `available` is too.
        let color = *available
            .choose(&mut self.rng)
            .unwrap_or(&self.palette[0]);
        self.used.insert(color);
        color
    }

    /// Number of distinct values that can still be drawn before a reset.
    pub fn remaining(&self) -> usize {
        self.available().len()
    }

    #[cfg(test)]
    fn is_used(&self, color: &BoxColor) -> bool {
        self.used.contains(color)
    }

    /// Unused values in palette order, each listed once.
    fn available(&self) -> Vec<BoxColor> {
        let mut seen = HashSet::new();
        self.palette
            .iter()
            .copied()
            .filter(|c| !self.used.contains(c) && seen.insert(*c))
            .collect()
    }
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self::new()
    }
}
