//! Rarity tiers, power multipliers and wave availability caps

use serde::{Deserialize, Serialize};

/// Ordered rarity tiers, lowest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Divine,
    Cosmic,
    Eternal,
}

impl Rarity {
    pub const COUNT: usize = 9;

    pub const ALL: [Rarity; Rarity::COUNT] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
        Rarity::Divine,
        Rarity::Cosmic,
        Rarity::Eternal,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The tier a merge produces, None at the top
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_top(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
            Rarity::Divine => "divine",
            Rarity::Cosmic => "cosmic",
            Rarity::Eternal => "eternal",
        }
    }

    /// Unknown keys fall back to the lowest tier
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(key))
            .unwrap_or_default()
    }
}

/// Per-tier constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityTier {
    /// Power multiplier for damage and petal health
    pub mult: f32,
    /// Base drop weight before caps and luck
    pub weight: f32,
}

/// Availability caps (0-100 per tier) at a given wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapBreakpoint {
    pub wave: u32,
    pub caps: [f32; Rarity::COUNT],
}

/// Rarity definition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityTable {
    pub tiers: [RarityTier; Rarity::COUNT],
    /// First tier index whose weight is scaled by luck
    pub luck_from_tier: usize,
    /// Sorted by wave, ascending
    pub breakpoints: Vec<CapBreakpoint>,
}

impl RarityTable {
    #[inline]
    pub fn mult(&self, rarity: Rarity) -> f32 {
        self.tiers[rarity.index()].mult
    }

    #[inline]
    pub fn weight(&self, rarity: Rarity) -> f32 {
        self.tiers[rarity.index()].weight
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        const fn tier(mult: f32, weight: f32) -> RarityTier {
            RarityTier { mult, weight }
        }
        let bp = |wave: u32, caps: [f32; Rarity::COUNT]| CapBreakpoint { wave, caps };

        Self {
            tiers: [
                tier(1.0, 45.0),
                tier(1.5, 25.0),
                tier(2.2, 15.0),
                tier(3.2, 8.0),
                tier(4.5, 4.0),
                tier(6.5, 2.0),
                tier(9.0, 0.8),
                tier(14.0, 0.2),
                tier(20.0, 0.05),
            ],
            luck_from_tier: 3,
            breakpoints: vec![
                bp(1, [100.0, 80.0, 50.0, 10.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
                bp(5, [100.0, 99.6, 92.7, 41.1, 4.5, 0.3, 0.001, 0.0, 0.0]),
                bp(10, [100.0, 100.0, 94.8, 72.2, 14.7, 0.9, 0.02, 0.0, 0.0]),
                bp(15, [100.0, 100.0, 99.9, 95.5, 47.7, 3.1, 0.1, 0.0, 0.0]),
                bp(20, [100.0, 100.0, 100.0, 100.0, 79.2, 17.7, 1.9, 0.03, 0.003]),
                bp(25, [100.0, 100.0, 100.0, 100.0, 99.8, 41.9, 7.6, 0.3, 0.02]),
                bp(30, [100.0, 100.0, 100.0, 100.0, 100.0, 82.7, 21.6, 1.5, 0.08]),
                bp(35, [100.0, 100.0, 100.0, 100.0, 100.0, 99.8, 44.1, 3.5, 0.15]),
                bp(40, [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 67.6, 8.0, 0.4]),
                bp(50, [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 90.0, 20.0, 1.5]),
                bp(60, [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 40.0, 4.0]),
                bp(75, [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 65.0, 10.0]),
                bp(100, [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 25.0]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tier() {
        assert_eq!(Rarity::Common.next(), Some(Rarity::Uncommon));
        assert_eq!(Rarity::Cosmic.next(), Some(Rarity::Eternal));
        assert_eq!(Rarity::Eternal.next(), None);
        assert!(Rarity::Eternal.is_top());
    }

    #[test]
    fn test_unknown_key_is_common() {
        assert_eq!(Rarity::from_key("mythic"), Rarity::Mythic);
        assert_eq!(Rarity::from_key("LEGENDARY"), Rarity::Legendary);
        assert_eq!(Rarity::from_key("sparkly"), Rarity::Common);
    }

    #[test]
    fn test_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&Rarity::Divine).unwrap();
        assert_eq!(json, "\"divine\"");
        let back: Rarity = serde_json::from_str("\"cosmic\"").unwrap();
        assert_eq!(back, Rarity::Cosmic);
    }

    #[test]
    fn test_breakpoints_sorted() {
        let table = RarityTable::default();
        assert!(table.breakpoints.windows(2).all(|w| w[0].wave < w[1].wave));
    }
}
