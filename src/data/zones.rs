//! Distance-banded world zones and arena zone configs

use serde::{Deserialize, Serialize};

use super::rarity::Rarity;

/// A ring of the world around its centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDef {
    pub name: String,
    /// Outer edge, measured from the world centre
    pub max_dist: f32,
    /// Multiplies luck for drops in this zone
    pub drop_bonus: f32,
}

pub fn default_zones() -> Vec<ZoneDef> {
    [
        ("Meadow", 1500.0, 1.0),
        ("Forest", 3000.0, 1.3),
        ("Desert", 5000.0, 1.7),
        ("Tundra", 7500.0, 2.2),
        ("Volcanic", 10000.0, 3.0),
        ("Void", 99999.0, 4.5),
    ]
    .into_iter()
    .map(|(name, max_dist, drop_bonus)| ZoneDef {
        name: name.to_string(),
        max_dist,
        drop_bonus,
    })
    .collect()
}

/// Zone index for a distance from the world centre; past the last band
/// resolves to the outermost zone
pub fn zone_index(zones: &[ZoneDef], dist: f32) -> usize {
    zones
        .iter()
        .position(|z| dist < z.max_dist)
        .unwrap_or(zones.len().saturating_sub(1))
}

/// Arena zone for the networked mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaZoneDef {
    pub id: u32,
    pub name: String,
    pub hp: f32,
    pub regen: f32,
    pub allowed_rarities: Vec<Rarity>,
    pub arena_size: f32,
    pub bot_count: u32,
    pub mob_spawn_interval: f32,
    pub max_slots: usize,
}

impl ArenaZoneDef {
    pub fn allows(&self, rarity: Rarity) -> bool {
        self.allowed_rarities.contains(&rarity)
    }
}

pub fn default_arena_zones() -> Vec<ArenaZoneDef> {
    use Rarity::*;

    let zone = |id: u32,
                name: &str,
                hp: f32,
                allowed_rarities: Vec<Rarity>,
                arena_size: f32,
                bot_count: u32,
                mob_spawn_interval: f32| ArenaZoneDef {
        id,
        name: name.to_string(),
        hp,
        regen: hp / 100.0,
        allowed_rarities,
        arena_size,
        bot_count,
        mob_spawn_interval,
        max_slots: 8,
    };

    vec![
        zone(1, "Starter Arena", 1000.0, vec![Common, Uncommon, Rare], 3000.0, 5, 8.0),
        zone(2, "Epic Grounds", 2000.0, vec![Epic, Legendary], 4000.0, 6, 7.0),
        zone(3, "Mythic Warzone", 4000.0, vec![Mythic, Divine], 5000.0, 7, 6.0),
        zone(4, "Eternal Abyss", 8000.0, vec![Cosmic, Eternal], 6000.0, 8, 5.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1499.0, 0)]
    #[case(1500.0, 1)]
    #[case(4999.0, 2)]
    #[case(8000.0, 4)]
    #[case(200_000.0, 5)]
    fn test_zone_index(#[case] dist: f32, #[case] expected: usize) {
        assert_eq!(zone_index(&default_zones(), dist), expected);
    }

    #[test]
    fn test_zone_index_empty_table() {
        assert_eq!(zone_index(&[], 100.0), 0);
    }

    #[test]
    fn test_arena_zone_rarity_gate() {
        let zones = default_arena_zones();
        assert!(zones[0].allows(Rarity::Rare));
        assert!(!zones[0].allows(Rarity::Epic));
        assert_eq!(zones[3].regen, 80.0);
    }
}
