//! Post-kill drop rolls and the kill streak

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rarity::roll_rarity;
use crate::consts::STREAK_TIMEOUT;
use crate::data::{GameData, LootTuning, OrbitalKind, Rarity};

/// Consecutive kills without a gap longer than the streak timeout
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KillStreak {
    pub count: u32,
    pub timer: f32,
}

impl KillStreak {
    pub fn record_kill(&mut self) {
        self.count += 1;
        self.timer = STREAK_TIMEOUT;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.count = 0;
            self.timer = 0.0;
        }
    }

    pub fn bonus(&self, tuning: &LootTuning) -> f32 {
        (self.count as f32 * tuning.streak_bonus_per_kill).min(tuning.streak_bonus_cap)
    }
}

/// Chance that a kill drops an orbital
pub fn drop_chance(tuning: &LootTuning, zone: usize, boss: bool, streak: &KillStreak) -> f32 {
    let base = if boss {
        tuning.boss_chance
    } else {
        tuning.base_chance + tuning.chance_per_zone * zone as f32
    };
    (base + streak.bonus(tuning)).min(1.0)
}

/// Inputs for one drop roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropRoll {
    pub zone: usize,
    pub boss: bool,
    pub luck: f32,
    pub wave: u32,
}

/// One uniform roll decides whether anything drops; then the rarity and a
/// uniformly chosen kind
pub fn roll_drop<R: Rng + ?Sized>(
    data: &GameData,
    roll: DropRoll,
    streak: &KillStreak,
    rng: &mut R,
) -> Option<(OrbitalKind, Rarity)> {
    let chance = drop_chance(&data.loot, roll.zone, roll.boss, streak);
    if rng.random::<f32>() >= chance {
        return None;
    }

    let mut luck = roll.luck * data.drop_bonus(roll.zone);
    if roll.boss {
        luck *= data.loot.boss_luck_mult;
    }
    let rarity = roll_rarity(&data.rarity, luck, roll.wave, rng);
    let kind = OrbitalKind::ALL[rng.random_range(0..OrbitalKind::ALL.len())];
    Some((kind, rarity))
}
