//! In-run levelling and level-up upgrade choices

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::orbital::{Orbital, initial_spacing};
use super::player::Player;
use super::rarity::roll_rarity;
use super::state::IdAllocator;
use crate::consts::{MAX_ORBITAL_LEVEL, MAX_SLOTS, UPGRADE_CHOICE_EVERY, XP_CURVE_BASE, XP_CURVE_MULT};
use crate::data::{GameData, OrbitalKind, Rarity, StatUpgrade};

/// XP needed to leave `level`
pub fn xp_to_next(level: u32) -> f32 {
    (XP_CURVE_BASE * XP_CURVE_MULT.powi(level.saturating_sub(1) as i32)).floor()
}

/// Whether reaching `level` offers an upgrade choice
pub fn offers_choice(level: u32) -> bool {
    level > 1 && level % UPGRADE_CHOICE_EVERY == 0
}

/// Grant XP (scaled by the XP gain stat). Returns every level reached;
/// each one re-derives stats and fully heals.
pub fn add_xp(player: &mut Player, amount: f32, data: &GameData) -> Vec<u32> {
    let mut reached = Vec::new();
    if amount <= 0.0 || player.is_dead() {
        return reached;
    }
    player.xp += amount * player.stats.xp_gain;
    while player.xp >= player.xp_to_next {
        player.xp -= player.xp_to_next;
        player.level += 1;
        player.xp_to_next = xp_to_next(player.level);
        player.refresh_stats(&data.player);
        player.full_heal();
        reached.push(player.level);
    }
    reached
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum UpgradeChoice {
    NewOrbital { kind: OrbitalKind, rarity: Rarity },
    UpgradeOrbital { index: usize },
    Stat(StatUpgrade),
    ExtraSlot,
    FullHeal,
}

/// Roll `count` choices for the current state of `player`
pub fn roll_choices<R: Rng + ?Sized>(
    player: &Player,
    data: &GameData,
    wave: u32,
    count: usize,
    rng: &mut R,
) -> Vec<UpgradeChoice> {
    (0..count)
        .map(|_| roll_choice(player, data, wave, rng))
        .collect()
}

fn roll_choice<R: Rng + ?Sized>(player: &Player, data: &GameData, wave: u32, rng: &mut R) -> UpgradeChoice {
    let roll = rng.random::<f32>();
    if roll < 0.35 && player.free_slots() > 0 {
        let kind = OrbitalKind::ALL[rng.random_range(0..OrbitalKind::ALL.len())];
        let rarity = roll_rarity(&data.rarity, player.stats.luck, wave.max(1), rng);
        return UpgradeChoice::NewOrbital { kind, rarity };
    }
    if roll < 0.55 {
        let upgradable: Vec<usize> = player
            .orbitals
            .iter()
            .enumerate()
            .filter(|(_, o)| o.level < MAX_ORBITAL_LEVEL)
            .map(|(i, _)| i)
            .collect();
        if !upgradable.is_empty() {
            let index = upgradable[rng.random_range(0..upgradable.len())];
            return UpgradeChoice::UpgradeOrbital { index };
        }
        return random_stat(data, rng);
    }
    if roll < 0.75 {
        return random_stat(data, rng);
    }
    if roll < 0.85 && player.slots < MAX_SLOTS {
        return UpgradeChoice::ExtraSlot;
    }
    if roll < 0.93 {
        return UpgradeChoice::FullHeal;
    }
    random_stat(data, rng)
}

fn random_stat<R: Rng + ?Sized>(data: &GameData, rng: &mut R) -> UpgradeChoice {
    if data.stat_upgrades.is_empty() {
        return UpgradeChoice::FullHeal;
    }
    UpgradeChoice::Stat(data.stat_upgrades[rng.random_range(0..data.stat_upgrades.len())])
}

/// Apply a chosen upgrade. Choices that no longer fit (slot taken since the
/// roll, orbital gone) do nothing and return false.
pub fn apply_choice(
    player: &mut Player,
    choice: UpgradeChoice,
    data: &GameData,
    ids: &mut IdAllocator,
) -> bool {
    match choice {
        UpgradeChoice::NewOrbital { kind, rarity } => {
            if player.free_slots() == 0 {
                return false;
            }
            let mut orbital = Orbital::new(ids.next(), kind, rarity, 1, data);
            orbital.spacing = initial_spacing(player.orbitals.len());
            player.orbitals.push(orbital);
            true
        }
        UpgradeChoice::UpgradeOrbital { index } => player
            .orbitals
            .get_mut(index)
            .is_some_and(|o| o.level_up(data)),
        UpgradeChoice::Stat(up) => {
            player.bonus.apply(&up);
            player.refresh_stats(&data.player);
            if up.stat == crate::data::StatKind::MaxHp {
                player.heal(up.amount);
            }
            true
        }
        UpgradeChoice::ExtraSlot => {
            if player.slots >= MAX_SLOTS {
                return false;
            }
            player.slots += 1;
            true
        }
        UpgradeChoice::FullHeal => {
            player.full_heal();
            true
        }
    }
}
