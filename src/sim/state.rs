//! World state and entity collections
//!
//! The world owns every live entity. Collections are kept sorted by id so
//! iteration order, and with it the seeded RNG stream, is reproducible.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::inventory::Inventory;
use super::loot::KillStreak;
use super::orbital::{Orbital, initial_spacing};
use super::pet::Pet;
use super::player::{PermBonuses, Player};
use super::progress::UpgradeChoice;
use super::projectile::Projectile;
use super::rarity::roll_rarity;
use super::wave::WaveDirector;
use crate::consts::{STARDUST_BOSS_BONUS, STARDUST_PER_LEVEL, STARDUST_PER_WAVE};
use crate::data::{GameData, OrbitalKind, Rarity};
use crate::world_center;

/// Petals a fresh run starts with
pub const STARTING_PETALS: usize = 5;

/// Hands out unique entity ids, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Experience pickup dropped by every kill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpGem {
    pub id: u32,
    pub pos: Vec2,
    pub amount: f32,
    /// Pulled toward the player once inside pickup range
    pub magnetized: bool,
    pub collected: bool,
}

/// Orbital lying on the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootDrop {
    pub id: u32,
    pub pos: Vec2,
    pub kind: OrbitalKind,
    pub rarity: Rarity,
    /// Wave it dropped in; expires a fixed number of waves later
    pub spawn_wave: u32,
    pub taken: bool,
}

/// Area-denial zone that damages the player while overlapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub remaining: f32,
    pub dps: f32,
}

/// Counters for the end-of-run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub boss_kills: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub best_streak: u32,
}

/// How a run is set up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub seed: u64,
    pub perm: PermBonuses,
    /// Stashed petal the player chose to bring along
    pub starting_petal: Option<(OrbitalKind, Rarity)>,
    /// Pick the first offered upgrade instead of waiting for a request
    pub auto_choose: bool,
    /// Walk-over loot pickup: equip when a slot is free, otherwise stash
    pub auto_loot: bool,
    /// Rarities accepted by equip requests; arena zones restrict these
    pub allowed_rarities: Option<Vec<Rarity>>,
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub wave: u32,
    pub level: u32,
    pub kills: u32,
    pub boss_kills: u32,
    pub time: f32,
    pub stardust: u32,
    /// Equipped and stashed petals at the end of the run
    pub petals: Vec<(OrbitalKind, Rarity)>,
}

/// Stardust earned for a finished run
pub fn stardust_for(wave: u32, level: u32, boss_kills: u32) -> u32 {
    STARDUST_PER_WAVE * wave + STARDUST_PER_LEVEL * level + STARDUST_BOSS_BONUS * boss_kills
}

/// Complete single-player simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub data: Arc<GameData>,
    pub seed: u64,
    pub rng: Pcg32,
    pub ids: IdAllocator,
    pub options: RunOptions,
    /// Simulated seconds
    pub time: f32,
    pub player: Player,
    pub pet: Pet,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub gems: Vec<XpGem>,
    pub loot: Vec<LootDrop>,
    pub hazards: Vec<Hazard>,
    pub inventory: Inventory,
    pub director: WaveDirector,
    pub streak: KillStreak,
    pub stats: RunStats,
    /// Upgrade choices waiting for a pick
    pub pending_choices: Vec<UpgradeChoice>,
    pub game_over: bool,
}

impl World {
    /// Fresh run at the world centre with a rolled starting loadout
    pub fn new(data: Arc<GameData>, options: RunOptions) -> Self {
        let mut rng = Pcg32::seed_from_u64(options.seed);
        let mut ids = IdAllocator::default();
        let mut player = Player::new(&data.player, options.perm, world_center());

        let mut loadout: Vec<(OrbitalKind, Rarity)> = options.starting_petal.into_iter().collect();
        while loadout.len() < STARTING_PETALS.min(player.slots) {
            let kind = OrbitalKind::ALL[rng.random_range(0..OrbitalKind::ALL.len())];
            let rarity = roll_rarity(&data.rarity, player.stats.luck, 1, &mut rng);
            loadout.push((kind, rarity));
        }
        for (i, (kind, rarity)) in loadout.into_iter().enumerate() {
            let mut orbital = Orbital::new(ids.next(), kind, rarity, 1, &data);
            orbital.spacing = initial_spacing(i);
            player.orbitals.push(orbital);
        }
        player.full_heal();

        let pet = Pet::new(&player, &data);
        let director = WaveDirector::new(&data.waves);
        log::info!(
            "New run: seed {}, level {}, {} slots, {} petals",
            options.seed,
            player.level,
            player.slots,
            player.orbitals.len()
        );

        Self {
            data,
            seed: options.seed,
            rng,
            ids,
            options,
            time: 0.0,
            player,
            pet,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            gems: Vec::new(),
            loot: Vec::new(),
            hazards: Vec::new(),
            inventory: Inventory::default(),
            director,
            streak: KillStreak::default(),
            stats: RunStats::default(),
            pending_choices: Vec::new(),
            game_over: false,
        }
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next()
    }

    pub fn wave(&self) -> u32 {
        self.director.wave
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.enemies[i])
    }

    /// Keep every collection sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.gems.sort_by_key(|g| g.id);
        self.loot.sort_by_key(|l| l.id);
        self.hazards.sort_by_key(|h| h.id);
    }

    pub fn summary(&self) -> RunSummary {
        let wave = self.wave();
        let level = self.player.level;
        let petals = self
            .player
            .orbitals
            .iter()
            .map(|o| (o.kind, o.rarity))
            .chain(self.inventory.items().iter().map(|i| (i.kind, i.rarity)))
            .collect();
        RunSummary {
            wave,
            level,
            kills: self.stats.kills,
            boss_kills: self.stats.boss_kills,
            time: self.time,
            stardust: stardust_for(wave, level, self.stats.boss_kills),
            petals,
        }
    }
}
