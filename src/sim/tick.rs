//! Fixed timestep simulation step
//!
//! Advances the world by one step in a fixed system order. Nothing is
//! removed mid-step: systems set dead flags and the cull at the end drops
//! them, after which entities spawned during the step are appended.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::abilities::{AbilityContext, apply_heals, update_enemy};
use super::collision::{circles_overlap, offset};
use super::combat::{absorb, try_contact};
use super::enemy::{Enemy, EnemyRole};
use super::events::{GameEvent, Spawned, StepEffects, Target};
use super::inventory::{self, Item};
use super::loot::{DropRoll, roll_drop};
use super::orbital::{Orbital, OrbitalContext, initial_spacing, layout, update_orbitals};
use super::pet::update_pet;
use super::player::MoveIntent;
use super::progress::{UpgradeChoice, add_xp, apply_choice, offers_choice, roll_choices};
use super::projectile::Owner;
use super::state::{LootDrop, World, XpGem};
use super::wave::{Directive, SpawnTarget, spawn_boss, spawn_regular, wave_scale};
use crate::consts::{MAX_DT, MAX_ENEMIES};
use crate::data::{GameData, OrbitalKind, Rarity};
use crate::error::InventoryError;

/// Choices offered per level-up upgrade
pub const CHOICES_OFFERED: usize = 3;

/// Loadout and stash requests, resolved at the start of a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Equip { item_id: u32 },
    Unequip { slot: usize },
    Merge { kind: OrbitalKind, rarity: Rarity },
    /// Take the nearest loot in reach; `store` sends it to the stash
    PickUp { store: bool },
    /// Pick one of the pending level-up choices
    Choose { index: usize },
}

/// Player intent for a single step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Desired movement direction, clamped to unit length
    pub move_dir: Vec2,
    pub dash: bool,
    pub extend: bool,
    pub retract: bool,
    pub requests: Vec<Request>,
}

impl TickInput {
    fn intent(&self) -> MoveIntent {
        MoveIntent {
            dir: self.move_dir,
            dash: self.dash,
            extend: self.extend,
            retract: self.retract,
        }
    }
}

/// Advance the world by `dt` seconds (clamped to `MAX_DT`)
pub fn step(world: &mut World, dt: f32, input: &TickInput) -> StepEffects {
    let mut effects = StepEffects::default();
    if world.game_over {
        return effects;
    }
    let dt = dt.clamp(0.0, MAX_DT);
    let data = Arc::clone(&world.data);
    world.time += dt;

    for request in &input.requests {
        handle_request(world, &data, *request, &mut effects);
    }

    world.player.update(&input.intent(), &data.player, dt);

    // Enemy behaviour; children and heals land after every enemy has acted
    let mut children = Vec::new();
    let mut heals = Vec::new();
    {
        let mut ctx = AbilityContext {
            data: &data,
            player_pos: world.player.pos,
            wave_scale: wave_scale(world.wave().max(1)),
            live_enemies: world.enemies.len(),
            ids: &mut world.ids,
            rng: &mut world.rng,
            projectiles: &mut world.projectiles,
            hazards: &mut world.hazards,
            children: &mut children,
            heals: &mut heals,
            effects: &mut effects,
        };
        for enemy in world.enemies.iter_mut() {
            update_enemy(enemy, dt, &mut ctx);
        }
    }
    apply_heals(&mut world.enemies, &heals);

    resolve_contacts(world, &data, &mut effects);

    let frame = world.player.frame();
    layout(&mut world.player.orbitals, &frame, &data, dt);
    let outcome = {
        let mut ctx = OrbitalContext {
            data: &data,
            enemies: &mut world.enemies,
            projectiles: &mut world.projectiles,
            ids: &mut world.ids,
            effects: &mut effects,
        };
        update_orbitals(&mut world.player.orbitals, &frame, dt, &mut ctx)
    };
    world.player.heal(outcome.lifesteal);

    resolve_projectiles(world, &data, dt, &mut effects);
    resolve_hazards(world, &data, dt, &mut effects);

    let healed = update_pet(
        &mut world.pet,
        &world.player,
        &world.enemies,
        &data,
        dt,
        &mut world.ids,
        &mut effects,
    );
    world.player.heal(healed);

    collect_gems(world, &data, dt, &mut effects);
    if world.options.auto_loot {
        auto_pick_up(world, &data, &mut effects);
    }

    resolve_deaths(world, &data, &mut children, &mut effects);
    world.streak.tick(dt);

    for e in &effects.damage {
        match e.target {
            Target::Enemy(_) => world.stats.damage_dealt += e.amount,
            Target::Player => world.stats.damage_taken += e.amount,
            _ => {}
        }
    }

    cull(world);
    world.enemies.append(&mut children);

    if !world.game_over {
        direct_waves(world, &data, dt, &mut effects);
    }
    world.normalize_order();
    effects
}

fn handle_request(world: &mut World, data: &GameData, request: Request, effects: &mut StepEffects) {
    let result = match request {
        Request::Equip { item_id } => {
            let allowed = world.options.allowed_rarities.as_deref();
            inventory::equip(&mut world.player, &mut world.inventory, item_id, data, allowed).map(
                |item| GameEvent::Equipped {
                    kind: item.kind,
                    rarity: item.rarity,
                },
            )
        }
        Request::Unequip { slot } => inventory::unequip(&mut world.player, &mut world.inventory, slot)
            .map(|item| GameEvent::Unequipped {
                kind: item.kind,
                rarity: item.rarity,
            }),
        Request::Merge { kind, rarity } => world
            .inventory
            .merge(kind, rarity, &mut world.ids)
            .map(|item| GameEvent::Merged {
                kind: item.kind,
                rarity: item.rarity,
            }),
        Request::PickUp { store } => pick_up(world, data, store),
        Request::Choose { index } => {
            choose(world, data, index);
            return;
        }
    };

    match result {
        Ok(event) => effects.event(event),
        Err(err) => {
            log::debug!("Request {request:?} rejected: {err}");
            effects.event(GameEvent::RequestRejected(err));
        }
    }
}

/// Take the nearest untaken drop within pickup reach
fn pick_up(world: &mut World, data: &GameData, store: bool) -> Result<GameEvent, InventoryError> {
    let player_pos = world.player.pos;
    let reach_sq = data.loot.pickup_radius * data.loot.pickup_radius;
    let index = world
        .loot
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.taken && l.pos.distance_squared(player_pos) <= reach_sq)
        .min_by(|a, b| {
            a.1.pos
                .distance_squared(player_pos)
                .total_cmp(&b.1.pos.distance_squared(player_pos))
        })
        .map(|(i, _)| i)
        .ok_or(InventoryError::NothingToPickUp)?;

    let drop = world.loot[index];
    if store {
        world.inventory.push(Item {
            id: drop.id,
            kind: drop.kind,
            rarity: drop.rarity,
        });
        world.loot[index].taken = true;
        return Ok(GameEvent::Stored {
            kind: drop.kind,
            rarity: drop.rarity,
        });
    }

    let player = &mut world.player;
    if player.free_slots() == 0 {
        return Err(InventoryError::SlotsFull(player.slots));
    }
    let mut orbital = Orbital::new(drop.id, drop.kind, drop.rarity, 1, data);
    orbital.spacing = initial_spacing(player.orbitals.len());
    player.orbitals.push(orbital);
    world.loot[index].taken = true;
    Ok(GameEvent::Equipped {
        kind: drop.kind,
        rarity: drop.rarity,
    })
}

/// Walk-over pickup: equip while slots are free, then stash
fn auto_pick_up(world: &mut World, data: &GameData, effects: &mut StepEffects) {
    let store = world.player.free_slots() == 0;
    if let Ok(event) = pick_up(world, data, store) {
        effects.event(event);
    }
}

fn choose(world: &mut World, data: &GameData, index: usize) {
    let Some(choice) = world.pending_choices.get(index).copied() else {
        log::debug!("No pending upgrade choice {index}");
        return;
    };
    world.pending_choices.clear();
    if !apply_choice(&mut world.player, choice, data, &mut world.ids) {
        log::debug!("Upgrade choice {choice:?} no longer applies");
    }
}

/// Enemy bodies against the player, then against the petal ring
fn resolve_contacts(world: &mut World, data: &GameData, effects: &mut StepEffects) {
    let tuning = &data.combat;
    let player = &mut world.player;
    for e in world.enemies.iter_mut() {
        if !e.targetable() {
            continue;
        }
        if circles_overlap(player.pos, player.radius, e.pos, e.radius) {
            if try_contact(&mut e.contact_timer, tuning.contact_cooldown) {
                let taken = player.take_hit(e.damage, data);
                effects.damage(Target::Player, taken, player.pos);
            }
            continue;
        }

        let damage_mult = player.stats.damage_mult;
        let Some(petal) = player.orbitals.iter_mut().find(|o| {
            o.is_active() && o.pos.distance(e.pos) < e.radius + tuning.petal_body_radius
        }) else {
            continue;
        };
        if !try_contact(&mut e.petal_contact_timer, tuning.contact_cooldown) {
            continue;
        }
        let dealt = e.take_damage(petal.damage(data, damage_mult), tuning);
        effects.damage(Target::Enemy(e.id), dealt.dealt, e.pos);
        let hit = petal.take_damage(e.damage * tuning.body_recoil, tuning);
        effects.damage(Target::Petal(petal.id), hit.dealt, petal.pos);
        if hit.broke {
            effects.event(GameEvent::PetalReloading { id: petal.id });
        }
    }
}

fn resolve_projectiles(world: &mut World, data: &GameData, dt: f32, effects: &mut StepEffects) {
    let tuning = &data.combat;
    for p in world.projectiles.iter_mut() {
        p.advance(dt);
        if p.dead {
            continue;
        }
        match p.owner {
            Owner::Player => {
                for e in world.enemies.iter_mut() {
                    if p.dead {
                        break;
                    }
                    if !e.targetable() || !circles_overlap(p.pos, p.size, e.pos, e.radius) {
                        continue;
                    }
                    let result = e.take_damage(p.damage, tuning);
                    effects.damage(Target::Enemy(e.id), result.dealt, e.pos);
                    absorb(p, p.damage, tuning, &mut world.rng);
                }
            }
            Owner::Enemy => {
                let player = &mut world.player;
                let damage_mult = player.stats.damage_mult;
                for o in player.orbitals.iter_mut() {
                    if p.dead {
                        break;
                    }
                    if !o.is_active() || p.pos.distance(o.pos) >= tuning.petal_projectile_radius + p.size {
                        continue;
                    }
                    let petal_damage = o.damage(data, damage_mult);
                    let hit = o.take_damage(p.damage, tuning);
                    effects.damage(Target::Petal(o.id), hit.dealt, o.pos);
                    if hit.broke {
                        effects.event(GameEvent::PetalReloading { id: o.id });
                    }
                    let spent = absorb(p, petal_damage, tuning, &mut world.rng);
                    effects.damage(Target::Projectile(p.id), spent.dealt, p.pos);
                }
                if p.dead {
                    continue;
                }

                let pet = &mut world.pet;
                if pet.alive && circles_overlap(p.pos, p.size, pet.pos, data.pet.radius) {
                    let (dealt, downed) = pet.take_damage(p.damage, data);
                    effects.damage(Target::Pet, dealt, pet.pos);
                    if downed {
                        effects.death(Target::Pet, pet.pos, false);
                        effects.event(GameEvent::PetDown);
                    }
                    p.dead = true;
                    continue;
                }

                if circles_overlap(p.pos, p.size, player.pos, player.radius) {
                    let taken = player.take_hit(p.damage, data);
                    effects.damage(Target::Player, taken, player.pos);
                    p.dead = true;
                }
            }
        }
    }
}

fn resolve_hazards(world: &mut World, data: &GameData, dt: f32, effects: &mut StepEffects) {
    let player = &mut world.player;
    for h in world.hazards.iter_mut() {
        h.remaining -= dt;
        if h.remaining <= 0.0 {
            continue;
        }
        if circles_overlap(h.pos, h.radius, player.pos, player.radius) {
            let taken = player.take_hazard(h.dps * dt, data);
            effects.damage(Target::Player, taken, player.pos);
        }
    }
}

/// Magnetize gems in pickup range, collect touching ones, then level up
fn collect_gems(world: &mut World, data: &GameData, dt: f32, effects: &mut StepEffects) {
    let player = &world.player;
    let range = player.stats.pickup_range;
    let collect = player.radius + 5.0;
    let pull = data.loot.gem_magnet_speed * dt;

    let mut xp = 0.0;
    for g in world.gems.iter_mut().filter(|g| !g.collected) {
        let to_player = player.pos - g.pos;
        let dist = to_player.length();
        if dist < range {
            g.magnetized = true;
        }
        if g.magnetized {
            g.pos = if dist <= pull {
                player.pos
            } else {
                g.pos + to_player / dist * pull
            };
        }
        if g.pos.distance(player.pos) < collect {
            g.collected = true;
            xp += g.amount;
        }
    }

    for level in add_xp(&mut world.player, xp, data) {
        let choice_offered = offers_choice(level);
        log::info!("Level up: {level}");
        effects.event(GameEvent::LevelUp {
            level,
            choice_offered,
        });
        if !choice_offered {
            continue;
        }
        let choices = roll_choices(&world.player, data, world.director.wave, CHOICES_OFFERED, &mut world.rng);
        if world.options.auto_choose {
            if let Some(&first) = choices.first() {
                apply_choice(&mut world.player, first, data, &mut world.ids);
            }
        } else {
            world.pending_choices = choices;
        }
    }
}

/// React to every enemy that died this step: rewards, drops and splits
fn resolve_deaths(
    world: &mut World,
    data: &GameData,
    children: &mut Vec<Enemy>,
    effects: &mut StepEffects,
) {
    let wave = world.director.wave;
    let live = world.enemies.iter().filter(|e| !e.dead).count();

    for e in world.enemies.iter().filter(|e| e.dead) {
        let boss = e.is_boss();
        world.stats.kills += 1;
        world.streak.record_kill();
        world.stats.best_streak = world.stats.best_streak.max(world.streak.count);
        if boss {
            world.stats.boss_kills += 1;
            log::info!("Wave {wave}: boss defeated");
        }
        effects.death(Target::Enemy(e.id), e.pos, boss);

        let gem_id = world.ids.next();
        world.gems.push(XpGem {
            id: gem_id,
            pos: e.pos,
            amount: e.xp,
            magnetized: false,
            collected: false,
        });
        effects.spawn(gem_id, Spawned::XpGem, e.pos);

        let roll = DropRoll {
            zone: data.zone_at(e.pos),
            boss,
            luck: world.player.stats.luck,
            wave,
        };
        if let Some((kind, rarity)) = roll_drop(data, roll, &world.streak, &mut world.rng) {
            let id = world.ids.next();
            world.loot.push(LootDrop {
                id,
                pos: e.pos,
                kind,
                rarity,
                spawn_wave: wave,
                taken: false,
            });
            effects.spawn(id, Spawned::Loot(kind, rarity), e.pos);
            if rarity >= Rarity::Legendary {
                log::info!("{} {} dropped on wave {wave}", rarity.as_str(), kind.as_str());
            }
        }

        if let EnemyRole::Regular(kind) = e.role {
            if e.split_count > 0 {
                if let Some(def) = data.enemy(kind) {
                    let loot = &data.loot;
                    let scale = wave_scale(wave.max(1)) * loot.split_child_scale;
                    for i in 0..e.split_count {
                        if live + children.len() >= MAX_ENEMIES {
                            break;
                        }
                        let angle = i as f32 / e.split_count as f32 * TAU;
                        let pos = crate::clamp_to_world(offset(e.pos, angle, loot.split_distance), e.radius);
                        let id = world.ids.next();
                        let mut child = Enemy::from_def(id, def, pos, scale, &data.combat);
                        child.radius *= loot.split_radius_mult;
                        child.max_hp *= loot.split_hp_mult;
                        child.hp = child.max_hp;
                        child.xp *= loot.split_xp_mult;
                        child.split_count = 0;
                        effects.spawn(id, Spawned::Enemy(kind), pos);
                        children.push(child);
                    }
                }
            }
        }
    }

    if world.player.is_dead() {
        world.game_over = true;
        effects.death(Target::Player, world.player.pos, false);
        effects.event(GameEvent::PlayerDied);
        log::info!(
            "Player died on wave {wave} at level {} after {:.1}s ({} kills)",
            world.player.level,
            world.time,
            world.stats.kills
        );
    }
}

fn cull(world: &mut World) {
    world.enemies.retain(|e| !e.dead);
    world.projectiles.retain(|p| !p.dead);
    world.gems.retain(|g| !g.collected);
    world.loot.retain(|l| !l.taken);
    world.hazards.retain(|h| h.remaining > 0.0);
}

fn direct_waves(world: &mut World, data: &GameData, dt: f32, effects: &mut StepEffects) {
    let alive = world.enemies.len();
    let directive = world.director.advance(dt, alive, &data.waves);
    let wave = world.director.wave;
    let player_pos = world.player.pos;

    match directive {
        Directive::Idle => {}
        Directive::StartWave(wave) => {
            let lifetime = data.waves.loot_lifetime_waves;
            world
                .loot
                .retain(|l| wave.saturating_sub(l.spawn_wave) < lifetime);
            log::info!(
                "Wave {wave} started: {} enemies, scale {:.2}",
                world.director.remaining_budget(),
                wave_scale(wave)
            );
            effects.event(GameEvent::WaveStarted { wave });
        }
        Directive::SpawnRegular => {
            let budget = world.director.remaining_budget();
            let mut target = SpawnTarget {
                data,
                ids: &mut world.ids,
                rng: &mut world.rng,
                enemies: &mut world.enemies,
                effects: &mut *effects,
            };
            let spawned = spawn_regular(&mut target, player_pos, wave, budget);
            world.director.record_spawned(spawned);
        }
        Directive::SpawnBoss => {
            let mut target = SpawnTarget {
                data,
                ids: &mut world.ids,
                rng: &mut world.rng,
                enemies: &mut world.enemies,
                effects: &mut *effects,
            };
            if spawn_boss(&mut target, player_pos, wave).is_some() {
                let index = super::wave::boss_index(wave, data.waves.boss_interval, data.bosses.len());
                effects.event(GameEvent::BossSpawned { wave, index });
            }
        }
        Directive::Cleared(wave) => {
            log::info!("Wave {wave} cleared at {:.1}s", world.time);
            effects.event(GameEvent::WaveCleared { wave });
        }
    }
}

/// Level-up choices still waiting for a pick
pub fn pending_choices(world: &World) -> &[UpgradeChoice] {
    &world.pending_choices
}
