//! Enemy and boss templates with their ability configurations

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Blob,
    Dasher,
    Charger,
    Tank,
    Swarm,
    Bomber,
    Sniper,
    Splitter,
    Necromancer,
    Healer,
    Juggernaut,
    Assassin,
    Wraith,
    Spawner,
    MegaSpawner,
    Parasite,
    Crawler,
    Golem,
    Voidling,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashConfig {
    pub interval: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShootConfig {
    pub interval: f32,
    pub range: f32,
    pub proj_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub interval: f32,
    pub kind: EnemyKind,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealConfig {
    pub interval: f32,
    pub range: f32,
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Seconds spent visible between phases
    pub interval: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportConfig {
    pub interval: f32,
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldConfig {
    pub interval: f32,
    pub duration: f32,
}

/// Rotating ring of projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralConfig {
    pub interval: f32,
    pub count: u32,
    pub speed: f32,
    pub range: f32,
}

/// Shotgun spread aimed at the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    pub interval: f32,
    pub count: u32,
    pub speed: f32,
    pub range: f32,
}

/// Lingering hazard zones dropped around the caster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaConfig {
    pub interval: f32,
    pub count: u32,
    pub radius: f32,
    pub duration: f32,
    pub dps: f32,
}

/// Optional abilities carried by a template. Each one is independent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    pub dash: Option<DashConfig>,
    pub shoot: Option<ShootConfig>,
    pub spawner: Option<SpawnerConfig>,
    pub heal: Option<HealConfig>,
    pub phase: Option<PhaseConfig>,
    pub teleport: Option<TeleportConfig>,
    pub shield: Option<ShieldConfig>,
    pub spiral: Option<SpiralConfig>,
    pub burst: Option<BurstConfig>,
    pub area: Option<AreaConfig>,
}

/// Base stats shared by regular enemies and bosses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyStats {
    pub radius: f32,
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub kind: EnemyKind,
    pub name: String,
    pub body: BodyStats,
    /// Inclusive zone index range this enemy spawns in
    pub zones: (usize, usize),
    /// Number spawned together per spawn event
    #[serde(default = "one")]
    pub pack_size: u32,
    /// Children spawned on death
    #[serde(default)]
    pub split_count: u32,
    #[serde(default)]
    pub abilities: AbilityConfig,
}

fn one() -> u32 {
    1
}

impl EnemyDef {
    pub fn spawns_in(&self, zone: usize) -> bool {
        (self.zones.0..=self.zones.1).contains(&zone)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub name: String,
    pub body: BodyStats,
    #[serde(default)]
    pub abilities: AbilityConfig,
}

const fn body(radius: f32, hp: f32, damage: f32, speed: f32, xp: f32) -> BodyStats {
    BodyStats {
        radius,
        hp,
        damage,
        speed,
        xp,
    }
}

fn enemy(kind: EnemyKind, name: &str, body: BodyStats, zones: (usize, usize)) -> EnemyDef {
    EnemyDef {
        kind,
        name: name.to_string(),
        body,
        zones,
        pack_size: 1,
        split_count: 0,
        abilities: AbilityConfig::default(),
    }
}

fn dash(interval: f32, speed: f32) -> Option<DashConfig> {
    Some(DashConfig { interval, speed })
}

fn shoot(interval: f32, range: f32, proj_speed: f32) -> Option<ShootConfig> {
    Some(ShootConfig {
        interval,
        range,
        proj_speed,
    })
}

fn heal(interval: f32, range: f32, amount: f32) -> Option<HealConfig> {
    Some(HealConfig {
        interval,
        range,
        amount,
    })
}

fn spawner(interval: f32, kind: EnemyKind, count: u32) -> Option<SpawnerConfig> {
    Some(SpawnerConfig {
        interval,
        kind,
        count,
    })
}

fn phase(interval: f32) -> Option<PhaseConfig> {
    Some(PhaseConfig { interval })
}

pub fn default_enemies() -> Vec<EnemyDef> {
    use EnemyKind::*;

    let mut defs = vec![
        enemy(Blob, "Blob", body(14.0, 15.0, 14.0, 65.0, 10.0), (0, 2)),
        enemy(Dasher, "Dasher", body(11.0, 11.0, 20.0, 170.0, 15.0), (0, 3)),
        enemy(Charger, "Charger", body(16.0, 22.0, 30.0, 50.0, 20.0), (0, 4)),
        enemy(Tank, "Tank", body(22.0, 55.0, 22.0, 45.0, 25.0), (1, 4)),
        enemy(Swarm, "Swarm", body(7.0, 6.0, 10.0, 130.0, 5.0), (1, 5)),
        enemy(Bomber, "Bomber", body(13.0, 12.0, 35.0, 80.0, 18.0), (1, 4)),
        enemy(Sniper, "Sniper", body(12.0, 18.0, 28.0, 55.0, 20.0), (2, 5)),
        enemy(Splitter, "Splitter", body(18.0, 32.0, 16.0, 75.0, 30.0), (2, 5)),
        enemy(Necromancer, "Necromancer", body(14.0, 28.0, 12.0, 45.0, 35.0), (2, 5)),
        enemy(Healer, "Healer", body(13.0, 22.0, 10.0, 55.0, 25.0), (3, 5)),
        enemy(Juggernaut, "Juggernaut", body(26.0, 100.0, 30.0, 35.0, 50.0), (3, 5)),
        enemy(Assassin, "Assassin", body(10.0, 15.0, 40.0, 200.0, 35.0), (3, 5)),
        enemy(Wraith, "Wraith", body(15.0, 45.0, 28.0, 110.0, 40.0), (4, 5)),
        enemy(Spawner, "Hive Mother", body(20.0, 40.0, 8.0, 35.0, 40.0), (0, 5)),
        enemy(MegaSpawner, "Brood Queen", body(25.0, 75.0, 12.0, 30.0, 60.0), (2, 5)),
        enemy(Parasite, "Parasite", body(6.0, 4.0, 15.0, 180.0, 3.0), (0, 5)),
        enemy(Crawler, "Crawler", body(9.0, 9.0, 18.0, 140.0, 8.0), (0, 3)),
        enemy(Golem, "Golem", body(30.0, 150.0, 35.0, 25.0, 70.0), (3, 5)),
        enemy(Voidling, "Voidling", body(8.0, 8.0, 22.0, 160.0, 12.0), (4, 5)),
    ];

    for def in &mut defs {
        let a = &mut def.abilities;
        match def.kind {
            Dasher => a.dash = dash(2.2, 500.0),
            Charger => a.dash = dash(1.8, 700.0),
            Swarm => def.pack_size = 5,
            Bomber => a.shoot = shoot(2.0, 250.0, 260.0),
            Sniper => a.shoot = shoot(2.0, 400.0, 350.0),
            Splitter => def.split_count = 4,
            Necromancer => a.heal = heal(1.5, 200.0, 8.0),
            Healer => a.heal = heal(1.5, 180.0, 8.0),
            Assassin => {
                a.dash = dash(1.5, 650.0);
                a.phase = phase(3.0);
            }
            Wraith => a.phase = phase(3.0),
            Spawner => a.spawner = spawner(3.0, Blob, 3),
            MegaSpawner => a.spawner = spawner(2.0, Swarm, 2),
            Parasite => def.pack_size = 6,
            Voidling => a.phase = phase(2.0),
            Blob | Tank | Juggernaut | Crawler | Golem => {}
        }
    }

    defs
}

/// Boss ability parameters in table order
struct BossSpec {
    name: &'static str,
    body: BodyStats,
    dash: (f32, f32),
    shoot: (f32, f32, f32),
    spawner: Option<(f32, EnemyKind, u32)>,
    heal: Option<(f32, f32, f32)>,
    phase: Option<f32>,
    spiral: Option<(f32, u32, f32)>,
    burst: Option<(f32, u32, f32)>,
    teleport: Option<(f32, f32)>,
    shield: Option<(f32, f32)>,
    area: Option<(f32, u32, f32, f32, f32)>,
}

impl BossSpec {
    fn build(self) -> BossDef {
        let (shoot_interval, range, proj_speed) = self.shoot;
        BossDef {
            name: self.name.to_string(),
            body: self.body,
            abilities: AbilityConfig {
                dash: dash(self.dash.0, self.dash.1),
                shoot: shoot(shoot_interval, range, proj_speed),
                spawner: self.spawner.and_then(|(i, k, c)| spawner(i, k, c)),
                heal: self.heal.and_then(|(i, r, a)| heal(i, r, a)),
                phase: self.phase.and_then(phase),
                teleport: self
                    .teleport
                    .map(|(interval, range)| TeleportConfig { interval, range }),
                shield: self
                    .shield
                    .map(|(interval, duration)| ShieldConfig { interval, duration }),
                spiral: self.spiral.map(|(interval, count, speed)| SpiralConfig {
                    interval,
                    count,
                    speed,
                    range,
                }),
                burst: self.burst.map(|(interval, count, speed)| BurstConfig {
                    interval,
                    count,
                    speed,
                    range,
                }),
                area: self
                    .area
                    .map(|(interval, count, radius, duration, dps)| AreaConfig {
                        interval,
                        count,
                        radius,
                        duration,
                        dps,
                    }),
            },
        }
    }
}

pub fn default_bosses() -> Vec<BossDef> {
    use EnemyKind::*;

    let specs = [
        BossSpec {
            name: "King Blob",
            body: body(55.0, 450.0, 12.0, 70.0, 300.0),
            dash: (2.5, 400.0),
            shoot: (1.2, 350.0, 280.0),
            spawner: Some((4.0, Blob, 5)),
            heal: None,
            phase: None,
            spiral: Some((3.0, 8, 200.0)),
            burst: Some((5.0, 12, 250.0)),
            teleport: None,
            shield: None,
            area: None,
        },
        BossSpec {
            name: "Mega Tank",
            body: body(60.0, 840.0, 15.0, 50.0, 500.0),
            dash: (4.0, 350.0),
            shoot: (0.6, 400.0, 300.0),
            spawner: Some((6.0, Tank, 2)),
            heal: Some((2.5, 250.0, 20.0)),
            phase: None,
            spiral: Some((4.0, 12, 180.0)),
            burst: None,
            teleport: None,
            shield: Some((8.0, 3.0)),
            area: None,
        },
        BossSpec {
            name: "Storm Lord",
            body: body(50.0, 660.0, 18.0, 100.0, 600.0),
            dash: (1.5, 600.0),
            shoot: (0.3, 500.0, 450.0),
            spawner: None,
            heal: None,
            phase: Some(3.0),
            spiral: Some((2.0, 16, 300.0)),
            burst: Some((3.0, 20, 350.0)),
            teleport: Some((6.0, 300.0)),
            shield: None,
            area: None,
        },
        BossSpec {
            name: "Void Titan",
            body: body(65.0, 450.0, 20.0, 65.0, 900.0),
            dash: (3.0, 450.0),
            shoot: (0.5, 450.0, 350.0),
            spawner: Some((4.0, Voidling, 4)),
            heal: Some((3.0, 300.0, 15.0)),
            phase: Some(2.5),
            spiral: Some((3.0, 20, 250.0)),
            burst: Some((4.0, 16, 300.0)),
            teleport: None,
            shield: Some((10.0, 4.0)),
            area: None,
        },
        BossSpec {
            name: "Infernal Dragon",
            body: body(60.0, 540.0, 22.0, 90.0, 1200.0),
            dash: (1.2, 700.0),
            shoot: (0.4, 500.0, 500.0),
            spawner: Some((3.0, Crawler, 6)),
            heal: None,
            phase: Some(4.0),
            spiral: Some((2.0, 24, 350.0)),
            burst: Some((3.0, 24, 400.0)),
            teleport: Some((5.0, 350.0)),
            shield: None,
            area: Some((4.0, 5, 40.0, 3.0, 8.0)),
        },
        BossSpec {
            name: "Necro Overlord",
            body: body(55.0, 400.0, 14.0, 60.0, 1000.0),
            dash: (3.0, 400.0),
            shoot: (0.6, 450.0, 350.0),
            spawner: Some((2.5, Swarm, 4)),
            heal: Some((1.2, 400.0, 50.0)),
            phase: Some(4.0),
            spiral: Some((3.0, 16, 250.0)),
            burst: Some((5.0, 20, 280.0)),
            teleport: None,
            shield: Some((12.0, 3.0)),
            area: None,
        },
        BossSpec {
            name: "Cosmic Entity",
            body: body(70.0, 900.0, 25.0, 80.0, 2000.0),
            dash: (1.5, 600.0),
            shoot: (0.25, 550.0, 500.0),
            spawner: Some((3.0, Assassin, 3)),
            heal: Some((2.0, 350.0, 30.0)),
            phase: Some(2.5),
            spiral: Some((1.5, 24, 350.0)),
            burst: Some((2.5, 30, 400.0)),
            teleport: Some((4.0, 400.0)),
            shield: Some((10.0, 4.0)),
            area: Some((3.0, 6, 50.0, 4.0, 10.0)),
        },
        BossSpec {
            name: "The Void",
            body: body(80.0, 1800.0, 30.0, 70.0, 5000.0),
            dash: (1.0, 750.0),
            shoot: (0.15, 600.0, 550.0),
            spawner: Some((2.0, Wraith, 4)),
            heal: Some((1.5, 500.0, 80.0)),
            phase: Some(1.5),
            spiral: Some((1.0, 32, 400.0)),
            burst: Some((2.0, 36, 450.0)),
            teleport: Some((3.0, 500.0)),
            shield: Some((8.0, 5.0)),
            area: Some((2.5, 8, 60.0, 5.0, 12.0)),
        },
        BossSpec {
            name: "Abyssal Leviathan",
            body: body(85.0, 2400.0, 32.0, 60.0, 7000.0),
            dash: (2.0, 600.0),
            shoot: (0.2, 550.0, 500.0),
            spawner: Some((2.5, Golem, 3)),
            heal: Some((2.0, 400.0, 60.0)),
            phase: Some(3.0),
            spiral: Some((1.5, 28, 350.0)),
            burst: Some((2.5, 32, 400.0)),
            teleport: Some((5.0, 400.0)),
            shield: Some((9.0, 4.0)),
            area: Some((2.0, 10, 55.0, 4.0, 10.0)),
        },
        BossSpec {
            name: "Eternal Warden",
            body: body(75.0, 3000.0, 35.0, 85.0, 10000.0),
            dash: (0.8, 800.0),
            shoot: (0.12, 600.0, 600.0),
            spawner: Some((2.0, Assassin, 4)),
            heal: Some((1.5, 450.0, 40.0)),
            phase: Some(2.0),
            spiral: Some((1.0, 36, 400.0)),
            burst: Some((2.0, 40, 450.0)),
            teleport: Some((3.0, 450.0)),
            shield: Some((7.0, 4.0)),
            area: Some((2.0, 8, 65.0, 4.0, 12.0)),
        },
        BossSpec {
            name: "The Singularity",
            body: body(90.0, 4000.0, 40.0, 75.0, 15000.0),
            dash: (0.6, 900.0),
            shoot: (0.1, 650.0, 650.0),
            spawner: Some((1.5, Wraith, 5)),
            heal: Some((1.2, 500.0, 50.0)),
            phase: Some(1.5),
            spiral: Some((0.8, 40, 450.0)),
            burst: Some((1.5, 48, 500.0)),
            teleport: Some((2.5, 500.0)),
            shield: Some((6.0, 5.0)),
            area: Some((1.5, 12, 70.0, 5.0, 15.0)),
        },
    ];

    specs.into_iter().map(BossSpec::build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_zone_has_enemies() {
        let defs = default_enemies();
        for zone in 0..6 {
            assert!(defs.iter().any(|d| d.spawns_in(zone)), "zone {zone} empty");
        }
    }

    #[test]
    fn test_pack_kinds() {
        let defs = default_enemies();
        let swarm = defs.iter().find(|d| d.kind == EnemyKind::Swarm).unwrap();
        assert_eq!(swarm.pack_size, 5);
        let blob = defs.iter().find(|d| d.kind == EnemyKind::Blob).unwrap();
        assert_eq!(blob.pack_size, 1);
    }

    #[test]
    fn test_bosses_have_ranged_abilities() {
        let bosses = default_bosses();
        assert_eq!(bosses.len(), 11);
        for boss in &bosses {
            let shoot = boss.abilities.shoot.expect("boss shoots");
            if let Some(spiral) = boss.abilities.spiral {
                assert_eq!(spiral.range, shoot.range);
            }
        }
        assert!(bosses.last().unwrap().abilities.area.is_some());
    }

    #[test]
    fn test_partial_ability_json() {
        let json = r#"{ "dash": { "interval": 1.0, "speed": 300.0 } }"#;
        let cfg: AbilityConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.dash.is_some());
        assert!(cfg.shoot.is_none());
    }
}
