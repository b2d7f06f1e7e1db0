//! Petal weapon definitions

use serde::{Deserialize, Serialize};

/// Petal weapon kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitalKind {
    Blade,
    Shooter,
    Nova,
    Frost,
    Leech,
    Chain,
    Shield,
    Fire,
    Laser,
}

impl OrbitalKind {
    pub const ALL: [OrbitalKind; 9] = [
        OrbitalKind::Blade,
        OrbitalKind::Shooter,
        OrbitalKind::Nova,
        OrbitalKind::Frost,
        OrbitalKind::Leech,
        OrbitalKind::Chain,
        OrbitalKind::Shield,
        OrbitalKind::Fire,
        OrbitalKind::Laser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitalKind::Blade => "blade",
            OrbitalKind::Shooter => "shooter",
            OrbitalKind::Nova => "nova",
            OrbitalKind::Frost => "frost",
            OrbitalKind::Leech => "leech",
            OrbitalKind::Chain => "chain",
            OrbitalKind::Shield => "shield",
            OrbitalKind::Fire => "fire",
            OrbitalKind::Laser => "laser",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
    }
}

/// How a petal deals damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum AttackStyle {
    /// Contact hits while touching enemies
    Melee,
    /// Fires a projectile at the nearest enemy in range
    Ranged { proj_speed: f32, proj_size: f32 },
    /// Periodic pulse hitting everything in range
    Area,
    /// Lightning that hops between nearby enemies
    Chain { bounces: u32, bounce_range: f32 },
    /// Piercing beam toward the nearest enemy
    Laser { beam_width: f32 },
    /// Contact hits plus a share of damage blocked for the owner
    Shield { block: f32 },
}

impl AttackStyle {
    /// Styles that strike on contact and take recoil damage
    pub fn is_contact(&self) -> bool {
        matches!(self, AttackStyle::Melee | AttackStyle::Shield { .. })
    }
}

/// Status applied by a contact hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum HitEffect {
    Slow,
    LifeSteal { fraction: f32 },
    Burn { dps: f32, duration: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalDef {
    pub kind: OrbitalKind,
    pub name: String,
    pub damage: f32,
    pub range: f32,
    /// Seconds between attacks for timed styles
    pub attack_interval: f32,
    /// Distance from the owner's edge
    pub orbit_dist: f32,
    pub style: AttackStyle,
    #[serde(default)]
    pub effect: Option<HitEffect>,
}

pub fn default_orbitals() -> Vec<OrbitalDef> {
    let def = |kind: OrbitalKind,
               name: &str,
               damage: f32,
               range: f32,
               attack_interval: f32,
               orbit_dist: f32,
               style: AttackStyle,
               effect: Option<HitEffect>| OrbitalDef {
        kind,
        name: name.to_string(),
        damage,
        range,
        attack_interval,
        orbit_dist,
        style,
        effect,
    };

    vec![
        def(OrbitalKind::Blade, "Blade", 15.0, 55.0, 0.0, 50.0, AttackStyle::Melee, None),
        def(
            OrbitalKind::Shooter,
            "Shooter",
            10.0,
            250.0,
            1.2,
            40.0,
            AttackStyle::Ranged {
                proj_speed: 400.0,
                proj_size: 4.0,
            },
            None,
        ),
        def(OrbitalKind::Nova, "Nova", 25.0, 120.0, 3.0, 35.0, AttackStyle::Area, None),
        def(
            OrbitalKind::Frost,
            "Frost",
            8.0,
            60.0,
            0.0,
            55.0,
            AttackStyle::Melee,
            Some(HitEffect::Slow),
        ),
        def(
            OrbitalKind::Leech,
            "Leech",
            7.0,
            70.0,
            0.0,
            45.0,
            AttackStyle::Melee,
            Some(HitEffect::LifeSteal { fraction: 0.3 }),
        ),
        def(
            OrbitalKind::Chain,
            "Chain",
            12.0,
            200.0,
            1.5,
            40.0,
            AttackStyle::Chain {
                bounces: 3,
                bounce_range: 150.0,
            },
            None,
        ),
        def(
            OrbitalKind::Shield,
            "Shield",
            5.0,
            45.0,
            0.0,
            60.0,
            AttackStyle::Shield { block: 0.15 },
            None,
        ),
        def(
            OrbitalKind::Fire,
            "Inferno",
            6.0,
            65.0,
            0.0,
            50.0,
            AttackStyle::Melee,
            Some(HitEffect::Burn {
                dps: 5.0,
                duration: 3.0,
            }),
        ),
        def(
            OrbitalKind::Laser,
            "Laser",
            18.0,
            400.0,
            0.08,
            35.0,
            AttackStyle::Laser { beam_width: 4.0 },
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_definition() {
        let defs = default_orbitals();
        for kind in OrbitalKind::ALL {
            assert!(defs.iter().any(|d| d.kind == kind), "{kind:?} missing");
        }
    }

    #[test]
    fn test_contact_styles() {
        assert!(AttackStyle::Melee.is_contact());
        assert!(AttackStyle::Shield { block: 0.1 }.is_contact());
        assert!(!AttackStyle::Area.is_contact());
    }

    #[test]
    fn test_from_key() {
        assert_eq!(OrbitalKind::from_key("fire"), Some(OrbitalKind::Fire));
        assert_eq!(OrbitalKind::from_key("banana"), None);
    }
}
