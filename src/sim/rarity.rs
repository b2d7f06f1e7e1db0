//! Wave-interpolated, luck-weighted rarity rolls

use rand::Rng;

use crate::data::{Rarity, RarityTable};

/// Availability caps for a wave, interpolated between breakpoints and
/// clamped to the first/last breakpoint outside the table
pub fn caps_for_wave(table: &RarityTable, wave: u32) -> [f32; Rarity::COUNT] {
    let points = &table.breakpoints;
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        // No table: only the lowest tier is available
        let mut caps = [0.0; Rarity::COUNT];
        caps[0] = 100.0;
        return caps;
    };

    if wave <= first.wave {
        return first.caps;
    }
    if wave >= last.wave {
        return last.caps;
    }

    let upper = points
        .iter()
        .position(|bp| bp.wave >= wave)
        .unwrap_or(points.len() - 1);
    let lo = &points[upper.saturating_sub(1)];
    let hi = &points[upper];
    if hi.wave == lo.wave {
        return hi.caps;
    }

    let t = (wave - lo.wave) as f32 / (hi.wave - lo.wave) as f32;
    let mut caps = [0.0; Rarity::COUNT];
    for (i, cap) in caps.iter_mut().enumerate() {
        *cap = lo.caps[i] + (hi.caps[i] - lo.caps[i]) * t;
    }
    caps
}

/// Per-tier selection weights for a luck multiplier at a wave
pub fn tier_weights(table: &RarityTable, luck: f32, wave: u32) -> [f32; Rarity::COUNT] {
    let caps = caps_for_wave(table, wave);
    let luck = luck.max(0.0);
    let mut weights = [0.0; Rarity::COUNT];
    for rarity in Rarity::ALL {
        let i = rarity.index();
        if caps[i] <= 0.0 {
            continue;
        }
        let luck_mult = if i >= table.luck_from_tier { luck } else { 1.0 };
        weights[i] = table.weight(rarity) * luck_mult * (caps[i] / 100.0);
    }
    weights
}

/// Roll a rarity tier. Never fails: degenerate weights give the lowest tier.
pub fn roll_rarity<R: Rng + ?Sized>(
    table: &RarityTable,
    luck: f32,
    wave: u32,
    rng: &mut R,
) -> Rarity {
    let weights = tier_weights(table, luck, wave);
    let total: f32 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Rarity::Common;
    }

    let mut r = rng.random::<f32>() * total;
    for rarity in Rarity::ALL {
        let w = weights[rarity.index()];
        if w <= 0.0 {
            continue;
        }
        r -= w;
        if r <= 0.0 {
            return rarity;
        }
    }
    Rarity::Common
}
