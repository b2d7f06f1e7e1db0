//! Orbital stash with merge, equip and unequip
//!
//! Every request either fully succeeds or returns an [`InventoryError`]
//! leaving both the stash and the loadout untouched.

use serde::{Deserialize, Serialize};

use super::orbital::{Orbital, initial_spacing};
use super::player::Player;
use super::state::IdAllocator;
use crate::data::{GameData, OrbitalKind, Rarity};
use crate::error::InventoryError;

/// Items consumed by one merge
pub const MERGE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: OrbitalKind,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Store a new item and return its id
    pub fn add(&mut self, ids: &mut IdAllocator, kind: OrbitalKind, rarity: Rarity) -> u32 {
        let id = ids.next();
        self.items.push(Item { id, kind, rarity });
        id
    }

    pub fn remove(&mut self, id: u32) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn count(&self, kind: OrbitalKind, rarity: Rarity) -> usize {
        self.items
            .iter()
            .filter(|i| i.kind == kind && i.rarity == rarity)
            .count()
    }

    /// Consume exactly three matching items and add one of the next tier
    pub fn merge(
        &mut self,
        kind: OrbitalKind,
        rarity: Rarity,
        ids: &mut IdAllocator,
    ) -> Result<Item, InventoryError> {
        let next = rarity.next().ok_or(InventoryError::TopTier(rarity))?;
        let have = self.count(kind, rarity);
        if have < MERGE_COUNT {
            return Err(InventoryError::NotEnoughToMerge { kind, rarity, have });
        }

        let mut taken = 0;
        self.items.retain(|i| {
            if taken < MERGE_COUNT && i.kind == kind && i.rarity == rarity {
                taken += 1;
                false
            } else {
                true
            }
        });
        let merged = Item {
            id: ids.next(),
            kind,
            rarity: next,
        };
        self.items.push(merged);
        Ok(merged)
    }
}

/// Move a stash item into a free orbital slot. `allowed` restricts the
/// rarities accepted (arena zones).
pub fn equip(
    player: &mut Player,
    inventory: &mut Inventory,
    item_id: u32,
    data: &GameData,
    allowed: Option<&[Rarity]>,
) -> Result<Item, InventoryError> {
    let item = *inventory
        .get(item_id)
        .ok_or(InventoryError::UnknownItem(item_id))?;
    if let Some(allowed) = allowed {
        if !allowed.contains(&item.rarity) {
            return Err(InventoryError::RarityNotAllowed(item.rarity));
        }
    }
    if player.free_slots() == 0 {
        return Err(InventoryError::SlotsFull(player.slots));
    }

    inventory.remove(item_id);
    let mut orbital = Orbital::new(item.id, item.kind, item.rarity, 1, data);
    orbital.spacing = initial_spacing(player.orbitals.len());
    player.orbitals.push(orbital);
    Ok(item)
}

/// Move the orbital in `slot` back to the stash
pub fn unequip(
    player: &mut Player,
    inventory: &mut Inventory,
    slot: usize,
) -> Result<Item, InventoryError> {
    if slot >= player.orbitals.len() {
        return Err(InventoryError::EmptySlot(slot));
    }
    let orbital = player.orbitals.remove(slot);
    let item = Item {
        id: orbital.id,
        kind: orbital.kind,
        rarity: orbital.rarity,
    };
    inventory.push(item);
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PermBonuses;
    use glam::Vec2;

    fn stash(ids: &mut IdAllocator, entries: &[(OrbitalKind, Rarity)]) -> Inventory {
        let mut inv = Inventory::default();
        for &(k, r) in entries {
            inv.add(ids, k, r);
        }
        inv
    }

    #[test]
    fn test_merge_consumes_exactly_three() {
        let mut ids = IdAllocator::default();
        let mut inv = stash(
            &mut ids,
            &[
                (OrbitalKind::Blade, Rarity::Rare),
                (OrbitalKind::Blade, Rarity::Rare),
                (OrbitalKind::Frost, Rarity::Rare),
                (OrbitalKind::Blade, Rarity::Rare),
                (OrbitalKind::Blade, Rarity::Rare),
            ],
        );
        let merged = inv.merge(OrbitalKind::Blade, Rarity::Rare, &mut ids).unwrap();
        assert_eq!(merged.rarity, Rarity::Epic);
        assert_eq!(inv.count(OrbitalKind::Blade, Rarity::Rare), 1);
        assert_eq!(inv.count(OrbitalKind::Blade, Rarity::Epic), 1);
        assert_eq!(inv.count(OrbitalKind::Frost, Rarity::Rare), 1);
        assert_eq!(inv.len(), 3);
    }

    #[test]
    fn test_merge_rejected_without_change() {
        let mut ids = IdAllocator::default();
        let mut inv = stash(
            &mut ids,
            &[
                (OrbitalKind::Nova, Rarity::Common),
                (OrbitalKind::Nova, Rarity::Common),
            ],
        );
        let before = inv.clone();
        let err = inv.merge(OrbitalKind::Nova, Rarity::Common, &mut ids).unwrap_err();
        assert_eq!(
            err,
            InventoryError::NotEnoughToMerge {
                kind: OrbitalKind::Nova,
                rarity: Rarity::Common,
                have: 2
            }
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn test_top_tier_cannot_merge() {
        let mut ids = IdAllocator::default();
        let mut inv = stash(&mut ids, &[(OrbitalKind::Laser, Rarity::Eternal); 3]);
        let before = inv.clone();
        assert_eq!(
            inv.merge(OrbitalKind::Laser, Rarity::Eternal, &mut ids),
            Err(InventoryError::TopTier(Rarity::Eternal))
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn test_equip_and_unequip() {
        let data = GameData::default();
        let mut ids = IdAllocator::default();
        let mut player = Player::new(&data.player, PermBonuses::default(), Vec2::ZERO);
        player.slots = 1;
        let mut inv = stash(
            &mut ids,
            &[
                (OrbitalKind::Chain, Rarity::Epic),
                (OrbitalKind::Blade, Rarity::Common),
            ],
        );
        let first = inv.items()[0].id;
        let second = inv.items()[1].id;

        equip(&mut player, &mut inv, first, &data, None).unwrap();
        assert_eq!(player.orbitals.len(), 1);
        assert_eq!(inv.len(), 1);

        let before = inv.clone();
        assert_eq!(
            equip(&mut player, &mut inv, second, &data, None),
            Err(InventoryError::SlotsFull(1))
        );
        assert_eq!(inv, before);
        assert_eq!(
            equip(&mut player, &mut inv, 999, &data, None),
            Err(InventoryError::UnknownItem(999))
        );

        assert_eq!(unequip(&mut player, &mut inv, 4), Err(InventoryError::EmptySlot(4)));
        let back = unequip(&mut player, &mut inv, 0).unwrap();
        assert_eq!(back.id, first);
        assert!(player.orbitals.is_empty());
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn test_equip_respects_allowed_rarities() {
        let data = GameData::default();
        let mut ids = IdAllocator::default();
        let mut player = Player::new(&data.player, PermBonuses::default(), Vec2::ZERO);
        let mut inv = stash(&mut ids, &[(OrbitalKind::Blade, Rarity::Mythic)]);
        let id = inv.items()[0].id;
        assert_eq!(
            equip(&mut player, &mut inv, id, &data, Some(&[Rarity::Common])),
            Err(InventoryError::RarityNotAllowed(Rarity::Mythic))
        );
        assert_eq!(inv.len(), 1);
    }
}
