use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::object::{Abilities, ItemClass, Misc, PvalFlags, Resists};
use crate::{RandartError, Result};

/// A mundane base item: what an artifact looks like before enchantment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseKind {
    pub class: ItemClass,
    pub sval: u8,
    pub name: String,
    pub level: u8,
    pub alloc_prob: u8,
    pub weight: i16,
    #[serde(default)]
    pub ac: i16,
    #[serde(default)]
    pub dd: u8,
    #[serde(default)]
    pub ds: u8,
    #[serde(default)]
    pub to_h: i16,
    #[serde(default)]
    pub to_d: i16,
    #[serde(default)]
    pub to_a: i16,
    #[serde(default)]
    pub pval: i16,
    #[serde(default)]
    pub abilities: Abilities,
}

struct KindRow {
    class: ItemClass,
    sval: u8,
    name: &'static str,
    level: u8,
    alloc: u8,
    weight: i16,
    ac: i16,
    dd: u8,
    ds: u8,
    pval: i16,
}

const fn weapon(
    class: ItemClass,
    sval: u8,
    name: &'static str,
    level: u8,
    alloc: u8,
    weight: i16,
    dd: u8,
    ds: u8,
) -> KindRow {
    KindRow {
        class,
        sval,
        name,
        level,
        alloc,
        weight,
        ac: 0,
        dd,
        ds,
        pval: 0,
    }
}

const fn digger(
    sval: u8,
    name: &'static str,
    level: u8,
    alloc: u8,
    weight: i16,
    ds: u8,
    pval: i16,
) -> KindRow {
    KindRow {
        class: ItemClass::Digger,
        sval,
        name,
        level,
        alloc,
        weight,
        ac: 0,
        dd: 1,
        ds,
        pval,
    }
}

const fn armor(
    class: ItemClass,
    sval: u8,
    name: &'static str,
    level: u8,
    alloc: u8,
    weight: i16,
    ac: i16,
) -> KindRow {
    KindRow {
        class,
        sval,
        name,
        level,
        alloc,
        weight,
        ac,
        dd: 0,
        ds: 0,
        pval: 0,
    }
}

const fn trinket(
    class: ItemClass,
    sval: u8,
    name: &'static str,
    level: u8,
    weight: i16,
) -> KindRow {
    KindRow {
        class,
        sval,
        name,
        level,
        alloc: 10,
        weight,
        ac: 0,
        dd: 0,
        ds: 0,
        pval: 0,
    }
}

use ItemClass::*;

#[rustfmt::skip]
const STANDARD_KINDS: &[KindRow] = &[
    // Launchers: the multiplier is sval % 10.
    weapon(Bow, 2, "Sling", 1, 40, 5, 0, 0),
    weapon(Bow, 12, "Short Bow", 3, 40, 30, 0, 0),
    weapon(Bow, 13, "Long Bow", 10, 40, 40, 0, 0),
    weapon(Bow, 23, "Light Crossbow", 15, 40, 60, 0, 0),
    weapon(Bow, 24, "Heavy Crossbow", 30, 40, 200, 0, 0),
    digger(1, "Shovel", 1, 30, 60, 2, 1),
    digger(2, "Gnomish Shovel", 20, 20, 60, 2, 2),
    digger(3, "Dwarven Shovel", 40, 15, 120, 3, 3),
    digger(4, "Pick", 5, 30, 150, 3, 1),
    digger(5, "Orcish Pick", 30, 20, 150, 3, 2),
    digger(6, "Dwarven Pick", 50, 15, 200, 4, 3),
    weapon(Hafted, 2, "Whip", 3, 40, 30, 1, 3),
    weapon(Hafted, 3, "Quarterstaff", 10, 40, 150, 1, 9),
    weapon(Hafted, 5, "Mace", 5, 40, 120, 2, 4),
    weapon(Hafted, 6, "Flail", 10, 40, 150, 2, 6),
    weapon(Hafted, 8, "War Hammer", 5, 40, 120, 3, 3),
    weapon(Hafted, 10, "Lucerne Hammer", 10, 40, 120, 2, 5),
    weapon(Hafted, 12, "Morning Star", 10, 40, 150, 2, 6),
    weapon(Hafted, 15, "Lead-Filled Mace", 15, 30, 180, 3, 4),
    weapon(Hafted, 18, "Two-Handed Flail", 45, 20, 280, 3, 6),
    weapon(Hafted, 20, "Mace of Disruption", 80, 5, 400, 5, 8),
    weapon(Sword, 4, "Dagger", 0, 40, 12, 1, 4),
    weapon(Sword, 5, "Main Gauche", 5, 40, 30, 1, 5),
    weapon(Sword, 7, "Rapier", 5, 40, 40, 1, 6),
    weapon(Sword, 8, "Small Sword", 5, 40, 75, 1, 6),
    weapon(Sword, 10, "Short Sword", 10, 40, 80, 1, 7),
    weapon(Sword, 11, "Sabre", 10, 40, 50, 1, 7),
    weapon(Sword, 12, "Cutlass", 12, 40, 110, 1, 8),
    weapon(Sword, 15, "Tulwar", 15, 40, 100, 2, 4),
    weapon(Sword, 16, "Broad Sword", 15, 40, 150, 2, 5),
    weapon(Sword, 17, "Long Sword", 20, 40, 130, 2, 5),
    weapon(Sword, 18, "Scimitar", 20, 40, 130, 4, 2),
    weapon(Sword, 20, "Katana", 30, 30, 120, 3, 5),
    weapon(Sword, 21, "Bastard Sword", 15, 40, 140, 3, 4),
    weapon(Sword, 25, "Two-Handed Sword", 30, 30, 250, 3, 6),
    weapon(Sword, 28, "Executioner's Sword", 40, 20, 260, 4, 5),
    weapon(Sword, 30, "Blade of Chaos", 70, 5, 180, 6, 5),
    weapon(Polearm, 2, "Spear", 5, 40, 50, 1, 6),
    weapon(Polearm, 4, "Awl-Pike", 8, 40, 160, 1, 8),
    weapon(Polearm, 5, "Trident", 5, 40, 70, 1, 10),
    weapon(Polearm, 8, "Pike", 15, 40, 160, 2, 5),
    weapon(Polearm, 10, "Beaked Axe", 15, 40, 180, 2, 6),
    weapon(Polearm, 11, "Broad Axe", 15, 40, 160, 2, 6),
    weapon(Polearm, 13, "Glaive", 20, 40, 190, 2, 6),
    weapon(Polearm, 15, "Halberd", 25, 40, 190, 3, 5),
    weapon(Polearm, 17, "Scythe", 45, 30, 250, 5, 3),
    weapon(Polearm, 20, "Lance", 10, 30, 300, 2, 8),
    weapon(Polearm, 22, "Battle Axe", 15, 40, 170, 2, 8),
    weapon(Polearm, 25, "Great Axe", 40, 30, 230, 4, 4),
    weapon(Polearm, 28, "Lochaber Axe", 45, 20, 250, 3, 8),
    weapon(Polearm, 30, "Scythe of Slicing", 60, 5, 250, 8, 4),
    armor(SoftArmor, 2, "Robe", 1, 40, 20, 2),
    armor(SoftArmor, 4, "Soft Leather Armour", 3, 40, 80, 8),
    armor(SoftArmor, 6, "Soft Studded Leather", 3, 40, 90, 10),
    armor(SoftArmor, 8, "Hard Leather Armour", 5, 40, 100, 16),
    armor(SoftArmor, 11, "Leather Scale Mail", 15, 40, 140, 20),
    armor(HardArmor, 1, "Chain Mail", 20, 40, 220, 32),
    armor(HardArmor, 3, "Augmented Chain Mail", 30, 40, 270, 42),
    armor(HardArmor, 4, "Metal Scale Mail", 25, 40, 250, 38),
    armor(HardArmor, 5, "Bar Chain Mail", 35, 40, 280, 45),
    armor(HardArmor, 6, "Metal Brigandine Armour", 35, 40, 290, 48),
    armor(HardArmor, 9, "Partial Plate Armour", 45, 30, 320, 50),
    armor(HardArmor, 10, "Metal Lamellar Armour", 55, 30, 340, 55),
    armor(HardArmor, 12, "Full Plate Armour", 60, 30, 380, 60),
    armor(HardArmor, 15, "Ribbed Plate Armour", 65, 30, 380, 66),
    armor(HardArmor, 20, "Mithril Chain Mail", 55, 10, 150, 55),
    armor(HardArmor, 25, "Mithril Plate Mail", 70, 10, 250, 75),
    armor(HardArmor, 30, "Adamantite Plate Mail", 75, 5, 420, 90),
    armor(DragonArmor, 1, "Black Dragon Scale Mail", 60, 10, 200, 30),
    armor(DragonArmor, 2, "Blue Dragon Scale Mail", 60, 10, 200, 30),
    armor(DragonArmor, 3, "White Dragon Scale Mail", 60, 10, 200, 30),
    armor(DragonArmor, 4, "Red Dragon Scale Mail", 60, 10, 200, 30),
    armor(DragonArmor, 5, "Green Dragon Scale Mail", 65, 10, 200, 30),
    armor(DragonArmor, 6, "Multi-Hued Dragon Scale Mail", 75, 5, 200, 40),
    armor(DragonArmor, 10, "Shining Dragon Scale Mail", 75, 5, 200, 30),
    armor(DragonArmor, 12, "Law Dragon Scale Mail", 85, 5, 200, 50),
    armor(DragonArmor, 14, "Bronze Dragon Scale Mail", 80, 5, 200, 30),
    armor(DragonArmor, 16, "Gold Dragon Scale Mail", 80, 5, 200, 30),
    armor(DragonArmor, 18, "Chaos Dragon Scale Mail", 95, 5, 200, 50),
    armor(DragonArmor, 20, "Balance Dragon Scale Mail", 98, 5, 200, 50),
    armor(DragonArmor, 30, "Power Dragon Scale Mail", 100, 2, 200, 60),
    armor(Boots, 2, "Pair of Soft Leather Boots", 1, 40, 20, 2),
    armor(Boots, 3, "Pair of Hard Leather Boots", 5, 40, 40, 3),
    armor(Boots, 6, "Pair of Metal Shod Boots", 20, 30, 80, 6),
    armor(Gloves, 1, "Set of Leather Gloves", 1, 40, 10, 1),
    armor(Gloves, 2, "Set of Gauntlets", 10, 40, 25, 3),
    armor(Gloves, 5, "Set of Cesti", 40, 20, 40, 5),
    armor(Helm, 2, "Hard Leather Cap", 3, 40, 15, 2),
    armor(Helm, 3, "Metal Cap", 10, 40, 20, 3),
    armor(Helm, 5, "Iron Helm", 20, 40, 75, 7),
    armor(Helm, 6, "Steel Helm", 40, 30, 60, 9),
    armor(Crown, 10, "Iron Crown", 45, 20, 20, 0),
    armor(Crown, 11, "Golden Crown", 45, 20, 30, 0),
    armor(Crown, 12, "Jewel Encrusted Crown", 50, 10, 40, 0),
    armor(Shield, 2, "Wicker Shield", 2, 40, 30, 2),
    armor(Shield, 3, "Small Metal Shield", 10, 40, 65, 5),
    armor(Shield, 4, "Leather Shield", 5, 40, 60, 8),
    armor(Shield, 5, "Large Metal Shield", 30, 30, 120, 12),
    armor(Shield, 10, "Mithril Shield", 70, 10, 60, 15),
    armor(Cloak, 1, "Cloak", 1, 40, 10, 1),
    armor(Cloak, 2, "Fur Cloak", 15, 40, 30, 3),
    armor(Cloak, 6, "Shadow Cloak", 60, 10, 5, 6),
    trinket(Light, 0, "Wooden Torch", 1, 30),
    trinket(Light, 1, "Lantern", 5, 50),
    trinket(Light, 4, "Phial", 30, 10),
    trinket(Light, 5, "Star", 30, 5),
    trinket(Light, 6, "Arkenstone", 50, 5),
    trinket(Amulet, 10, "Carved Amulet", 50, 3),
    trinket(Amulet, 11, "Jeweled Amulet", 50, 3),
    trinket(Amulet, 12, "Golden Amulet", 50, 3),
    trinket(Amulet, 13, "Green Amulet", 60, 3),
    trinket(Amulet, 14, "Crystal Amulet", 60, 3),
    trinket(Ring, 22, "Iron Ring", 30, 1),
    trinket(Ring, 23, "Gold Ring", 30, 1),
    trinket(Ring, 24, "Ruby Ring", 50, 1),
    trinket(Ring, 25, "Adamant Ring", 60, 1),
    trinket(Ring, 26, "Sapphire Ring", 70, 1),
    trinket(Ring, 32, "Plain Gold Ring", 100, 1),
];

fn default_abilities(class: ItemClass, sval: u8) -> Abilities {
    let mut ab = Abilities::default();
    match (class, sval) {
        (Digger, _) => ab.pval_flags = PvalFlags::TUNNEL,
        (Light, _) => ab.misc = Misc::LIGHT,
        (DragonArmor, 1) => ab.resists = Resists::ACID,
        (DragonArmor, 2) => ab.resists = Resists::ELEC,
        (DragonArmor, 3) => ab.resists = Resists::COLD,
        (DragonArmor, 4) => ab.resists = Resists::FIRE,
        (DragonArmor, 5) => ab.resists = Resists::POIS,
        (DragonArmor, 6) => ab.resists = Resists::LOW | Resists::POIS,
        (DragonArmor, 10) => ab.resists = Resists::LIGHT | Resists::DARK,
        (DragonArmor, 12) => ab.resists = Resists::SOUND | Resists::SHARD,
        (DragonArmor, 14) => ab.resists = Resists::CONF,
        (DragonArmor, 16) => ab.resists = Resists::SOUND,
        (DragonArmor, 18) => ab.resists = Resists::CHAOS | Resists::DISEN,
        (DragonArmor, 20) => {
            ab.resists = Resists::SOUND | Resists::SHARD | Resists::CHAOS | Resists::DISEN
        }
        (DragonArmor, 30) => ab.resists = Resists::all(),
        _ => {}
    }
    ab
}

/// The kind table used when a catalogue does not supply its own.
pub fn standard_kinds() -> Vec<BaseKind> {
    STANDARD_KINDS
        .iter()
        .map(|row| BaseKind {
            class: row.class,
            sval: row.sval,
            name: row.name.to_string(),
            level: row.level,
            alloc_prob: row.alloc,
            weight: row.weight,
            ac: row.ac,
            dd: row.dd,
            ds: row.ds,
            to_h: 0,
            to_d: 0,
            to_a: 0,
            pval: row.pval,
            abilities: default_abilities(row.class, row.sval),
        })
        .collect()
}

/// `(class, sval)` lookup over a kind list. Built once per session.
#[derive(Clone, Debug, Default)]
pub struct KindTable {
    kinds: Vec<BaseKind>,
    by_key: HashMap<(ItemClass, u8), usize>,
}

impl KindTable {
    pub fn new(kinds: Vec<BaseKind>) -> Self {
        let mut by_key = HashMap::with_capacity(kinds.len());
        for (idx, kind) in kinds.iter().enumerate() {
            by_key.entry((kind.class, kind.sval)).or_insert(idx);
        }
        Self { kinds, by_key }
    }

    /// Resolve a kind. A miss means the catalogue is inconsistent, which
    /// aborts the session.
    pub fn get(&self, class: ItemClass, sval: u8) -> Result<&BaseKind> {
        self.by_key
            .get(&(class, sval))
            .map(|&idx| &self.kinds[idx])
            .ok_or(RandartError::MissingKind { class, sval })
    }

    pub fn contains(&self, class: ItemClass, sval: u8) -> bool {
        self.by_key.contains_key(&(class, sval))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BaseKind> {
        self.kinds.iter()
    }
}
