use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::kinds::KindTable;
use crate::object::ItemClass;
use crate::{RandartError, Result};

/// Upper bounds of the flat `0..100` category draw.
const CLASS_THRESHOLDS: [(u32, Slot); 11] = [
    (5, Slot::Bow),
    (9, Slot::Digger),
    (19, Slot::Hafted),
    (33, Slot::Sword),
    (42, Slot::Polearm),
    (64, Slot::Body),
    (71, Slot::Boots),
    (78, Slot::Gloves),
    (87, Slot::Headgear),
    (94, Slot::Shield),
    (100, Slot::Cloak),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Bow,
    Digger,
    Hafted,
    Sword,
    Polearm,
    Body,
    Boots,
    Gloves,
    Headgear,
    Shield,
    Cloak,
}

// Each ladder maps the level-biased draw to an sval, weakest first. The draw
// picks the first rung whose bound it does not exceed; past the last bound it
// takes the last rung.
const BOWS: &[(i32, u8)] = &[(3, 2), (10, 12), (30, 13), (45, 23), (i32::MAX, 24)];
const DIGGERS: &[(i32, u8)] = &[(15, 1), (30, 4), (45, 2), (60, 5), (75, 3), (i32::MAX, 6)];
const HAFTED: &[(i32, u8)] = &[
    (3, 2),
    (5, 5),
    (8, 8),
    (15, 3),
    (20, 6),
    (30, 10),
    (45, 12),
    (60, 15),
    (90, 18),
    (i32::MAX, 20),
];
const SWORDS: &[(i32, u8)] = &[
    (0, 4),
    (5, 5),
    (10, 7),
    (15, 8),
    (20, 10),
    (25, 11),
    (30, 12),
    (35, 15),
    (40, 16),
    (45, 17),
    (50, 18),
    (55, 21),
    (60, 20),
    (70, 25),
    (80, 28),
    (i32::MAX, 30),
];
const POLEARMS: &[(i32, u8)] = &[
    (3, 2),
    (6, 5),
    (8, 4),
    (15, 8),
    (20, 10),
    (25, 11),
    (30, 13),
    (40, 15),
    (50, 20),
    (60, 22),
    (70, 17),
    (80, 25),
    (90, 28),
    (i32::MAX, 30),
];
const SOFT_ARMOR: &[(i32, u8)] = &[(8, 2), (15, 4), (22, 6), (30, 8), (35, 11)];
const HARD_ARMOR: &[(i32, u8)] = &[
    (40, 1),
    (45, 4),
    (50, 3),
    (55, 5),
    (60, 6),
    (70, 9),
    (80, 10),
    (90, 12),
    (100, 15),
    (110, 20),
    (120, 25),
    (130, 30),
];
const DRAGON_ARMOR: &[(i32, u8)] = &[
    (135, 1),
    (140, 2),
    (145, 3),
    (150, 4),
    (155, 5),
    (160, 6),
    (165, 10),
    (170, 12),
    (175, 14),
    (180, 16),
    (190, 18),
    (200, 20),
    (i32::MAX, 30),
];
const BOOTS: &[(i32, u8)] = &[(20, 2), (45, 3), (i32::MAX, 6)];
const GLOVES: &[(i32, u8)] = &[(10, 1), (40, 2), (i32::MAX, 5)];
const HELMS: &[(i32, u8)] = &[(10, 2), (30, 3), (60, 5), (100, 6)];
const CROWNS: &[(i32, u8)] = &[(120, 10), (140, 11), (i32::MAX, 12)];
const SHIELDS: &[(i32, u8)] = &[(10, 2), (25, 4), (40, 3), (80, 5), (i32::MAX, 10)];
const CLOAKS: &[(i32, u8)] = &[(30, 1), (90, 2), (i32::MAX, 6)];

const LADDERS: &[(ItemClass, &[(i32, u8)])] = &[
    (ItemClass::Bow, BOWS),
    (ItemClass::Digger, DIGGERS),
    (ItemClass::Hafted, HAFTED),
    (ItemClass::Sword, SWORDS),
    (ItemClass::Polearm, POLEARMS),
    (ItemClass::SoftArmor, SOFT_ARMOR),
    (ItemClass::HardArmor, HARD_ARMOR),
    (ItemClass::DragonArmor, DRAGON_ARMOR),
    (ItemClass::Boots, BOOTS),
    (ItemClass::Gloves, GLOVES),
    (ItemClass::Helm, HELMS),
    (ItemClass::Crown, CROWNS),
    (ItemClass::Shield, SHIELDS),
    (ItemClass::Cloak, CLOAKS),
];

/// Every `(class, sval)` the chooser can return.
pub fn drawable_kinds() -> impl Iterator<Item = (ItemClass, u8)> {
    LADDERS
        .iter()
        .flat_map(|&(class, ladder)| {
            ladder.iter().map(move |&(_, sval)| (class, sval))
        })
}

/// A replacement kind table must still hold every base the chooser draws.
pub fn check_kinds(kinds: &KindTable) -> Result<()> {
    let missing: Vec<String> = drawable_kinds()
        .filter(|&(class, sval)| !kinds.contains(class, sval))
        .map(|(class, sval)| format!("{class} {sval}"))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(RandartError::Config(format!(
        "kind table lacks base items the generator draws from: {}",
        missing.join(", ")
    )))
}

fn rung(ladder: &[(i32, u8)], draw: i32) -> u8 {
    ladder
        .iter()
        .find(|&&(bound, _)| draw <= bound)
        .or_else(|| ladder.last())
        .map_or(0, |&(_, sval)| sval)
}

/// Level-biased draw: mean twice the level, spread of one level.
fn level_draw<R: Rng>(rng: &mut R, target_level: u8) -> i32 {
    let level = f64::from(target_level);
    match Normal::new(2.0 * level, level) {
        Ok(dist) => dist.sample(rng).round() as i32,
        Err(_) => 2 * i32::from(target_level),
    }
}

/// Pick a concrete base kind for a generated artifact of roughly
/// `target_level`. Always returns one of `drawable_kinds`.
pub fn choose_base_item<R: Rng>(rng: &mut R, target_level: u8) -> (ItemClass, u8) {
    let r = rng.gen_range(0..100u32);
    let slot = CLASS_THRESHOLDS
        .iter()
        .find(|&&(bound, _)| r < bound)
        .map_or(Slot::Cloak, |&(_, slot)| slot);
    let draw = level_draw(rng, target_level);

    match slot {
        Slot::Bow => (ItemClass::Bow, rung(BOWS, draw)),
        Slot::Digger => (ItemClass::Digger, rung(DIGGERS, draw)),
        Slot::Hafted => (ItemClass::Hafted, rung(HAFTED, draw)),
        Slot::Sword => (ItemClass::Sword, rung(SWORDS, draw)),
        Slot::Polearm => (ItemClass::Polearm, rung(POLEARMS, draw)),
        // Body armour spans three classes; the same draw decides which.
        Slot::Body => {
            if draw <= 35 {
                (ItemClass::SoftArmor, rung(SOFT_ARMOR, draw))
            } else if draw <= 130 {
                (ItemClass::HardArmor, rung(HARD_ARMOR, draw))
            } else {
                (ItemClass::DragonArmor, rung(DRAGON_ARMOR, draw))
            }
        }
        Slot::Boots => (ItemClass::Boots, rung(BOOTS, draw)),
        Slot::Gloves => (ItemClass::Gloves, rung(GLOVES, draw)),
        Slot::Headgear => {
            if draw <= 100 {
                (ItemClass::Helm, rung(HELMS, draw))
            } else {
                (ItemClass::Crown, rung(CROWNS, draw))
            }
        }
        Slot::Shield => (ItemClass::Shield, rung(SHIELDS, draw)),
        Slot::Cloak => (ItemClass::Cloak, rung(CLOAKS, draw)),
    }
}
