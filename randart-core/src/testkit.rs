//! Fixtures shared by the unit tests.

use crate::catalogue::Catalogue;
use crate::kinds::{standard_kinds, KindTable};
use crate::object::{
    Abilities, Artifact, Curses, Immunities, ItemClass, Misc, MonsterFlags, MonsterRecord,
    PvalFlags, Resists, Slays, Sustains,
};

/// An unenchanted artifact on a standard kind.
pub fn plain_artifact(class: ItemClass, sval: u8) -> Artifact {
    let kinds = KindTable::new(standard_kinds());
    let kind = kinds.get(class, sval).unwrap();
    Artifact {
        index: 0,
        name: format!("Plain {}", kind.name),
        class,
        sval,
        pval: 0,
        to_h: 0,
        to_d: 0,
        to_a: 0,
        ac: kind.ac,
        dd: kind.dd,
        ds: kind.ds,
        weight: kind.weight,
        level: kind.level,
        rarity: 20,
        cost: 0,
        power: 0,
        activation: None,
        abilities: Abilities::default(),
    }
}

fn monster(
    name: &str,
    level: u8,
    hp: i32,
    speed: i16,
    dam: i32,
    flags: MonsterFlags,
) -> MonsterRecord {
    MonsterRecord {
        name: name.to_string(),
        level,
        hit_points: hp,
        speed,
        blow_damage: dam,
        flags,
    }
}

#[rustfmt::skip]
pub fn monsters() -> Vec<MonsterRecord> {
    use MonsterFlags as F;
    let cold_fire_pois = F::IM_FIRE | F::IM_COLD | F::IM_POIS;
    let all_immune = F::IM_ACID | F::IM_ELEC | cold_fire_pois;
    vec![
        monster("Grip", 1, 5, 120, 3, F::ANIMAL),
        monster("Soldier ant", 1, 6, 110, 3, F::ANIMAL),
        monster("Kobold", 2, 12, 110, 8, F::EVIL),
        monster("Cave spider", 2, 2, 120, 4, F::ANIMAL),
        monster("Snaga", 3, 8, 110, 8, F::EVIL | F::ORC),
        monster("Bullroarer", 10, 200, 120, 16, F::EVIL | F::ORC),
        monster("Wormtongue", 16, 150, 110, 10, F::EVIL | F::MAN),
        monster("Black orc", 13, 20, 110, 10, F::EVIL | F::ORC),
        monster("Hill giant", 20, 60, 110, 30, F::EVIL | F::GIANT),
        monster("Stone troll", 25, 90, 110, 24, F::EVIL | F::TROLL),
        monster("Olog", 35, 160, 115, 40, F::EVIL | F::TROLL | F::IM_POIS),
        monster("Fire giant", 30, 150, 110, 60, F::EVIL | F::GIANT | F::IM_FIRE),
        monster("Frost giant", 28, 130, 110, 50, F::EVIL | F::GIANT | F::IM_COLD),
        monster("Ghoul", 26, 80, 110, 20, F::EVIL | F::UNDEAD | F::IM_COLD | F::IM_POIS),
        monster("Wight", 30, 90, 110, 25, F::EVIL | F::UNDEAD | F::IM_COLD | F::IM_POIS),
        monster("Vampire", 27, 120, 110, 30, F::EVIL | F::UNDEAD | F::IM_COLD | F::IM_POIS),
        monster("Nether wraith", 52, 210, 120, 60, F::EVIL | F::UNDEAD | F::IM_COLD | F::IM_POIS),
        monster("Imp", 17, 30, 120, 10, F::EVIL | F::DEMON | F::IM_FIRE),
        monster("Vrock", 40, 180, 110, 45, F::EVIL | F::DEMON | F::IM_FIRE),
        monster("Balrog", 75, 3000, 130, 150, F::EVIL | F::DEMON | F::IM_FIRE),
        monster("Baby blue dragon", 9, 88, 110, 12, F::EVIL | F::DRAGON | F::IM_ELEC),
        monster("Young red dragon", 36, 290, 110, 40, F::EVIL | F::DRAGON | F::IM_FIRE),
        monster("Ancient white dragon", 38, 700, 120, 60, F::EVIL | F::DRAGON | F::IM_COLD),
        monster("Great wyrm of chaos", 67, 2900, 120, 150, F::EVIL | F::DRAGON),
        monster("Warg", 18, 28, 120, 16, F::ANIMAL | F::EVIL),
        monster("Cave bear", 9, 36, 110, 20, F::ANIMAL),
        monster("Wererat", 21, 90, 110, 24, F::ANIMAL | F::EVIL),
        monster("Easterling warrior", 22, 60, 110, 25, F::EVIL | F::MAN),
        monster("Dark elven priest", 18, 40, 120, 15, F::EVIL | F::ELF),
        monster("Petty-dwarf", 14, 40, 110, 15, F::DWARF),
        monster("Mumak", 35, 900, 110, 80, F::ANIMAL),
        monster("Black ogre", 15, 100, 110, 30, F::EVIL | F::GIANT),
        monster("Mind flayer", 22, 60, 110, 20, F::EVIL),
        monster("Gelatinous cube", 16, 300, 110, 25, all_immune),
        monster("Sauron", 99, 12000, 130, 300, F::EVIL | F::UNDEAD | cold_fire_pois),
        monster("Morgoth", 100, 20000, 140, 400, F::EVIL | all_immune),
    ]
}

struct Recipe {
    class: ItemClass,
    sval: u8,
    pval: i16,
    to_h: i16,
    to_d: i16,
    to_a: i16,
    abilities: Abilities,
    activation: Option<&'static str>,
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            class: ItemClass::Ring,
            sval: 23,
            pval: 0,
            to_h: 0,
            to_d: 0,
            to_a: 0,
            abilities: Abilities::default(),
            activation: None,
        }
    }
}

fn ab() -> Abilities {
    Abilities::default()
}

/// Twenty-five template shapes, cycled through by index.
fn recipe(i: usize) -> Recipe {
    use ItemClass::*;
    match i % 25 {
        0 => Recipe {
            class: Sword,
            sval: 17,
            pval: 2,
            to_h: 10,
            to_d: 12,
            abilities: Abilities {
                pval_flags: PvalFlags::STR | PvalFlags::DEX,
                sustains: Sustains::STR,
                resists: Resists::FIRE,
                slays: Slays::SLAY_EVIL | Slays::SLAY_ORC,
                ..ab()
            },
            ..Recipe::default()
        },
        1 => Recipe {
            class: Polearm,
            sval: 15,
            pval: 3,
            to_h: 8,
            to_d: 14,
            abilities: Abilities {
                pval_flags: PvalFlags::CON,
                resists: Resists::FIRE | Resists::COLD,
                slays: Slays::BRAND_FIRE,
                ..ab()
            },
            ..Recipe::default()
        },
        2 => Recipe {
            class: Hafted,
            sval: 12,
            pval: 2,
            to_h: 9,
            to_d: 11,
            abilities: Abilities {
                pval_flags: PvalFlags::WIS,
                slays: Slays::SLAY_UNDEAD | Slays::SLAY_DEMON,
                misc: Misc::SEE_INVIS,
                ..ab()
            },
            ..Recipe::default()
        },
        3 => Recipe {
            class: Bow,
            sval: 13,
            pval: 1,
            to_h: 15,
            to_d: 17,
            abilities: Abilities {
                pval_flags: PvalFlags::MIGHT,
                resists: Resists::ELEC,
                ..ab()
            },
            ..Recipe::default()
        },
        4 => Recipe {
            class: Bow,
            sval: 23,
            pval: 2,
            to_h: 10,
            to_d: 12,
            abilities: Abilities {
                pval_flags: PvalFlags::SHOTS,
                ..ab()
            },
            ..Recipe::default()
        },
        5 => Recipe {
            class: SoftArmor,
            sval: 8,
            pval: 2,
            to_a: 15,
            abilities: Abilities {
                pval_flags: PvalFlags::STEALTH,
                resists: Resists::LOW,
                ..ab()
            },
            ..Recipe::default()
        },
        6 => Recipe {
            class: HardArmor,
            sval: 12,
            to_a: 20,
            abilities: Abilities {
                sustains: Sustains::CON,
                resists: Resists::LOW | Resists::POIS,
                misc: Misc::HOLD_LIFE,
                ..ab()
            },
            ..Recipe::default()
        },
        7 => Recipe {
            class: Shield,
            sval: 5,
            to_a: 18,
            abilities: Abilities {
                resists: Resists::ACID | Resists::FIRE | Resists::COLD | Resists::SOUND,
                ..ab()
            },
            ..Recipe::default()
        },
        8 => Recipe {
            class: Cloak,
            sval: 1,
            pval: 3,
            to_a: 15,
            abilities: Abilities {
                pval_flags: PvalFlags::STEALTH,
                resists: Resists::ACID | Resists::POIS,
                ..ab()
            },
            ..Recipe::default()
        },
        9 => Recipe {
            class: Helm,
            sval: 5,
            pval: 2,
            to_a: 12,
            abilities: Abilities {
                pval_flags: PvalFlags::INT | PvalFlags::WIS,
                resists: Resists::BLIND,
                misc: Misc::SEE_INVIS,
                ..ab()
            },
            ..Recipe::default()
        },
        10 => Recipe {
            class: Crown,
            sval: 10,
            pval: 3,
            abilities: Abilities {
                pval_flags: PvalFlags::INT | PvalFlags::WIS,
                resists: Resists::CONF,
                misc: Misc::TELEPATHY,
                ..ab()
            },
            ..Recipe::default()
        },
        11 => Recipe {
            class: Gloves,
            sval: 2,
            pval: 2,
            to_a: 10,
            abilities: Abilities {
                pval_flags: PvalFlags::DEX,
                resists: Resists::ELEC,
                misc: Misc::FREE_ACT,
                ..ab()
            },
            ..Recipe::default()
        },
        12 => Recipe {
            class: Boots,
            sval: 3,
            pval: 5,
            to_a: 12,
            abilities: Abilities {
                pval_flags: PvalFlags::SPEED,
                misc: Misc::FEATHER,
                ..ab()
            },
            ..Recipe::default()
        },
        13 => Recipe {
            class: Light,
            sval: 4,
            abilities: Abilities {
                resists: Resists::LIGHT | Resists::DARK,
                misc: Misc::LIGHT,
                ..ab()
            },
            activation: Some("illumination"),
            ..Recipe::default()
        },
        14 => Recipe {
            class: Amulet,
            sval: 12,
            pval: 2,
            abilities: Abilities {
                pval_flags: PvalFlags::WIS | PvalFlags::CHR,
                resists: Resists::POIS,
                misc: Misc::SLOW_DIGEST,
                ..ab()
            },
            ..Recipe::default()
        },
        15 => Recipe {
            class: Ring,
            sval: 24,
            pval: 3,
            abilities: Abilities {
                pval_flags: PvalFlags::STR | PvalFlags::CON,
                sustains: Sustains::STR | Sustains::CON,
                resists: Resists::FIRE | Resists::COLD,
                ..ab()
            },
            activation: Some("fire bolt"),
            ..Recipe::default()
        },
        16 => Recipe {
            class: Sword,
            sval: 20,
            pval: 2,
            to_h: 12,
            to_d: 13,
            abilities: Abilities {
                pval_flags: PvalFlags::BLOWS,
                slays: Slays::KILL_DRAGON | Slays::SLAY_TROLL,
                ..ab()
            },
            ..Recipe::default()
        },
        17 => Recipe {
            class: Digger,
            sval: 6,
            pval: 4,
            to_h: 5,
            to_d: 5,
            abilities: Abilities {
                pval_flags: PvalFlags::TUNNEL | PvalFlags::STR,
                resists: Resists::ACID,
                ..ab()
            },
            ..Recipe::default()
        },
        18 => Recipe {
            class: Polearm,
            sval: 22,
            pval: -2,
            to_h: -5,
            to_d: -5,
            abilities: Abilities {
                pval_flags: PvalFlags::STR,
                curses: Curses::LIGHT_CURSE
                    | Curses::HEAVY_CURSE
                    | Curses::AGGRAVATE
                    | Curses::TELEPORT,
                ..ab()
            },
            ..Recipe::default()
        },
        19 => Recipe {
            class: DragonArmor,
            sval: 4,
            to_a: 10,
            abilities: Abilities {
                resists: Resists::POIS,
                immunities: Immunities::FIRE,
                ..ab()
            },
            activation: Some("fire breath"),
            ..Recipe::default()
        },
        20 => Recipe {
            class: Sword,
            sval: 10,
            pval: 1,
            to_h: 7,
            to_d: 8,
            abilities: Abilities {
                pval_flags: PvalFlags::SPEED,
                slays: Slays::BRAND_COLD,
                misc: Misc::REGEN,
                ..ab()
            },
            ..Recipe::default()
        },
        21 => Recipe {
            class: Bow,
            sval: 2,
            pval: 2,
            to_h: 8,
            to_d: 8,
            abilities: Abilities {
                pval_flags: PvalFlags::SHOTS,
                ..ab()
            },
            ..Recipe::default()
        },
        22 => Recipe {
            class: Gloves,
            sval: 5,
            to_h: -3,
            to_a: -8,
            abilities: Abilities {
                curses: Curses::LIGHT_CURSE | Curses::DRAIN_EXP,
                ..ab()
            },
            ..Recipe::default()
        },
        23 => Recipe {
            class: Boots,
            sval: 2,
            pval: 2,
            to_a: 8,
            abilities: Abilities {
                pval_flags: PvalFlags::STEALTH,
                resists: Resists::NEXUS,
                misc: Misc::FEATHER | Misc::FREE_ACT,
                ..ab()
            },
            ..Recipe::default()
        },
        _ => Recipe {
            class: Shield,
            sval: 10,
            to_a: 20,
            abilities: Abilities {
                resists: Resists::LOW,
                sustains: Sustains::DEX,
                ..ab()
            },
            ..Recipe::default()
        },
    }
}

fn special(index: usize) -> Option<(Recipe, &'static str)> {
    let stats = PvalFlags::STATS;
    match index {
        13 => Some((
            Recipe {
                class: ItemClass::Ring,
                sval: 32,
                pval: 5,
                abilities: Abilities {
                    pval_flags: stats | PvalFlags::SPEED,
                    sustains: Sustains::all(),
                    resists: Resists::POIS | Resists::NETHER | Resists::CHAOS,
                    immunities: Immunities::FIRE | Immunities::COLD,
                    misc: Misc::TELEPATHY | Misc::SEE_INVIS | Misc::FREE_ACT,
                    curses: Curses::LIGHT_CURSE | Curses::HEAVY_CURSE | Curses::PERMA_CURSE,
                    ..ab()
                },
                activation: Some("bizarre things"),
                ..Recipe::default()
            },
            "of Power (The One Ring)",
        )),
        34 => Some((
            Recipe {
                class: ItemClass::Crown,
                sval: 12,
                pval: 5,
                to_a: 50,
                abilities: Abilities {
                    pval_flags: stats | PvalFlags::INFRA,
                    resists: Resists::all(),
                    misc: Misc::TELEPATHY | Misc::SEE_INVIS | Misc::LIGHT,
                    curses: Curses::LIGHT_CURSE
                        | Curses::HEAVY_CURSE
                        | Curses::PERMA_CURSE
                        | Curses::AGGRAVATE,
                    ..ab()
                },
                ..Recipe::default()
            },
            "of Morgoth",
        )),
        111 => Some((
            Recipe {
                class: ItemClass::Hafted,
                sval: 20,
                to_h: 30,
                to_d: 30,
                to_a: 10,
                abilities: Abilities {
                    slays: Slays::KILL_DRAGON | Slays::SLAY_EVIL | Slays::SLAY_ANIMAL,
                    misc: Misc::IMPACT | Misc::SEE_INVIS,
                    curses: Curses::AGGRAVATE,
                    ..ab()
                },
                ..Recipe::default()
            },
            "'Grond'",
        )),
        _ => None,
    }
}

fn build(index: usize, recipe: Recipe, name: String) -> Artifact {
    let mut art = plain_artifact(recipe.class, recipe.sval);
    art.index = index;
    art.name = name;
    art.pval = recipe.pval;
    art.to_h = recipe.to_h;
    art.to_d = recipe.to_d;
    art.to_a = recipe.to_a;
    art.level = 5 + ((index * 13) % 80) as u8;
    art.rarity = 20 + ((index * 7) % 60) as u8;
    art.activation = recipe.activation.map(str::to_string);
    art.abilities = recipe.abilities;
    if art.activation.is_some() {
        art.abilities.misc |= Misc::ACTIVATE;
    }
    art.normalized()
}

/// `n` named templates indexed by position, with the three specials at
/// their usual slots.
pub fn catalogue(n: usize) -> Catalogue {
    let artifacts = (0..n)
        .map(|i| match special(i) {
            Some((recipe, name)) => build(i, recipe, name.to_string()),
            None => build(i, recipe(i), format!("Template {i}")),
        })
        .collect();
    Catalogue {
        kinds: None,
        monsters: monsters(),
        artifacts,
    }
}
