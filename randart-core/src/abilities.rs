use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{SoftCeiling, Tuning};
use crate::frequency::{AbilityCategory, CumulativeTable};
use crate::object::{Artifact, Curses, Immunities, Misc, PvalFlags, Resists, Slays, Sustains};

const STATS: [PvalFlags; 6] = [
    PvalFlags::STR,
    PvalFlags::INT,
    PvalFlags::WIS,
    PvalFlags::DEX,
    PvalFlags::CON,
    PvalFlags::CHR,
];

const SUSTAINS: [Sustains; 6] = [
    Sustains::STR,
    Sustains::INT,
    Sustains::WIS,
    Sustains::DEX,
    Sustains::CON,
    Sustains::CHR,
];

const LOW_RESISTS: [Resists; 4] = [Resists::ACID, Resists::ELEC, Resists::FIRE, Resists::COLD];

const HIGH_RESISTS: [Resists; 12] = [
    Resists::POIS,
    Resists::FEAR,
    Resists::LIGHT,
    Resists::DARK,
    Resists::BLIND,
    Resists::CONF,
    Resists::SOUND,
    Resists::SHARD,
    Resists::NEXUS,
    Resists::NETHER,
    Resists::CHAOS,
    Resists::DISEN,
];

const IMMUNITIES: [Immunities; 4] = [
    Immunities::ACID,
    Immunities::ELEC,
    Immunities::FIRE,
    Immunities::COLD,
];

/// The twenty slay and brand options. The first fourteen are slays.
const SLAY_CHOICES: [Slays; 20] = [
    Slays::SLAY_ANIMAL,
    Slays::SLAY_EVIL,
    Slays::SLAY_UNDEAD,
    Slays::SLAY_DEMON,
    Slays::SLAY_ORC,
    Slays::SLAY_TROLL,
    Slays::SLAY_GIANT,
    Slays::SLAY_DRAGON,
    Slays::KILL_DRAGON,
    Slays::KILL_DEMON,
    Slays::KILL_UNDEAD,
    Slays::SLAY_MAN,
    Slays::SLAY_ELF,
    Slays::SLAY_DWARF,
    Slays::BRAND_ACID,
    Slays::BRAND_ELEC,
    Slays::BRAND_FIRE,
    Slays::BRAND_COLD,
    Slays::BRAND_POIS,
    Slays::BRAND_HOLY,
];

/// Passes always below `high`, one time in two above it and one time in six
/// above `very_high`.
pub fn passes_soft_ceiling<R: Rng>(rng: &mut R, current: i16, ceiling: SoftCeiling) -> bool {
    if current > ceiling.very_high {
        rng.gen_ratio(1, 6)
    } else if current > ceiling.high {
        rng.gen_ratio(1, 2)
    } else {
        true
    }
}

fn bump_pval<R: Rng>(art: &mut Artifact, rng: &mut R, tuning: &Tuning) {
    if art.pval == 0 {
        art.pval = rng.gen_range(1..=4);
    } else if art.pval < 0 {
        if rng.gen_ratio(1, 2) {
            art.pval -= 1;
        }
    } else if passes_soft_ceiling(rng, art.pval, tuning.soft_ceilings.pval) {
        art.pval += 1;
    }
}

fn add_pval_flag<R: Rng>(art: &mut Artifact, flag: PvalFlags, rng: &mut R, tuning: &Tuning) {
    art.abilities.pval_flags |= flag;
    bump_pval(art, rng, tuning);
}

fn add_stat<R: Rng>(art: &mut Artifact, rng: &mut R, tuning: &Tuning) {
    let absent: Vec<PvalFlags> = STATS
        .iter()
        .copied()
        .filter(|s| !art.abilities.pval_flags.contains(*s))
        .collect();
    if let Some(&stat) = absent.choose(rng) {
        art.abilities.pval_flags |= stat;
    }
    bump_pval(art, rng, tuning);
}

fn add_sustain<R: Rng>(art: &mut Artifact, rng: &mut R) {
    let absent: Vec<Sustains> = SUSTAINS
        .iter()
        .copied()
        .filter(|s| !art.abilities.sustains.contains(*s))
        .collect();
    if let Some(&s) = absent.choose(rng) {
        art.abilities.sustains |= s;
    }
}

fn add_resist_from<R: Rng>(art: &mut Artifact, pool: &[Resists], rng: &mut R) {
    let absent: Vec<Resists> = pool
        .iter()
        .copied()
        .filter(|r| !art.abilities.resists.contains(*r))
        .collect();
    if let Some(&r) = absent.choose(rng) {
        art.abilities.resists |= r;
    }
}

fn add_immunity<R: Rng>(art: &mut Artifact, rng: &mut R) {
    let absent: Vec<Immunities> = IMMUNITIES
        .iter()
        .copied()
        .filter(|i| !art.abilities.immunities.contains(*i))
        .collect();
    if let Some(&i) = absent.choose(rng) {
        art.abilities.immunities |= i;
    }
}

fn add_slay_from<R: Rng>(art: &mut Artifact, pool: &[Slays], rng: &mut R) {
    let current = art.abilities.slays;
    let holy = current.contains(Slays::BRAND_HOLY);
    let kindred = current.intersects(Slays::KINDRED);
    let absent: Vec<Slays> = pool
        .iter()
        .copied()
        .filter(|s| !current.contains(*s))
        .filter(|s| !(holy && Slays::KINDRED.contains(*s)))
        .filter(|s| !(kindred && *s == Slays::BRAND_HOLY))
        .collect();
    if let Some(&s) = absent.choose(rng) {
        art.abilities.slays |= s;
    }
}

fn add_to_hit<R: Rng>(art: &mut Artifact, rng: &mut R, tuning: &Tuning) {
    if passes_soft_ceiling(rng, art.to_h, tuning.soft_ceilings.to_h) {
        art.to_h += 1 + rng.gen_range(0..6);
    }
}

fn add_to_dam<R: Rng>(art: &mut Artifact, rng: &mut R, tuning: &Tuning) {
    if passes_soft_ceiling(rng, art.to_d, tuning.soft_ceilings.to_d) {
        art.to_d += 1 + rng.gen_range(0..6);
    }
}

fn add_to_ac<R: Rng>(art: &mut Artifact, rng: &mut R, tuning: &Tuning) {
    if passes_soft_ceiling(rng, art.to_a, tuning.soft_ceilings.to_a) {
        art.to_a += 1 + rng.gen_range(0..8);
    }
}

fn lighten(art: &mut Artifact) {
    art.weight = art.weight * 9 / 10;
}

/// Apply one category's mutator to a copy of `art`. Abilities that are
/// already present leave the copy unchanged.
pub fn apply_category<R: Rng>(
    art: &Artifact,
    cat: AbilityCategory,
    rng: &mut R,
    tuning: &Tuning,
) -> Artifact {
    use AbilityCategory::*;

    let mut a = art.clone();
    match cat {
        BowShots | NonWeaponShots => add_pval_flag(&mut a, PvalFlags::SHOTS, rng, tuning),
        BowMight => add_pval_flag(&mut a, PvalFlags::MIGHT, rng, tuning),
        MeleeBlows | NonWeaponBlows => add_pval_flag(&mut a, PvalFlags::BLOWS, rng, tuning),
        WeaponHit | NonWeaponHit => add_to_hit(&mut a, rng, tuning),
        WeaponDam | NonWeaponDam => add_to_dam(&mut a, rng, tuning),
        NonWeaponHitDam => {
            add_to_hit(&mut a, rng, tuning);
            add_to_dam(&mut a, rng, tuning);
        }
        NonWeaponSlay | MeleeSlay => add_slay_from(&mut a, &SLAY_CHOICES[..14], rng),
        NonWeaponBrand | MeleeBrand => add_slay_from(&mut a, &SLAY_CHOICES[14..], rng),
        MeleeBless => a.abilities.misc |= Misc::BLESSED,
        MeleeSeeInvis | HelmSeeInvis | SeeInvis => a.abilities.misc |= Misc::SEE_INVIS,
        MeleeAc | BootAc | GloveAc | HelmAc | ShieldAc | CloakAc | BodyAc | Ac => {
            add_to_ac(&mut a, rng, tuning)
        }
        MeleeDice => {
            if a.dd < 9 {
                a.dd += 1;
            }
        }
        MeleeWeight | ArmorWeight => lighten(&mut a),
        MeleeTunnel | Tunnel => add_pval_flag(&mut a, PvalFlags::TUNNEL, rng, tuning),
        BootFeather | Feather => a.abilities.misc |= Misc::FEATHER,
        BootStealth | CloakStealth | BodyStealth | Stealth => {
            add_pval_flag(&mut a, PvalFlags::STEALTH, rng, tuning)
        }
        BootSpeed | Speed => add_pval_flag(&mut a, PvalFlags::SPEED, rng, tuning),
        GloveFreeAct | FreeAct => a.abilities.misc |= Misc::FREE_ACT,
        GloveDex => add_pval_flag(&mut a, PvalFlags::DEX, rng, tuning),
        HelmResBlind | ResBlind => a.abilities.resists |= Resists::BLIND,
        HelmTelepathy | Telepathy => a.abilities.misc |= Misc::TELEPATHY,
        HelmWis => add_pval_flag(&mut a, PvalFlags::WIS, rng, tuning),
        HelmInt => add_pval_flag(&mut a, PvalFlags::INT, rng, tuning),
        ShieldLowResist | BodyLowResist | LowResist => add_resist_from(&mut a, &LOW_RESISTS, rng),
        BodyAllLowResist => a.abilities.resists |= Resists::LOW,
        BodyHighResist => add_resist_from(&mut a, &HIGH_RESISTS, rng),
        BodyHoldLife | HoldLife => a.abilities.misc |= Misc::HOLD_LIFE,
        BodyCon => add_pval_flag(&mut a, PvalFlags::CON, rng, tuning),
        Stat => add_stat(&mut a, rng, tuning),
        Sustain => add_sustain(&mut a, rng),
        Search => add_pval_flag(&mut a, PvalFlags::SEARCH, rng, tuning),
        Infra => add_pval_flag(&mut a, PvalFlags::INFRA, rng, tuning),
        Immunity => add_immunity(&mut a, rng),
        Light => a.abilities.misc |= Misc::LIGHT,
        SlowDigest => a.abilities.misc |= Misc::SLOW_DIGEST,
        Regen => a.abilities.misc |= Misc::REGEN,
        ResPois => a.abilities.resists |= Resists::POIS,
        ResFear => a.abilities.resists |= Resists::FEAR,
        ResLight => a.abilities.resists |= Resists::LIGHT,
        ResDark => a.abilities.resists |= Resists::DARK,
        ResConf => a.abilities.resists |= Resists::CONF,
        ResSound => a.abilities.resists |= Resists::SOUND,
        ResShard => a.abilities.resists |= Resists::SHARD,
        ResNexus => a.abilities.resists |= Resists::NEXUS,
        ResNether => a.abilities.resists |= Resists::NETHER,
        ResChaos => a.abilities.resists |= Resists::CHAOS,
        ResDisen => a.abilities.resists |= Resists::DISEN,
        // Rolled by the scrambler, never drawn.
        MeleeDiceSuper | BowShotsSuper | BowMightSuper | SpeedSuper | WeaponAggravate
        | NonWeaponAggravate => {}
    }

    finish(&mut a);
    a
}

/// Rules that hold after every mutation.
fn finish(a: &mut Artifact) {
    if a.class.blesses_with_wisdom()
        && a.pval > 0
        && a.abilities.pval_flags.contains(PvalFlags::WIS)
    {
        a.abilities.misc |= Misc::BLESSED;
    }
    a.normalize();
}

/// Draw one category from `table` and apply it. Returns the category drawn
/// alongside the new item.
pub fn add_one_ability<R: Rng>(
    art: &Artifact,
    table: &CumulativeTable,
    rng: &mut R,
    tuning: &Tuning,
) -> (Option<AbilityCategory>, Artifact) {
    match table.pick(rng) {
        Some(cat) => (Some(cat), apply_category(art, cat, rng, tuning)),
        None => (None, art.clone()),
    }
}

/// One random drawback, then escalate the curse level.
pub fn apply_curse<R: Rng>(art: &Artifact, rng: &mut R) -> Artifact {
    let mut a = art.clone();
    match rng.gen_range(0..8) {
        0 if a.pval > 0 => a.pval = -a.pval,
        1 if a.to_h > 0 => a.to_h = -a.to_h,
        2 if a.to_d > 0 => a.to_d = -a.to_d,
        3 if a.to_a > 0 => a.to_a = -a.to_a,
        4 => a.abilities.curses |= Curses::AGGRAVATE,
        5 => a.abilities.curses |= Curses::DRAIN_EXP,
        6 => a.abilities.curses |= Curses::TELEPORT,
        7 => a.abilities.curses |= Curses::NO_TELEPORT,
        _ => {}
    }

    let curses = &mut a.abilities.curses;
    if curses.contains(Curses::HEAVY_CURSE) {
        if rng.gen_ratio(1, 4) {
            *curses |= Curses::PERMA_CURSE;
        }
    } else if curses.contains(Curses::LIGHT_CURSE) {
        if rng.gen_ratio(1, 2) {
            *curses |= Curses::HEAVY_CURSE;
        }
    } else {
        *curses |= Curses::LIGHT_CURSE;
    }

    a.normalize();
    a
}
