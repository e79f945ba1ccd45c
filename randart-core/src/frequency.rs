use rand::Rng;
use strum::{EnumCount, IntoEnumIterator};

use crate::catalogue::Catalogue;
use crate::config::Tuning;
use crate::diagnostics::DiagnosticLog;
use crate::kinds::{BaseKind, KindTable};
use crate::object::{Artifact, Curses, ItemClass, Misc, PvalFlags, Resists, Slays};
use crate::power::{total_threat, PowerEvaluator};
use crate::Result;

/// Which item classes a category may be drawn for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Bow,
    Melee,
    Weapon,
    NonWeapon,
    Boots,
    Gloves,
    Headgear,
    Shield,
    Cloak,
    BodyArmor,
    Armor,
    Generic,
}

impl Scope {
    pub fn includes(self, class: ItemClass) -> bool {
        match self {
            Scope::Bow => class.is_bow(),
            Scope::Melee => class.is_melee(),
            Scope::Weapon => class.is_weapon(),
            Scope::NonWeapon => !class.is_weapon(),
            Scope::Boots => class == ItemClass::Boots,
            Scope::Gloves => class == ItemClass::Gloves,
            Scope::Headgear => class.is_headgear(),
            Scope::Shield => class == ItemClass::Shield,
            Scope::Cloak => class == ItemClass::Cloak,
            Scope::BodyArmor => class.is_body_armor(),
            Scope::Armor => class.is_armor(),
            Scope::Generic => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Drawn by the synthesizer.
    Ordinary,
    /// Rolled once per item in the supercharge step.
    Supercharge,
    /// Rolled once per item as a drawback of high power.
    Aggravation,
}

/// One independently selectable item power.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum AbilityCategory {
    BowShots,
    BowMight,
    WeaponHit,
    WeaponDam,
    NonWeaponHit,
    NonWeaponDam,
    NonWeaponHitDam,
    NonWeaponSlay,
    NonWeaponBrand,
    NonWeaponBlows,
    NonWeaponShots,
    MeleeBless,
    MeleeBrand,
    MeleeSlay,
    MeleeSeeInvis,
    MeleeBlows,
    MeleeAc,
    MeleeDice,
    MeleeWeight,
    MeleeTunnel,
    ArmorWeight,
    BootAc,
    BootFeather,
    BootStealth,
    BootSpeed,
    GloveAc,
    GloveFreeAct,
    GloveDex,
    HelmAc,
    HelmResBlind,
    HelmTelepathy,
    HelmSeeInvis,
    HelmWis,
    HelmInt,
    ShieldAc,
    ShieldLowResist,
    CloakAc,
    CloakStealth,
    BodyAc,
    BodyStealth,
    BodyHoldLife,
    BodyCon,
    BodyLowResist,
    BodyAllLowResist,
    BodyHighResist,
    Stat,
    Sustain,
    Stealth,
    Search,
    Infra,
    Speed,
    Immunity,
    FreeAct,
    HoldLife,
    Feather,
    Light,
    SeeInvis,
    Telepathy,
    SlowDigest,
    Regen,
    LowResist,
    ResPois,
    ResFear,
    ResLight,
    ResDark,
    ResBlind,
    ResConf,
    ResSound,
    ResShard,
    ResNexus,
    ResNether,
    ResChaos,
    ResDisen,
    Ac,
    Tunnel,
    MeleeDiceSuper,
    BowShotsSuper,
    BowMightSuper,
    SpeedSuper,
    WeaponAggravate,
    NonWeaponAggravate,
}

/// Floor for categories every item class relies on.
pub const STRUCTURAL_FLOOR: u32 = 5;
pub const ORDINARY_FLOOR: u32 = 1;

impl AbilityCategory {
    pub fn scope(self) -> Scope {
        use AbilityCategory::*;
        match self {
            BowShots | BowMight | BowShotsSuper | BowMightSuper => Scope::Bow,
            WeaponHit | WeaponDam | WeaponAggravate => Scope::Weapon,
            NonWeaponHit | NonWeaponDam | NonWeaponHitDam | NonWeaponSlay | NonWeaponBrand
            | NonWeaponBlows | NonWeaponShots | NonWeaponAggravate => Scope::NonWeapon,
            MeleeBless | MeleeBrand | MeleeSlay | MeleeSeeInvis | MeleeBlows | MeleeAc
            | MeleeDice | MeleeWeight | MeleeTunnel | MeleeDiceSuper => Scope::Melee,
            ArmorWeight => Scope::Armor,
            BootAc | BootFeather | BootStealth | BootSpeed => Scope::Boots,
            GloveAc | GloveFreeAct | GloveDex => Scope::Gloves,
            HelmAc | HelmResBlind | HelmTelepathy | HelmSeeInvis | HelmWis | HelmInt => {
                Scope::Headgear
            }
            ShieldAc | ShieldLowResist => Scope::Shield,
            CloakAc | CloakStealth => Scope::Cloak,
            BodyAc | BodyStealth | BodyHoldLife | BodyCon | BodyLowResist | BodyAllLowResist
            | BodyHighResist => Scope::BodyArmor,
            _ => Scope::Generic,
        }
    }

    pub fn role(self) -> Role {
        use AbilityCategory::*;
        match self {
            MeleeDiceSuper | BowShotsSuper | BowMightSuper | SpeedSuper => Role::Supercharge,
            WeaponAggravate | NonWeaponAggravate => Role::Aggravation,
            _ => Role::Ordinary,
        }
    }

    pub fn floor(self) -> u32 {
        use AbilityCategory::*;
        match self {
            BowShots | BowMight | WeaponHit | WeaponDam | MeleeDice | BootAc | GloveAc
            | HelmAc | ShieldAc | CloakAc | BodyAc | Stat | Sustain | LowResist => {
                STRUCTURAL_FLOOR
            }
            _ if self.role() == Role::Ordinary => ORDINARY_FLOOR,
            _ => 0,
        }
    }

    /// Legal for the synthesizer on an item of `class`.
    pub fn is_drawable_for(self, class: ItemClass) -> bool {
        self.role() == Role::Ordinary && self.scope().includes(class)
    }
}

/// Learned weight per ability category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    weights: Vec<u32>,
    /// Number of templates tallied; the denominator of supercharge rolls.
    sample: u32,
}

impl FrequencyTable {
    pub fn zeroed() -> Self {
        Self {
            weights: vec![0; AbilityCategory::COUNT],
            sample: 0,
        }
    }

    pub fn get(&self, cat: AbilityCategory) -> u32 {
        self.weights[cat as usize]
    }

    pub fn set(&mut self, cat: AbilityCategory, weight: u32) {
        self.weights[cat as usize] = weight;
    }

    pub fn sample(&self) -> u32 {
        self.sample
    }

    /// Raise every category to at least its floor.
    pub fn apply_floors(&mut self) {
        for cat in AbilityCategory::iter() {
            let w = &mut self.weights[cat as usize];
            *w = (*w).max(cat.floor());
        }
    }

    /// Roll a supercharge or aggravation category against its learned rate.
    pub fn roll<R: Rng>(&self, rng: &mut R, cat: AbilityCategory) -> bool {
        let w = self.get(cat);
        w > 0 && rng.gen_range(0..self.sample.max(1)) < w
    }

    /// Cumulative weights of the categories drawable for `class`.
    pub fn cumulative_for(&self, class: ItemClass) -> CumulativeTable {
        let mut entries = Vec::new();
        let mut running = 0u32;
        for cat in AbilityCategory::iter().filter(|c| c.is_drawable_for(class)) {
            running += self.get(cat);
            entries.push((cat, running));
        }
        CumulativeTable { entries }
    }
}

/// Non-decreasing running totals over the eligible categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CumulativeTable {
    entries: Vec<(AbilityCategory, u32)>,
}

impl CumulativeTable {
    pub fn total(&self) -> u32 {
        self.entries.last().map_or(0, |&(_, w)| w)
    }

    pub fn entries(&self) -> &[(AbilityCategory, u32)] {
        &self.entries
    }

    /// Uniform draw in `1..=total`, first entry whose running weight reaches it.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<AbilityCategory> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let draw = rng.gen_range(1..=total);
        self.entries
            .iter()
            .find(|&&(_, cum)| cum >= draw)
            .map(|&(cat, _)| cat)
    }
}

/// What the generator remembers about each template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub power: i32,
    pub base_level: u8,
    pub base_alloc: u8,
    pub rarity: u8,
}

#[derive(Clone, Debug)]
pub struct Analysis {
    pub frequencies: FrequencyTable,
    /// Indexed like the catalogue's artifacts.
    pub snapshots: Vec<Snapshot>,
    pub total_threat: i64,
}

/// Category signatures found on one normalized template.
pub fn signatures(art: &Artifact, kind: &BaseKind) -> Vec<(AbilityCategory, u32)> {
    use AbilityCategory::*;

    let class = art.class;
    let ab = &art.abilities;
    let melee = class.is_melee();
    let headgear = class.is_headgear();
    let body = class.is_body_armor();
    let gloves = class == ItemClass::Gloves;
    let boots = class == ItemClass::Boots;
    let shield = class == ItemClass::Shield;
    let mut out: Vec<(AbilityCategory, u32)> = Vec::new();
    let mut add = |cat: AbilityCategory, n: u32| {
        if n > 0 {
            out.push((cat, n));
        }
    };

    let pval = art.pval;
    let flags = if pval > 0 {
        ab.pval_flags
    } else {
        PvalFlags::empty()
    };
    let p = u32::try_from(pval.max(0)).unwrap_or(0);

    for (stat, cat) in [
        (PvalFlags::STR, Stat),
        (PvalFlags::INT, if headgear { HelmInt } else { Stat }),
        (PvalFlags::WIS, if headgear { HelmWis } else { Stat }),
        (PvalFlags::DEX, if gloves { GloveDex } else { Stat }),
        (PvalFlags::CON, if body { BodyCon } else { Stat }),
        (PvalFlags::CHR, Stat),
    ] {
        if flags.contains(stat) {
            add(cat, 1);
        }
    }
    if flags.contains(PvalFlags::STEALTH) {
        let cat = match class {
            ItemClass::Boots => BootStealth,
            ItemClass::Cloak => CloakStealth,
            _ if body => BodyStealth,
            _ => Stealth,
        };
        add(cat, 1);
    }
    if flags.contains(PvalFlags::SEARCH) {
        add(Search, 1);
    }
    if flags.contains(PvalFlags::INFRA) {
        add(Infra, 1);
    }
    if flags.contains(PvalFlags::SPEED) {
        if pval >= 7 {
            add(SpeedSuper, 1);
        } else if boots {
            add(BootSpeed, 1);
        } else {
            add(Speed, 1);
        }
    }
    if flags.contains(PvalFlags::TUNNEL) && class != ItemClass::Digger {
        add(if melee { MeleeTunnel } else { Tunnel }, 1);
    }
    if flags.contains(PvalFlags::BLOWS) {
        if melee {
            add(MeleeBlows, p);
        } else if !class.is_weapon() {
            add(NonWeaponBlows, 1);
        }
    }
    if flags.contains(PvalFlags::SHOTS) {
        if class.is_bow() && pval >= 3 {
            add(BowShotsSuper, 1);
        } else if class.is_bow() {
            add(BowShots, p);
        } else if !class.is_weapon() {
            add(NonWeaponShots, 1);
        }
    }
    if flags.contains(PvalFlags::MIGHT) && class.is_bow() {
        if pval >= 3 {
            add(BowMightSuper, 1);
        } else {
            add(BowMight, p);
        }
    }

    add(Sustain, ab.sustains.bits().count_ones());
    add(Immunity, ab.immunities.bits().count_ones());

    let resists = ab.resists - kind.abilities.resists;
    let low = resists & Resists::LOW;
    if body {
        if low.contains(Resists::LOW) {
            add(BodyAllLowResist, 1);
        } else {
            add(BodyLowResist, low.bits().count_ones());
        }
        let high = (resists & Resists::HIGH).bits().count_ones();
        add(BodyHighResist, high);
    } else {
        let cat = if shield { ShieldLowResist } else { LowResist };
        add(cat, low.bits().count_ones());
        for (res, cat) in [
            (Resists::POIS, ResPois),
            (Resists::FEAR, ResFear),
            (Resists::LIGHT, ResLight),
            (Resists::DARK, ResDark),
            (Resists::BLIND, if headgear { HelmResBlind } else { ResBlind }),
            (Resists::CONF, ResConf),
            (Resists::SOUND, ResSound),
            (Resists::SHARD, ResShard),
            (Resists::NEXUS, ResNexus),
            (Resists::NETHER, ResNether),
            (Resists::CHAOS, ResChaos),
            (Resists::DISEN, ResDisen),
        ] {
            if resists.contains(res) {
                add(cat, 1);
            }
        }
    }

    let misc = ab.misc - kind.abilities.misc;
    let see_invis = if melee {
        MeleeSeeInvis
    } else if headgear {
        HelmSeeInvis
    } else {
        SeeInvis
    };
    for (flag, cat) in [
        (Misc::FREE_ACT, if gloves { GloveFreeAct } else { FreeAct }),
        (Misc::HOLD_LIFE, if body { BodyHoldLife } else { HoldLife }),
        (Misc::FEATHER, if boots { BootFeather } else { Feather }),
        (Misc::LIGHT, Light),
        (Misc::SEE_INVIS, see_invis),
        (Misc::TELEPATHY, if headgear { HelmTelepathy } else { Telepathy }),
        (Misc::SLOW_DIGEST, SlowDigest),
        (Misc::REGEN, Regen),
    ] {
        if misc.contains(flag) {
            add(cat, 1);
        }
    }
    if melee && misc.contains(Misc::BLESSED) {
        add(MeleeBless, 1);
    }

    let brands = Slays::BRAND_ACID
        | Slays::BRAND_ELEC
        | Slays::BRAND_FIRE
        | Slays::BRAND_COLD
        | Slays::BRAND_POIS
        | Slays::BRAND_HOLY;
    let n_brands = (ab.slays & brands).bits().count_ones();
    let n_slays = (ab.slays - brands).bits().count_ones();
    if melee {
        add(MeleeBrand, n_brands);
        add(MeleeSlay, n_slays);
    } else if !class.is_weapon() {
        add(NonWeaponBrand, n_brands);
        add(NonWeaponSlay, n_slays);
    }

    if ab.curses.contains(Curses::AGGRAVATE) {
        let cat = if class.is_weapon() {
            WeaponAggravate
        } else {
            NonWeaponAggravate
        };
        add(cat, 1);
    }

    let dh = art.to_h - kind.to_h;
    let dd = art.to_d - kind.to_d;
    if class.is_weapon() {
        let steps = |d: i16| u32::try_from((d + 2) / 3).unwrap_or(0);
        if dh > 0 {
            add(WeaponHit, steps(dh));
        }
        if dd > 0 {
            add(WeaponDam, steps(dd));
        }
    } else if dh > 0 && dd > 0 {
        add(NonWeaponHitDam, 1);
    } else if dh > 0 {
        add(NonWeaponHit, 1);
    } else if dd > 0 {
        add(NonWeaponDam, 1);
    }

    if art.to_a > kind.to_a {
        let cat = match class {
            ItemClass::Boots => BootAc,
            ItemClass::Gloves => GloveAc,
            ItemClass::Shield => ShieldAc,
            ItemClass::Cloak => CloakAc,
            c if c.is_headgear() => HelmAc,
            c if c.is_body_armor() => BodyAc,
            c if c.is_melee() => MeleeAc,
            _ => Ac,
        };
        add(cat, 1);
    }

    if melee && art.dd > kind.dd {
        let jump = u32::from(art.dd - kind.dd);
        if jump > 2 {
            add(MeleeDiceSuper, 1);
        } else {
            add(MeleeDice, jump);
        }
    }

    if art.weight < kind.weight {
        if melee {
            add(MeleeWeight, 1);
        } else if class.is_armor() {
            add(ArmorWeight, 1);
        }
    }

    out
}

fn scope_count(counts: &[(ItemClass, u32)], scope: Scope) -> u32 {
    counts
        .iter()
        .filter(|(class, _)| scope.includes(*class))
        .map(|(_, n)| n)
        .sum()
}

/// One pass over the templates: snapshots, learned frequencies and the
/// bestiary's total threat.
pub fn analyze(
    catalogue: &Catalogue,
    kinds: &KindTable,
    tuning: &Tuning,
    log: &mut DiagnosticLog,
) -> Result<Analysis> {
    let threat = total_threat(&catalogue.monsters);
    let eval = PowerEvaluator::new(kinds, &catalogue.monsters, threat, tuning.hard_ceilings);

    let mut raw = FrequencyTable::zeroed();
    let mut snapshots = vec![Snapshot::default(); catalogue.artifacts.len()];
    let mut class_counts: Vec<(ItemClass, u32)> =
        ItemClass::iter().map(|class| (class, 0)).collect();
    let mut sample = 0u32;

    log.line("Template analysis");
    for (slot, art) in catalogue.artifacts.iter().enumerate() {
        if art.is_unused() {
            continue;
        }
        let art = art.clone().normalized();
        let kind = kinds.get(art.class, art.sval)?;
        let power = if tuning.is_special(art.index) {
            eval.evaluate(&art)?
        } else {
            eval.evaluate_traced(&art, log)?
        };
        snapshots[slot] = Snapshot {
            power,
            base_level: kind.level,
            base_alloc: kind.alloc_prob,
            rarity: art.rarity,
        };
        if tuning.is_special(art.index) {
            continue;
        }

        sample += 1;
        if let Some(entry) = class_counts.iter_mut().find(|(c, _)| *c == art.class) {
            entry.1 += 1;
        }
        for (cat, n) in signatures(&art, kind) {
            let w = raw.get(cat);
            raw.set(cat, w + n);
        }
    }

    let mut frequencies = FrequencyTable::zeroed();
    frequencies.sample = sample;
    for cat in AbilityCategory::iter() {
        let in_scope = scope_count(&class_counts, cat.scope());
        let w = if in_scope > 0 {
            raw.get(cat) * sample / in_scope
        } else {
            raw.get(cat)
        };
        frequencies.set(cat, w);
    }
    frequencies.apply_floors();

    tracing::debug!(
        templates = sample,
        total_threat = threat,
        "analysed templates"
    );
    if log.is_enabled() {
        log.line("Learned frequencies");
        for cat in AbilityCategory::iter() {
            log.line(&format!(
                "  {:<22} raw {:>3} scaled {:>4}",
                cat.as_ref(),
                raw.get(cat),
                frequencies.get(cat)
            ));
        }
    }

    Ok(Analysis {
        frequencies,
        snapshots,
        total_threat: threat,
    })
}
