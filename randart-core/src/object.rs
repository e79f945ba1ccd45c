use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Base category of an item. Artifacts and base kinds are both keyed by
/// `(ItemClass, sval)`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ItemClass {
    Bow,
    Digger,
    Hafted,
    Polearm,
    Sword,
    SoftArmor,
    HardArmor,
    DragonArmor,
    Boots,
    Gloves,
    Helm,
    Crown,
    Shield,
    Cloak,
    Light,
    Amulet,
    Ring,
}

impl ItemClass {
    pub fn is_bow(self) -> bool {
        self == ItemClass::Bow
    }

    pub fn is_melee(self) -> bool {
        matches!(
            self,
            ItemClass::Digger | ItemClass::Hafted | ItemClass::Polearm | ItemClass::Sword
        )
    }

    pub fn is_weapon(self) -> bool {
        self.is_bow() || self.is_melee()
    }

    pub fn is_body_armor(self) -> bool {
        matches!(
            self,
            ItemClass::SoftArmor | ItemClass::HardArmor | ItemClass::DragonArmor
        )
    }

    pub fn is_headgear(self) -> bool {
        matches!(self, ItemClass::Helm | ItemClass::Crown)
    }

    pub fn is_armor(self) -> bool {
        self.is_body_armor()
            || self.is_headgear()
            || matches!(
                self,
                ItemClass::Boots | ItemClass::Gloves | ItemClass::Shield | ItemClass::Cloak
            )
    }

    /// Lights, amulets and rings keep their kind when scrambled.
    pub fn is_special_slot(self) -> bool {
        matches!(self, ItemClass::Light | ItemClass::Amulet | ItemClass::Ring)
    }

    /// Edged and pole weapons get the blessed flag alongside a wisdom bonus.
    pub fn blesses_with_wisdom(self) -> bool {
        matches!(self, ItemClass::Sword | ItemClass::Polearm)
    }
}

bitflags! {
    /// Abilities whose magnitude is the item's shared `pval`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PvalFlags: u16 {
        const STR     = 1 << 0;
        const INT     = 1 << 1;
        const WIS     = 1 << 2;
        const DEX     = 1 << 3;
        const CON     = 1 << 4;
        const CHR     = 1 << 5;
        const STEALTH = 1 << 6;
        const SEARCH  = 1 << 7;
        const INFRA   = 1 << 8;
        const TUNNEL  = 1 << 9;
        const SPEED   = 1 << 10;
        const BLOWS   = 1 << 11;
        const SHOTS   = 1 << 12;
        const MIGHT   = 1 << 13;

        const STATS = Self::STR.bits()
            | Self::INT.bits()
            | Self::WIS.bits()
            | Self::DEX.bits()
            | Self::CON.bits()
            | Self::CHR.bits();
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Sustains: u8 {
        const STR = 1 << 0;
        const INT = 1 << 1;
        const WIS = 1 << 2;
        const DEX = 1 << 3;
        const CON = 1 << 4;
        const CHR = 1 << 5;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Resists: u16 {
        const ACID   = 1 << 0;
        const ELEC   = 1 << 1;
        const FIRE   = 1 << 2;
        const COLD   = 1 << 3;
        const POIS   = 1 << 4;
        const FEAR   = 1 << 5;
        const LIGHT  = 1 << 6;
        const DARK   = 1 << 7;
        const BLIND  = 1 << 8;
        const CONF   = 1 << 9;
        const SOUND  = 1 << 10;
        const SHARD  = 1 << 11;
        const NEXUS  = 1 << 12;
        const NETHER = 1 << 13;
        const CHAOS  = 1 << 14;
        const DISEN  = 1 << 15;

        const LOW = Self::ACID.bits() | Self::ELEC.bits() | Self::FIRE.bits() | Self::COLD.bits();
        const HIGH = !Self::LOW.bits();
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Immunities: u8 {
        const ACID = 1 << 0;
        const ELEC = 1 << 1;
        const FIRE = 1 << 2;
        const COLD = 1 << 3;
    }
}

bitflags! {
    /// Slays, kills and elemental brands. Only meaningful on melee weapons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Slays: u32 {
        const SLAY_ANIMAL = 1 << 0;
        const SLAY_EVIL   = 1 << 1;
        const SLAY_UNDEAD = 1 << 2;
        const SLAY_DEMON  = 1 << 3;
        const SLAY_ORC    = 1 << 4;
        const SLAY_TROLL  = 1 << 5;
        const SLAY_GIANT  = 1 << 6;
        const SLAY_DRAGON = 1 << 7;
        const KILL_DRAGON = 1 << 8;
        const KILL_DEMON  = 1 << 9;
        const KILL_UNDEAD = 1 << 10;
        const SLAY_MAN    = 1 << 11;
        const SLAY_ELF    = 1 << 12;
        const SLAY_DWARF  = 1 << 13;
        const BRAND_ACID  = 1 << 14;
        const BRAND_ELEC  = 1 << 15;
        const BRAND_FIRE  = 1 << 16;
        const BRAND_COLD  = 1 << 17;
        const BRAND_POIS  = 1 << 18;
        const BRAND_HOLY  = 1 << 19;

        const KINDRED = Self::SLAY_MAN.bits() | Self::SLAY_ELF.bits() | Self::SLAY_DWARF.bits();
    }
}

bitflags! {
    /// Curses, drawbacks and restrictions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Curses: u8 {
        const LIGHT_CURSE = 1 << 0;
        const HEAVY_CURSE = 1 << 1;
        const PERMA_CURSE = 1 << 2;
        const AGGRAVATE   = 1 << 3;
        const TELEPORT    = 1 << 4;
        const DRAIN_EXP   = 1 << 5;
        const NO_TELEPORT = 1 << 6;

        const CURSE_MASK = Self::LIGHT_CURSE.bits()
            | Self::HEAVY_CURSE.bits()
            | Self::PERMA_CURSE.bits();
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Misc: u16 {
        const SLOW_DIGEST = 1 << 0;
        const FEATHER     = 1 << 1;
        const LIGHT       = 1 << 2;
        const REGEN       = 1 << 3;
        const TELEPATHY   = 1 << 4;
        const SEE_INVIS   = 1 << 5;
        const FREE_ACT    = 1 << 6;
        const HOLD_LIFE   = 1 << 7;
        const BLESSED     = 1 << 8;
        const IMPACT      = 1 << 9;
        const ACTIVATE    = 1 << 10;
        const IGNORE_ACID = 1 << 11;
        const IGNORE_ELEC = 1 << 12;
        const IGNORE_FIRE = 1 << 13;
        const IGNORE_COLD = 1 << 14;

        const IGNORE_MASK = Self::IGNORE_ACID.bits()
            | Self::IGNORE_ELEC.bits()
            | Self::IGNORE_FIRE.bits()
            | Self::IGNORE_COLD.bits();
    }
}

/// Stat flags paired with the sustain that protects them.
pub const STAT_SUSTAINS: [(PvalFlags, Sustains); 6] = [
    (PvalFlags::STR, Sustains::STR),
    (PvalFlags::INT, Sustains::INT),
    (PvalFlags::WIS, Sustains::WIS),
    (PvalFlags::DEX, Sustains::DEX),
    (PvalFlags::CON, Sustains::CON),
    (PvalFlags::CHR, Sustains::CHR),
];

/// Every boolean and pval-scaled ability an item can carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Abilities {
    pub pval_flags: PvalFlags,
    pub sustains: Sustains,
    pub resists: Resists,
    pub immunities: Immunities,
    pub slays: Slays,
    pub curses: Curses,
    pub misc: Misc,
}

impl Abilities {
    pub fn is_cursed(&self) -> bool {
        self.curses.intersects(Curses::CURSE_MASK)
    }
}

/// One artifact definition: the unit that is scored and mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub index: usize,
    pub name: String,
    pub class: ItemClass,
    pub sval: u8,
    #[serde(default)]
    pub pval: i16,
    #[serde(default)]
    pub to_h: i16,
    #[serde(default)]
    pub to_d: i16,
    #[serde(default)]
    pub to_a: i16,
    #[serde(default)]
    pub ac: i16,
    #[serde(default)]
    pub dd: u8,
    #[serde(default)]
    pub ds: u8,
    pub weight: i16,
    pub level: u8,
    pub rarity: u8,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub power: i32,
    #[serde(default)]
    pub activation: Option<String>,
    #[serde(default)]
    pub abilities: Abilities,
}

impl Artifact {
    /// Catalogue slots without a name are placeholders and never touched.
    pub fn is_unused(&self) -> bool {
        self.name.is_empty()
    }

    /// Remove contradictory ability pairs. Running this twice is the same as
    /// running it once.
    pub fn normalize(&mut self) {
        let ab = &mut self.abilities;

        if ab.curses.intersects(Curses::HEAVY_CURSE | Curses::PERMA_CURSE) {
            ab.curses |= Curses::LIGHT_CURSE;
        }
        if ab.curses.contains(Curses::LIGHT_CURSE) {
            ab.misc.remove(Misc::BLESSED);
        }
        if ab.curses.contains(Curses::NO_TELEPORT) {
            ab.curses.remove(Curses::TELEPORT);
        }
        if ab.curses.contains(Curses::AGGRAVATE) {
            ab.pval_flags.remove(PvalFlags::STEALTH);
        }
        if ab.curses.contains(Curses::DRAIN_EXP) {
            ab.misc.remove(Misc::HOLD_LIFE);
        }

        for (imm, res) in [
            (Immunities::ACID, Resists::ACID),
            (Immunities::ELEC, Resists::ELEC),
            (Immunities::FIRE, Resists::FIRE),
            (Immunities::COLD, Resists::COLD),
        ] {
            if ab.immunities.contains(imm) {
                ab.resists.remove(res);
            }
        }

        for (kill, slay) in [
            (Slays::KILL_DRAGON, Slays::SLAY_DRAGON),
            (Slays::KILL_DEMON, Slays::SLAY_DEMON),
            (Slays::KILL_UNDEAD, Slays::SLAY_UNDEAD),
        ] {
            if ab.slays.contains(kill) {
                ab.slays.remove(slay);
            }
        }
        if ab.slays.contains(Slays::BRAND_HOLY) {
            ab.slays.remove(Slays::KINDRED);
        }

        if self.pval == 0 {
            ab.pval_flags = PvalFlags::empty();
        } else if self.pval < 0 {
            for (stat, sustain) in STAT_SUSTAINS {
                if ab.pval_flags.contains(stat) {
                    ab.sustains.remove(sustain);
                }
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

bitflags! {
    /// Monster race and immunity flags consulted by slay and brand coverage.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MonsterFlags: u16 {
        const EVIL    = 1 << 0;
        const ANIMAL  = 1 << 1;
        const UNDEAD  = 1 << 2;
        const DEMON   = 1 << 3;
        const ORC     = 1 << 4;
        const TROLL   = 1 << 5;
        const GIANT   = 1 << 6;
        const DRAGON  = 1 << 7;
        const MAN     = 1 << 8;
        const ELF     = 1 << 9;
        const DWARF   = 1 << 10;
        const IM_ACID = 1 << 11;
        const IM_ELEC = 1 << 12;
        const IM_FIRE = 1 << 13;
        const IM_COLD = 1 << 14;
        const IM_POIS = 1 << 15;
    }
}

/// The slice of a monster race the evaluator needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub name: String,
    pub level: u8,
    pub hit_points: i32,
    /// Normal speed is 110.
    pub speed: i16,
    /// Average melee damage per monster turn.
    pub blow_damage: i32,
    #[serde(default)]
    pub flags: MonsterFlags,
}

impl MonsterRecord {
    /// Combat threat rating: durability times damage output, scaled by the
    /// energy the monster gets per game turn.
    pub fn threat(&self) -> i64 {
        let energy = i64::from((self.speed - 100).clamp(1, 50));
        let hp = i64::from(self.hit_points.max(1));
        let dam = i64::from(self.blow_damage.max(0)) + 1;
        (hp * dam * energy / 100).max(1) + i64::from(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;

    #[test]
    fn immunity_removes_matching_resist() {
        let mut a = testkit::plain_artifact(ItemClass::Shield, 5);
        a.abilities.immunities = Immunities::FIRE;
        a.abilities.resists = Resists::FIRE | Resists::COLD;
        a.normalize();
        assert_eq!(a.abilities.resists, Resists::COLD);
    }

    #[test]
    fn holy_brand_excludes_kindred_slays() {
        let mut a = testkit::plain_artifact(ItemClass::Sword, 17);
        a.abilities.slays = Slays::BRAND_HOLY | Slays::SLAY_MAN | Slays::SLAY_ORC;
        a.normalize();
        assert_eq!(a.abilities.slays, Slays::BRAND_HOLY | Slays::SLAY_ORC);
    }

    #[test]
    fn heavy_curse_implies_light_curse_and_strips_blessing() {
        let mut a = testkit::plain_artifact(ItemClass::Sword, 17);
        a.abilities.curses = Curses::HEAVY_CURSE;
        a.abilities.misc = Misc::BLESSED | Misc::SEE_INVIS;
        a.normalize();
        assert!(a.abilities.curses.contains(Curses::LIGHT_CURSE));
        assert_eq!(a.abilities.misc, Misc::SEE_INVIS);
    }

    #[test]
    fn zero_pval_clears_pval_flags_and_negative_pval_drops_sustains() {
        let mut a = testkit::plain_artifact(ItemClass::Ring, 23);
        a.abilities.pval_flags = PvalFlags::STR | PvalFlags::SPEED;
        a.normalize();
        assert!(a.abilities.pval_flags.is_empty());

        let mut b = testkit::plain_artifact(ItemClass::Ring, 23);
        b.pval = -2;
        b.abilities.pval_flags = PvalFlags::STR;
        b.abilities.sustains = Sustains::STR | Sustains::CON;
        b.normalize();
        assert_eq!(b.abilities.sustains, Sustains::CON);
    }

    #[test]
    fn normalize_is_idempotent_on_fixture_catalogue() {
        let catalogue = testkit::catalogue(150);
        for art in &catalogue.artifacts {
            let once = art.clone().normalized();
            let twice = once.clone().normalized();
            assert_eq!(once, twice, "artifact {} changed on second pass", art.index);
        }
    }

    #[test]
    fn item_class_parses_from_snake_case() {
        let class: ItemClass = "dragon_armor".parse().unwrap();
        assert_eq!(class, ItemClass::DragonArmor);
        assert_eq!(ItemClass::SoftArmor.to_string(), "soft_armor");
    }

    #[test]
    fn monster_threat_is_positive_and_grows_with_speed() {
        let slow = MonsterRecord {
            name: "Snaga".to_string(),
            level: 3,
            hit_points: 8,
            speed: 110,
            blow_damage: 4,
            flags: MonsterFlags::EVIL | MonsterFlags::ORC,
        };
        let mut fast = slow.clone();
        fast.speed = 120;
        assert!(slow.threat() > 0);
        assert!(fast.threat() > slow.threat());
    }
}
