use crate::config::HardCeilings;
use crate::diagnostics::DiagnosticLog;
use crate::kinds::{BaseKind, KindTable};
use crate::object::{
    Artifact, Curses, Immunities, ItemClass, Misc, MonsterFlags, MonsterRecord, PvalFlags,
    Resists, Slays, Sustains,
};
use crate::Result;

/// Score assigned to any item past a hard ceiling. Also the veto threshold.
pub const INHIBIT_POWER: i32 = 20000;

/// Pval flags with a ceiling of their own instead of the generic one.
const OWN_CEILING: PvalFlags = PvalFlags::SPEED
    .union(PvalFlags::BLOWS)
    .union(PvalFlags::SHOTS)
    .union(PvalFlags::MIGHT);

/// Average damage of one missile, in tenths.
const AMMO_DAMAGE_X10: i64 = 35;

pub fn is_inhibited(power: i32) -> bool {
    power >= INHIBIT_POWER
}

struct SlayMult {
    flag: Slays,
    mult: i64,
    /// Monster must carry one of these. Empty means every monster.
    races: MonsterFlags,
    /// Monster ignores the brand when it carries this.
    resist: MonsterFlags,
}

const fn slay(flag: Slays, mult: i64, races: MonsterFlags) -> SlayMult {
    SlayMult {
        flag,
        mult,
        races,
        resist: MonsterFlags::empty(),
    }
}

const fn brand(flag: Slays, resist: MonsterFlags) -> SlayMult {
    SlayMult {
        flag,
        mult: 3,
        races: MonsterFlags::empty(),
        resist,
    }
}

const SLAY_MULTS: &[SlayMult] = &[
    slay(Slays::SLAY_ANIMAL, 2, MonsterFlags::ANIMAL),
    slay(Slays::SLAY_EVIL, 2, MonsterFlags::EVIL),
    slay(Slays::SLAY_UNDEAD, 3, MonsterFlags::UNDEAD),
    slay(Slays::SLAY_DEMON, 3, MonsterFlags::DEMON),
    slay(Slays::SLAY_ORC, 3, MonsterFlags::ORC),
    slay(Slays::SLAY_TROLL, 3, MonsterFlags::TROLL),
    slay(Slays::SLAY_GIANT, 3, MonsterFlags::GIANT),
    slay(Slays::SLAY_DRAGON, 3, MonsterFlags::DRAGON),
    slay(Slays::KILL_DRAGON, 5, MonsterFlags::DRAGON),
    slay(Slays::KILL_DEMON, 5, MonsterFlags::DEMON),
    slay(Slays::KILL_UNDEAD, 5, MonsterFlags::UNDEAD),
    slay(Slays::SLAY_MAN, 3, MonsterFlags::MAN),
    slay(Slays::SLAY_ELF, 3, MonsterFlags::ELF),
    slay(Slays::SLAY_DWARF, 3, MonsterFlags::DWARF),
    brand(Slays::BRAND_ACID, MonsterFlags::IM_ACID),
    brand(Slays::BRAND_ELEC, MonsterFlags::IM_ELEC),
    brand(Slays::BRAND_FIRE, MonsterFlags::IM_FIRE),
    brand(Slays::BRAND_COLD, MonsterFlags::IM_COLD),
    brand(Slays::BRAND_POIS, MonsterFlags::IM_POIS),
    slay(Slays::BRAND_HOLY, 3, MonsterFlags::EVIL),
];

const STAT_WEIGHTS: [(PvalFlags, i64, &str); 6] = [
    (PvalFlags::STR, 3, "strength"),
    (PvalFlags::INT, 2, "intelligence"),
    (PvalFlags::WIS, 2, "wisdom"),
    (PvalFlags::DEX, 3, "dexterity"),
    (PvalFlags::CON, 3, "constitution"),
    (PvalFlags::CHR, 1, "charisma"),
];

const SUSTAIN_WEIGHTS: [(Sustains, i64); 6] = [
    (Sustains::STR, 5),
    (Sustains::INT, 3),
    (Sustains::WIS, 3),
    (Sustains::DEX, 4),
    (Sustains::CON, 5),
    (Sustains::CHR, 1),
];

const RESIST_WEIGHTS: [(Resists, i64); 16] = [
    (Resists::ACID, 5),
    (Resists::ELEC, 5),
    (Resists::FIRE, 6),
    (Resists::COLD, 5),
    (Resists::POIS, 14),
    (Resists::FEAR, 3),
    (Resists::LIGHT, 5),
    (Resists::DARK, 5),
    (Resists::BLIND, 8),
    (Resists::CONF, 8),
    (Resists::SOUND, 5),
    (Resists::SHARD, 6),
    (Resists::NEXUS, 6),
    (Resists::NETHER, 10),
    (Resists::CHAOS, 10),
    (Resists::DISEN, 10),
];

const IMMUNITY_WEIGHTS: [(Immunities, i64); 4] = [
    (Immunities::ACID, 25),
    (Immunities::ELEC, 20),
    (Immunities::FIRE, 25),
    (Immunities::COLD, 20),
];

const MISC_WEIGHTS: [(Misc, i64, &str); 10] = [
    (Misc::FREE_ACT, 8, "free action"),
    (Misc::HOLD_LIFE, 10, "hold life"),
    (Misc::SEE_INVIS, 8, "see invisible"),
    (Misc::TELEPATHY, 35, "telepathy"),
    (Misc::FEATHER, 2, "feather fall"),
    (Misc::SLOW_DIGEST, 2, "slow digestion"),
    (Misc::REGEN, 5, "regeneration"),
    (Misc::LIGHT, 3, "light"),
    (Misc::BLESSED, 1, "blessed"),
    (Misc::IMPACT, 1, "impact"),
];

const CURSE_WEIGHTS: [(Curses, i64, &str); 7] = [
    (Curses::AGGRAVATE, -15, "aggravation"),
    (Curses::DRAIN_EXP, -8, "experience drain"),
    (Curses::TELEPORT, -20, "random teleport"),
    (Curses::NO_TELEPORT, -10, "no teleport"),
    (Curses::LIGHT_CURSE, -3, "light curse"),
    (Curses::HEAVY_CURSE, -10, "heavy curse"),
    (Curses::PERMA_CURSE, -20, "permanent curse"),
];

/// Sum of every monster's threat rating, never below 1.
pub fn total_threat(monsters: &[MonsterRecord]) -> i64 {
    monsters.iter().map(MonsterRecord::threat).sum::<i64>().max(1)
}

/// Integer division rounding away from zero by `bias`.
fn div_away(x: i64, bias: i64, d: i64) -> i64 {
    (x + bias * x.signum()) / d
}

/// Running score with an optional per-step trace.
struct Tally<'l> {
    total: i64,
    index: usize,
    log: Option<&'l mut DiagnosticLog>,
}

impl Tally<'_> {
    fn add(&mut self, what: &str, delta: i64) {
        if delta == 0 {
            return;
        }
        self.total += delta;
        tracing::trace!(
            index = self.index,
            step = what,
            delta,
            total = self.total,
            "power step"
        );
        if let Some(log) = self.log.as_deref_mut() {
            log.line(&format!("  {what}: {delta:+} (total {})", self.total));
        }
    }
}

/// Converts an artifact into one comparable power figure. Pure: the same
/// artifact always scores the same for a given kind table and bestiary.
pub struct PowerEvaluator<'a> {
    kinds: &'a KindTable,
    monsters: &'a [MonsterRecord],
    total_threat: i64,
    ceilings: HardCeilings,
}

impl<'a> PowerEvaluator<'a> {
    pub fn new(
        kinds: &'a KindTable,
        monsters: &'a [MonsterRecord],
        total_threat: i64,
        ceilings: HardCeilings,
    ) -> Self {
        Self {
            kinds,
            monsters,
            total_threat: total_threat.max(1),
            ceilings,
        }
    }

    pub fn evaluate(&self, art: &Artifact) -> Result<i32> {
        let mut tally = Tally {
            total: 0,
            index: art.index,
            log: None,
        };
        self.score(art, &mut tally)
    }

    /// As `evaluate`, writing each non-zero step to `log`.
    pub fn evaluate_traced(&self, art: &Artifact, log: &mut DiagnosticLog) -> Result<i32> {
        log.line(&format!(
            "Scoring [{}] {} ({} {})",
            art.index, art.name, art.class, art.sval
        ));
        let mut tally = Tally {
            total: 0,
            index: art.index,
            log: Some(log),
        };
        let power = self.score(art, &mut tally)?;
        if let Some(log) = tally.log {
            log.line(&format!("  => power {power}"));
        }
        Ok(power)
    }

    /// Slay/brand multiplier averaged over the bestiary, weighted by threat.
    /// Fixed point: 100 means no bonus.
    pub fn slay_coverage(&self, slays: Slays) -> i64 {
        if slays.is_empty() || self.monsters.is_empty() {
            return 100;
        }
        let mut weighted = 0i64;
        for monster in self.monsters {
            let best = SLAY_MULTS
                .iter()
                .filter(|s| slays.contains(s.flag))
                .filter(|s| s.races.is_empty() || monster.flags.intersects(s.races))
                .filter(|s| !monster.flags.intersects(s.resist))
                .map(|s| s.mult)
                .max()
                .unwrap_or(1);
            weighted += monster.threat() * best;
        }
        weighted * 100 / self.total_threat
    }

    fn over_hard_ceiling(&self, art: &Artifact) -> bool {
        let flags = art.abilities.pval_flags;
        let c = &self.ceilings;
        let p = art.pval;
        if flags.intersects(PvalFlags::BLOWS | PvalFlags::SHOTS | PvalFlags::MIGHT) && p < 0 {
            return true;
        }
        (flags.contains(PvalFlags::BLOWS) && p > c.blows)
            || (flags.contains(PvalFlags::SHOTS) && p > c.shots)
            || (flags.contains(PvalFlags::MIGHT) && p > c.might)
            || (flags.contains(PvalFlags::SPEED) && p > c.speed)
            || (!(flags - OWN_CEILING).is_empty() && p > c.pval)
            || art.to_a > c.to_a
            || art.dd > c.dice
    }

    fn score(&self, art: &Artifact, tally: &mut Tally<'_>) -> Result<i32> {
        let kind = self.kinds.get(art.class, art.sval)?;

        if self.over_hard_ceiling(art) {
            tally.add("hard ceiling", i64::from(INHIBIT_POWER) - tally.total);
            return Ok(INHIBIT_POWER);
        }

        if art.class.is_melee() {
            self.score_melee(art, kind, tally);
        } else if art.class.is_bow() {
            self.score_bow(art, kind, tally);
        } else {
            tally.add("to-hit", div_away(i64::from(art.to_h), 1, 2));
            tally.add("to-dam", i64::from(art.to_d) * 3 / 2);
        }

        score_armor(art, kind, tally);
        score_pval(art, kind, tally);
        score_flags(art, kind, tally);

        let total = tally.total.clamp(-i64::from(INHIBIT_POWER), i64::from(INHIBIT_POWER));
        Ok(total as i32)
    }

    fn score_melee(&self, art: &Artifact, kind: &BaseKind, tally: &mut Tally<'_>) {
        let dice = |dd: u8, ds: u8| i64::from(dd) * (i64::from(ds) + 1) * 5;
        let blows = if art.abilities.pval_flags.contains(PvalFlags::BLOWS) {
            i64::from(art.pval).max(0)
        } else {
            0
        };
        let per_blow = dice(art.dd, art.ds) * self.slay_coverage(art.abilities.slays) / 100
            + i64::from(art.to_d) * 10;
        let per_turn = per_blow * (2 + blows) / 2;
        let mundane = dice(kind.dd, kind.ds) + i64::from(kind.to_d) * 10;
        tally.add("melee damage", (per_turn - mundane) / 5);
        tally.add(
            "to-hit",
            div_away(i64::from(art.to_h - kind.to_h), 3, 4),
        );
    }

    fn score_bow(&self, art: &Artifact, kind: &BaseKind, tally: &mut Tally<'_>) {
        let flags = art.abilities.pval_flags;
        let p = i64::from(art.pval).max(0);
        let might = p * i64::from(flags.contains(PvalFlags::MIGHT));
        let shots = p * i64::from(flags.contains(PvalFlags::SHOTS));
        let mult = i64::from(art.sval % 10);
        let kind_mult = i64::from(kind.sval % 10);

        let shot = (AMMO_DAMAGE_X10 + i64::from(art.to_d) * 10) * (mult + might) * (1 + shots);
        let mundane = (AMMO_DAMAGE_X10 + i64::from(kind.to_d) * 10) * kind_mult;
        tally.add("missile damage", (shot - mundane) / 10);
        tally.add(
            "to-hit",
            div_away(i64::from(art.to_h - kind.to_h), 3, 4),
        );
    }
}

fn score_armor(art: &Artifact, kind: &BaseKind, tally: &mut Tally<'_>) {
    let ac_delta = i64::from(art.ac - kind.ac) + i64::from(art.to_a - kind.to_a);
    tally.add("armour class", div_away(ac_delta, 2, 3));
    if art.to_a > 30 {
        tally.add("high to-AC", i64::from(art.to_a - 30) / 2);
    }
    if (art.class.is_armor() || art.class.is_melee()) && kind.weight > 0 {
        let lighter = i64::from(kind.weight - art.weight) * 10 / i64::from(kind.weight);
        tally.add("weight", lighter);
    }
}

fn score_pval(art: &Artifact, kind: &BaseKind, tally: &mut Tally<'_>) {
    let flags = art.abilities.pval_flags;
    let p = i64::from(art.pval);
    if flags.is_empty() || p == 0 {
        return;
    }

    for (stat, weight, name) in STAT_WEIGHTS {
        if flags.contains(stat) {
            tally.add(name, weight * (p * p.abs() + 3 * p) / 4);
        }
    }
    if flags.contains(PvalFlags::STEALTH) {
        tally.add("stealth", p);
    }
    if flags.contains(PvalFlags::SEARCH) {
        tally.add("searching", div_away(p, 1, 2));
    }
    if flags.contains(PvalFlags::INFRA) {
        tally.add("infravision", div_away(p, 1, 2));
    }
    if flags.contains(PvalFlags::TUNNEL) {
        let innate = if kind.abilities.pval_flags.contains(PvalFlags::TUNNEL) {
            i64::from(kind.pval)
        } else {
            0
        };
        tally.add("tunnelling", p - innate);
    }
    if flags.contains(PvalFlags::SPEED) {
        tally.add("speed", 4 * p);
    }
    // Blows, shots and might on their own weapon class are part of the
    // damage figure.
    if flags.contains(PvalFlags::BLOWS) && !art.class.is_melee() {
        tally.add("stray blows", 8 * p);
    }
    if flags.intersects(PvalFlags::SHOTS | PvalFlags::MIGHT) && !art.class.is_bow() {
        let n = (flags & (PvalFlags::SHOTS | PvalFlags::MIGHT)).bits().count_ones();
        tally.add("stray launcher bonus", 8 * p * i64::from(n));
    }
}

/// Resists, immunities and misc flags the base kind already carries are not
/// the artifact's doing and score nothing.
fn score_flags(art: &Artifact, kind: &BaseKind, tally: &mut Tally<'_>) {
    let ab = &art.abilities;
    let resists = ab.resists - kind.abilities.resists;
    let immunities = ab.immunities - kind.abilities.immunities;
    let misc = ab.misc - kind.abilities.misc;

    for (sustain, weight) in SUSTAIN_WEIGHTS {
        if ab.sustains.contains(sustain) {
            tally.add("sustain", weight);
        }
    }
    if ab.sustains.is_all() {
        tally.add("all sustains", 10);
    }

    for (resist, weight) in RESIST_WEIGHTS {
        if resists.contains(resist) {
            tally.add("resist", weight);
        }
    }
    if resists.contains(Resists::LOW) {
        tally.add("all low resists", 8);
    }
    let high = i64::from((resists & Resists::HIGH).bits().count_ones());
    if high > 6 {
        tally.add("high resist discount", -(high - 6) * 4);
    }

    for (imm, weight) in IMMUNITY_WEIGHTS {
        if immunities.contains(imm) {
            tally.add("immunity", weight);
        }
    }
    let imms = i64::from(immunities.bits().count_ones());
    if imms >= 2 {
        tally.add("stacked immunities", 10 * (imms - 1));
    }

    for (flag, weight, name) in MISC_WEIGHTS {
        if misc.contains(flag) {
            tally.add(name, weight);
        }
    }

    if !art.class.is_melee() && !ab.slays.is_empty() {
        let n = i64::from(ab.slays.bits().count_ones());
        tally.add("off-weapon slays", 3 * n);
    }

    for (curse, weight, name) in CURSE_WEIGHTS {
        if ab.curses.contains(curse) {
            tally.add(name, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::kinds::standard_kinds;
    use crate::testkit;

    fn evaluator<'a>(kinds: &'a KindTable, monsters: &'a [MonsterRecord]) -> PowerEvaluator<'a> {
        PowerEvaluator::new(
            kinds,
            monsters,
            total_threat(monsters),
            Tuning::default().hard_ceilings,
        )
    }

    #[test]
    fn mundane_items_score_zero() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        for kind in kinds.iter() {
            let mut art = testkit::plain_artifact(kind.class, kind.sval);
            art.abilities = kind.abilities;
            art.pval = kind.pval;
            let power = eval.evaluate(&art).unwrap();
            assert_eq!(power, 0, "{} scored {power}", kind.name);
        }
    }

    #[test]
    fn more_enchantment_means_more_power() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        let mut sword = testkit::plain_artifact(ItemClass::Sword, 17);
        let base = eval.evaluate(&sword).unwrap();
        sword.to_d = 10;
        let damaged = eval.evaluate(&sword).unwrap();
        sword.abilities.slays = Slays::SLAY_EVIL;
        let slaying = eval.evaluate(&sword).unwrap();
        assert!(damaged > base);
        assert!(slaying > damaged);
    }

    #[test]
    fn curses_score_negative() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        let mut ring = testkit::plain_artifact(ItemClass::Ring, 23);
        ring.abilities.curses = Curses::LIGHT_CURSE | Curses::AGGRAVATE;
        assert_eq!(eval.evaluate(&ring).unwrap(), -18);
    }

    #[test]
    fn hard_ceilings_inhibit() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);

        let mut boots = testkit::plain_artifact(ItemClass::Boots, 2);
        boots.pval = 21;
        boots.abilities.pval_flags = PvalFlags::SPEED;
        assert!(is_inhibited(eval.evaluate(&boots).unwrap()));

        let mut ring = testkit::plain_artifact(ItemClass::Ring, 23);
        ring.pval = 11;
        ring.abilities.pval_flags = PvalFlags::STEALTH;
        assert!(is_inhibited(eval.evaluate(&ring).unwrap()));

        let mut sword = testkit::plain_artifact(ItemClass::Sword, 17);
        sword.pval = -1;
        sword.abilities.pval_flags = PvalFlags::BLOWS;
        assert_eq!(eval.evaluate(&sword).unwrap(), INHIBIT_POWER);

        let mut shield = testkit::plain_artifact(ItemClass::Shield, 5);
        shield.to_a = 76;
        assert!(is_inhibited(eval.evaluate(&shield).unwrap()));
    }

    #[test]
    fn speed_has_its_own_ceiling() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        let mut boots = testkit::plain_artifact(ItemClass::Boots, 2);
        boots.abilities.pval_flags = PvalFlags::SPEED;
        for pval in [10, 11, 15, 20] {
            boots.pval = pval;
            assert_eq!(eval.evaluate(&boots).unwrap(), 4 * i32::from(pval));
        }
        boots.pval = 21;
        assert_eq!(eval.evaluate(&boots).unwrap(), INHIBIT_POWER);

        // Sharing the pval with another flag brings back the generic cap.
        boots.pval = 15;
        boots.abilities.pval_flags |= PvalFlags::STEALTH;
        assert_eq!(eval.evaluate(&boots).unwrap(), INHIBIT_POWER);
    }

    #[test]
    fn innate_kind_flags_score_nothing() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);

        let mut power_dsm = testkit::plain_artifact(ItemClass::DragonArmor, 30);
        power_dsm.abilities = kinds.get(ItemClass::DragonArmor, 30).unwrap().abilities;
        assert_eq!(eval.evaluate(&power_dsm).unwrap(), 0);

        let mut torch = testkit::plain_artifact(ItemClass::Light, 0);
        torch.abilities.misc = Misc::LIGHT;
        assert_eq!(eval.evaluate(&torch).unwrap(), 0);
        torch.abilities.misc |= Misc::SEE_INVIS;
        assert_eq!(eval.evaluate(&torch).unwrap(), 8);

        // Red scale mail resists fire already; only the added cold counts.
        let mut red = testkit::plain_artifact(ItemClass::DragonArmor, 4);
        red.abilities.resists = Resists::FIRE | Resists::COLD;
        assert_eq!(eval.evaluate(&red).unwrap(), 5);
    }

    #[test]
    fn stat_bonus_is_quadratic() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        let mut ring = testkit::plain_artifact(ItemClass::Ring, 23);
        ring.abilities.pval_flags = PvalFlags::STR;
        ring.pval = 1;
        assert_eq!(eval.evaluate(&ring).unwrap(), 3);
        ring.pval = 4;
        assert_eq!(eval.evaluate(&ring).unwrap(), 21);
        ring.pval = -2;
        assert_eq!(eval.evaluate(&ring).unwrap(), -7);
    }

    #[test]
    fn coverage_counts_only_matching_monsters() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        assert_eq!(eval.slay_coverage(Slays::empty()), 100);
        let evil = eval.slay_coverage(Slays::SLAY_EVIL);
        let kill = eval.slay_coverage(Slays::KILL_DRAGON);
        assert!(evil > 100 && evil <= 200);
        assert!(kill > 100 && kill <= 500);
    }

    #[test]
    fn traced_scoring_matches_untraced() {
        let kinds = KindTable::new(standard_kinds());
        let monsters = testkit::monsters();
        let eval = evaluator(&kinds, &monsters);
        let catalogue = testkit::catalogue(150);
        let mut log = DiagnosticLog::new(true);
        for art in catalogue.artifacts.iter().take(20) {
            let plain = eval.evaluate(art).unwrap();
            assert_eq!(eval.evaluate_traced(art, &mut log).unwrap(), plain);
        }
        assert!(log.text().contains("=> power"));
    }
}
