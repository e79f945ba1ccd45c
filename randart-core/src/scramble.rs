use rand::Rng;

use crate::abilities::{add_one_ability, apply_curse};
use crate::chooser::choose_base_item;
use crate::config::Tuning;
use crate::diagnostics::{DiagnosticLog, WarningKind};
use crate::frequency::{AbilityCategory, CumulativeTable, FrequencyTable, Snapshot};
use crate::kinds::{BaseKind, KindTable};
use crate::object::{Abilities, Artifact, Curses, Misc, PvalFlags};
use crate::power::{is_inhibited, PowerEvaluator};
use crate::Result;

/// Everything a scramble reads but never changes.
pub struct ScrambleContext<'a> {
    pub eval: &'a PowerEvaluator<'a>,
    pub kinds: &'a KindTable,
    pub frequencies: &'a FrequencyTable,
    pub tuning: &'a Tuning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Specials and unused slots.
    Unchanged,
    Balanced { converged: bool, draws: u32 },
    Cursed { fallback: bool },
}

#[derive(Clone, Debug)]
pub struct Scrambled {
    pub item: Artifact,
    pub outcome: Outcome,
}

/// Fresh artifact on `kind`, keeping the template's identity.
fn on_kind(template: &Artifact, kind: &BaseKind) -> Artifact {
    let mut abilities = kind.abilities;
    abilities.misc |= Misc::IGNORE_MASK;
    Artifact {
        index: template.index,
        name: template.name.clone(),
        class: kind.class,
        sval: kind.sval,
        pval: kind.pval,
        to_h: kind.to_h,
        to_d: kind.to_d,
        to_a: kind.to_a,
        ac: kind.ac,
        dd: kind.dd,
        ds: kind.ds,
        weight: kind.weight,
        level: template.level,
        rarity: template.rarity,
        cost: 0,
        power: 0,
        activation: template.activation.clone(),
        abilities,
    }
}

/// Rarity scaled by how much more or less common the new base is.
fn rescaled_rarity(snap: &Snapshot, kind: &BaseKind) -> u8 {
    let new_alloc = u32::from(kind.alloc_prob.max(1));
    let r = u32::from(snap.rarity) * u32::from(snap.base_alloc) / new_alloc;
    r.clamp(1, 99) as u8
}

/// Monotonic in power; zero for anything not worth having.
pub fn cost_for_power(power: i32) -> i64 {
    if power <= 0 {
        return 0;
    }
    let p = i64::from(power);
    (p * p / 4 + 50 * p) * 10
}

fn base_choice_limit(tuning: &Tuning, original: i32) -> i32 {
    let share = tuning.base_power_fraction * f64::from(original.max(0));
    share.floor() as i32 + 1
}

fn choose_base<R: Rng>(
    ctx: &ScrambleContext<'_>,
    template: &Artifact,
    snap: &Snapshot,
    rng: &mut R,
    log: &mut DiagnosticLog,
) -> Result<Artifact> {
    if template.class.is_special_slot() {
        let kind = ctx.kinds.get(template.class, template.sval)?;
        let item = on_kind(template, kind);
        log.line(&format!(
            "[{}] {}: keeps its {} base",
            template.index, template.name, kind.name
        ));
        return Ok(item);
    }

    let max_tries = ctx.tuning.max_tries;
    let limit = base_choice_limit(ctx.tuning, snap.power);
    let cursed = snap.power < 0;
    let mut target = snap.base_level.max(template.level);
    let mut light_curse = false;
    let mut last: Option<Artifact> = None;

    for tries in 0..max_tries {
        if tries == max_tries / 2 {
            if cursed {
                light_curse = true;
            } else {
                target /= 2;
            }
        }

        let (class, sval) = choose_base_item(rng, target);
        let kind = ctx.kinds.get(class, sval)?;
        let mut cand = on_kind(template, kind);
        let lvl = i16::from(template.level / 10);
        if class.is_weapon() {
            cand.to_h = kind.to_h + lvl + rng.gen_range(0..4) + rng.gen_range(0..4);
            cand.to_d = kind.to_d + lvl + rng.gen_range(0..4) + rng.gen_range(0..4);
        } else if class.is_armor() {
            cand.to_a = kind.to_a + lvl + kind.ac / 3 + rng.gen_range(0..8);
            if cand.to_a < 10 {
                cand.to_a += 2 + rng.gen_range(0..4) + rng.gen_range(0..4);
            }
        }
        if light_curse {
            cand.abilities.curses |= Curses::LIGHT_CURSE;
        }
        cand.normalize();
        cand.rarity = rescaled_rarity(snap, kind);

        let ap = ctx.eval.evaluate(&cand)?;
        if ap <= limit && cand.rarity != 1 {
            log.line(&format!(
                "[{}] {}: base {} after {} tries, power {} (limit {}), rarity {}",
                template.index,
                template.name,
                kind.name,
                tries + 1,
                ap,
                limit,
                cand.rarity
            ));
            return Ok(cand);
        }
        last = Some(cand);
    }

    match last {
        Some(item) => {
            log.warn(
                Some(template.index),
                WarningKind::BaseChoice,
                format!("no base item within power {limit} after {max_tries} tries"),
            );
            Ok(item)
        }
        // Zero tries: fall back to the template's own kind.
        None => {
            let kind = ctx.kinds.get(template.class, template.sval)?;
            Ok(on_kind(template, kind))
        }
    }
}

fn supercharge<R: Rng>(
    ctx: &ScrambleContext<'_>,
    item: &Artifact,
    original: i32,
    rng: &mut R,
    log: &mut DiagnosticLog,
) -> Result<Artifact> {
    let freq = ctx.frequencies;
    let mut a = item.clone();
    let mut changed = false;

    if a.class.is_melee() && freq.roll(rng, AbilityCategory::MeleeDiceSuper) {
        a.dd = (a.dd + 3 + rng.gen_range(0..4)).min(9);
        changed = true;
    } else if a.class.is_bow() {
        if freq.roll(rng, AbilityCategory::BowShotsSuper) {
            a.abilities.pval_flags |= PvalFlags::SHOTS;
            a.pval = 3;
            changed = true;
        } else if freq.roll(rng, AbilityCategory::BowMightSuper) {
            a.abilities.pval_flags |= PvalFlags::MIGHT;
            a.pval = 3;
            changed = true;
        }
    }
    if freq.roll(rng, AbilityCategory::SpeedSuper) {
        a.abilities.pval_flags |= PvalFlags::SPEED;
        a.pval = 5 + rng.gen_range(0..6);
        if rng.gen_ratio(1, 2) {
            a.pval += rng.gen_range(1..=3);
        }
        if rng.gen_ratio(1, 6) {
            a.pval += rng.gen_range(1..=3);
        }
        changed = true;
    }

    let mut result = item.clone();
    if changed {
        a.normalize();
        let ap = ctx.eval.evaluate(&a)?;
        let window = ctx.tuning.window(original);
        if is_inhibited(ap) || ap > window.high {
            log.line(&format!(
                "[{}] supercharge rolled back (power {ap} over {})",
                item.index, window.high
            ));
        } else {
            log.line(&format!("[{}] supercharged to power {ap}", item.index));
            result = a;
        }
    }

    if original > ctx.tuning.aggravate_power {
        let cat = if result.class.is_weapon() {
            AbilityCategory::WeaponAggravate
        } else {
            AbilityCategory::NonWeaponAggravate
        };
        if freq.roll(rng, cat) {
            result.abilities.curses |= Curses::AGGRAVATE;
            result.normalize();
            log.line(&format!("[{}] aggravates", item.index));
        }
    }
    Ok(result)
}

/// Cursed templates: add abilities and curses until the item scores negative.
fn curse_item<R: Rng>(
    ctx: &ScrambleContext<'_>,
    start: &Artifact,
    table: &CumulativeTable,
    rng: &mut R,
    log: &mut DiagnosticLog,
) -> Result<(Artifact, bool)> {
    let mut last = start.clone();
    for _ in 0..ctx.tuning.max_tries {
        let mut a = start.clone();
        for _ in 0..2 {
            a = add_one_ability(&a, table, rng, ctx.tuning).1;
        }
        for _ in 0..3 {
            a = apply_curse(&a, rng);
        }
        let ap = ctx.eval.evaluate(&a)?;
        if ap < 0 && !is_inhibited(ap) {
            return Ok((a, false));
        }
        last = a;
    }

    // Strip to the bare base with its drawbacks.
    let kind = ctx.kinds.get(last.class, last.sval)?;
    let mut stripped = on_kind(&last, kind);
    stripped.to_h = -last.to_h.abs();
    stripped.to_d = -last.to_d.abs();
    stripped.to_a = -last.to_a.abs();
    stripped.pval = 0;
    stripped.rarity = last.rarity;
    stripped.abilities = Abilities {
        curses: last.abilities.curses
            | Curses::LIGHT_CURSE
            | Curses::HEAVY_CURSE
            | Curses::AGGRAVATE,
        misc: Misc::IGNORE_MASK,
        ..Abilities::default()
    };
    stripped.normalize();
    log.warn(
        Some(start.index),
        WarningKind::Curse,
        format!(
            "no negative curse after {} tries; stripped to a cursed base",
            ctx.tuning.max_tries
        ),
    );
    Ok((stripped, true))
}

/// Add abilities until power lands in the window. Overshoots are discarded,
/// undershoots kept.
fn balance<R: Rng>(
    ctx: &ScrambleContext<'_>,
    start: &Artifact,
    original: i32,
    table: &CumulativeTable,
    rng: &mut R,
    log: &mut DiagnosticLog,
) -> Result<(Artifact, bool, u32)> {
    let window = ctx.tuning.window(original);
    let mut current = start.clone();
    let mut power = ctx.eval.evaluate(&current)?;
    let mut draws = 0u32;

    for _ in 0..ctx.tuning.max_tries {
        if window.contains(power) {
            break;
        }
        let (cat, cand) = add_one_ability(&current, table, rng, ctx.tuning);
        draws += 1;
        let ap = ctx.eval.evaluate(&cand)?;
        if is_inhibited(ap) || ap > window.high {
            if let Some(cat) = cat {
                tracing::trace!(index = start.index, category = %cat, power = ap, "discarded draw");
            }
            continue;
        }
        current = cand;
        power = ap;
    }

    let converged = window.contains(power);
    if !converged {
        log.warn(
            Some(start.index),
            WarningKind::Balance,
            format!(
                "power {power} outside {}..={} after {} tries",
                window.low, window.high, ctx.tuning.max_tries
            ),
        );
    }
    Ok((current, converged, draws))
}

/// Regenerate one template. Specials and unused slots come back unchanged.
pub fn scramble_item<R: Rng>(
    ctx: &ScrambleContext<'_>,
    template: &Artifact,
    snap: &Snapshot,
    rng: &mut R,
    log: &mut DiagnosticLog,
) -> Result<Scrambled> {
    if template.is_unused() || ctx.tuning.is_special(template.index) {
        return Ok(Scrambled {
            item: template.clone(),
            outcome: Outcome::Unchanged,
        });
    }

    let original = snap.power;
    let base = choose_base(ctx, template, snap, rng, log)?;
    let charged = supercharge(ctx, &base, original, rng, log)?;
    let table = ctx.frequencies.cumulative_for(charged.class);

    let (mut item, outcome) = if original < 0 {
        let (item, fallback) = curse_item(ctx, &charged, &table, rng, log)?;
        (item, Outcome::Cursed { fallback })
    } else {
        let (item, converged, draws) = balance(ctx, &charged, original, &table, rng, log)?;
        (item, Outcome::Balanced { converged, draws })
    };

    if item.activation.is_some() {
        item.abilities.misc |= Misc::ACTIVATE;
    }
    let power = if log.is_enabled() {
        ctx.eval.evaluate_traced(&item, log)?
    } else {
        ctx.eval.evaluate(&item)?
    };
    item.power = power;
    item.cost = cost_for_power(power);

    tracing::debug!(
        index = item.index,
        original,
        power,
        class = %item.class,
        ?outcome,
        "scrambled artifact"
    );
    Ok(Scrambled { item, outcome })
}
