use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::acceptance::{accept, SetCounts};
use crate::catalogue::Catalogue;
use crate::chooser::check_kinds;
use crate::config::Tuning;
use crate::diagnostics::{DiagnosticLog, WarningKind};
use crate::frequency::{analyze, Analysis};
use crate::kinds::KindTable;
use crate::object::Artifact;
use crate::power::PowerEvaluator;
use crate::scramble::{scramble_item, Outcome, ScrambleContext};
use crate::Result;

/// Salt separating the generation stream from other seeded streams.
const GENERATION_SALT: u64 = 0x5241_4E44_4152_5421;

/// One complete regeneration of a catalogue.
#[derive(Clone, Debug)]
pub struct GeneratedSet {
    pub artifacts: Vec<Artifact>,
    pub outcomes: Vec<Outcome>,
    /// Whole-set passes run, counting the accepted one.
    pub passes: u32,
    pub accepted: bool,
}

/// State for one generation run: the seeded stream, lookup caches and what
/// was learned from the templates. Dropped when the run ends.
pub struct GenerationSession<'c> {
    seed: u64,
    rng: StdRng,
    catalogue: &'c Catalogue,
    tuning: &'c Tuning,
    kinds: KindTable,
    analysis: Analysis,
    log: DiagnosticLog,
}

impl<'c> GenerationSession<'c> {
    pub fn new(
        catalogue: &'c Catalogue,
        tuning: &'c Tuning,
        seed: u64,
        debug: bool,
    ) -> Result<Self> {
        let kinds = catalogue.kind_table();
        check_kinds(&kinds)?;
        let mut log = DiagnosticLog::new(debug);
        log.line(&format!("Random artifact seed: {seed}"));
        let analysis = analyze(catalogue, &kinds, tuning, &mut log)?;
        tracing::info!(
            seed,
            artifacts = catalogue.artifacts.len(),
            monsters = catalogue.monsters.len(),
            "generation session started"
        );
        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed ^ GENERATION_SALT),
            catalogue,
            tuning,
            kinds,
            analysis,
            log,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn into_log(self) -> DiagnosticLog {
        self.log
    }

    /// Scramble every template, rerunning the whole pass until the set is
    /// structurally balanced or the pass budget runs out.
    pub fn generate(&mut self) -> Result<GeneratedSet> {
        let catalogue = self.catalogue;
        let tuning = self.tuning;
        let kinds = &self.kinds;
        let analysis = &self.analysis;
        let rng = &mut self.rng;
        let log = &mut self.log;

        let eval = PowerEvaluator::new(
            kinds,
            &catalogue.monsters,
            analysis.total_threat,
            tuning.hard_ceilings,
        );
        let ctx = ScrambleContext {
            eval: &eval,
            kinds,
            frequencies: &analysis.frequencies,
            tuning,
        };

        let mut last: Option<(Vec<Artifact>, Vec<Outcome>)> = None;
        for pass in 1..=tuning.max_set_tries {
            log.clear_item_warnings();
            log.line(&format!("Pass {pass}"));

            let mut items = Vec::with_capacity(catalogue.artifacts.len());
            let mut outcomes = Vec::with_capacity(catalogue.artifacts.len());
            for (template, snap) in catalogue.artifacts.iter().zip(&analysis.snapshots) {
                let out = scramble_item(&ctx, template, snap, rng, log)?;
                items.push(out.item);
                outcomes.push(out.outcome);
            }

            let counts = SetCounts::of(&items);
            if accept(&items, &tuning.set_minimums) {
                tracing::info!(pass, "artifact set accepted");
                log.line(&format!("Pass {pass} accepted: {counts:?}"));
                return Ok(GeneratedSet {
                    artifacts: items,
                    outcomes,
                    passes: pass,
                    accepted: true,
                });
            }

            for (what, have, need) in counts.shortfalls(&tuning.set_minimums) {
                tracing::debug!(pass, what, have, need, "set rejected");
                log.line(&format!("Pass {pass} rejected: {have} {what}, need {need}"));
            }
            last = Some((items, outcomes));
        }

        log.warn(
            None,
            WarningKind::SetAcceptance,
            format!(
                "no balanced set after {} passes; keeping the last",
                tuning.max_set_tries
            ),
        );
        let (artifacts, outcomes) = last.unwrap_or_default();
        Ok(GeneratedSet {
            artifacts,
            outcomes,
            passes: tuning.max_set_tries,
            accepted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SetMinimums;
    use crate::testkit;

    #[test]
    fn same_seed_same_set() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning::default();
        let a = GenerationSession::new(&catalogue, &tuning, 1234, false)
            .unwrap()
            .generate()
            .unwrap();
        let b = GenerationSession::new(&catalogue, &tuning, 1234, false)
            .unwrap()
            .generate()
            .unwrap();
        assert_eq!(a.artifacts, b.artifacts);
        assert_eq!(a.passes, b.passes);
    }

    #[test]
    fn specials_pass_through_and_the_rest_are_scrambled() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning::default();
        let set = GenerationSession::new(&catalogue, &tuning, 77, false)
            .unwrap()
            .generate()
            .unwrap();
        assert_eq!(set.artifacts.len(), 150);
        let unchanged = set
            .outcomes
            .iter()
            .filter(|o| **o == Outcome::Unchanged)
            .count();
        assert_eq!(unchanged, 3);
        for idx in [13, 34, 111] {
            assert_eq!(set.artifacts[idx], catalogue.artifacts[idx]);
        }
        for (i, art) in set.artifacts.iter().enumerate() {
            assert_eq!(art.index, i);
            assert_eq!(art.clone().normalized(), *art, "[{i}] not normalized");
        }
    }

    #[test]
    fn balanced_items_land_in_window_or_warn() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning::default();
        let mut session = GenerationSession::new(&catalogue, &tuning, 9, false).unwrap();
        let set = session.generate().unwrap();
        let snapshots = session.analysis().snapshots.clone();
        let log = session.into_log();
        for (i, outcome) in set.outcomes.iter().enumerate() {
            if let Outcome::Balanced { .. } = outcome {
                let window = tuning.window(snapshots[i].power);
                let inside = window.contains(set.artifacts[i].power);
                let warned = log.has_warning(i, WarningKind::Balance);
                assert!(inside != warned, "[{i}] inside={inside} warned={warned}");
            }
        }
    }

    #[test]
    fn negative_templates_end_cursed() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning::default();
        let mut session = GenerationSession::new(&catalogue, &tuning, 31, false).unwrap();
        let set = session.generate().unwrap();
        let snapshots = &session.analysis().snapshots;
        let mut cursed = 0;
        for (i, art) in set.artifacts.iter().enumerate() {
            if snapshots[i].power < 0 && !tuning.is_special(i) {
                cursed += 1;
                assert!(art.power < 0, "[{i}] ended at {}", art.power);
                assert!(art.abilities.is_cursed());
            }
        }
        assert!(cursed > 0);
    }

    #[test]
    fn accepted_sets_meet_the_minimums() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning::default();
        let set = GenerationSession::new(&catalogue, &tuning, 2024, false)
            .unwrap()
            .generate()
            .unwrap();
        assert_eq!(set.accepted, accept(&set.artifacts, &tuning.set_minimums));
        assert_eq!(set.accepted, accept(&set.artifacts, &tuning.set_minimums));
        if set.accepted {
            assert!(set.passes <= tuning.max_set_tries);
        } else {
            assert_eq!(set.passes, tuning.max_set_tries);
        }
    }

    #[test]
    fn custom_kind_table_must_cover_the_chooser() {
        let mut catalogue = testkit::catalogue(150);
        let mut kinds = crate::kinds::standard_kinds();
        kinds.retain(|k| k.class != crate::object::ItemClass::Bow);
        catalogue.kinds = Some(kinds);
        let tuning = Tuning::default();
        let err = GenerationSession::new(&catalogue, &tuning, 3, false)
            .err()
            .unwrap();
        assert!(matches!(err, crate::RandartError::Config(_)), "{err}");
    }

    #[test]
    fn impossible_minimums_exhaust_the_pass_budget() {
        let catalogue = testkit::catalogue(150);
        let tuning = Tuning {
            max_set_tries: 2,
            max_tries: 20,
            set_minimums: SetMinimums {
                bows: 200,
                ..SetMinimums::default()
            },
            ..Tuning::default()
        };
        let mut session = GenerationSession::new(&catalogue, &tuning, 5, true).unwrap();
        let set = session.generate().unwrap();
        assert!(!set.accepted);
        assert_eq!(set.passes, 2);
        assert_eq!(set.artifacts.len(), 150);
        let log = session.into_log();
        assert!(log
            .warnings()
            .iter()
            .any(|w| w.kind == WarningKind::SetAcceptance));
        assert!(log.text().contains("Pass 2 rejected"));
    }
}
