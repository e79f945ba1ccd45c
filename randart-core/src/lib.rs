use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub mod abilities;
pub mod acceptance;
pub mod catalogue;
pub mod chooser;
pub mod config;
pub mod diagnostics;
pub mod frequency;
pub mod kinds;
pub mod names;
pub mod object;
pub mod power;
pub mod scramble;
pub mod session;

#[cfg(test)]
mod testkit;

pub use catalogue::Catalogue;
pub use config::Tuning;
pub use diagnostics::{Warning, WarningKind};
pub use object::{Artifact, ItemClass};
pub use session::{GeneratedSet, GenerationSession};

use catalogue::write_json;
use names::name_set;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandartSettings {
    pub seed: u64,
    /// Regenerate abilities and bases. When off only names change.
    pub full: bool,
    pub randomize_names: bool,
    pub debug: bool,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub tuning_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum RandartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no base kind for {class} sval {sval}")]
    MissingKind { class: ItemClass, sval: u8 },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RandartError>;

/// A finished regeneration, ready to be written out.
#[derive(Debug, Clone)]
pub struct Generated {
    pub artifacts: Vec<Artifact>,
    /// Display name per catalogue slot.
    pub names: Vec<String>,
    pub passes: u32,
    pub accepted: bool,
    pub warnings: Vec<Warning>,
    /// Diagnostic text, empty unless debug is on.
    pub log: String,
}

/// Regenerate `catalogue` in memory. Nothing touches the filesystem.
pub fn generate(
    catalogue: &Catalogue,
    settings: &RandartSettings,
    tuning: &Tuning,
) -> Result<Generated> {
    catalogue.validate()?;
    tuning.validate()?;

    let (mut artifacts, passes, accepted, warnings, log) = if settings.full {
        let mut session =
            GenerationSession::new(catalogue, tuning, settings.seed, settings.debug)?;
        let set = session.generate()?;
        let log = session.into_log();
        let warnings = log.warnings().to_vec();
        (set.artifacts, set.passes, set.accepted, warnings, log.into_text())
    } else {
        (catalogue.artifacts.clone(), 0, true, Vec::new(), String::new())
    };

    let names = if settings.randomize_names {
        let names = name_set(settings.seed, &artifacts, &tuning.special_indices);
        for (art, name) in artifacts.iter_mut().zip(&names) {
            if !art.is_unused() {
                art.name = name.clone();
            }
        }
        names
    } else {
        artifacts.iter().map(|a| a.name.clone()).collect()
    };

    Ok(Generated {
        artifacts,
        names,
        passes,
        accepted,
        warnings,
        log,
    })
}

pub fn run(settings: RandartSettings) -> Result<()> {
    if !settings.input_path.exists() {
        return Err(RandartError::Config(format!(
            "Input path does not exist: {}",
            settings.input_path.display()
        )));
    }

    let catalogue = Catalogue::load(&settings.input_path)?;
    let tuning = match &settings.tuning_path {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let generated = generate(&catalogue, &settings, &tuning)?;

    // Each seed gets its own folder so repeated runs do not collide.
    let out_root = settings
        .output_path
        .join(format!("Randart_{}", settings.seed));
    if !out_root.exists() {
        fs::create_dir_all(&out_root)?;
    }

    let output = Catalogue {
        kinds: catalogue.kinds.clone(),
        monsters: catalogue.monsters.clone(),
        artifacts: generated.artifacts.clone(),
    };
    let artifacts_path = out_root.join("artifacts.json");
    write_json(&artifacts_path, &output, false)?;

    let mut names = generated.names.join("\n");
    names.push('\n');
    fs::write(out_root.join("names.txt"), names)?;

    tracing::info!(
        seed = settings.seed,
        passes = generated.passes,
        accepted = generated.accepted,
        warnings = generated.warnings.len(),
        out = %out_root.display(),
        "random artifacts written"
    );

    let mut log = format!("Random artifact seed: {}\n", settings.seed);
    log.push_str(&format!(
        "catalogue: {} -> {}\n",
        settings.input_path.display(),
        artifacts_path.display()
    ));
    if let Some(path) = &settings.tuning_path {
        log.push_str(&format!("tuning: {}\n", path.display()));
    } else {
        log.push_str("tuning: defaults\n");
    }
    if settings.full {
        log.push_str(&format!(
            "passes: {} (accepted: {})\n",
            generated.passes, generated.accepted
        ));
    } else {
        log.push_str("abilities: unchanged (names only)\n");
    }
    log.push_str(&format!("warnings: {}\n", generated.warnings.len()));
    for w in &generated.warnings {
        match w.index {
            Some(idx) => log.push_str(&format!("  [{}] {}: {}\n", idx, w.kind, w.message)),
            None => log.push_str(&format!("  {}: {}\n", w.kind, w.message)),
        }
    }

    log.push_str("artifacts:\n");
    for art in generated.artifacts.iter().filter(|a| !a.is_unused()) {
        log.push_str(&format!(
            "  [{:3}] {:<28} {} {} (+{},+{}) [{},+{}] pval {} power {} cost {}\n",
            art.index,
            art.name,
            art.class,
            art.sval,
            art.to_h,
            art.to_d,
            art.ac,
            art.to_a,
            art.pval,
            art.power,
            art.cost,
        ));
    }

    if !generated.log.is_empty() {
        log.push('\n');
        log.push_str(&generated.log);
    }

    if settings.debug {
        let log_path = out_root.join("randart_log.txt");
        fs::write(log_path, log)?;
    }

    Ok(())
}
