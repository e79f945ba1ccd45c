use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::kinds::{standard_kinds, BaseKind, KindTable};
use crate::object::{Artifact, MonsterRecord};
use crate::{RandartError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Everything the generator reads: templates, bestiary and optionally a
/// kind table replacing the standard one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<BaseKind>>,
    #[serde(default)]
    pub monsters: Vec<MonsterRecord>,
    pub artifacts: Vec<Artifact>,
}

impl Catalogue {
    /// Read a catalogue from plain or gzip-compressed JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let text = if bytes.starts_with(&GZIP_MAGIC) {
            let mut decoder = GzDecoder::new(&bytes[..]);
            let mut s = String::new();
            decoder.read_to_string(&mut s)?;
            s
        } else {
            String::from_utf8(bytes).map_err(|e| {
                RandartError::Config(format!("{} is not UTF-8: {e}", path.display()))
            })?
        };
        let catalogue: Catalogue = serde_json::from_str(&text)?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Slot `i` must hold the artifact with index `i`.
    pub fn validate(&self) -> Result<()> {
        for (slot, art) in self.artifacts.iter().enumerate() {
            if art.index != slot {
                return Err(RandartError::Config(format!(
                    "artifact at position {slot} has index {}",
                    art.index
                )));
            }
        }
        Ok(())
    }

    pub fn kind_table(&self) -> KindTable {
        KindTable::new(self.kinds.clone().unwrap_or_else(standard_kinds))
    }
}

/// Write `value` as pretty JSON, gzip-compressed when `compress` is set.
pub fn write_json<T: Serialize>(path: &Path, value: &T, compress: bool) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if compress {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        fs::write(path, encoder.finish()?)?;
    } else {
        fs::write(path, json)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;

    #[test]
    fn gzip_and_plain_files_load_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let catalogue = testkit::catalogue(150);
        let plain = dir.path().join("artifacts.json");
        let packed = dir.path().join("artifacts.json.gz");
        write_json(&plain, &catalogue, false).unwrap();
        write_json(&packed, &catalogue, true).unwrap();
        assert_eq!(Catalogue::load(&plain).unwrap(), catalogue);
        assert_eq!(Catalogue::load(&packed).unwrap(), catalogue);
    }

    #[test]
    fn misindexed_catalogue_is_rejected() {
        let mut catalogue = testkit::catalogue(150);
        catalogue.artifacts.swap(3, 4);
        assert!(matches!(catalogue.validate(), Err(RandartError::Config(_))));
    }

    #[test]
    fn missing_kinds_fall_back_to_the_standard_table() {
        let json = r#"{ "artifacts": [] }"#;
        let catalogue: Catalogue = serde_json::from_str(json).unwrap();
        assert!(catalogue.monsters.is_empty());
        assert_eq!(catalogue.kind_table().len(), standard_kinds().len());
    }
}
