//! Persists text records as JSON artifacts next to the mirrored original.

use crate::error::IngestResult;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use strata_core::TextRecord;
use tracing::debug;
use uuid::Uuid;

const MAX_NAME_ATTEMPTS: usize = 5;

/// Write `record` as `<stem>-<suffix>.json` in the directory of `mirrored_output`.
///
/// `mirrored_output` is where the original will land under the Output root; only its
/// directory and stem are used. Existing files are never overwritten.
pub fn write_record(record: &TextRecord, mirrored_output: &Path) -> IngestResult<PathBuf> {
    let parent = mirrored_output.parent().unwrap_or_else(|| Path::new("."));
    let stem = mirrored_output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| record.file_name.clone());

    std::fs::create_dir_all(parent)?;

    for _ in 0..MAX_NAME_ATTEMPTS {
        let path = parent.join(artifact_name(&stem));
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_json(record, file) {
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        debug!("Wrote record {:?}", path);
        return Ok(path);
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free artifact name for {} in {:?}", stem, parent),
    )
    .into())
}

fn artifact_name(stem: &str) -> String {
    format!("{}-{}.json", stem, random_suffix())
}

/// 11 URL-safe characters from 8 random bytes.
fn random_suffix() -> String {
    let id = Uuid::new_v4();
    URL_SAFE_NO_PAD.encode(&id.as_bytes()[8..])
}

fn write_json(record: &TextRecord, file: File) -> IngestResult<()> {
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::FileType;
    use tempfile::tempdir;

    fn record(content: &str) -> TextRecord {
        TextRecord::new("relatório.py", FileType::Code, content).unwrap()
    }

    #[test]
    fn test_suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 11);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_artifact_name_and_content() {
        let dir = tempdir().unwrap();
        let mirrored = dir.path().join("code/sub/relatório.py");

        let path = write_record(&record("print('olá')\n"), &mirrored).unwrap();

        assert_eq!(path.parent().unwrap(), dir.path().join("code/sub"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("relatório-"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "relatório-".len() + 11 + ".json".len());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("olá"), "non-ASCII must not be escaped");
        assert!(raw.contains("\n    \"file_name\""), "four-space indentation");

        let parsed: TextRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, record("print('olá')\n"));
    }

    #[test]
    fn test_same_stem_gets_distinct_artifacts() {
        let dir = tempdir().unwrap();
        let first = write_record(&record("a = 1"), &dir.path().join("code/x.py")).unwrap();
        let second = write_record(&record("b = 2"), &dir.path().join("code/x.js")).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }
}
