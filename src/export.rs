//! Export orchestration: storage layout, decode, render, write.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::transcript::{Decoder, render_message};
use crate::writer::{RenderedSection, TranscriptHeader, write_transcript_file};

/// Characters of the session id kept in artifact filenames
const SESSION_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub transcript_path: String,
    pub session_id: String,
    pub trigger: String,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            transcript_path: String::new(),
            session_id: "unknown".to_string(),
            trigger: "unknown".to_string(),
        }
    }
}

/// What a strict export run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported { path: PathBuf, messages: usize },
    /// The source transcript does not exist; nothing was written
    MissingSource,
}

/// Result handed back across the orchestrator boundary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportResult {
    /// `None` means nothing was exported
    pub exported_path: Option<PathBuf>,
}

impl ExportResult {
    pub fn is_exported(&self) -> bool {
        self.exported_path.is_some()
    }

    /// The exported path, or an empty string when nothing was exported
    pub fn path_string(&self) -> String {
        self.exported_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> Option<String> {
        self.exported_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Local time when the offset can be determined, UTC otherwise
pub fn capture_time() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `transcript_<YYYYMMDD_HHMMSS>_<first 8 chars of session id>.txt`
pub fn artifact_file_name(captured_at: OffsetDateTime, session_id: &str) -> Result<String> {
    let stamp = captured_at.format(format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))?;
    let prefix: String = session_id.chars().take(SESSION_PREFIX_LEN).collect();
    Ok(format!("transcript_{stamp}_{prefix}.txt"))
}

fn format_exported_at(captured_at: OffsetDateTime) -> Result<String> {
    Ok(captured_at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?)
}

pub struct Exporter {
    storage_dir: PathBuf,
}

impl Exporter {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.storage_dir()?))
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Export without swallowing errors, using `captured_at` for naming and the header.
    pub fn try_export_at(
        &self,
        request: &ExportRequest,
        captured_at: OffsetDateTime,
    ) -> Result<ExportOutcome> {
        fs::create_dir_all(&self.storage_dir).map_err(|err| {
            ExportError::io(
                format!("failed to create {}", self.storage_dir.display()),
                err,
            )
        })?;
        let output = self
            .storage_dir
            .join(artifact_file_name(captured_at, &request.session_id)?);

        let source = Path::new(&request.transcript_path);
        if !source.exists() {
            debug!(path = %source.display(), "transcript not found, nothing to export");
            return Ok(ExportOutcome::MissingSource);
        }

        let read_context = || format!("failed to read {}", source.display());
        let sections = Decoder::open(source)
            .map_err(|err| ExportError::io(read_context(), err))?
            .map(|entry| {
                entry.map(|entry| RenderedSection {
                    kind: entry.kind,
                    text: render_message(&entry.message),
                })
            })
            .collect::<io::Result<Vec<_>>>()
            .map_err(|err| ExportError::io(read_context(), err))?;

        let exported_at = format_exported_at(captured_at)?;
        let header = TranscriptHeader {
            exported_at: &exported_at,
            session_id: &request.session_id,
            trigger: &request.trigger,
        };
        write_transcript_file(&output, &header, &sections)?;

        info!(
            path = %output.display(),
            messages = sections.len(),
            "transcript exported"
        );
        Ok(ExportOutcome::Exported {
            path: output,
            messages: sections.len(),
        })
    }

    pub fn try_export(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        self.try_export_at(request, capture_time())
    }

    /// Failure boundary: errors are logged and reported as "not exported".
    pub fn export(&self, request: &ExportRequest) -> ExportResult {
        match self.try_export(request) {
            Ok(ExportOutcome::Exported { path, .. }) => ExportResult {
                exported_path: Some(path),
            },
            Ok(ExportOutcome::MissingSource) => ExportResult::default(),
            Err(err) => {
                error!("Error exporting transcript: {err}");
                ExportResult::default()
            }
        }
    }
}

/// Resolve the storage directory from `config` and export, never failing.
pub fn export_transcript(config: &Config, request: &ExportRequest) -> ExportResult {
    match Exporter::from_config(config) {
        Ok(exporter) => exporter.export(request),
        Err(err) => {
            error!("Error exporting transcript: {err}");
            ExportResult::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use tempfile::TempDir;

    const FIXED: OffsetDateTime = datetime!(2024-03-05 14:07:09 UTC);

    fn request(path: &Path, session_id: &str) -> ExportRequest {
        ExportRequest {
            transcript_path: path.display().to_string(),
            session_id: session_id.to_string(),
            trigger: "auto".to_string(),
        }
    }

    #[test]
    fn file_name_uses_timestamp_and_session_prefix() {
        assert_eq!(
            artifact_file_name(FIXED, "0123456789abcdef").unwrap(),
            "transcript_20240305_140709_01234567.txt"
        );
    }

    #[test]
    fn short_session_id_is_not_padded() {
        assert_eq!(
            artifact_file_name(FIXED, "abc").unwrap(),
            "transcript_20240305_140709_abc.txt"
        );
        assert_eq!(
            artifact_file_name(FIXED, "").unwrap(),
            "transcript_20240305_140709_.txt"
        );
    }

    #[test]
    fn session_prefix_counts_characters() {
        assert_eq!(
            artifact_file_name(FIXED, "ééééééééé").unwrap(),
            "transcript_20240305_140709_éééééééé.txt"
        );
    }

    #[test]
    fn end_to_end_two_messages() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("session.jsonl");
        fs::write(
            &source,
            concat!(
                r#"{"type":"user","message":{"role":"user","content":"Hello"}}"#,
                "\n",
                r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Hi there"}]}}"#,
                "\n"
            ),
        )
        .unwrap();
        let storage = tmp.path().join("saved");
        let exporter = Exporter::new(&storage);

        let outcome = exporter
            .try_export_at(&request(&source, "session-1234"), FIXED)
            .unwrap();
        let expected_path = storage.join("transcript_20240305_140709_session-.txt");
        assert_eq!(
            outcome,
            ExportOutcome::Exported {
                path: expected_path.clone(),
                messages: 2
            }
        );

        let content = fs::read_to_string(&expected_path).unwrap();
        assert!(content.contains("Exported: 2024-03-05 14:07:09\n"));
        assert!(content.contains("Session ID: session-1234\n"));
        assert!(content.contains("Trigger: auto\n"));
        assert!(content.contains("Messages: 2\n"));
        assert!(content.contains("--- Message 1 (user) ---\n[USER]:\nHello\n"));
        assert!(content.contains("--- Message 2 (assistant) ---\n[ASSISTANT]:\nHi there\n"));
        assert!(content.contains("END OF TRANSCRIPT\n"));
        assert!(content.contains(&format!("Location: {}\n", expected_path.display())));
    }

    #[test]
    fn corrupt_lines_leave_valid_entries_in_order() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("session.jsonl");
        let mut data = String::new();
        for i in 0..5 {
            data.push_str(&format!(
                "{{\"type\":\"user\",\"message\":{{\"content\":\"msg-{i}\"}}}}\n"
            ));
            data.push_str("{broken\n\n");
            data.push_str("{\"type\":\"progress\",\"data\":{}}\n");
        }
        fs::write(&source, data).unwrap();

        let exporter = Exporter::new(tmp.path().join("saved"));
        let ExportOutcome::Exported { path, messages } = exporter
            .try_export_at(&request(&source, "abc"), FIXED)
            .unwrap()
        else {
            panic!("expected export");
        };
        assert_eq!(messages, 5);
        let content = fs::read_to_string(path).unwrap();
        let positions: Vec<usize> = (0..5)
            .map(|i| content.find(&format!("msg-{i}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(content.contains("--- Message 5 (user) ---"));
        assert!(!content.contains("--- Message 6"));
    }

    #[test]
    fn missing_source_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = tmp.path().join("saved");
        let exporter = Exporter::new(&storage);

        let outcome = exporter
            .try_export_at(&request(&tmp.path().join("nope.jsonl"), "abc"), FIXED)
            .unwrap();
        assert_eq!(outcome, ExportOutcome::MissingSource);
        assert!(storage.is_dir());
        assert_eq!(fs::read_dir(&storage).unwrap().count(), 0);

        let result = exporter.export(&request(&tmp.path().join("nope.jsonl"), "abc"));
        assert!(!result.is_exported());
        assert_eq!(result.path_string(), "");
    }

    #[test]
    fn existing_storage_dir_is_fine() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("session.jsonl");
        fs::write(&source, "").unwrap();
        let storage = tmp.path().join("saved");
        fs::create_dir_all(&storage).unwrap();

        let result = Exporter::new(&storage).export(&request(&source, "abc"));
        assert!(result.is_exported());
        let content = fs::read_to_string(result.exported_path.unwrap()).unwrap();
        assert!(content.contains("Messages: 0\n"));
    }

    #[test]
    fn io_failure_is_contained() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("session.jsonl");
        fs::write(&source, "").unwrap();
        // A regular file where the storage directory should be
        let blocker = tmp.path().join("saved");
        fs::write(&blocker, "not a directory").unwrap();

        let exporter = Exporter::new(&blocker);
        assert!(matches!(
            exporter.try_export_at(&request(&source, "abc"), FIXED),
            Err(ExportError::Io { .. })
        ));
        assert_eq!(exporter.export(&request(&source, "abc")), ExportResult::default());
    }

    #[test]
    fn directory_as_source_is_contained() {
        let tmp = TempDir::new().unwrap();
        let exporter = Exporter::new(tmp.path().join("saved"));
        let result = exporter.export(&request(tmp.path(), "abc"));
        assert!(!result.is_exported());
    }

    #[test]
    fn result_file_name() {
        let result = ExportResult {
            exported_path: Some(PathBuf::from("/x/transcript_20240305_140709_abc.txt")),
        };
        assert_eq!(
            result.file_name().as_deref(),
            Some("transcript_20240305_140709_abc.txt")
        );
        assert_eq!(ExportResult::default().file_name(), None);
    }
}
