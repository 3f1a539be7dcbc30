//! Transcript artifact layout: header, message sections, footer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::transcript::EntryKind;

pub const TITLE: &str = "CLAUDE CODE CONVERSATION TRANSCRIPT";
const RULE_WIDTH: usize = 80;

/// Header fields written above the message sections
#[derive(Debug, Clone)]
pub struct TranscriptHeader<'a> {
    /// Already formatted capture time
    pub exported_at: &'a str,
    pub session_id: &'a str,
    pub trigger: &'a str,
}

/// One rendered message along with the entry type it came from
#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub kind: EntryKind,
    pub text: String,
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Write the full transcript to `out` in one sequential pass.
pub fn write_transcript<W: Write>(
    out: &mut W,
    header: &TranscriptHeader<'_>,
    sections: &[RenderedSection],
    location: &Path,
) -> std::io::Result<()> {
    let rule = rule();

    writeln!(out, "{rule}")?;
    writeln!(out, "{TITLE}")?;
    writeln!(out, "Exported: {}", header.exported_at)?;
    writeln!(out, "Session ID: {}", header.session_id)?;
    writeln!(out, "Trigger: {}", header.trigger)?;
    writeln!(out, "Messages: {}", sections.len())?;
    writeln!(out, "{rule}")?;

    for (idx, section) in sections.iter().enumerate() {
        write!(
            out,
            "\n--- Message {} ({}) ---",
            idx + 1,
            section.kind.as_str()
        )?;
        out.write_all(section.text.as_bytes())?;
    }

    write!(out, "\n{rule}\n")?;
    writeln!(out, "END OF TRANSCRIPT")?;
    writeln!(out, "Location: {}", location.display())?;
    writeln!(out, "{rule}")?;
    Ok(())
}

/// Create (or replace) `path` and write the transcript into it.
pub fn write_transcript_file(
    path: &Path,
    header: &TranscriptHeader<'_>,
    sections: &[RenderedSection],
) -> Result<()> {
    let context = || format!("failed to write {}", path.display());
    let file = File::create(path).map_err(|err| ExportError::io(context(), err))?;
    let mut out = BufWriter::new(file);
    write_transcript(&mut out, header, sections, path)
        .and_then(|()| out.flush())
        .map_err(|err| ExportError::io(context(), err))
}
