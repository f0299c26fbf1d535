//! Markdown digest of a triage pass.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::pipeline::types::{Category, TriagedMessage};

/// Heading order in the digest file.
const SECTION_ORDER: [Category; 3] = [Category::Important, Category::Necessary, Category::Neither];

/// Write `triage_YYYY-MM-DD.md` into `dir`, grouped by category.
///
/// An empty digest writes nothing and returns `Ok(None)`. Re-running on
/// the same day overwrites that day's file.
pub fn write_digest(
    entries: &[TriagedMessage],
    dir: &Path,
) -> std::io::Result<Option<PathBuf>> {
    if entries.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let date = Local::now().format("%Y-%m-%d");
    let path = dir.join(format!("triage_{date}.md"));

    let mut out = Vec::new();
    writeln!(out, "# Gmail Triage Digest — {date}")?;
    writeln!(out)?;

    for category in SECTION_ORDER {
        let group: Vec<&TriagedMessage> =
            entries.iter().filter(|e| e.category == category).collect();
        if group.is_empty() {
            continue;
        }

        writeln!(out, "## {}", capitalize(category.label()))?;
        writeln!(out)?;
        for entry in group {
            writeln!(out, "- **{}** — _{}_", entry.subject, entry.sender)?;
        }
        writeln!(out)?;
    }

    std::fs::write(&path, out)?;
    Ok(Some(path))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
