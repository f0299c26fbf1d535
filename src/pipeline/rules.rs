//! Sender allow/deny rules, loaded from a YAML document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::pipeline::types::Category;

/// Whitelist/blacklist substrings matched against the From header.
///
/// Loaded once per run, applied per message, never mutated by
/// classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl Rules {
    /// Load rules from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Rules(format!("{}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| PipelineError::Rules(format!("{}: {e}", path.display())))
    }

    /// Apply the override: whitelist forces `Important`, blacklist forces
    /// `Neither`, otherwise the baseline category stands. Whitelist wins
    /// when a sender somehow matches both.
    pub fn apply(&self, baseline: Category, sender: &str) -> Category {
        if self.whitelist.iter().any(|w| sender.contains(w.as_str())) {
            Category::Important
        } else if self.blacklist.iter().any(|b| sender.contains(b.as_str())) {
            Category::Neither
        } else {
            baseline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rules(whitelist: &[&str], blacklist: &[&str]) -> Rules {
        Rules {
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn whitelist_forces_important() {
        let r = rules(&["boss@corp.com"], &[]);
        assert_eq!(
            r.apply(Category::Neither, "Big Boss <boss@corp.com>"),
            Category::Important
        );
    }

    #[test]
    fn blacklist_forces_neither() {
        let r = rules(&[], &["spam.example"]);
        assert_eq!(
            r.apply(Category::Necessary, "deals@spam.example"),
            Category::Neither
        );
    }

    #[test]
    fn whitelist_beats_blacklist() {
        let r = rules(&["alice"], &["alice"]);
        assert_eq!(r.apply(Category::Neither, "alice@x.com"), Category::Important);
    }

    #[test]
    fn no_match_keeps_baseline() {
        let r = rules(&["boss@corp.com"], &["spam.example"]);
        assert_eq!(
            r.apply(Category::Necessary, "someone@else.com"),
            Category::Necessary
        );
    }

    #[test]
    fn loads_yaml_with_missing_sections() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "whitelist:\n  - boss@corp.com").unwrap();

        let r = Rules::load(f.path()).unwrap();
        assert_eq!(r.whitelist, vec!["boss@corp.com"]);
        assert!(r.blacklist.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Rules::load(Path::new("/nonexistent/rules.yaml")).is_err());
    }
}
