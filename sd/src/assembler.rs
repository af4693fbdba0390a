//! Result assembly
//!
//! Turns the matched lines of a finished search into a downloadable text
//! artifact plus a one-line human summary.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest file-name stem kept after sanitizing
const MAX_STEM_CHARS: usize = 50;

/// A result file ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "file-name")]
    pub file_name: String,
    pub content: String,
    pub summary: String,
    #[serde(rename = "match-count")]
    pub match_count: usize,
    pub truncated: bool,
}

/// Outcome of assembling a search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// At least one match
    Artifact(Artifact),
    /// Nothing matched; there is no file to send
    Empty { summary: String },
}

impl Assembly {
    pub fn summary(&self) -> &str {
        match self {
            Self::Artifact(artifact) => &artifact.summary,
            Self::Empty { summary } => summary,
        }
    }

    pub fn match_count(&self) -> usize {
        match self {
            Self::Artifact(artifact) => artifact.match_count,
            Self::Empty { .. } => 0,
        }
    }
}

/// How a result is described to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLabel {
    /// Summary prefix, e.g. `Mode 3 Results for 'alice'`
    pub caption: String,
    /// File name stem before sanitizing, e.g. `M3_Search_alice`
    pub file_stem: String,
}

impl ResultLabel {
    pub fn new(caption: impl Into<String>, file_stem: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            file_stem: file_stem.into(),
        }
    }
}

/// Assembly settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Extra footer line appended after the result count
    pub signature: Option<String>,
}

/// Assemble using the current local time for the file name
pub fn assemble(matches: &[String], label: &ResultLabel, truncated: bool, options: &AssemblyOptions) -> Assembly {
    assemble_at(matches, label, truncated, options, Local::now())
}

/// Assemble with an explicit timestamp
pub fn assemble_at(
    matches: &[String],
    label: &ResultLabel,
    truncated: bool,
    options: &AssemblyOptions,
    now: DateTime<Local>,
) -> Assembly {
    debug!(match_count = matches.len(), truncated, caption = %label.caption, "assemble_at: called");
    if matches.is_empty() {
        return Assembly::Empty {
            summary: "No matching results found.".to_string(),
        };
    }

    let count = matches.len();
    let mut content = matches.join("\n");
    content.push_str(&format!("\n\n# --- Results: {} --- #\n", format_count(count)));
    if let Some(signature) = options.signature.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        content.push_str(&format!("# {} --- #", signature));
    }

    let noun = if count == 1 { "line" } else { "lines" };
    let mut summary = format!("{} ({} {} found).", label.caption, format_count(count), noun);
    if truncated {
        summary.push_str(" Limit reached, more matches may exist.");
    }

    Assembly::Artifact(Artifact {
        file_name: format!("{}_{}.txt", sanitize_stem(&label.file_stem), now.format("%Y%m%d_%H%M")),
        content,
        summary,
        match_count: count,
        truncated,
    })
}

/// Format a count with thousands separators (`1234567` -> `1,234,567`)
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Replace each run of characters other than word characters and `-` with a
/// single `_`, then cap the length
fn sanitize_stem(stem: &str) -> String {
    let mut out = String::new();
    let mut in_run = false;
    for ch in stem.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out.chars().take(MAX_STEM_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap()
    }

    fn label() -> ResultLabel {
        ResultLabel::new("Mode 3 Results for 'pass'", "M3_Search_pass")
    }

    #[test]
    fn test_empty_matches_have_no_artifact() {
        let assembly = assemble_at(&[], &label(), false, &AssemblyOptions::default(), fixed_now());
        assert_eq!(
            assembly,
            Assembly::Empty {
                summary: "No matching results found.".to_string()
            }
        );
        assert_eq!(assembly.match_count(), 0);
    }

    #[test]
    fn test_artifact_content_and_footer() {
        let matches = vec!["a:1".to_string(), "b:2".to_string()];
        let Assembly::Artifact(artifact) =
            assemble_at(&matches, &label(), false, &AssemblyOptions::default(), fixed_now())
        else {
            panic!("expected artifact");
        };

        assert_eq!(artifact.content, "a:1\nb:2\n\n# --- Results: 2 --- #\n");
        assert_eq!(artifact.file_name, "M3_Search_pass_20260307_0905.txt");
        assert_eq!(artifact.summary, "Mode 3 Results for 'pass' (2 lines found).");
        assert_eq!(artifact.match_count, 2);
        assert!(!artifact.truncated);
    }

    #[test]
    fn test_signature_and_truncation_note() {
        let matches = vec!["only".to_string()];
        let options = AssemblyOptions {
            signature: Some("Sifted by ops".to_string()),
        };
        let Assembly::Artifact(artifact) = assemble_at(&matches, &label(), true, &options, fixed_now()) else {
            panic!("expected artifact");
        };

        assert!(artifact.content.ends_with("# --- Results: 1 --- #\n# Sifted by ops --- #"));
        assert_eq!(
            artifact.summary,
            "Mode 3 Results for 'pass' (1 line found). Limit reached, more matches may exist."
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let matches = vec!["z".to_string(), "a".to_string()];
        let before = matches.clone();
        let _ = assemble(&matches, &label(), false, &AssemblyOptions::default());
        assert_eq!(matches, before);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("M1_Filter_my site.com"), "M1_Filter_my_site_com");
        assert_eq!(sanitize_stem("a  @@ b"), "a_b");
        assert_eq!(sanitize_stem(&"x".repeat(80)).len(), MAX_STEM_CHARS);
    }
}
