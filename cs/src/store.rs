//! Core Corpus implementation

use eyre::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Statistics for a loaded corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    /// Number of stored lines
    pub line_count: usize,
    /// Total bytes across stored lines (after trimming)
    pub total_bytes: u64,
    /// Whether the load succeeded
    pub ready: bool,
}

/// Ordered, immutable set of text lines
///
/// A corpus is either ready (the load succeeded, possibly with zero lines) or
/// unavailable (the file was missing or unreadable). It is never mutated once
/// built.
#[derive(Debug, Default)]
pub struct Corpus {
    lines: Vec<String>,
    ready: bool,
    source: Option<PathBuf>,
}

impl Corpus {
    /// Load every non-blank, trimmed line of the file at `path`
    ///
    /// Never fails: a missing or unreadable file produces an unavailable
    /// corpus and an error log entry instead.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        debug!(path = %path.display(), "Corpus::load: called");

        if !path.is_file() {
            error!(path = %path.display(), "Corpus file not found, filters unavailable");
            return Self::unavailable_at(path);
        }

        match read_lines(path) {
            Ok(lines) => {
                if lines.is_empty() {
                    warn!(path = %path.display(), "Corpus loaded but empty, every search will come back empty");
                } else {
                    info!(path = %path.display(), line_count = lines.len(), "Corpus loaded");
                }
                Self {
                    lines,
                    ready: true,
                    source: Some(path.to_path_buf()),
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load corpus, filters unavailable");
                Self::unavailable_at(path)
            }
        }
    }

    /// Build a ready corpus from in-memory lines, applying the same trimming
    /// and blank-line rules as [`Corpus::load`]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines.into_iter().filter_map(|l| normalize(l.as_ref())).collect();
        debug!(line_count = lines.len(), "Corpus::from_lines: called");
        Self {
            lines,
            ready: true,
            source: None,
        }
    }

    /// An empty corpus marked as unavailable
    pub fn unavailable() -> Self {
        Self::default()
    }

    fn unavailable_at(path: &Path) -> Self {
        Self {
            lines: Vec::new(),
            ready: false,
            source: Some(path.to_path_buf()),
        }
    }

    /// Lines in load order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the load succeeded
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// File the corpus was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            line_count: self.lines.len(),
            total_bytes: self.lines.iter().map(|l| l.len() as u64).sum(),
            ready: self.ready,
        }
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(path).context(format!("Failed to open corpus: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut lines = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context(format!("Failed to read corpus: {}", path.display()))?;
        if read == 0 {
            break;
        }
        // Invalid UTF-8 is replaced rather than rejected
        if let Some(line) = normalize(&String::from_utf8_lossy(&buf)) {
            lines.push(line);
        }
    }

    Ok(lines)
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
