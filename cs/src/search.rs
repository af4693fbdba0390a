//! Line filters over a loaded corpus
//!
//! Every strategy is case-insensitive, keeps corpus order and stops scanning
//! as soon as the limit is reached. Lines after that point are never
//! examined, so `match_count` reports matches found, not matches possible.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::CANCEL_CHECK_INTERVAL;
use crate::sites::SiteSet;
use crate::store::Corpus;

/// Errors from running a search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search cancelled after scanning {scanned} lines")]
    Cancelled { scanned: usize },

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Which lines a search keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Lines containing the part of the target before its first `.`
    SiteName(String),
    /// Lines containing one of the listed domains on a token boundary
    CommonSites(Arc<SiteSet>),
    /// Lines containing the term
    FreeText(String),
}

impl Strategy {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::SiteName(_) => "site-name",
            Self::CommonSites(_) => "common-sites",
            Self::FreeText(_) => "free-text",
        }
    }
}

/// Result cap for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    AtMost(NonZeroUsize),
}

impl Limit {
    /// Cap at `n` matches; zero means unbounded
    pub fn at_most(n: usize) -> Self {
        NonZeroUsize::new(n).map(Self::AtMost).unwrap_or(Self::Unbounded)
    }

    pub fn get(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::AtMost(n) => Some(n.get()),
        }
    }

    fn is_reached(&self, found: usize) -> bool {
        matches!(self, Self::AtMost(n) if found >= n.get())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "all"),
            Self::AtMost(n) => write!(f, "{}", n),
        }
    }
}

/// A fully specified search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub strategy: Strategy,
    pub limit: Limit,
}

impl SearchRequest {
    pub fn new(strategy: Strategy, limit: Limit) -> Self {
        Self { strategy, limit }
    }
}

/// Matched lines in corpus order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<String>,
    /// True when the limit was hit while corpus lines remained unscanned
    pub truncated: bool,
    /// Lines examined before the scan stopped
    pub scanned: usize,
}

impl SearchResult {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Token used by the site-name filter: the target up to its first `.`
///
/// Returns `None` when nothing usable precedes the dot (`".com"`, `""`).
pub fn site_token(target: &str) -> Option<String> {
    let token = target.trim().split('.').next().unwrap_or("").trim().to_lowercase();
    if token.is_empty() { None } else { Some(token) }
}

enum LineMatcher<'a> {
    Nothing,
    Pattern(Regex),
    Sites(&'a SiteSet),
}

impl<'a> LineMatcher<'a> {
    fn build(strategy: &'a Strategy) -> Result<Self, SearchError> {
        match strategy {
            Strategy::SiteName(target) => match site_token(target) {
                Some(token) => {
                    info!(%token, "Filtering broadly for site token");
                    Ok(Self::Pattern(substring(&token)?))
                }
                None => {
                    warn!(%target, "Could not extract a site token from target");
                    Ok(Self::Nothing)
                }
            },
            Strategy::CommonSites(sites) => Ok(Self::Sites(sites)),
            Strategy::FreeText(term) => {
                let term = term.trim();
                if term.is_empty() {
                    warn!("Empty free-text term, nothing to match");
                    Ok(Self::Nothing)
                } else {
                    Ok(Self::Pattern(substring(term)?))
                }
            }
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Nothing => false,
            Self::Pattern(re) => re.is_match(line),
            Self::Sites(sites) => sites.is_match(line),
        }
    }
}

fn substring(needle: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(needle)).case_insensitive(true).build()
}

/// Run a search to completion
pub fn execute(corpus: &Corpus, request: &SearchRequest) -> Result<SearchResult, SearchError> {
    execute_with_cancel(corpus, request, &AtomicBool::new(false))
}

/// Run a search, giving up once `cancel` is raised
///
/// The flag is polled every [`CANCEL_CHECK_INTERVAL`] lines.
pub fn execute_with_cancel(
    corpus: &Corpus,
    request: &SearchRequest,
    cancel: &AtomicBool,
) -> Result<SearchResult, SearchError> {
    debug!(strategy = request.strategy.name(), limit = %request.limit, "execute: called");
    let matcher = LineMatcher::build(&request.strategy)?;
    if matches!(matcher, LineMatcher::Nothing) {
        return Ok(SearchResult::default());
    }

    let lines = corpus.lines();
    let mut result = SearchResult::default();

    for (idx, line) in lines.iter().enumerate() {
        if idx % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Err(SearchError::Cancelled { scanned: idx });
        }
        result.scanned = idx + 1;

        if matcher.is_match(line) {
            result.matches.push(line.clone());
            if request.limit.is_reached(result.matches.len()) {
                result.truncated = idx + 1 < lines.len();
                break;
            }
        }
    }

    debug!(
        strategy = request.strategy.name(),
        match_count = result.match_count(),
        scanned = result.scanned,
        truncated = result.truncated,
        "execute: finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    // The search enum, not proptest's trait
    use super::Strategy;

    fn sample() -> Corpus {
        Corpus::from_lines(["user:pass@instagram.com:x", "foo@bar.com", "admin@INSTAGRAM.COM:y"])
    }

    fn free(term: &str, limit: Limit) -> SearchRequest {
        SearchRequest::new(Strategy::FreeText(term.to_string()), limit)
    }

    #[test]
    fn test_site_token() {
        assert_eq!(site_token("instagram.com"), Some("instagram".to_string()));
        assert_eq!(site_token(" NetFlix "), Some("netflix".to_string()));
        assert_eq!(site_token(".com"), None);
        assert_eq!(site_token("   "), None);
    }

    #[test]
    fn test_site_name_is_case_insensitive_substring() {
        let request = SearchRequest::new(Strategy::SiteName("instagram".into()), Limit::Unbounded);
        let result = execute(&sample(), &request).unwrap();

        assert_eq!(result.matches, vec!["user:pass@instagram.com:x", "admin@INSTAGRAM.COM:y"]);
        assert!(!result.truncated);
    }

    #[test]
    fn test_site_name_uses_pre_dot_token() {
        let corpus = Corpus::from_lines(["a@instagram.net:1", "b@bar.com:2"]);
        let request = SearchRequest::new(Strategy::SiteName("instagram.com".into()), Limit::Unbounded);

        assert_eq!(execute(&corpus, &request).unwrap().matches, vec!["a@instagram.net:1"]);
    }

    #[test]
    fn test_site_name_without_token_matches_nothing() {
        let request = SearchRequest::new(Strategy::SiteName(".com".into()), Limit::Unbounded);
        let result = execute(&sample(), &request).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_common_sites_exact_boundaries() {
        let corpus = Corpus::from_lines([
            "xinstagram.com:pw",
            "user@instagram.com:pw",
            "user@bar.com:pw",
            "https://instagram.com secret",
        ]);
        let sites = Arc::new(SiteSet::new(["instagram.com"]).unwrap());
        let request = SearchRequest::new(Strategy::CommonSites(sites), Limit::Unbounded);

        let result = execute(&corpus, &request).unwrap();
        assert_eq!(result.matches, vec!["user@instagram.com:pw", "https://instagram.com secret"]);
    }

    #[test]
    fn test_free_text_limit_stops_early() {
        let result = execute(&sample(), &free("pass", Limit::at_most(1))).unwrap();
        assert_eq!(result.matches, vec!["user:pass@instagram.com:x"]);
        assert!(result.truncated);
        assert_eq!(result.scanned, 1);
    }

    #[test]
    fn test_limit_hit_on_last_line_is_not_truncated() {
        let corpus = Corpus::from_lines(["one", "two", "three"]);
        let result = execute(&corpus, &free("t", Limit::at_most(2))).unwrap();

        assert_eq!(result.matches, vec!["two", "three"]);
        assert!(!result.truncated);
    }

    #[test]
    fn test_empty_corpus_yields_empty_result() {
        let corpus = Corpus::from_lines(Vec::<String>::new());
        let result = execute(&corpus, &free("anything", Limit::Unbounded)).unwrap();

        assert_eq!(result.match_count(), 0);
        assert!(!result.truncated);
    }

    #[test]
    fn test_empty_term_matches_nothing() {
        assert!(execute(&sample(), &free("  ", Limit::Unbounded)).unwrap().is_empty());
    }

    #[test]
    fn test_term_with_metacharacters_is_literal() {
        let corpus = Corpus::from_lines(["a.b", "axb", "(x)"]);
        assert_eq!(execute(&corpus, &free("a.b", Limit::Unbounded)).unwrap().matches, vec!["a.b"]);
        assert_eq!(execute(&corpus, &free("(x", Limit::Unbounded)).unwrap().matches, vec!["(x)"]);
    }

    #[test]
    fn test_cancel_flag_aborts() {
        let cancel = AtomicBool::new(true);
        let err = execute_with_cancel(&sample(), &free("pass", Limit::Unbounded), &cancel).unwrap_err();
        assert!(matches!(err, SearchError::Cancelled { scanned: 0 }));
    }

    #[test]
    fn test_limit_display_and_at_most() {
        assert_eq!(Limit::at_most(0), Limit::Unbounded);
        assert_eq!(Limit::at_most(5).get(), Some(5));
        assert_eq!(Limit::Unbounded.to_string(), "all");
        assert_eq!(Limit::at_most(42).to_string(), "42");
    }

    proptest! {
        #[test]
        fn prop_capped_result_is_prefix_of_unbounded(
            lines in proptest::collection::vec("[a-c]{0,6}", 0..60),
            term in "[a-c]{1,2}",
            cap in 1usize..20,
        ) {
            let corpus = Corpus::from_lines(&lines);
            let all = execute(&corpus, &free(&term, Limit::Unbounded)).unwrap();
            let capped = execute(&corpus, &free(&term, Limit::at_most(cap))).unwrap();

            prop_assert!(capped.match_count() <= cap);
            prop_assert_eq!(&all.matches[..capped.match_count()], &capped.matches[..]);
            prop_assert!(!all.truncated);
        }

        #[test]
        fn prop_site_name_matches_contain_token_in_order(
            lines in proptest::collection::vec("[a-cA-C@.:]{0,10}", 0..60),
            target in "[a-c]{1,3}\\.[a-c]{1,3}",
        ) {
            let corpus = Corpus::from_lines(&lines);
            let token = site_token(&target).unwrap();
            let request = SearchRequest::new(Strategy::SiteName(target.clone()), Limit::Unbounded);
            let result = execute(&corpus, &request).unwrap();

            let expected: Vec<String> = corpus
                .lines()
                .iter()
                .filter(|l| l.to_lowercase().contains(&token))
                .cloned()
                .collect();
            prop_assert_eq!(result.matches, expected);
        }
    }
}
