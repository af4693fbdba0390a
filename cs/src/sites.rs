//! Exact-domain matching against a fixed site list

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::debug;

/// Errors building a [`SiteSet`]
#[derive(Debug, Error)]
pub enum SiteSetError {
    #[error("Site list is empty")]
    Empty,

    #[error("Invalid site pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A fixed list of domains compiled into one alternation
///
/// A domain only counts when it is preceded by start-of-line, `@`, `:` or `/`
/// and followed by end-of-line, `:` or whitespace, so `xinstagram.com` never
/// matches `instagram.com`.
#[derive(Debug, Clone)]
pub struct SiteSet {
    domains: Vec<String>,
    pattern: Regex,
}

impl SiteSet {
    /// Compile a site set. Domains are trimmed, lowercased and de-duplicated.
    pub fn new<I, S>(domains: I) -> Result<Self, SiteSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for domain in domains {
            let domain = domain.as_ref().trim().to_lowercase();
            if !domain.is_empty() && !unique.contains(&domain) {
                unique.push(domain);
            }
        }

        if unique.is_empty() {
            return Err(SiteSetError::Empty);
        }

        let alternation = unique.iter().map(|d| regex::escape(d)).collect::<Vec<_>>().join("|");
        let pattern = RegexBuilder::new(&format!(r"(?:^|[@:/])(?:{})(?:[:\s]|$)", alternation))
            .case_insensitive(true)
            .build()?;

        debug!(site_count = unique.len(), "SiteSet::new: compiled");
        Ok(Self {
            domains: unique,
            pattern,
        })
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// True when any listed domain appears in `line` on a token boundary
    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

impl PartialEq for SiteSet {
    fn eq(&self, other: &Self) -> bool {
        self.domains == other.domains
    }
}

impl Eq for SiteSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> SiteSet {
        SiteSet::new(["instagram.com", "apple.com", "idmsa.apple.com", "twitch.tv"]).unwrap()
    }

    #[test]
    fn test_boundary_prefixes() {
        let set = sites();
        assert!(set.is_match("instagram.com:user:pw"));
        assert!(set.is_match("user@instagram.com:pw"));
        assert!(set.is_match("https://instagram.com pw"));
        assert!(set.is_match("user:pw:instagram.com"));
    }

    #[test]
    fn test_rejects_embedded_domains() {
        let set = sites();
        assert!(!set.is_match("xinstagram.com:pw"));
        assert!(!set.is_match("user@notinstagram.com:pw"));
        assert!(!set.is_match("user@instagram.community:pw"));
        assert!(!set.is_match("user@instagram.com.evil:pw"));
    }

    #[test]
    fn test_subdomain_listed_separately() {
        let set = sites();
        assert!(set.is_match("user@idmsa.apple.com:pw"));
        assert!(!set.is_match("user@store.apple.com:pw"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(sites().is_match("ADMIN@INSTAGRAM.COM:y"));
        assert!(sites().is_match("viewer@Twitch.TV\tsecret"));
    }

    #[test]
    fn test_normalizes_and_dedupes() {
        let set = SiteSet::new([" Instagram.com ", "instagram.com", ""]).unwrap();
        assert_eq!(set.domains(), &["instagram.com"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_list_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(SiteSet::new(empty), Err(SiteSetError::Empty)));
        assert!(matches!(SiteSet::new(["  "]), Err(SiteSetError::Empty)));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let set = SiteSet::new(["a.b"]).unwrap();
        assert!(set.is_match("u@a.b:pw"));
        assert!(!set.is_match("u@axb:pw"));
    }
}
