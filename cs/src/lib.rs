//! CorpusStore - in-memory line corpus with capped filters
//!
//! Loads a flat, line-oriented text file once and answers case-insensitive
//! line filters against it. The corpus is immutable after load, so a single
//! `Arc<Corpus>` can be scanned by any number of readers without locking.
//!
//! # Strategies
//!
//! ```text
//! SiteName("netflix.com")   -> token "netflix" anywhere in the line
//! CommonSites(SiteSet)      -> a listed domain bounded by ^|@|:|/ and :|\s|$
//! FreeText("alice")         -> term anywhere in the line
//! ```
//!
//! # Example
//!
//! ```ignore
//! use corpusstore::{Corpus, Limit, SearchRequest, Strategy};
//!
//! let corpus = Corpus::load("data.txt");
//! let request = SearchRequest::new(Strategy::FreeText("alice".into()), Limit::at_most(100));
//! let result = corpusstore::execute(&corpus, &request)?;
//! println!("{} matches (truncated: {})", result.match_count(), result.truncated);
//! ```

pub mod cli;
pub mod config;
mod search;
mod sites;
mod store;

pub use search::{Limit, SearchError, SearchRequest, SearchResult, Strategy, execute, execute_with_cancel, site_token};
pub use sites::{SiteSet, SiteSetError};
pub use store::{Corpus, CorpusStats};

/// Number of lines scanned between cancellation checks
pub const CANCEL_CHECK_INTERVAL: usize = 4096;
