//! The search engines and their orchestration.
//!
//! [`SearchEngine`] bundles a store with a [`SearchConfig`] and exposes
//! the public search operations:
//!
//! - `search_names`: taxon search over scientific and vernacular names
//! - `search_sponsors`: sponsorship/dedication text search
//! - `search`: both, with sponsorship gated behind sparse taxon results
//!
//! Every search is a stateless read: engines hold no per-request state
//! and may be shared across threads. A caller that abandons a search can
//! signal this through a [`CancelToken`]; the engine stops issuing
//! dependent lookups once cancellation is observed and returns the empty
//! shape.

pub mod names;
pub mod orchestrator;
pub mod resolver;
pub mod sponsors;

pub use resolver::{pick_best_vernaculars, resolve_names, BestVernacular};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::core::{Page, Restrict};

/// Cooperative cancellation flag for an in-flight search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the search as abandoned.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parameters of a taxon name search.
#[derive(Debug, Clone, PartialEq)]
pub struct NameSearchRequest {
    pub query: String,
    /// Full language string (Accept-Language form accepted).
    pub language: String,
    /// Order hits by popularity score, descending.
    pub order_by_popularity: bool,
    /// Surface leaf prices in the hits.
    pub include_price: bool,
    pub restrict: Restrict,
    pub page: Page,
}

impl NameSearchRequest {
    pub fn new(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            order_by_popularity: false,
            include_price: false,
            restrict: Restrict::Both,
            page: Page::default(),
        }
    }

    pub fn order_by_popularity(mut self, order: bool) -> Self {
        self.order_by_popularity = order;
        self
    }

    pub fn include_price(mut self, include: bool) -> Self {
        self.include_price = include;
        self
    }

    pub fn restrict(mut self, restrict: Restrict) -> Self {
        self.restrict = restrict;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

/// Parameters of a sponsorship-text search.
#[derive(Debug, Clone, PartialEq)]
pub struct SponsorSearchRequest {
    pub query: String,
    /// Restrict to one sponsorship kind; `None` searches all kinds.
    pub kind: Option<String>,
    pub language: String,
    /// Order each tier by its recency column.
    pub order_by_recent: bool,
    /// Attach a best-image reference per matched taxon.
    pub default_images: bool,
    pub page: Page,
}

impl SponsorSearchRequest {
    pub fn new(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kind: None,
            language: language.into(),
            order_by_recent: false,
            default_images: false,
            page: Page::default(),
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn order_by_recent(mut self, order: bool) -> Self {
        self.order_by_recent = order;
        self
    }

    pub fn default_images(mut self, include: bool) -> Self {
        self.default_images = include;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

/// The search core: a store plus its tunables.
#[derive(Debug)]
pub struct SearchEngine<S> {
    store: S,
    config: SearchConfig,
}

impl<S> SearchEngine<S> {
    /// Create an engine with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SearchConfig::default())
    }

    pub fn with_config(store: S, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_name_request_builder() {
        let req = NameSearchRequest::new("panda", "en")
            .order_by_popularity(true)
            .include_price(true)
            .restrict(Restrict::Leaves)
            .page(Page::new(Some(10), 5));
        assert_eq!(req.query, "panda");
        assert!(req.order_by_popularity);
        assert!(req.include_price);
        assert_eq!(req.restrict, Restrict::Leaves);
        assert_eq!(req.page.limit, Some(10));
    }

    #[test]
    fn test_sponsor_request_builder() {
        let req = SponsorSearchRequest::new("ada", "en")
            .kind("by")
            .order_by_recent(true)
            .default_images(true);
        assert_eq!(req.kind.as_deref(), Some("by"));
        assert!(req.order_by_recent);
        assert!(req.default_images);
    }
}
