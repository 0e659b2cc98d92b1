//! Canopy - taxon and sponsorship search for tree-of-life browsing.
//!
//! Canopy matches free-text queries against scientific names, a
//! multi-language vernacular-name table, and sponsorship/dedication
//! records, behind a pluggable entity store. Queries are tokenized with
//! script awareness, matched in full-text or prefix mode depending on
//! what the store's text index can hold, and annotated with per-entity
//! resolved vernacular names.

pub mod config;
pub mod core;
pub mod error;
pub mod query;
pub mod search;
pub mod store;

pub use config::SearchConfig;
pub use core::{
    CombinedSearchResult, ImageRef, KeyedVernacular, LeafRef, NameSearchResult, NamedVernacular,
    OttId, Page, ReservationRow, ResolvedName, ResolvedNames, Restrict, SponsorFilter, SponsorHit,
    SponsorSearchResult, SponsorTier, TaxonClass, TaxonHit, TaxonRow,
};
pub use error::{CanopyError, FailOpen, Result};
pub use query::{plan_query, sponsor_terms, tokenize, MatchStrategy};
pub use search::{
    pick_best_vernaculars, resolve_names, BestVernacular, CancelToken, NameSearchRequest,
    SearchEngine, SponsorSearchRequest,
};
pub use store::{Dataset, EntityStore, MemoryEntityStore};
