//! Core types and language handling for canopy.
//!
//! This module contains the typed rows and result shapes shared between
//! the query planner, the search engines, and the store boundary.

pub mod language;
pub mod types;

pub use language::{is_logographic, primary_subtag};
pub use types::{
    CombinedSearchResult, ImageRef, KeyedVernacular, LeafRef, NameSearchResult, NamedVernacular,
    OttId, Page, ReservationRow, ResolvedName, ResolvedNames, Restrict, SponsorFilter, SponsorHit,
    SponsorSearchResult, SponsorTier, TaxonClass, TaxonHit, TaxonRow, PENDING_INFO_TEXT,
    PENDING_NAME_TEXT,
};
