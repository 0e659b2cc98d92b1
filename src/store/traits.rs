//! The entity/vernacular/sponsorship store boundary.
//!
//! The search core is a pure function of `(query, language, pagination)`
//! with the store as an injected dependency. Implementations translate
//! these typed read operations into whatever the backing engine speaks;
//! none of the engine's own types cross this boundary in either direction.
//!
//! Implementations own timeouts and retries: the core treats every call
//! as fallible and fails open per sub-search (see
//! [`crate::config::SearchConfig::store_timeout_ms`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{
    ImageRef, KeyedVernacular, LeafRef, NamedVernacular, OttId, ReservationRow, SponsorFilter,
    SponsorTier, TaxonClass, TaxonRow,
};
use crate::error::Result;
use crate::query::MatchStrategy;

/// Read operations the search core issues against the external store.
///
/// All operations are snapshot reads: two calls within one search may see
/// different data if the store is concurrently mutated, which is
/// acceptable. Implementations must be thread-safe.
pub trait EntityStore: Send + Sync {
    /// Taxa whose scientific name satisfies the match strategy.
    fn taxa_matching_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
    ) -> Result<Vec<TaxonRow>>;

    /// Taxa whose cross-reference key appears in the vernacular-by-key
    /// table under a matching vernacular string in the given language.
    fn taxa_matching_vernacular_by_key(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>>;

    /// Taxa whose scientific name appears in the vernacular-by-name table
    /// under a matching vernacular string in the given language.
    fn taxa_matching_vernacular_by_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>>;

    /// All vernacular rows for the given keys in the given language, each
    /// annotated with whether it matches the query strategy.
    fn vernaculars_by_key(
        &self,
        keys: &[OttId],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<KeyedVernacular>>;

    /// All vernacular rows for the given scientific names, annotated the
    /// same way.
    fn vernaculars_by_name(
        &self,
        names: &[String],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<NamedVernacular>>;

    /// Reservations in one sponsorship tier matching the text/kind filter,
    /// ordered by the tier's recency column when the filter asks for it.
    fn sponsorships(&self, tier: SponsorTier, filter: &SponsorFilter)
        -> Result<Vec<ReservationRow>>;

    /// Leaf references for the given keys.
    fn leaves_by_key(&self, keys: &[OttId]) -> Result<Vec<LeafRef>>;

    /// Best preferred common name per key in the given language. Keys
    /// with no preferred vernacular are absent from the map.
    fn preferred_common_names(
        &self,
        keys: &[OttId],
        lang_primary: &str,
    ) -> Result<BTreeMap<OttId, String>>;

    /// Best image reference per key. Keys with no usable image are absent.
    fn best_images(&self, keys: &[OttId]) -> Result<BTreeMap<OttId, ImageRef>>;
}

/// Blanket implementation of EntityStore for Arc-wrapped stores.
///
/// This allows sharing one store between an engine and tests, or between
/// concurrent searches, without re-implementing the trait.
impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    fn taxa_matching_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
    ) -> Result<Vec<TaxonRow>> {
        (**self).taxa_matching_name(class, strategy)
    }

    fn taxa_matching_vernacular_by_key(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>> {
        (**self).taxa_matching_vernacular_by_key(class, strategy, lang_primary)
    }

    fn taxa_matching_vernacular_by_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>> {
        (**self).taxa_matching_vernacular_by_name(class, strategy, lang_primary)
    }

    fn vernaculars_by_key(
        &self,
        keys: &[OttId],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<KeyedVernacular>> {
        (**self).vernaculars_by_key(keys, strategy, lang_primary)
    }

    fn vernaculars_by_name(
        &self,
        names: &[String],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<NamedVernacular>> {
        (**self).vernaculars_by_name(names, strategy, lang_primary)
    }

    fn sponsorships(
        &self,
        tier: SponsorTier,
        filter: &SponsorFilter,
    ) -> Result<Vec<ReservationRow>> {
        (**self).sponsorships(tier, filter)
    }

    fn leaves_by_key(&self, keys: &[OttId]) -> Result<Vec<LeafRef>> {
        (**self).leaves_by_key(keys)
    }

    fn preferred_common_names(
        &self,
        keys: &[OttId],
        lang_primary: &str,
    ) -> Result<BTreeMap<OttId, String>> {
        (**self).preferred_common_names(keys, lang_primary)
    }

    fn best_images(&self, keys: &[OttId]) -> Result<BTreeMap<OttId, ImageRef>> {
        (**self).best_images(keys)
    }
}
