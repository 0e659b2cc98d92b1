//! Combined taxon and sponsorship search.
//!
//! Taxon search always runs first. Sponsorship search runs only when the
//! taxon results are sparse, keeping broad taxonomic queries free of
//! sponsorship noise while narrow queries still surface dedications.

use crate::core::{CombinedSearchResult, SponsorSearchResult};
use crate::error::{FailOpen, Result};
use crate::search::{CancelToken, NameSearchRequest, SearchEngine, SponsorSearchRequest};
use crate::store::EntityStore;

impl<S: EntityStore> SearchEngine<S> {
    /// Search taxon names, then sponsorship text when taxon hits number
    /// fewer than the configured gate.
    ///
    /// A degraded sponsorship search never fails the whole call once the
    /// taxon search succeeded; it collapses to the empty shape.
    pub fn search(
        &self,
        query: &str,
        language: &str,
        cancel: &CancelToken,
    ) -> Result<CombinedSearchResult> {
        let taxa = self.search_names(&NameSearchRequest::new(query, language), cancel)?;

        let sponsors = if taxa.hit_count() < self.config().sponsor_gate && !cancel.is_cancelled() {
            self.search_sponsors(&SponsorSearchRequest::new(query, language), cancel)
                .fail_open_with("sponsorship search", SponsorSearchResult::empty(language))
        } else {
            SponsorSearchResult::empty(language)
        };

        Ok(CombinedSearchResult { taxa, sponsors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::core::{OttId, ReservationRow, TaxonRow};
    use crate::store::{Dataset, MemoryEntityStore, OttVernacularEntry};
    use chrono::{Duration, TimeZone, Utc};

    /// A dataset where `leafcount` leaves match "tern" and one verified
    /// sponsorship mentions it too.
    fn dataset(leafcount: i64) -> Dataset {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        Dataset {
            leaves: (1..=leafcount)
                .map(|i| TaxonRow {
                    id: i,
                    ott: Some(1000 + i as OttId),
                    name: Some(format!("Sterna species{i}")),
                    popularity: Some(100.0),
                    price: None,
                })
                .collect(),
            vernaculars_by_ott: (1..=leafcount)
                .map(|i| OttVernacularEntry {
                    ott: 1000 + i as OttId,
                    vernacular: format!("Tern {i}"),
                    lang_primary: "en".to_string(),
                    preferred: true,
                    src: 1,
                })
                .collect(),
            reservations: vec![ReservationRow {
                ott: 1001,
                verified_name: Some("For the tern watchers".to_string()),
                verified_time: Some(now - Duration::days(5)),
                sponsorship_duration_days: Some(365),
                ..ReservationRow::default()
            }],
            ..Dataset::default()
        }
    }

    fn engine(leafcount: i64) -> SearchEngine<MemoryEntityStore> {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        SearchEngine::new(MemoryEntityStore::new(dataset(leafcount)).with_now(now))
    }

    #[test]
    fn test_sponsors_run_below_the_gate() {
        // 14 combined hits: one short of the gate, sponsors run.
        let result = engine(14)
            .search("tern", "en", &CancelToken::new())
            .unwrap();
        assert_eq!(result.taxa.hit_count(), 14);
        assert_eq!(result.sponsors.reservations.len(), 1);
    }

    #[test]
    fn test_sponsors_gated_at_threshold() {
        // 15 combined hits: at the gate, sponsors return the empty shape.
        let result = engine(15)
            .search("tern", "en", &CancelToken::new())
            .unwrap();
        assert_eq!(result.taxa.hit_count(), 15);
        assert!(result.sponsors.reservations.is_empty());
        assert!(result.sponsors.common_names.is_empty());
    }

    #[test]
    fn test_gate_threshold_is_configurable() {
        let config = SearchConfig {
            sponsor_gate: 20,
            ..SearchConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let engine =
            SearchEngine::with_config(MemoryEntityStore::new(dataset(15)).with_now(now), config);
        let result = engine.search("tern", "en", &CancelToken::new()).unwrap();
        assert_eq!(result.sponsors.reservations.len(), 1);
    }

    #[test]
    fn test_rejected_query_yields_both_empty_shapes() {
        let result = engine(3).search("a b", "en", &CancelToken::new()).unwrap();
        assert_eq!(result.taxa.hit_count(), 0);
        // Zero taxon hits is below the gate, but the same guard rejects
        // the sponsorship query too.
        assert!(result.sponsors.reservations.is_empty());
    }

    #[test]
    fn test_identical_searches_are_idempotent() {
        let engine = engine(5);
        let first = engine.search("tern", "en", &CancelToken::new()).unwrap();
        let second = engine.search("tern", "en", &CancelToken::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cancelled_search_skips_sponsor_stage() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = engine(3).search("tern", "en", &cancel).unwrap();
        assert_eq!(result.taxa.hit_count(), 0);
        assert!(result.sponsors.reservations.is_empty());
    }
}
