//! Core row and result types for taxon and sponsorship search.
//!
//! Rows are explicit structs per collection. The store-adapter boundary is
//! the only place a positional projection may exist; inside resolution
//! logic every field is named.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stable cross-reference key joining a taxon across name tables.
pub type OttId = i64;

/// The two entity collections a name search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxonClass {
    /// A terminal taxon (species-level entity).
    Leaf,
    /// An internal, non-terminal classification group.
    Node,
}

/// Which collections a name search is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Restrict {
    Leaves,
    Nodes,
    #[default]
    Both,
}

impl Restrict {
    /// Parse a raw restriction parameter. Anything unrecognized degrades
    /// to searching both collections.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("leaves") => Self::Leaves,
            Some("nodes") => Self::Nodes,
            _ => Self::Both,
        }
    }

    /// The collections this restriction includes, leaves first.
    pub fn classes(self) -> &'static [TaxonClass] {
        match self {
            Self::Leaves => &[TaxonClass::Leaf],
            Self::Nodes => &[TaxonClass::Node],
            Self::Both => &[TaxonClass::Leaf, TaxonClass::Node],
        }
    }
}

/// A taxon row as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRow {
    /// Identifier, unique within its collection.
    pub id: i64,
    /// Cross-reference key; absent for unnamed or unmapped taxa.
    #[serde(default)]
    pub ott: Option<OttId>,
    /// Scientific name.
    #[serde(default)]
    pub name: Option<String>,
    /// Non-negative popularity score, absent when never computed.
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Sponsorship price; leaves only.
    #[serde(default)]
    pub price: Option<f64>,
}

/// A taxon search hit with its resolved vernacular names attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonHit {
    pub id: i64,
    pub ott: Option<OttId>,
    pub name: Option<String>,
    pub popularity: Option<f64>,
    pub price: Option<f64>,
    /// Canonical display name in the requested language, when one exists.
    pub vernacular: Option<String>,
    /// Non-preferred vernaculars that actually satisfied the query.
    pub extra_vernaculars: Vec<String>,
}

impl TaxonHit {
    /// Build a hit from a store row, before vernacular attachment.
    pub fn from_row(row: TaxonRow) -> Self {
        Self {
            id: row.id,
            ott: row.ott,
            name: row.name,
            popularity: row.popularity,
            price: row.price,
            vernacular: None,
            extra_vernaculars: Vec::new(),
        }
    }
}

/// A vernacular name resolved for one entity and one query.
///
/// `display` is the canonical (preferred) vernacular when one exists;
/// `alternates` are the non-preferred texts that satisfied the query,
/// surfaced so a caller can show "matched on: ...".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedName {
    pub display: Option<String>,
    pub alternates: Vec<String>,
}

/// Resolved names for a batch of entities, keyed both ways.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNames {
    /// Entities reached via a cross-reference key.
    pub by_key: BTreeMap<OttId, ResolvedName>,
    /// Entities reached via a bare scientific name.
    pub by_name: BTreeMap<String, ResolvedName>,
}

/// A vernacular row keyed by cross-reference key, annotated with whether
/// it matches the current query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedVernacular {
    pub ott: OttId,
    pub text: String,
    pub preferred: bool,
    /// Source-priority rank; lower is better. Tie-break among
    /// non-preferred entries.
    pub src: i32,
    pub matched: bool,
}

/// A vernacular row keyed by scientific name, annotated with whether it
/// matches the current query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedVernacular {
    pub name: String,
    pub text: String,
    pub preferred: bool,
    pub src: i32,
    pub matched: bool,
}

/// The two validity tiers of a sponsorship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SponsorTier {
    /// Moderated records still inside their validity window.
    Verified,
    /// Records awaiting verification; their text is not yet public.
    Pending,
}

impl SponsorTier {
    /// Check whether a reservation belongs to this tier at `now`.
    ///
    /// Verified records need a verification timestamp and an unexpired
    /// validity window; pending records need no verification timestamp
    /// but a non-empty pending-kind marker. Deactivated records belong
    /// to neither tier.
    pub fn admits(self, row: &ReservationRow, now: DateTime<Utc>) -> bool {
        if row.deactivated.as_deref().is_some_and(|d| !d.is_empty()) {
            return false;
        }
        match self {
            Self::Verified => match (row.verified_time, row.sponsorship_duration_days) {
                (Some(verified), Some(days)) => verified + Duration::days(days) > now,
                _ => false,
            },
            Self::Pending => {
                row.verified_time.is_none()
                    && row.user_sponsor_kind.as_deref().is_some_and(|k| !k.is_empty())
            }
        }
    }
}

/// A sponsorship/dedication record as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationRow {
    /// Cross-reference key of the sponsored leaf.
    pub ott: OttId,
    /// Scientific name of the sponsored leaf.
    pub name: Option<String>,
    pub verified_name: Option<String>,
    pub verified_more_info: Option<String>,
    pub verified_kind: Option<String>,
    pub verified_url: Option<String>,
    pub verified_image_src: Option<i32>,
    pub verified_image_src_id: Option<i64>,
    pub user_sponsor_name: Option<String>,
    pub user_more_info: Option<String>,
    pub user_sponsor_kind: Option<String>,
    pub verified_time: Option<DateTime<Utc>>,
    pub sponsorship_duration_days: Option<i64>,
    /// Non-empty when the sponsorship has been taken down.
    pub deactivated: Option<String>,
    pub user_updated_time: Option<DateTime<Utc>>,
}

/// Text and kind predicate for a sponsorship lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorFilter {
    /// Every term must substring-match one of the tier's text fields.
    pub terms: Vec<String>,
    /// Restrict to one sponsorship kind; `None` matches all kinds.
    pub kind: Option<String>,
    /// Order each tier by its recency column.
    pub order_by_recent: bool,
}

impl SponsorFilter {
    /// Check a reservation against the terms and kind filter, reading the
    /// tier's own text fields (verified text for the verified tier,
    /// pending text for the pending tier).
    pub fn matches(&self, row: &ReservationRow, tier: SponsorTier) -> bool {
        let (name, info, kind) = match tier {
            SponsorTier::Verified => (
                row.verified_name.as_deref(),
                row.verified_more_info.as_deref(),
                row.verified_kind.as_deref(),
            ),
            SponsorTier::Pending => (
                row.user_sponsor_name.as_deref(),
                row.user_more_info.as_deref(),
                row.user_sponsor_kind.as_deref(),
            ),
        };
        if let Some(want) = self.kind.as_deref() {
            if kind != Some(want) {
                return false;
            }
        }
        self.terms.iter().all(|term| {
            let term = term.to_lowercase();
            contains_ci(name, &term) || contains_ci(info, &term)
        })
    }
}

fn contains_ci(field: Option<&str>, lowered_term: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(lowered_term))
}

/// Placeholder display name returned for pending sponsorships.
pub const PENDING_NAME_TEXT: &str = "This leaf has been sponsored";
/// Placeholder description returned for pending sponsorships.
pub const PENDING_INFO_TEXT: &str = "text awaiting confirmation";

/// The public projection of a sponsorship record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorHit {
    pub ott: OttId,
    pub name: Option<String>,
    pub verified_name: Option<String>,
    pub verified_more_info: Option<String>,
    pub verified_kind: Option<String>,
    pub verified_url: Option<String>,
    pub verified_image_src: Option<i32>,
    pub verified_image_src_id: Option<i64>,
}

impl SponsorHit {
    /// Project a verified reservation; its public text passes through.
    pub fn verified(row: &ReservationRow) -> Self {
        Self {
            ott: row.ott,
            name: row.name.clone(),
            verified_name: row.verified_name.clone(),
            verified_more_info: row.verified_more_info.clone(),
            verified_kind: row.verified_kind.clone(),
            verified_url: row.verified_url.clone(),
            verified_image_src: row.verified_image_src,
            verified_image_src_id: row.verified_image_src_id,
        }
    }

    /// Project a pending reservation. Pending text is not yet public, so
    /// fixed placeholder strings stand in for the real fields.
    pub fn pending(row: &ReservationRow) -> Self {
        Self {
            ott: row.ott,
            name: row.name.clone(),
            verified_name: Some(PENDING_NAME_TEXT.to_string()),
            verified_more_info: Some(PENDING_INFO_TEXT.to_string()),
            verified_kind: Some(String::new()),
            verified_url: None,
            verified_image_src: None,
            verified_image_src_id: None,
        }
    }
}

/// A leaf reference attached to sponsorship results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafRef {
    pub id: i64,
    pub ott: OttId,
}

/// A best-image reference for a taxon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: i32,
    pub src_id: i64,
}

/// Pagination for a search, applied after sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum rows to return; `None` means unlimited within the hard cap.
    pub limit: Option<usize>,
    /// Rows to skip before the first returned row.
    pub offset: usize,
}

impl Page {
    pub fn new(limit: Option<usize>, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Parse raw pagination parameters. Malformed values degrade to the
    /// defaults (no limit, offset 0) rather than failing the search.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: limit.and_then(|v| v.trim().parse().ok()),
            offset: offset.and_then(|v| v.trim().parse().ok()).unwrap_or(0),
        }
    }

    /// Apply offset and limit to a sorted result, never exceeding
    /// `hard_cap` rows.
    pub fn apply<T>(&self, items: Vec<T>, hard_cap: usize) -> Vec<T> {
        let take = self.limit.unwrap_or(hard_cap).min(hard_cap);
        items.into_iter().skip(self.offset).take(take).collect()
    }
}

/// Result of an entity (taxon) name search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameSearchResult {
    pub leaf_hits: Vec<TaxonHit>,
    pub node_hits: Vec<TaxonHit>,
    /// The full language string the search ran under.
    pub lang: String,
}

impl NameSearchResult {
    /// The empty shape returned for rejected or failed name searches.
    pub fn empty(lang: &str) -> Self {
        Self {
            leaf_hits: Vec::new(),
            node_hits: Vec::new(),
            lang: lang.to_string(),
        }
    }

    /// Combined hit count across both collections.
    pub fn hit_count(&self) -> usize {
        self.leaf_hits.len() + self.node_hits.len()
    }
}

/// Result of a sponsorship-text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SponsorSearchResult {
    /// Matching sponsorships, verified tier first.
    pub reservations: Vec<SponsorHit>,
    /// Leaf references for the matched taxa.
    pub leaves: Vec<LeafRef>,
    /// Best preferred common name per matched taxon.
    pub common_names: BTreeMap<OttId, String>,
    /// Best image per matched taxon, when requested.
    pub default_images: Option<BTreeMap<OttId, ImageRef>>,
    pub lang: String,
}

impl SponsorSearchResult {
    /// The empty shape returned for rejected, gated, or failed searches.
    pub fn empty(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            ..Self::default()
        }
    }
}

/// Result of an orchestrated search: taxa plus (possibly gated) sponsors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedSearchResult {
    pub taxa: NameSearchResult,
    pub sponsors: SponsorSearchResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn verified_row(verified_days_ago: i64, duration_days: i64) -> ReservationRow {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        ReservationRow {
            ott: 770315,
            name: Some("Homo sapiens".to_string()),
            verified_name: Some("For Ada".to_string()),
            verified_more_info: Some("from her friends".to_string()),
            verified_kind: Some("by".to_string()),
            verified_time: Some(now - Duration::days(verified_days_ago)),
            sponsorship_duration_days: Some(duration_days),
            ..ReservationRow::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_restrict_from_param() {
        assert_eq!(Restrict::from_param(Some("leaves")), Restrict::Leaves);
        assert_eq!(Restrict::from_param(Some("nodes")), Restrict::Nodes);
        assert_eq!(Restrict::from_param(Some("bogus")), Restrict::Both);
        assert_eq!(Restrict::from_param(None), Restrict::Both);
    }

    #[test]
    fn test_restrict_classes() {
        assert_eq!(Restrict::Leaves.classes(), &[TaxonClass::Leaf]);
        assert_eq!(
            Restrict::Both.classes(),
            &[TaxonClass::Leaf, TaxonClass::Node]
        );
    }

    #[test]
    fn test_page_from_params_valid() {
        let page = Page::from_params(Some("20"), Some("40"));
        assert_eq!(page.limit, Some(20));
        assert_eq!(page.offset, 40);
    }

    #[test]
    fn test_page_from_params_malformed_degrades_to_defaults() {
        let page = Page::from_params(Some("twenty"), Some("-3"));
        assert_eq!(page.limit, None);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_page_apply_offset_and_limit() {
        let page = Page::new(Some(2), 1);
        assert_eq!(page.apply(vec![1, 2, 3, 4], 100), vec![2, 3]);
    }

    #[test]
    fn test_page_apply_hard_cap() {
        let page = Page::new(None, 0);
        let items: Vec<i32> = (0..50).collect();
        assert_eq!(page.apply(items, 10).len(), 10);

        // An explicit limit above the cap is still capped.
        let page = Page::new(Some(50), 0);
        let items: Vec<i32> = (0..50).collect();
        assert_eq!(page.apply(items, 10).len(), 10);
    }

    #[test]
    fn test_verified_tier_admits_inside_window() {
        let row = verified_row(10, 365);
        assert!(SponsorTier::Verified.admits(&row, now()));
        assert!(!SponsorTier::Pending.admits(&row, now()));
    }

    #[test]
    fn test_verified_tier_excludes_expired_window() {
        // Verified 400 days ago with a 365-day window: expired.
        let row = verified_row(400, 365);
        assert!(!SponsorTier::Verified.admits(&row, now()));
    }

    #[test]
    fn test_verified_tier_requires_duration() {
        let mut row = verified_row(10, 365);
        row.sponsorship_duration_days = None;
        assert!(!SponsorTier::Verified.admits(&row, now()));
    }

    #[test]
    fn test_deactivated_excluded_from_both_tiers() {
        let mut row = verified_row(10, 365);
        row.deactivated = Some("expired sponsorship".to_string());
        assert!(!SponsorTier::Verified.admits(&row, now()));

        let pending = ReservationRow {
            ott: 1,
            user_sponsor_kind: Some("for".to_string()),
            deactivated: Some("removed".to_string()),
            ..ReservationRow::default()
        };
        assert!(!SponsorTier::Pending.admits(&pending, now()));
    }

    #[test]
    fn test_empty_deactivated_marker_is_active() {
        let mut row = verified_row(10, 365);
        row.deactivated = Some(String::new());
        assert!(SponsorTier::Verified.admits(&row, now()));
    }

    #[test]
    fn test_pending_tier_requires_kind_marker() {
        let bare = ReservationRow {
            ott: 1,
            user_sponsor_name: Some("someone".to_string()),
            ..ReservationRow::default()
        };
        assert!(!SponsorTier::Pending.admits(&bare, now()));

        let marked = ReservationRow {
            user_sponsor_kind: Some("for".to_string()),
            ..bare
        };
        assert!(SponsorTier::Pending.admits(&marked, now()));
    }

    #[test]
    fn test_sponsor_filter_terms_match_either_text_field() {
        let row = verified_row(10, 365);
        let filter = SponsorFilter {
            terms: vec!["ada".to_string(), "friends".to_string()],
            ..SponsorFilter::default()
        };
        assert!(filter.matches(&row, SponsorTier::Verified));

        let filter = SponsorFilter {
            terms: vec!["ada".to_string(), "enemies".to_string()],
            ..SponsorFilter::default()
        };
        assert!(!filter.matches(&row, SponsorTier::Verified));
    }

    #[test]
    fn test_sponsor_filter_kind() {
        let row = verified_row(10, 365);
        let mut filter = SponsorFilter {
            terms: vec!["ada".to_string()],
            kind: Some("by".to_string()),
            ..SponsorFilter::default()
        };
        assert!(filter.matches(&row, SponsorTier::Verified));

        filter.kind = Some("for".to_string());
        assert!(!filter.matches(&row, SponsorTier::Verified));
    }

    #[test]
    fn test_sponsor_filter_pending_reads_pending_fields() {
        let row = ReservationRow {
            ott: 2,
            user_sponsor_name: Some("Grandma Rose".to_string()),
            user_sponsor_kind: Some("for".to_string()),
            ..ReservationRow::default()
        };
        let filter = SponsorFilter {
            terms: vec!["rose".to_string()],
            ..SponsorFilter::default()
        };
        assert!(filter.matches(&row, SponsorTier::Pending));
        // The verified fields are empty, so the verified view can't match.
        assert!(!filter.matches(&row, SponsorTier::Verified));
    }

    #[test]
    fn test_pending_hit_substitutes_placeholders() {
        let row = ReservationRow {
            ott: 3,
            name: Some("Ailuropoda melanoleuca".to_string()),
            user_sponsor_name: Some("secret name".to_string()),
            user_more_info: Some("secret info".to_string()),
            user_sponsor_kind: Some("for".to_string()),
            ..ReservationRow::default()
        };
        let hit = SponsorHit::pending(&row);
        assert_eq!(hit.verified_name.as_deref(), Some(PENDING_NAME_TEXT));
        assert_eq!(hit.verified_more_info.as_deref(), Some(PENDING_INFO_TEXT));
        assert_eq!(hit.verified_kind.as_deref(), Some(""));
        assert!(hit.verified_url.is_none());
        assert!(hit.verified_image_src.is_none());
        // The real pending text never leaks.
        let json = serde_json::to_string(&hit).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_verified_hit_passes_text_through() {
        let row = verified_row(10, 365);
        let hit = SponsorHit::verified(&row);
        assert_eq!(hit.verified_name.as_deref(), Some("For Ada"));
        assert_eq!(hit.verified_kind.as_deref(), Some("by"));
    }

    #[test]
    fn test_result_empty_shapes() {
        let names = NameSearchResult::empty("en-GB");
        assert_eq!(names.hit_count(), 0);
        assert_eq!(names.lang, "en-GB");

        let sponsors = SponsorSearchResult::empty("en");
        assert!(sponsors.reservations.is_empty());
        assert!(sponsors.default_images.is_none());
    }
}
