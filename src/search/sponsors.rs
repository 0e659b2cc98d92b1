//! Sponsorship/dedication text search.
//!
//! Two tiers are searched and concatenated, verified first. Verified
//! records match on their public text and must still be inside their
//! validity window; pending records match on their submitted text but
//! return fixed placeholder strings instead of it, since pending text is
//! not yet public. Display names for the sponsored taxa come from the
//! plain preferred-common-name lookup, not the match-aware resolver.

use std::collections::BTreeSet;

use crate::core::{
    primary_subtag, OttId, SponsorFilter, SponsorHit, SponsorSearchResult, SponsorTier,
};
use crate::error::{CanopyError, FailOpen, Result};
use crate::query::sponsor_terms;
use crate::search::{CancelToken, SearchEngine, SponsorSearchRequest};
use crate::store::EntityStore;

impl<S: EntityStore> SearchEngine<S> {
    /// Search sponsorship records in both validity tiers.
    ///
    /// Queries with no tokens, or nothing but single-character tokens,
    /// return the empty shape. Pagination applies to the concatenated
    /// verified-then-pending list.
    pub fn search_sponsors(
        &self,
        req: &SponsorSearchRequest,
        cancel: &CancelToken,
    ) -> Result<SponsorSearchResult> {
        let terms = sponsor_terms(&req.query);
        if terms.is_empty() || terms.iter().all(|t| t.chars().count() == 1) {
            return Ok(SponsorSearchResult::empty(&req.language));
        }
        let lang_primary = primary_subtag(&req.language);
        let filter = SponsorFilter {
            terms,
            kind: req.kind.clone(),
            order_by_recent: req.order_by_recent,
        };

        let mut failed = 0usize;
        let mut tier_rows = |tier: SponsorTier| match self.store().sponsorships(tier, &filter) {
            Ok(rows) => rows,
            Err(err) => {
                failed += 1;
                tracing::warn!("sponsorship lookup failed for {:?}: {}", tier, err);
                Vec::new()
            }
        };
        let verified = tier_rows(SponsorTier::Verified);
        let pending = tier_rows(SponsorTier::Pending);
        if failed == 2 {
            return Err(CanopyError::store_unavailable(
                "both sponsorship tier lookups failed",
            ));
        }

        let hits: Vec<SponsorHit> = verified
            .iter()
            .map(SponsorHit::verified)
            .chain(pending.iter().map(SponsorHit::pending))
            .collect();
        let hits = req.page.apply(hits, self.config().hard_result_cap);

        if cancel.is_cancelled() {
            return Ok(SponsorSearchResult::empty(&req.language));
        }

        let keys: Vec<OttId> = hits
            .iter()
            .map(|h| h.ott)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let leaves = self
            .store()
            .leaves_by_key(&keys)
            .fail_open_default("sponsor leaf lookup");
        let common_names = self
            .store()
            .preferred_common_names(&keys, &lang_primary)
            .fail_open_default("sponsor common-name lookup");
        let default_images = req.default_images.then(|| {
            self.store()
                .best_images(&keys)
                .fail_open_default("sponsor image lookup")
        });

        Ok(SponsorSearchResult {
            reservations: hits,
            leaves,
            common_names,
            default_images,
            lang: req.language.clone(),
        })
    }
}
