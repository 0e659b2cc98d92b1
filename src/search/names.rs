//! Entity (taxon) name search.
//!
//! Each requested collection is searched along three candidate paths
//! (the taxon's own scientific name, vernacular names joined by
//! cross-reference key, and vernacular names joined by scientific name)
//! and the union is sorted, paginated, and annotated with resolved
//! vernacular names.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::core::{
    primary_subtag, NameSearchResult, OttId, ResolvedNames, TaxonClass, TaxonHit, TaxonRow,
};
use crate::error::{CanopyError, FailOpen, Result};
use crate::query::plan_query;
use crate::search::{resolve_names, CancelToken, NameSearchRequest, SearchEngine};
use crate::store::EntityStore;

impl<S: EntityStore> SearchEngine<S> {
    /// Search scientific and vernacular names for taxa.
    ///
    /// A rejected query (no tokens, or nothing but single non-logographic
    /// characters) returns the empty shape, not an error. Individual
    /// failed lookups degrade that path only; a search where every lookup
    /// failed returns [`CanopyError::StoreUnavailable`].
    pub fn search_names(
        &self,
        req: &NameSearchRequest,
        cancel: &CancelToken,
    ) -> Result<NameSearchResult> {
        let lang_primary = primary_subtag(&req.language);
        let Some(strategy) = plan_query(
            &req.query,
            &lang_primary,
            self.config().min_index_token_len,
        ) else {
            return Ok(NameSearchResult::empty(&req.language));
        };

        let mut result = NameSearchResult::empty(&req.language);
        let mut attempted = 0usize;
        let mut failed = 0usize;
        let mut keys: BTreeSet<OttId> = BTreeSet::new();
        let mut bare_names: BTreeSet<String> = BTreeSet::new();

        for &class in req.restrict.classes() {
            if cancel.is_cancelled() {
                return Ok(NameSearchResult::empty(&req.language));
            }

            let store = self.store();
            let lookups = [
                store.taxa_matching_name(class, &strategy),
                store.taxa_matching_vernacular_by_key(class, &strategy, &lang_primary),
                store.taxa_matching_vernacular_by_name(class, &strategy, &lang_primary),
            ];

            let mut rows: Vec<TaxonRow> = Vec::new();
            for lookup in lookups {
                attempted += 1;
                match lookup {
                    Ok(found) => rows.extend(found),
                    Err(err) => {
                        failed += 1;
                        tracing::warn!("name search lookup failed for {:?}: {}", class, err);
                    }
                }
            }

            // Union semantics: a taxon reached by more than one path is
            // one row.
            let mut seen = BTreeSet::new();
            rows.retain(|row| seen.insert(row.id));

            if req.order_by_popularity {
                rows.sort_by(popularity_desc);
            }
            let rows = req.page.apply(rows, self.config().hard_result_cap);

            let mut hits = Vec::with_capacity(rows.len());
            for row in rows {
                match (row.ott, row.name.as_ref()) {
                    (Some(ott), _) => {
                        keys.insert(ott);
                    }
                    (None, Some(name)) => {
                        bare_names.insert(name.clone());
                    }
                    (None, None) => {}
                }
                let mut hit = TaxonHit::from_row(row);
                if class == TaxonClass::Node || !req.include_price {
                    hit.price = None;
                }
                hits.push(hit);
            }
            match class {
                TaxonClass::Leaf => result.leaf_hits = hits,
                TaxonClass::Node => result.node_hits = hits,
            }
        }

        if attempted > 0 && failed == attempted {
            return Err(CanopyError::store_unavailable(format!(
                "all {attempted} candidate lookups failed"
            )));
        }
        if cancel.is_cancelled() {
            return Ok(NameSearchResult::empty(&req.language));
        }

        let keys: Vec<OttId> = keys.into_iter().collect();
        let bare_names: Vec<String> = bare_names.into_iter().collect();
        let resolved = resolve_names(self.store(), &keys, &bare_names, &strategy, &lang_primary)
            .fail_open_default("vernacular resolution");
        attach_resolved(&mut result.leaf_hits, &resolved);
        attach_resolved(&mut result.node_hits, &resolved);

        Ok(result)
    }
}

/// Descending by popularity; absent scores sort last. Stable sort keeps
/// union order among ties.
fn popularity_desc(a: &TaxonRow, b: &TaxonRow) -> Ordering {
    let pa = a.popularity.unwrap_or(f64::NEG_INFINITY);
    let pb = b.popularity.unwrap_or(f64::NEG_INFINITY);
    pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
}

fn attach_resolved(hits: &mut [TaxonHit], resolved: &ResolvedNames) {
    for hit in hits {
        let entry = hit
            .ott
            .and_then(|ott| resolved.by_key.get(&ott))
            .or_else(|| hit.name.as_ref().and_then(|n| resolved.by_name.get(n)));
        if let Some(name) = entry {
            hit.vernacular = name.display.clone();
            hit.extra_vernaculars = name.alternates.clone();
        }
    }
}
