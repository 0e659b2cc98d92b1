//! Vernacular-name resolution.
//!
//! Given the keys and bare scientific names reached by a search, fetch
//! every vernacular row for them and collapse each group into a single
//! [`ResolvedName`]. The canonical (preferred) vernacular is always shown
//! when one exists, but the search must still reveal which alternate name
//! actually satisfied the query, since that is often why the result
//! appeared at all.
//!
//! Grouping is an explicit map keyed by ott or name: resolution does not
//! depend on the store returning rows in any particular order.

use std::collections::BTreeMap;

use crate::core::{KeyedVernacular, OttId, ResolvedName, ResolvedNames};
use crate::error::Result;
use crate::query::MatchStrategy;
use crate::store::EntityStore;

/// Resolve display names for entities reached by key and by bare name.
///
/// Each group of vernacular rows collapses by the same policy:
///
/// 1. the preferred row matches the query: display it, no alternates;
/// 2. a preferred row exists but some other row matches: display the
///    preferred text, list every matching text as an alternate;
/// 3. a preferred row exists and nothing matches: display it alone;
/// 4. no preferred row: no display, every matching text is an alternate.
pub fn resolve_names<S: EntityStore + ?Sized>(
    store: &S,
    keys: &[OttId],
    names: &[String],
    strategy: &MatchStrategy,
    lang_primary: &str,
) -> Result<ResolvedNames> {
    let mut resolved = ResolvedNames::default();

    if !keys.is_empty() {
        let rows = store.vernaculars_by_key(keys, strategy, lang_primary)?;
        let mut groups: BTreeMap<OttId, Vec<GroupRow<'_>>> = BTreeMap::new();
        for row in &rows {
            groups.entry(row.ott).or_default().push(GroupRow {
                text: &row.text,
                preferred: row.preferred,
                src: row.src,
                matched: row.matched,
            });
        }
        resolved.by_key = groups
            .into_iter()
            .map(|(ott, group)| (ott, resolve_group(group)))
            .collect();
    }

    if !names.is_empty() {
        let rows = store.vernaculars_by_name(names, strategy, lang_primary)?;
        let mut groups: BTreeMap<&str, Vec<GroupRow<'_>>> = BTreeMap::new();
        for row in &rows {
            groups.entry(row.name.as_str()).or_default().push(GroupRow {
                text: &row.text,
                preferred: row.preferred,
                src: row.src,
                matched: row.matched,
            });
        }
        resolved.by_name = groups
            .into_iter()
            .map(|(name, group)| (name.to_string(), resolve_group(group)))
            .collect();
    }

    Ok(resolved)
}

/// One vernacular row inside a group, borrowed from either join path.
struct GroupRow<'a> {
    text: &'a str,
    preferred: bool,
    src: i32,
    matched: bool,
}

fn resolve_group(mut rows: Vec<GroupRow<'_>>) -> ResolvedName {
    // Deterministic regardless of store row order.
    rows.sort_by(|a, b| {
        b.preferred
            .cmp(&a.preferred)
            .then(a.src.cmp(&b.src))
            .then(a.text.cmp(b.text))
    });

    let preferred = rows.iter().find(|r| r.preferred);
    match preferred {
        Some(p) if p.matched => ResolvedName {
            display: Some(p.text.to_string()),
            alternates: Vec::new(),
        },
        Some(p) => ResolvedName {
            display: Some(p.text.to_string()),
            alternates: rows
                .iter()
                .filter(|r| !r.preferred && r.matched)
                .map(|r| r.text.to_string())
                .collect(),
        },
        None => ResolvedName {
            display: None,
            alternates: rows
                .iter()
                .filter(|r| r.matched)
                .map(|r| r.text.to_string())
                .collect(),
        },
    }
}

/// The best vernacular selected for one key by [`pick_best_vernaculars`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BestVernacular {
    pub ott: OttId,
    /// Canonical display text: the preferred vernacular when one exists,
    /// otherwise the group's first text when nothing matched.
    pub vernacular: Option<String>,
    /// The non-preferred text that satisfied the query, when the match
    /// came through one.
    pub matched_alternate: Option<String>,
}

/// Select the single best matching vernacular per key from unannotated
/// rows, comparing against the query tokens directly.
///
/// Useful for callers holding plain vernacular rows without store match
/// annotation. A row matches when every query token substring-matches its
/// text, case-insensitively; with `order_sensitive` set, tokens must also
/// be found at nondecreasing positions.
pub fn pick_best_vernaculars(
    rows: &[KeyedVernacular],
    terms: &[String],
    order_sensitive: bool,
) -> Vec<BestVernacular> {
    let mut groups: BTreeMap<OttId, Vec<&KeyedVernacular>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.ott).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(ott, mut group)| {
            group.sort_by(|a, b| {
                b.preferred
                    .cmp(&a.preferred)
                    .then(a.src.cmp(&b.src))
                    .then(a.text.cmp(&b.text))
            });
            let preferred = group.iter().find(|r| r.preferred);

            if let Some(p) = preferred {
                if terms_contained(terms, &p.text, order_sensitive) {
                    return BestVernacular {
                        ott,
                        vernacular: Some(p.text.clone()),
                        matched_alternate: None,
                    };
                }
            }
            if let Some(hit) = group
                .iter()
                .find(|r| !r.preferred && terms_contained(terms, &r.text, order_sensitive))
            {
                return BestVernacular {
                    ott,
                    vernacular: preferred.map(|p| p.text.clone()),
                    matched_alternate: Some(hit.text.clone()),
                };
            }
            BestVernacular {
                ott,
                vernacular: group.first().map(|r| r.text.clone()),
                matched_alternate: None,
            }
        })
        .collect()
}

/// Check that every term appears in `text`, case-insensitively. An empty
/// term list matches nothing.
fn terms_contained(terms: &[String], text: &str, order_sensitive: bool) -> bool {
    if terms.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    if order_sensitive {
        let mut cursor = 0;
        for term in terms {
            match text[cursor..].find(&term.to_lowercase()) {
                Some(pos) => cursor += pos,
                None => return false,
            }
        }
        true
    } else {
        terms.iter().all(|t| text.contains(&t.to_lowercase()))
    }
}
