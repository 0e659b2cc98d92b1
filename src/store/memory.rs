//! In-memory entity store.
//!
//! Backs the CLI's dataset mode and the unit tests with a store that
//! evaluates the same predicates a SQL-backed adapter would push down.
//! The dataset is immutable once loaded, so searches share it freely
//! across threads.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{
    ImageRef, KeyedVernacular, LeafRef, NamedVernacular, OttId, ReservationRow, SponsorFilter,
    SponsorTier, TaxonClass, TaxonRow,
};
use crate::error::Result;
use crate::query::MatchStrategy;
use crate::store::EntityStore;

/// A vernacular-name record keyed by cross-reference key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OttVernacularEntry {
    pub ott: OttId,
    pub vernacular: String,
    pub lang_primary: String,
    #[serde(default)]
    pub preferred: bool,
    /// Source-priority rank; lower is better.
    #[serde(default)]
    pub src: i32,
}

/// A vernacular-name record keyed by scientific name, for taxa with no
/// cross-reference key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameVernacularEntry {
    pub name: String,
    pub vernacular: String,
    pub lang_primary: String,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default)]
    pub src: i32,
}

/// An image record for a taxon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub ott: OttId,
    pub src: i32,
    pub src_id: i64,
    #[serde(default)]
    pub best_any: bool,
}

/// The full content of an in-memory store, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub leaves: Vec<TaxonRow>,
    pub nodes: Vec<TaxonRow>,
    pub vernaculars_by_ott: Vec<OttVernacularEntry>,
    pub vernaculars_by_name: Vec<NameVernacularEntry>,
    pub reservations: Vec<ReservationRow>,
    pub images: Vec<ImageEntry>,
}

/// In-memory implementation of [`EntityStore`].
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    data: Dataset,
    /// Clock override for validity-window tests; `None` means wall time.
    now: Option<DateTime<Utc>>,
}

impl MemoryEntityStore {
    /// Create a store over a dataset.
    pub fn new(data: Dataset) -> Self {
        Self { data, now: None }
    }

    /// Parse a JSON dataset into a store.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Pin the store's clock, so sponsorship validity windows evaluate
    /// against a fixed instant.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// The dataset backing this store.
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn collection(&self, class: TaxonClass) -> &[TaxonRow] {
        match class {
            TaxonClass::Leaf => &self.data.leaves,
            TaxonClass::Node => &self.data.nodes,
        }
    }
}

impl EntityStore for MemoryEntityStore {
    fn taxa_matching_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
    ) -> Result<Vec<TaxonRow>> {
        Ok(self
            .collection(class)
            .iter()
            .filter(|row| row.name.as_deref().is_some_and(|n| strategy.matches(n)))
            .cloned()
            .collect())
    }

    fn taxa_matching_vernacular_by_key(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>> {
        let keys: BTreeSet<OttId> = self
            .data
            .vernaculars_by_ott
            .iter()
            .filter(|v| v.lang_primary == lang_primary && strategy.matches(&v.vernacular))
            .map(|v| v.ott)
            .collect();
        Ok(self
            .collection(class)
            .iter()
            .filter(|row| row.ott.is_some_and(|ott| keys.contains(&ott)))
            .cloned()
            .collect())
    }

    fn taxa_matching_vernacular_by_name(
        &self,
        class: TaxonClass,
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<TaxonRow>> {
        let names: BTreeSet<&str> = self
            .data
            .vernaculars_by_name
            .iter()
            .filter(|v| v.lang_primary == lang_primary && strategy.matches(&v.vernacular))
            .map(|v| v.name.as_str())
            .collect();
        Ok(self
            .collection(class)
            .iter()
            .filter(|row| row.name.as_deref().is_some_and(|n| names.contains(n)))
            .cloned()
            .collect())
    }

    fn vernaculars_by_key(
        &self,
        keys: &[OttId],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<KeyedVernacular>> {
        let wanted: BTreeSet<OttId> = keys.iter().copied().collect();
        Ok(self
            .data
            .vernaculars_by_ott
            .iter()
            .filter(|v| v.lang_primary == lang_primary && wanted.contains(&v.ott))
            .map(|v| KeyedVernacular {
                ott: v.ott,
                text: v.vernacular.clone(),
                preferred: v.preferred,
                src: v.src,
                matched: strategy.annotates(&v.vernacular),
            })
            .collect())
    }

    fn vernaculars_by_name(
        &self,
        names: &[String],
        strategy: &MatchStrategy,
        lang_primary: &str,
    ) -> Result<Vec<NamedVernacular>> {
        let wanted: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        Ok(self
            .data
            .vernaculars_by_name
            .iter()
            .filter(|v| v.lang_primary == lang_primary && wanted.contains(v.name.as_str()))
            .map(|v| NamedVernacular {
                name: v.name.clone(),
                text: v.vernacular.clone(),
                preferred: v.preferred,
                src: v.src,
                matched: strategy.annotates(&v.vernacular),
            })
            .collect())
    }

    fn sponsorships(
        &self,
        tier: SponsorTier,
        filter: &SponsorFilter,
    ) -> Result<Vec<ReservationRow>> {
        let now = self.now();
        let mut rows: Vec<ReservationRow> = self
            .data
            .reservations
            .iter()
            .filter(|row| tier.admits(row, now) && filter.matches(row, tier))
            .cloned()
            .collect();
        if filter.order_by_recent {
            match tier {
                SponsorTier::Verified => {
                    rows.sort_by(|a, b| b.verified_time.cmp(&a.verified_time));
                }
                SponsorTier::Pending => {
                    rows.sort_by(|a, b| b.user_updated_time.cmp(&a.user_updated_time));
                }
            }
        }
        Ok(rows)
    }

    fn leaves_by_key(&self, keys: &[OttId]) -> Result<Vec<LeafRef>> {
        let wanted: BTreeSet<OttId> = keys.iter().copied().collect();
        Ok(self
            .data
            .leaves
            .iter()
            .filter_map(|row| {
                let ott = row.ott?;
                wanted.contains(&ott).then_some(LeafRef { id: row.id, ott })
            })
            .collect())
    }

    fn preferred_common_names(
        &self,
        keys: &[OttId],
        lang_primary: &str,
    ) -> Result<BTreeMap<OttId, String>> {
        let wanted: BTreeSet<OttId> = keys.iter().copied().collect();
        let mut best: BTreeMap<OttId, (i32, &str)> = BTreeMap::new();
        for v in &self.data.vernaculars_by_ott {
            if !v.preferred || v.lang_primary != lang_primary || !wanted.contains(&v.ott) {
                continue;
            }
            match best.get(&v.ott) {
                Some((src, _)) if *src <= v.src => {}
                _ => {
                    best.insert(v.ott, (v.src, v.vernacular.as_str()));
                }
            }
        }
        Ok(best
            .into_iter()
            .map(|(ott, (_, text))| (ott, text.to_string()))
            .collect())
    }

    fn best_images(&self, keys: &[OttId]) -> Result<BTreeMap<OttId, ImageRef>> {
        let wanted: BTreeSet<OttId> = keys.iter().copied().collect();
        let mut best: BTreeMap<OttId, ImageRef> = BTreeMap::new();
        for img in &self.data.images {
            if !img.best_any || !wanted.contains(&img.ott) {
                continue;
            }
            let entry = ImageRef {
                src: img.src,
                src_id: img.src_id,
            };
            match best.get(&img.ott) {
                Some(existing) if existing.src >= entry.src => {}
                _ => {
                    best.insert(img.ott, entry);
                }
            }
        }
        Ok(best)
    }
}
