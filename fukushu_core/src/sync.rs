//! Upstream sync: upsert fetched review items into the local store.
//!
//! Items are deduplicated on `(kind, source_id)` per owner. New items start
//! with empty schedule state; existing items only have their mastery bucket
//! refreshed when it changed upstream.

use crate::upstream::{extract_items, UpstreamClient, UpstreamItem};
use crate::{ItemKind, JsonStore, MasteryLevel, Result, ReviewItem};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Insert/update counts for one sync run
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncStats {
    pub inserted: usize,
    pub updated: usize,
}

impl SyncStats {
    fn merge(&mut self, other: SyncStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

/// Upsert one batch of upstream items for an owner
pub fn upsert_items(
    store: &mut JsonStore,
    owner: &str,
    items: &[UpstreamItem],
    mastery: MasteryLevel,
    kind: ItemKind,
    now: DateTime<Utc>,
) -> Result<SyncStats> {
    let mut stats = SyncStats::default();

    for item in items {
        match store.find_by_source(owner, kind, &item.source_id)? {
            Some(existing) => {
                if existing.mastery != mastery {
                    store.set_mastery(existing.id, mastery, now)?;
                    stats.updated += 1;
                }
            }
            None => {
                store.insert(ReviewItem {
                    id: Uuid::new_v4(),
                    owner: owner.to_string(),
                    kind,
                    source_id: item.source_id.clone(),
                    slug: item.slug.clone(),
                    title: item.title.clone(),
                    meaning: item.meaning.clone(),
                    level: item.level.clone(),
                    mastery,
                    created_at: now,
                    updated_at: now,
                    last_practiced: None,
                    next_practice: None,
                    practice_interval: None,
                    practice_ease: None,
                    practice_count: 0,
                })?;
                stats.inserted += 1;
            }
        }
    }

    Ok(stats)
}

/// Fetch and upsert one item kind across all five mastery levels
pub fn sync_kind(
    client: &UpstreamClient,
    store: &mut JsonStore,
    owner: &str,
    kind: ItemKind,
) -> Result<SyncStats> {
    let mut total = SyncStats::default();

    for &level in MasteryLevel::ALL {
        tracing::info!("Fetching {} at level {}", kind.as_str(), level.as_str());
        let page = client.fetch_reviews(level, kind)?;
        let items = extract_items(&page);
        tracing::info!(
            "Found {} {} items at {}",
            items.len(),
            kind.as_str(),
            level.as_str()
        );

        let stats = upsert_items(store, owner, &items, level, kind, Utc::now())?;
        tracing::info!("Inserted: {}, updated: {}", stats.inserted, stats.updated);
        total.merge(stats);
    }

    Ok(total)
}

/// Full sync of both item kinds; returns (vocab, grammar) stats
pub fn sync_all(
    client: &UpstreamClient,
    store: &mut JsonStore,
    owner: &str,
) -> Result<(SyncStats, SyncStats)> {
    tracing::info!("Syncing vocab for {}", owner);
    let vocab = sync_kind(client, store, owner, ItemKind::Vocab)?;

    tracing::info!("Syncing grammar for {}", owner);
    let grammar = sync_kind(client, store, owner, ItemKind::Grammar)?;

    Ok((vocab, grammar))
}
