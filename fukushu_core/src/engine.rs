//! Lesson recommendation and post-session schedule updates.
//!
//! The engine orchestrates the scorer, selector and schedule updater over
//! an abstract review store. It performs no IO of its own beyond the store
//! calls and never retries; store/API retry policy lives with the callers.

use crate::{
    schedule, select_for_lesson, Error, ItemKind, LessonRecommendation, LessonRequest,
    PracticeUpdate, Result, ReviewStore,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Recommend a lesson for one owner and level.
///
/// Runs the selector once per kind with independent counts; no cross-kind
/// balancing. Empty candidate pools yield empty result sets, not errors.
pub fn recommend_lesson<S, R>(
    store: &S,
    request: &LessonRequest,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<LessonRecommendation>
where
    S: ReviewStore + ?Sized,
    R: Rng + ?Sized,
{
    if request.owner.trim().is_empty() {
        return Err(Error::Recommend("owner is required".into()));
    }
    if request.level.trim().is_empty() {
        return Err(Error::Recommend("level is required".into()));
    }

    tracing::info!(
        "Selecting {} vocab and {} grammar for {}",
        request.vocab_count,
        request.grammar_count,
        request.level
    );

    let vocab_pool = store.find_candidates(&request.owner, &request.level, ItemKind::Vocab)?;
    let vocab = select_for_lesson(&vocab_pool, now, request.vocab_count, rng);

    let grammar_pool = store.find_candidates(&request.owner, &request.level, ItemKind::Grammar)?;
    let grammar = select_for_lesson(&grammar_pool, now, request.grammar_count, rng);

    tracing::info!(
        "Selected {} vocab and {} grammar items",
        vocab.len(),
        grammar.len()
    );

    Ok(LessonRecommendation { vocab, grammar })
}

/// Advance the schedule of every practiced item.
///
/// Items are processed sequentially; each advance is its own atomic
/// read-modify-write with no batch rollback. Unknown ids are logged and
/// skipped, so partial success is the expected outcome.
pub fn advance_after_session<S>(
    store: &mut S,
    owner: &str,
    item_ids: &[Uuid],
    now: DateTime<Utc>,
) -> Result<Vec<PracticeUpdate>>
where
    S: ReviewStore + ?Sized,
{
    let mut updates = Vec::new();

    for &item_id in item_ids {
        let item = match store.find_item(owner, item_id)? {
            Some(item) => item,
            None => {
                tracing::warn!("Item {} not found for user {}", item_id, owner);
                continue;
            }
        };

        let next = schedule::advance(&item, now);

        if !store.apply_schedule(item_id, &next, now)? {
            tracing::warn!("Item {} vanished before its schedule update", item_id);
            continue;
        }

        updates.push(PracticeUpdate {
            item_id,
            title: item.title,
            practice_count: next.practice_count,
            new_interval: next.practice_interval,
            next_practice: next.next_practice,
        });
    }

    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonStore, MasteryLevel, ReviewItem};
    use chrono::Duration;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_item(owner: &str, kind: ItemKind, overdue_days: Option<i64>) -> ReviewItem {
        let now = Utc::now();
        let (last_practiced, next_practice, practice_count) = match overdue_days {
            Some(days) => (
                Some(now - Duration::days(days + 2)),
                Some(now - Duration::days(days)),
                1,
            ),
            None => (None, None, 0),
        };

        ReviewItem {
            id: Uuid::new_v4(),
            owner: owner.into(),
            kind,
            source_id: Uuid::new_v4().to_string(),
            slug: "slug".into(),
            title: "title".into(),
            meaning: "meaning".into(),
            level: "N5".into(),
            mastery: MasteryLevel::Beginner,
            created_at: now,
            updated_at: now,
            last_practiced,
            next_practice,
            practice_interval: Some(2),
            practice_ease: Some(2.5),
            practice_count,
        }
    }

    fn seeded_store(dir: &std::path::Path, items: Vec<ReviewItem>) -> JsonStore {
        let mut store = JsonStore::new(dir.join("reviews.json"));
        for item in items {
            store.insert(item).unwrap();
        }
        store
    }

    #[test]
    fn test_recommend_rejects_blank_owner_and_level() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = seeded_store(temp_dir.path(), vec![]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let now = Utc::now();

        let request = LessonRequest {
            owner: "".into(),
            level: "N5".into(),
            vocab_count: 3,
            grammar_count: 2,
        };
        assert!(recommend_lesson(&store, &request, now, &mut rng).is_err());

        let request = LessonRequest {
            owner: "u1".into(),
            level: "  ".into(),
            vocab_count: 3,
            grammar_count: 2,
        };
        assert!(recommend_lesson(&store, &request, now, &mut rng).is_err());
    }

    #[test]
    fn test_recommend_empty_store_is_empty_result() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = seeded_store(temp_dir.path(), vec![]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let request = LessonRequest {
            owner: "u1".into(),
            level: "N5".into(),
            vocab_count: 3,
            grammar_count: 2,
        };
        let recommendation = recommend_lesson(&store, &request, Utc::now(), &mut rng).unwrap();

        assert!(recommendation.is_empty());
    }

    #[test]
    fn test_recommend_selects_per_kind_independently() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = seeded_store(
            temp_dir.path(),
            vec![
                test_item("u1", ItemKind::Vocab, Some(1)),
                test_item("u1", ItemKind::Vocab, Some(2)),
                test_item("u1", ItemKind::Vocab, Some(3)),
                test_item("u1", ItemKind::Grammar, Some(1)),
            ],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let request = LessonRequest {
            owner: "u1".into(),
            level: "N5".into(),
            vocab_count: 2,
            grammar_count: 2,
        };
        let recommendation = recommend_lesson(&store, &request, Utc::now(), &mut rng).unwrap();

        assert_eq!(recommendation.vocab.len(), 2);
        assert_eq!(recommendation.grammar.len(), 1);
        assert!(recommendation.vocab.iter().all(|i| i.kind == ItemKind::Vocab));
        assert!(recommendation.grammar.iter().all(|i| i.kind == ItemKind::Grammar));
    }

    #[test]
    fn test_never_practiced_item_reachable_over_trials() {
        // One unseen item among four overdue ones: it always tops the
        // ranking, so it lands in every top tier and shows up across
        // repeated selections
        let temp_dir = tempfile::tempdir().unwrap();
        let unseen = test_item("u1", ItemKind::Vocab, None);
        let unseen_id = unseen.id;
        let store = seeded_store(
            temp_dir.path(),
            vec![
                unseen,
                test_item("u1", ItemKind::Vocab, Some(1)),
                test_item("u1", ItemKind::Vocab, Some(10)),
                test_item("u1", ItemKind::Vocab, Some(20)),
                test_item("u1", ItemKind::Vocab, Some(30)),
            ],
        );

        let request = LessonRequest {
            owner: "u1".into(),
            level: "N5".into(),
            vocab_count: 2,
            grammar_count: 0,
        };

        let now = Utc::now();
        let mut hits = 0;
        for seed in 0..60 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let recommendation = recommend_lesson(&store, &request, now, &mut rng).unwrap();
            assert_eq!(recommendation.vocab.len(), 2);
            if recommendation.vocab.iter().any(|i| i.id == unseen_id) {
                hits += 1;
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_advance_skips_unknown_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let known = test_item("u1", ItemKind::Vocab, None);
        let known_id = known.id;
        let mut store = seeded_store(temp_dir.path(), vec![known]);

        let updates =
            advance_after_session(&mut store, "u1", &[Uuid::new_v4(), known_id], Utc::now())
                .unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].item_id, known_id);
        assert_eq!(updates[0].practice_count, 1);
        assert_eq!(updates[0].new_interval, 1);
    }

    #[test]
    fn test_advance_persists_new_schedule() {
        let temp_dir = tempfile::tempdir().unwrap();
        let item = test_item("u1", ItemKind::Grammar, None);
        let id = item.id;
        let mut store = seeded_store(temp_dir.path(), vec![item]);

        let now = Utc::now();
        advance_after_session(&mut store, "u1", &[id], now).unwrap();

        let stored = store.find_item("u1", id).unwrap().unwrap();
        assert_eq!(stored.practice_count, 1);
        assert_eq!(stored.practice_interval, Some(1));
        assert_eq!(stored.next_practice, Some(now + Duration::days(1)));

        // A second session moves to the 3-day interval
        advance_after_session(&mut store, "u1", &[id], now).unwrap();
        let stored = store.find_item("u1", id).unwrap().unwrap();
        assert_eq!(stored.practice_count, 2);
        assert_eq!(stored.practice_interval, Some(3));
    }

    #[test]
    fn test_advance_ignores_other_owners_items() {
        let temp_dir = tempfile::tempdir().unwrap();
        let foreign = test_item("u2", ItemKind::Vocab, Some(1));
        let foreign_id = foreign.id;
        let mut store = seeded_store(temp_dir.path(), vec![foreign]);

        let updates = advance_after_session(&mut store, "u1", &[foreign_id], Utc::now()).unwrap();

        assert!(updates.is_empty());
        let untouched = store.find_item("u2", foreign_id).unwrap().unwrap();
        assert_eq!(untouched.practice_count, 1);
    }
}
