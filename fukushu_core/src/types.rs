//! Core domain types for the Fukushu revision system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Review items and their SRS schedule state
//! - Item kinds and upstream mastery levels
//! - Lesson requests, recommendations and practice updates
//! - Generated reading lessons

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Item Classification
// ============================================================================

/// Kind of study item tracked for review
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Vocab,
    Grammar,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Vocab => "vocab",
            ItemKind::Grammar => "grammar",
        }
    }

    /// The upstream API's name for this kind (`reviewable_type` parameter)
    pub fn reviewable_type(&self) -> &'static str {
        match self {
            ItemKind::Vocab => "Vocab",
            ItemKind::Grammar => "Grammar",
        }
    }
}

/// Coarse mastery bucket reported by the upstream API (5-stage progression)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    Beginner,
    Adept,
    Seasoned,
    Expert,
    Master,
}

impl MasteryLevel {
    /// All levels, from least to most mastered
    pub const ALL: &'static [MasteryLevel] = &[
        MasteryLevel::Beginner,
        MasteryLevel::Adept,
        MasteryLevel::Seasoned,
        MasteryLevel::Expert,
        MasteryLevel::Master,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryLevel::Beginner => "beginner",
            MasteryLevel::Adept => "adept",
            MasteryLevel::Seasoned => "seasoned",
            MasteryLevel::Expert => "expert",
            MasteryLevel::Master => "master",
        }
    }
}

// ============================================================================
// Review Items and Schedule State
// ============================================================================

/// One learner's tracked study item.
///
/// The schedule fields are owned exclusively by the SRS engine: they start
/// absent when an item is first synced from upstream and are only ever
/// written through a [`PracticeSchedule`] after a practice session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: Uuid,
    pub owner: String,
    pub kind: ItemKind,
    /// Upstream identifier; `(kind, source_id)` deduplicates across syncs
    pub source_id: String,
    pub slug: String,
    pub title: String,
    pub meaning: String,
    /// JLPT difficulty band label, e.g. "N5"
    pub level: String,
    pub mastery: MasteryLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// None means the item has never completed a practice session
    pub last_practiced: Option<DateTime<Utc>>,
    /// Always derived from `last_practiced` plus the interval; never set alone
    pub next_practice: Option<DateTime<Utc>>,
    /// Days between reviews, within [1, 180] once set
    pub practice_interval: Option<u32>,
    /// Interval growth multiplier, never below 1.3
    pub practice_ease: Option<f64>,
    #[serde(default)]
    pub practice_count: u32,
}

/// Schedule state produced by advancing an item after practice.
///
/// This is the unit written back to the store; one per practiced item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PracticeSchedule {
    pub practice_count: u32,
    pub practice_interval: u32,
    pub practice_ease: f64,
    pub last_practiced: DateTime<Utc>,
    pub next_practice: DateTime<Utc>,
}

/// Per-item outcome of a post-session schedule update
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PracticeUpdate {
    pub item_id: Uuid,
    pub title: String,
    pub practice_count: u32,
    pub new_interval: u32,
    pub next_practice: DateTime<Utc>,
}

// ============================================================================
// Lesson Recommendation
// ============================================================================

/// Parameters for a lesson recommendation
#[derive(Clone, Debug)]
pub struct LessonRequest {
    pub owner: String,
    pub level: String,
    pub vocab_count: usize,
    pub grammar_count: usize,
}

/// Items selected for one lesson, per kind
#[derive(Clone, Debug, Default)]
pub struct LessonRecommendation {
    pub vocab: Vec<ReviewItem>,
    pub grammar: Vec<ReviewItem>,
}

impl LessonRecommendation {
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty() && self.grammar.is_empty()
    }

    /// Ids of every selected item, vocab first
    pub fn item_ids(&self) -> Vec<Uuid> {
        self.vocab
            .iter()
            .chain(self.grammar.iter())
            .map(|item| item.id)
            .collect()
    }
}

// ============================================================================
// Generated Reading Lessons
// ============================================================================

/// A word/phrase chunk within a generated sentence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonChunk {
    pub japanese: String,
    pub hiragana: String,
    pub english: String,
}

/// One line of a generated reading passage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonLine {
    /// Japanese text with `{kanji|reading}` furigana markup
    pub japanese: String,
    pub english: String,
    /// Titles of the provided vocab/grammar points used in this line
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub chunks: Vec<LessonChunk>,
}

/// A generated reading lesson as returned by the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadingLesson {
    pub title: String,
    pub lines: Vec<LessonLine>,
}

/// A reading lesson persisted to the lesson log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedLesson {
    pub id: Uuid,
    pub owner: String,
    pub level: String,
    pub title: String,
    pub lines: Vec<LessonLine>,
    pub vocab_ids: Vec<Uuid>,
    pub grammar_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
