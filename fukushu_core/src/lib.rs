#![forbid(unsafe_code)]

//! Core domain model and business logic for the Fukushu revision system.
//!
//! This crate provides:
//! - Domain types (review items, schedules, lessons)
//! - SRS priority scoring and lesson selection
//! - SM-2 style schedule advancement
//! - Review store (JSON document file)
//! - Upstream sync (Bunpro review API)
//! - Reading lesson generation (Gemini)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod priority;
pub mod selector;
pub mod schedule;
pub mod engine;
pub mod store;
pub mod upstream;
pub mod sync;
pub mod generate;
pub mod lesson_log;
pub mod seed;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use priority::priority_score;
pub use selector::select_for_lesson;
pub use schedule::advance;
pub use engine::{advance_after_session, recommend_lesson};
pub use store::{JsonStore, ReviewStore};
pub use upstream::UpstreamClient;
pub use sync::sync_all;
pub use generate::{lines_missing_furigana, GeminiClient};
pub use lesson_log::{read_lessons, JsonlLessonLog, LessonSink};
pub use seed::{seed_user, SeedOutcome};
