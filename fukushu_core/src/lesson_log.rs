//! Append-only log of saved reading lessons.
//!
//! Lessons are appended to a JSONL (JSON Lines) file with file locking so
//! concurrent invocations cannot interleave partial lines.

use crate::{Result, SavedLesson};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Lesson sink trait for persisting generated lessons
pub trait LessonSink {
    fn append(&mut self, lesson: &SavedLesson) -> Result<()>;
}

/// JSONL-based lesson log with file locking
pub struct JsonlLessonLog {
    path: PathBuf,
}

impl JsonlLessonLog {
    /// Create a new lesson log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl LessonSink for JsonlLessonLog {
    fn append(&mut self, lesson: &SavedLesson) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(lesson)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended lesson {} to log", lesson.id);
        Ok(())
    }
}

/// Read all lessons from a log file.
///
/// Malformed lines are logged and skipped so one bad record never hides
/// the rest of the history.
pub fn read_lessons(path: &Path) -> Result<Vec<SavedLesson>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut lessons = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SavedLesson>(&line) {
            Ok(lesson) => lessons.push(lesson),
            Err(e) => {
                tracing::warn!("Failed to parse lesson at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} lessons from log", lessons.len());
    Ok(lessons)
}
