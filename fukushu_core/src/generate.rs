//! Reading lesson generation via the Gemini API.
//!
//! The model is asked for a short reading passage that uses every selected
//! vocab and grammar point, returned as JSON and parsed into
//! [`ReadingLesson`]. Kanji in generated text must carry `{kanji|reading}`
//! furigana markup; helpers here flag lines where the model missed some.

use crate::{config::GeminiConfig, Error, ReadingLesson, Result, ReviewItem};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// CJK Unified Ideographs block
static KANJI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FFF}]").expect("kanji pattern"));

/// A `{kanji|reading}` furigana span
static FURIGANA_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}|]+\|[^{}|]+\}").expect("furigana pattern"));

/// Whether the text contains any kanji character
pub fn contains_kanji(text: &str) -> bool {
    KANJI.is_match(text)
}

/// Indices of lesson lines whose Japanese text still has kanji outside
/// furigana markup
pub fn lines_missing_furigana(lesson: &ReadingLesson) -> Vec<usize> {
    lesson
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| contains_kanji(&FURIGANA_SPAN.replace_all(&line.japanese, "")))
        .map(|(index, _)| index)
        .collect()
}

fn point_list(items: &[ReviewItem]) -> String {
    if items.is_empty() {
        return "(none)".into();
    }
    items
        .iter()
        .map(|item| format!("- {} ({})", item.title, item.meaning))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the generation prompt for one lesson
pub fn build_lesson_prompt(vocab: &[ReviewItem], grammar: &[ReviewItem], level: &str) -> String {
    format!(
        r#"You are a Japanese language teacher creating a reading lesson for {level} level students.

Create a short reading passage (5-10 sentences) that uses ALL of the following vocabulary and grammar points naturally.
The rest of the text should match {level} level difficulty.

VOCABULARY TO USE:
{vocab_list}

GRAMMAR TO USE:
{grammar_list}

IMPORTANT FORMATTING RULES:
1. For ALL kanji in the "japanese" field, include furigana using this syntax: {{kanji|reading}}
   Example: {{食べる|たべる}} or {{日本語|にほんご}}
2. Even single kanji need furigana: {{私|わたし}}, {{今日|きょう}}
3. Return the lesson as a JSON object with a "title" and "lines" array

The response object must have:
- "title": a short, descriptive title for the passage in the format "{level}: <topic>" (e.g., "{level}: A Day at the Park")
- "lines": array of line objects

Each line object must have:
- "japanese": the full Japanese sentence with furigana syntax for all kanji
- "english": the full English translation
- "points": array of vocab/grammar titles used in this line (empty array if none from the provided lists)
- "chunks": array of word/phrase chunks that make up the sentence. Each chunk has:
  - "japanese": the Japanese word/phrase (kanji allowed, no furigana syntax)
  - "hiragana": the hiragana reading
  - "english": the English meaning of this chunk
  The chunks, when concatenated, must form the complete sentence (matching "japanese" without furigana syntax).

Return ONLY the JSON object."#,
        level = level,
        vocab_list = point_list(vocab),
        grammar_list = point_list(grammar),
    )
}

// ============================================================================
// Gemini Client
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Blocking wrapper around the Gemini `generateContent` endpoint
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from config plus the API key (environment, never config file)
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Generate("API key is empty".into()));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Generate a reading lesson from the selected items.
    ///
    /// Requires at least one vocab or grammar point.
    pub fn generate_reading_lesson(
        &self,
        vocab: &[ReviewItem],
        grammar: &[ReviewItem],
        level: &str,
    ) -> Result<ReadingLesson> {
        if vocab.is_empty() && grammar.is_empty() {
            return Err(Error::Generate(
                "at least one vocab or grammar item is required".into(),
            ));
        }

        let prompt = build_lesson_prompt(vocab, grammar, level);
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            return Err(Error::Generate(format!(
                "generation request failed with status {}",
                response.status()
            )));
        }

        let reply: GenerateContentResponse = response.json()?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::Generate("model returned no candidates".into()))?;

        parse_lesson_text(&text)
    }
}

/// Parse the model's JSON reply into a lesson
pub fn parse_lesson_text(text: &str) -> Result<ReadingLesson> {
    let lesson: ReadingLesson = serde_json::from_str(text)
        .map_err(|e| Error::Generate(format!("model reply is not a valid lesson: {}", e)))?;

    if lesson.lines.is_empty() {
        return Err(Error::Generate("model returned a lesson with no lines".into()));
    }

    Ok(lesson)
}
