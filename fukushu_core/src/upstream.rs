//! Upstream review API client and payload extraction.
//!
//! Bunpro reports SRS review data as paginated JSON:API documents: review
//! records under `reviews.data`, their reviewables (the actual vocab and
//! grammar points) under `reviews.included`, joined through a relationship
//! id. This module models that payload, joins the two halves, and pages
//! through the endpoint with a polite randomized delay.

use crate::{config::UpstreamConfig, Error, ItemKind, MasteryLevel, Result};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

// ============================================================================
// Payload Model
// ============================================================================

/// One page (or merged pages) of the `srs_level_details` endpoint
#[derive(Debug, Deserialize)]
pub struct SrsLevelPage {
    pub reviews: ReviewsDocument,
    pub pagy: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewsDocument {
    #[serde(default)]
    pub data: Vec<ReviewRecord>,
    #[serde(default)]
    pub included: Vec<Reviewable>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub relationships: Option<Relationships>,
}

#[derive(Debug, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub reviewable: Option<RelationshipRef>,
}

#[derive(Debug, Deserialize)]
pub struct RelationshipRef {
    #[serde(default)]
    pub data: Option<ResourceId>,
}

/// Upstream ids arrive as both numbers and strings
#[derive(Debug, Deserialize)]
pub struct ResourceId {
    pub id: Value,
}

#[derive(Debug, Deserialize)]
pub struct Reviewable {
    pub id: Value,
    pub attributes: ReviewableAttributes,
}

#[derive(Debug, Deserialize)]
pub struct ReviewableAttributes {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub level: String,
}

/// A review item as extracted from the upstream payload
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamItem {
    pub source_id: String,
    pub slug: String,
    pub title: String,
    pub meaning: String,
    pub level: String,
}

fn id_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Join review records to their reviewables.
///
/// Records whose reviewable cannot be resolved are dropped; the upstream
/// occasionally returns dangling relationships.
pub fn extract_items(page: &SrsLevelPage) -> Vec<UpstreamItem> {
    let by_id: HashMap<String, &Reviewable> = page
        .reviews
        .included
        .iter()
        .map(|r| (id_key(&r.id), r))
        .collect();

    page.reviews
        .data
        .iter()
        .filter_map(|record| {
            let reviewable_id = record
                .relationships
                .as_ref()?
                .reviewable
                .as_ref()?
                .data
                .as_ref()?;

            let reviewable = by_id.get(&id_key(&reviewable_id.id))?;
            let attrs = &reviewable.attributes;

            Some(UpstreamItem {
                source_id: attrs
                    .id
                    .as_ref()
                    .map(id_key)
                    .unwrap_or_else(|| id_key(&reviewable.id)),
                slug: attrs.slug.clone(),
                title: attrs.title.clone(),
                meaning: attrs.meaning.clone(),
                level: attrs.level.clone(),
            })
        })
        .collect()
}

// ============================================================================
// Client
// ============================================================================

/// Blocking client for the upstream review API
pub struct UpstreamClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
    page_delay_ms: (u64, u64),
}

impl UpstreamClient {
    /// Build a client from config plus the API token (environment, never config file)
    pub fn new(config: &UpstreamConfig, token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Upstream("API token is empty".into()));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            page_delay_ms: (config.page_delay_min_ms, config.page_delay_max_ms),
        })
    }

    /// Fetch every page of reviews for one mastery level and item kind.
    ///
    /// Pages are merged into a single document. No retry or backoff; a
    /// failed page fails the whole fetch.
    pub fn fetch_reviews(&self, level: MasteryLevel, kind: ItemKind) -> Result<SrsLevelPage> {
        let url = format!("{}/user_stats/srs_level_details", self.base_url);

        let mut all_data = Vec::new();
        let mut all_included = Vec::new();
        let mut page = 1u32;
        let mut total_pages;

        loop {
            let response = self
                .http
                .get(&url)
                .query(&[
                    ("level", level.as_str()),
                    ("reviewable_type", kind.reviewable_type()),
                ])
                .query(&[("page", page)])
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Token token={}", self.token),
                )
                .send()?;

            if !response.status().is_success() {
                return Err(Error::Upstream(format!(
                    "review request for {}/{} failed with status {}",
                    level.as_str(),
                    kind.reviewable_type(),
                    response.status()
                )));
            }

            let body: SrsLevelPage = response.json()?;
            total_pages = body.pagy.pages;
            all_data.extend(body.reviews.data);
            all_included.extend(body.reviews.included);

            page += 1;
            if page > total_pages {
                break;
            }

            let delay = self.page_delay();
            tracing::debug!("Waiting {}ms before requesting page {}", delay, page);
            thread::sleep(Duration::from_millis(delay));
        }

        Ok(SrsLevelPage {
            reviews: ReviewsDocument {
                data: all_data,
                included: all_included,
            },
            pagy: PageInfo { pages: total_pages },
        })
    }

    fn page_delay(&self) -> u64 {
        let (min, max) = self.page_delay_ms;
        if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        }
    }
}
