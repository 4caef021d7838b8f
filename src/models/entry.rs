use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::services::entry_tags::parse_labels;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: String,
    pub author_id: String,
    pub title: String,
    /// Calendar day in `YYYY-MM-DD` form.
    pub date: String,
    pub time_spent: i64,
    pub content: String,
    pub resources: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Field values for creating or updating an entry, after form parsing.
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time_spent: i64,
    pub content: String,
    pub resources: String,
    /// Raw, comma-separated tag labels as typed by the author.
    pub tags: String,
}

impl EntryInput {
    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();

        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), "Title is required".to_string());
        }

        if self.title.chars().count() > 200 {
            errors.insert("title".to_string(), "Title must be at most 200 characters".to_string());
        }

        let slug = self.slug();
        if slug == "new" || slug.contains(['/', '?', '#', '%']) {
            errors.insert("title".to_string(), "That title cannot be used as a link".to_string());
        }

        if self.time_spent < 0 {
            errors.insert("time_spent".to_string(), "Time spent cannot be negative".to_string());
        }

        if self.content.trim().is_empty() {
            errors.insert("content".to_string(), "Content is required".to_string());
        }

        if self.resources.trim().is_empty() {
            errors.insert("resources".to_string(), "Resources are required".to_string());
        }

        if parse_labels(&self.tags).is_empty() {
            errors.insert("tags".to_string(), "At least one tag is required".to_string());
        }

        errors
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// The entry date, falling back to today in local time.
    pub fn date_or_today(&self) -> String {
        self.date
            .unwrap_or_else(|| Local::now().date_naive())
            .format(DATE_FORMAT)
            .to_string()
    }
}

/// Lowercases the title, trims it and replaces spaces with hyphens.
pub fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "-")
}
