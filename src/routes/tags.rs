use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::auth::MaybeUser;
use crate::error::AppError;
use crate::models::User;
use crate::routes::entries::{entry_views, EntryView};
use crate::routes::encode_segment;
use crate::services::entries;
use crate::AppState;

struct TagWithCount {
    label: String,
    count: i64,
}

struct TagCloudItem {
    href: String,
    label: String,
    count: i64,
    font_size: String,
    color: String,
}

#[derive(Template)]
#[template(path = "tags/list.html")]
struct TagListTemplate {
    tags: Vec<TagCloudItem>,
    static_hash: &'static str,
    user: Option<User>,
}

#[derive(Template)]
#[template(path = "tags/show.html")]
struct TagShowTemplate {
    label: String,
    entries: Vec<EntryView>,
    static_hash: &'static str,
    user: Option<User>,
}

fn build_tag_cloud(tags: Vec<TagWithCount>) -> Vec<TagCloudItem> {
    if tags.is_empty() {
        return vec![];
    }

    let max_count = tags.iter().map(|t| t.count).max().unwrap_or(1) as f64;
    let min_count = tags.iter().map(|t| t.count).min().unwrap_or(1) as f64;

    // Size range: 0.85rem to 2.25rem
    let min_size: f64 = 0.85;
    let max_size: f64 = 2.25;

    // Warm ink palette: sepia (rare) to deep rust (frequent)
    let min_hue: f64 = 40.0;
    let max_hue: f64 = 10.0;
    let min_sat: f64 = 30.0;
    let max_sat: f64 = 55.0;
    let max_light: f64 = 60.0;
    let min_light: f64 = 30.0;

    tags.into_iter()
        .map(|tag| {
            // Logarithmic scaling
            let ratio = if max_count == min_count {
                0.5
            } else {
                let log_count = (tag.count as f64).ln();
                let log_min = min_count.ln();
                let log_max = max_count.ln();
                (log_count - log_min) / (log_max - log_min)
            };

            let font_size = min_size + ratio * (max_size - min_size);
            let hue = min_hue + ratio * (max_hue - min_hue);
            let sat = min_sat + ratio * (max_sat - min_sat);
            let light = max_light - ratio * (max_light - min_light);

            TagCloudItem {
                href: format!("/tags/{}", encode_segment(&tag.label)),
                label: tag.label,
                count: tag.count,
                font_size: format!("{:.2}rem", font_size),
                color: format!("hsl({:.0}, {:.0}%, {:.0}%)", hue, sat, light),
            }
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tags/{label}", get(show_tag))
}

async fn list_tags(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<impl IntoResponse, AppError> {
    let tag_counts: Vec<TagWithCount> = entries::list_tags_with_counts(&state.db)
        .await?
        .into_iter()
        .map(|(label, count)| TagWithCount { label, count })
        .collect();

    let template = TagListTemplate {
        tags: build_tag_cloud(tag_counts),
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}

async fn show_tag(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(label): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let list = entries::list_by_tag(&state.db, &label).await?;

    let template = TagShowTemplate {
        label,
        entries: entry_views(&state, list).await?,
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}
