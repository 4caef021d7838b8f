use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::services::entries;
use crate::AppState;

#[derive(Serialize)]
struct ExportEntry {
    title: String,
    slug: String,
    date: String,
    time_spent: i64,
    content: String,
    resources: String,
    created_at: String,
    updated_at: String,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct ExportData {
    exported_at: String,
    username: String,
    entries: Vec<ExportEntry>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/export", get(export_data))
}

async fn export_data(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let mut export_entries = Vec::new();

    for entry in entries::list_entries_for_author(&state.db, &user.id).await? {
        let tags = entries::list_tags(&state.db, &entry.id).await?;

        export_entries.push(ExportEntry {
            title: entry.title,
            slug: entry.slug,
            date: entry.date,
            time_spent: entry.time_spent,
            content: entry.content,
            resources: entry.resources,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            tags,
        });
    }

    let export = ExportData {
        exported_at: chrono::Utc::now().to_rfc3339(),
        username: user.username,
        entries: export_entries,
    };

    let filename = format!("journal-export-{}.json", chrono::Local::now().format("%Y-%m-%d"));
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&content_disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Json(export)))
}
