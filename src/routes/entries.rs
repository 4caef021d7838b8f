use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::{AuthUser, MaybeUser};
use crate::error::{AppError, JournalError};
use crate::models::{entry::DATE_FORMAT, Entry, EntryInput, User};
use crate::routes::TagLink;
use crate::services::entries;
use crate::AppState;

#[derive(Template)]
#[template(path = "entries/list.html")]
struct EntryListTemplate {
    heading: String,
    entries: Vec<EntryView>,
    static_hash: &'static str,
    user: Option<User>,
}

#[derive(Template)]
#[template(path = "entries/detail.html")]
struct EntryDetailTemplate {
    entry: Entry,
    tags: Vec<TagLink>,
    is_author: bool,
    static_hash: &'static str,
    user: Option<User>,
}

#[derive(Template)]
#[template(path = "entries/form.html")]
struct EntryFormTemplate {
    heading: &'static str,
    action: String,
    form: EntryForm,
    errors: HashMap<String, String>,
    static_hash: &'static str,
    user: Option<User>,
}

pub struct EntryView {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub time_spent: i64,
    pub tags: Vec<TagLink>,
}

/// Raw form fields. Numbers and dates stay strings here so that bad input is
/// reported next to the field instead of rejecting the request.
#[derive(Deserialize, Default, Clone)]
pub struct EntryForm {
    title: String,
    #[serde(default)]
    date: String,
    time_spent: String,
    content: String,
    resources: String,
    tags: String,
}

impl EntryForm {
    fn from_entry(entry: &Entry, tags: &[String]) -> Self {
        Self {
            title: entry.title.clone(),
            date: entry.date.clone(),
            time_spent: entry.time_spent.to_string(),
            content: entry.content.clone(),
            resources: entry.resources.clone(),
            tags: tags.join(", "),
        }
    }

    fn to_input(&self) -> Result<EntryInput, HashMap<String, String>> {
        let mut errors = HashMap::new();

        let date = match self.date.trim() {
            "" => None,
            s => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.insert("date".to_string(), "Date must be YYYY-MM-DD".to_string());
                    None
                }
            },
        };

        let time_spent = match self.time_spent.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                errors.insert("time_spent".to_string(), "Time spent must be a whole number".to_string());
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(EntryInput {
            title: self.title.clone(),
            date,
            time_spent,
            content: self.content.clone(),
            resources: self.resources.clone(),
            tags: self.tags.clone(),
        })
    }
}

/// Validation and slug conflicts go back to the form; anything else is an
/// application error.
fn form_errors(e: JournalError) -> Result<HashMap<String, String>, AppError> {
    match e {
        JournalError::Validation(errors) => Ok(errors),
        JournalError::DuplicateSlug(_) => {
            let mut errors = HashMap::new();
            errors.insert(
                "title".to_string(),
                "An entry with that title already exists".to_string(),
            );
            Ok(errors)
        }
        other => Err(other.into()),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/new", get(new_entry_form))
        .route(
            "/entries/{slug}",
            get(show_entry).post(update_entry).delete(delete_entry_htmx),
        )
        .route("/entries/{slug}/edit", get(edit_entry_form))
        .route("/entries/{slug}/delete", post(delete_entry))
}

pub(crate) async fn entry_views(state: &AppState, list: Vec<Entry>) -> Result<Vec<EntryView>, AppError> {
    let mut views = Vec::with_capacity(list.len());
    for entry in list {
        let tags = entries::list_tags(&state.db, &entry.id).await?;
        views.push(EntryView {
            title: entry.title,
            slug: entry.slug,
            date: entry.date,
            time_spent: entry.time_spent,
            tags: tags.into_iter().map(TagLink::new).collect(),
        });
    }
    Ok(views)
}

async fn list_entries(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<impl IntoResponse, AppError> {
    let list = entries::list_entries(&state.db).await?;

    let template = EntryListTemplate {
        heading: "Journal Entries".to_string(),
        entries: entry_views(&state, list).await?,
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}

async fn show_entry(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = entries::find_by_slug(&state.db, &slug).await?;
    let tags = entries::list_tags(&state.db, &entry.id).await?;

    let template = EntryDetailTemplate {
        is_author: user.as_ref().is_some_and(|u| u.id == entry.author_id),
        entry,
        tags: tags.into_iter().map(TagLink::new).collect(),
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}

fn render_form(
    heading: &'static str,
    action: String,
    form: EntryForm,
    errors: HashMap<String, String>,
    user: User,
) -> Result<Response, AppError> {
    let template = EntryFormTemplate {
        heading,
        action,
        form,
        errors,
        static_hash: crate::STATIC_HASH,
        user: Some(user),
    };
    Ok(Html(template.render()?).into_response())
}

async fn new_entry_form(AuthUser(user): AuthUser) -> Result<Response, AppError> {
    render_form("New Entry", "/entries".to_string(), EntryForm::default(), HashMap::new(), user)
}

async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return render_form("New Entry", "/entries".to_string(), form, errors, user),
    };

    match entries::create_entry(&state.db, &user, &input).await {
        Ok(entry) => Ok(Redirect::to(&format!("/entries/{}", entry.slug)).into_response()),
        Err(e) => {
            let errors = form_errors(e)?;
            render_form("New Entry", "/entries".to_string(), form, errors, user)
        }
    }
}

async fn edit_entry_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let entry = entries::find_by_slug(&state.db, &slug).await?;
    if entry.author_id != user.id {
        return Err(AppError::Forbidden);
    }

    let tags = entries::list_tags(&state.db, &entry.id).await?;
    let action = format!("/entries/{}", entry.slug);
    render_form("Edit Entry", action, EntryForm::from_entry(&entry, &tags), HashMap::new(), user)
}

async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<Response, AppError> {
    let entry = entries::find_by_slug(&state.db, &slug).await?;
    if entry.author_id != user.id {
        return Err(AppError::Forbidden);
    }

    let action = format!("/entries/{}", entry.slug);
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => return render_form("Edit Entry", action, form, errors, user),
    };

    match entries::update_entry(&state.db, &entry, &user, &input).await {
        Ok(updated) => Ok(Redirect::to(&format!("/entries/{}", updated.slug)).into_response()),
        Err(e) => {
            let errors = form_errors(e)?;
            render_form("Edit Entry", action, form, errors, user)
        }
    }
}

async fn remove_entry(state: &AppState, user: &User, slug: &str) -> Result<(), AppError> {
    let entry = entries::find_by_slug(&state.db, slug).await?;
    entries::delete_entry(&state.db, &entry, user).await?;
    Ok(())
}

async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_entry(&state, &user, &slug).await?;
    Ok(Redirect::to("/"))
}

async fn delete_entry_htmx(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_entry(&state, &user, &slug).await?;
    // htmx follows the header instead of swapping the body
    Ok(([("HX-Redirect", "/")], ""))
}
