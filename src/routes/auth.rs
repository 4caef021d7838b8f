use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::{login_user, logout_user, MaybeUser};
use crate::error::{AppError, JournalError};
use crate::models::User;
use crate::services::users;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    email: String,
    error: Option<String>,
    static_hash: &'static str,
    user: Option<User>,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    username: String,
    email: String,
    errors: HashMap<String, String>,
    static_hash: &'static str,
    user: Option<User>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    password_confirm: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
        .route("/logout", post(logout))
}

async fn login_page(MaybeUser(user): MaybeUser) -> Result<impl IntoResponse, AppError> {
    let template = LoginTemplate {
        email: String::new(),
        error: None,
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}

async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match users::authenticate(&state.db, &form.email, &form.password).await? {
        Some(user) => {
            login_user(&session, user).await?;
            Ok(Redirect::to("/").into_response())
        }
        None => {
            let template = LoginTemplate {
                email: form.email,
                error: Some("Your email or password is incorrect".to_string()),
                static_hash: crate::STATIC_HASH,
                user: None,
            };
            Ok(Html(template.render()?).into_response())
        }
    }
}

fn render_register(form: RegisterForm, errors: HashMap<String, String>) -> Result<Response, AppError> {
    let template = RegisterTemplate {
        username: form.username,
        email: form.email,
        errors,
        static_hash: crate::STATIC_HASH,
        user: None,
    };
    Ok(Html(template.render()?).into_response())
}

async fn register_page(MaybeUser(user): MaybeUser) -> Result<impl IntoResponse, AppError> {
    let template = RegisterTemplate {
        username: String::new(),
        email: String::new(),
        errors: HashMap::new(),
        static_hash: crate::STATIC_HASH,
        user,
    };
    Ok(Html(template.render()?))
}

async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if form.password != form.password_confirm {
        let mut errors = HashMap::new();
        errors.insert("password_confirm".to_string(), "Passwords must match".to_string());
        return render_register(form, errors);
    }

    match users::register(&state.db, &form.username, &form.email, &form.password).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(JournalError::Validation(errors)) => render_register(form, errors),
        Err(JournalError::DuplicateUser) => {
            let mut errors = HashMap::new();
            errors.insert(
                "username".to_string(),
                "A user with that username or email already exists".to_string(),
            );
            render_register(form, errors)
        }
        Err(e) => Err(e.into()),
    }
}

async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    Ok(Redirect::to("/"))
}
