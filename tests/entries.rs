mod common;

use axum::http::StatusCode;
use common::{all_tags, assert_hx_redirect, assert_redirect, body_string, count, create_entry, TestApp};

const GO_BASICS: &str = "title=Go+Basics&date=2024-03-09&time_spent=45&content=Goroutines+are+cheap&resources=Tour+of+Go&tags=go%2C+concurrency";

#[tokio::test]
async fn create_entry_with_valid_form() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;

    let resp = app.post_form("/entries", GO_BASICS, Some(&cookie)).await;
    assert_redirect(&resp, "/entries/go-basics");

    let resp = app.get("/", None).await;
    let html = body_string(resp).await;
    assert!(html.contains("Go Basics"));
    assert!(html.contains("2024-03-09"));
    assert!(html.contains("href=\"/tags/concurrency\""));

    assert_eq!(all_tags(&app.db).await, vec!["concurrency", "go"]);
}

#[tokio::test]
async fn entry_detail_is_public() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    create_entry(&app.db, &user, "Go Basics", "go").await;

    let resp = app.get("/entries/go-basics", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Notes about Go Basics"));
    assert!(!html.contains("Edit Entry"));
}

#[tokio::test]
async fn author_sees_edit_controls() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;
    create_entry(&app.db, &user, "Go Basics", "go").await;

    let html = body_string(app.get("/entries/go-basics", Some(&cookie)).await).await;
    assert!(html.contains("href=\"/entries/go-basics/edit\""));
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = TestApp::new().await;
    let resp = app.get("/entries/nothing-here", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_entry_with_empty_title_shows_error() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;

    let body = "title=&date=&time_spent=10&content=Something&resources=Somewhere&tags=misc";
    let resp = app.post_form("/entries", body, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Title is required"));
    // Input is echoed back
    assert!(html.contains("Somewhere"));
    assert_eq!(count(&app.db, "entries").await, 0);
}

#[tokio::test]
async fn create_entry_with_bad_time_spent_shows_error() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;

    let body = "title=Test&date=&time_spent=lots&content=c&resources=r&tags=misc";
    let resp = app.post_form("/entries", body, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Time spent must be a whole number"));
}

#[tokio::test]
async fn create_entry_without_tags_shows_error() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;

    let body = "title=Test&date=&time_spent=5&content=c&resources=r&tags=+%2C+";
    let resp = app.post_form("/entries", body, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("At least one tag is required"));
}

#[tokio::test]
async fn duplicate_title_shows_distinct_error() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;
    create_entry(&app.db, &user, "Go Basics", "go").await;

    let resp = app.post_form("/entries", GO_BASICS, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("An entry with that title already exists"));
    assert!(!html.contains("Title is required"));

    assert_eq!(count(&app.db, "entries").await, 1);
    assert_eq!(all_tags(&app.db).await, vec!["go"]);
}

#[tokio::test]
async fn edit_entry_as_author() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;
    create_entry(&app.db, &user, "Go Basics", "go, concurrency").await;

    let resp = app.get("/entries/go-basics/edit", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("value=\"Go Basics\""));
    assert!(html.contains("value=\"concurrency, go\""));

    let body = "title=Go+Channels&date=2024-04-01&time_spent=60&content=Select&resources=Effective+Go&tags=go%2C+channels";
    let resp = app.post_form("/entries/go-basics", body, Some(&cookie)).await;
    assert_redirect(&resp, "/entries/go-channels");

    assert_eq!(all_tags(&app.db).await, vec!["channels", "go"]);
    let resp = app.get("/entries/go-basics", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_entry_as_non_author_is_forbidden() {
    let app = TestApp::new().await;
    let owner = app.create_user("ana").await;
    let other = app.create_user("bob").await;
    let cookie = app.login(&other).await;
    create_entry(&app.db, &owner, "Not Yours", "private").await;

    let resp = app.get("/entries/not-yours/edit", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body = "title=Mine+Now&date=&time_spent=1&content=c&resources=r&tags=stolen";
    let resp = app.post_form("/entries/not-yours", body, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_eq!(all_tags(&app.db).await, vec!["private"]);
    let resp = app.get("/entries/not-yours", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_entry_as_author() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;
    create_entry(&app.db, &user, "Delete Me", "gone, soon").await;

    let resp = app.delete("/entries/delete-me", Some(&cookie)).await;
    assert_hx_redirect(&resp, "/");

    assert_eq!(count(&app.db, "entries").await, 0);
    assert_eq!(count(&app.db, "entry_tags").await, 0);
    assert_eq!(count(&app.db, "tags").await, 0);
}

#[tokio::test]
async fn delete_entry_with_plain_form() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;
    create_entry(&app.db, &user, "Delete Me", "gone").await;

    let resp = app.post_form("/entries/delete-me/delete", "", Some(&cookie)).await;
    assert_redirect(&resp, "/");
    assert_eq!(count(&app.db, "entries").await, 0);
}

#[tokio::test]
async fn delete_entry_as_non_author() {
    let app = TestApp::new().await;
    let owner = app.create_user("ana").await;
    let other = app.create_user("bob").await;
    let cookie = app.login(&other).await;
    create_entry(&app.db, &owner, "Not Yours", "private").await;

    let resp = app.delete("/entries/not-yours", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_eq!(count(&app.db, "entries").await, 1);
    assert_eq!(all_tags(&app.db).await, vec!["private"]);
}

#[tokio::test]
async fn delete_requires_login() {
    let app = TestApp::new().await;
    let owner = app.create_user("ana").await;
    create_entry(&app.db, &owner, "Keep Me", "kept").await;

    let resp = app.delete("/entries/keep-me", None).await;
    assert_redirect(&resp, "/login");
    assert_eq!(count(&app.db, "entries").await, 1);
}

#[tokio::test]
async fn title_with_percent_escape_is_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("ana").await;
    let cookie = app.login(&user).await;

    let body = "title=50%2520off&date=&time_spent=5&content=c&resources=r&tags=deals";
    let resp = app.post_form("/entries", body, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("That title cannot be used as a link"));
    assert_eq!(count(&app.db, "entries").await, 0);
}
