use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{is_unique_violation, JournalError};
use crate::models::{Entry, EntryInput, User};
use crate::services::{entry_tags, tags};

async fn slug_taken(
    conn: &mut SqliteConnection,
    slug: &str,
    except_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let (taken,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE slug = ? AND id IS NOT ?)"
    )
    .bind(slug)
    .bind(except_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(taken)
}

fn map_slug_conflict(e: sqlx::Error, slug: &str) -> JournalError {
    if is_unique_violation(&e) {
        JournalError::DuplicateSlug(slug.to_string())
    } else {
        JournalError::Database(e)
    }
}

/// Creates an entry owned by `author` and attaches its tags.
pub async fn create_entry(
    pool: &SqlitePool,
    author: &User,
    input: &EntryInput,
) -> Result<Entry, JournalError> {
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(JournalError::Validation(errors));
    }

    let now = Utc::now().to_rfc3339();
    let entry = Entry {
        id: Uuid::new_v4().to_string(),
        author_id: author.id.clone(),
        title: input.title.trim().to_string(),
        date: input.date_or_today(),
        time_spent: input.time_spent,
        content: input.content.clone(),
        resources: input.resources.clone(),
        slug: input.slug(),
        created_at: now.clone(),
        updated_at: now,
    };

    let mut tx = pool.begin().await?;

    if slug_taken(&mut tx, &entry.slug, None).await? {
        return Err(JournalError::DuplicateSlug(entry.slug));
    }

    sqlx::query(
        r#"
        INSERT INTO entries (id, author_id, title, date, time_spent, content, resources, slug, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(&entry.id)
    .bind(&entry.author_id)
    .bind(&entry.title)
    .bind(&entry.date)
    .bind(entry.time_spent)
    .bind(&entry.content)
    .bind(&entry.resources)
    .bind(&entry.slug)
    .bind(&entry.created_at)
    .bind(&entry.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_slug_conflict(e, &entry.slug))?;

    entry_tags::apply_tags(&mut tx, &entry.id, &input.tags).await?;

    tx.commit().await?;
    Ok(entry)
}

/// Rewrites the entry's fields and brings its tags in line with
/// `input.tags`. Only the author may do this.
pub async fn update_entry(
    pool: &SqlitePool,
    entry: &Entry,
    acting_user: &User,
    input: &EntryInput,
) -> Result<Entry, JournalError> {
    if entry.author_id != acting_user.id {
        return Err(JournalError::Permission);
    }

    let errors = input.validate();
    if !errors.is_empty() {
        return Err(JournalError::Validation(errors));
    }

    let updated = Entry {
        title: input.title.trim().to_string(),
        date: input.date_or_today(),
        time_spent: input.time_spent,
        content: input.content.clone(),
        resources: input.resources.clone(),
        slug: input.slug(),
        updated_at: Utc::now().to_rfc3339(),
        ..entry.clone()
    };

    let mut tx = pool.begin().await?;

    if slug_taken(&mut tx, &updated.slug, Some(&entry.id)).await? {
        return Err(JournalError::DuplicateSlug(updated.slug));
    }

    let result = sqlx::query(
        r#"
        UPDATE entries
        SET title = ?, date = ?, time_spent = ?, content = ?, resources = ?, slug = ?, updated_at = ?
        WHERE id = ? AND author_id = ?
        "#
    )
    .bind(&updated.title)
    .bind(&updated.date)
    .bind(updated.time_spent)
    .bind(&updated.content)
    .bind(&updated.resources)
    .bind(&updated.slug)
    .bind(&updated.updated_at)
    .bind(&entry.id)
    .bind(&acting_user.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_slug_conflict(e, &updated.slug))?;

    if result.rows_affected() == 0 {
        return Err(JournalError::NotFound);
    }

    let desired = entry_tags::parse_labels(&input.tags);
    entry_tags::reconcile_tags(&mut tx, &entry.id, &desired).await?;

    tx.commit().await?;
    Ok(updated)
}

/// Removes the entry's associations, then the entry. Only the author may do
/// this.
pub async fn delete_entry(pool: &SqlitePool, entry: &Entry, acting_user: &User) -> Result<(), JournalError> {
    if entry.author_id != acting_user.id {
        return Err(JournalError::Permission);
    }

    let mut tx = pool.begin().await?;

    entry_tags::delete_all_for_entry(&mut tx, &entry.id).await?;

    let result = sqlx::query("DELETE FROM entries WHERE id = ? AND author_id = ?")
        .bind(&entry.id)
        .bind(&acting_user.id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(JournalError::NotFound);
    }

    tx.commit().await?;
    Ok(())
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Entry, JournalError> {
    let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    entry.ok_or(JournalError::NotFound)
}

/// All entries, most recent date first.
pub async fn list_entries(pool: &SqlitePool) -> Result<Vec<Entry>, JournalError> {
    let entries = sqlx::query_as("SELECT * FROM entries ORDER BY date DESC, created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(entries)
}

pub async fn list_entries_for_author(pool: &SqlitePool, author_id: &str) -> Result<Vec<Entry>, JournalError> {
    let entries = sqlx::query_as("SELECT * FROM entries WHERE author_id = ? ORDER BY date DESC, created_at DESC")
        .bind(author_id)
        .fetch_all(pool)
        .await?;

    Ok(entries)
}

/// Entries tagged with exactly `label`. An unknown label is `NotFound`, not
/// an empty list.
pub async fn list_by_tag(pool: &SqlitePool, label: &str) -> Result<Vec<Entry>, JournalError> {
    let mut conn = pool.acquire().await?;

    let tag = tags::find_by_label(&mut conn, label)
        .await?
        .ok_or(JournalError::NotFound)?;

    let entries = sqlx::query_as(
        r#"
        SELECT e.* FROM entries e
        JOIN entry_tags et ON et.entry_id = e.id
        WHERE et.tag_id = ?
        ORDER BY e.date DESC, e.created_at DESC
        "#
    )
    .bind(&tag.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(entries)
}

pub async fn list_tags(pool: &SqlitePool, entry_id: &str) -> Result<Vec<String>, JournalError> {
    let mut conn = pool.acquire().await?;
    Ok(entry_tags::list_tags(&mut conn, entry_id).await?)
}

/// Every tag with the number of entries using it, alphabetically.
pub async fn list_tags_with_counts(pool: &SqlitePool) -> Result<Vec<(String, i64)>, JournalError> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.label, COUNT(et.entry_id) as count
        FROM tags t
        JOIN entry_tags et ON et.tag_id = t.id
        GROUP BY t.id
        ORDER BY t.label ASC
        "#
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}
