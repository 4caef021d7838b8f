use sqlx::SqliteConnection;
use std::collections::BTreeSet;

use crate::models::EntryTag;
use crate::services::tags;

/// Splits a comma-separated tag string into distinct labels. Pieces are
/// trimmed at the edges only; blank pieces are dropped and case is kept.
pub fn parse_labels(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Labels currently attached to the entry, alphabetically.
pub async fn list_tags(conn: &mut SqliteConnection, entry_id: &str) -> Result<Vec<String>, sqlx::Error> {
    let labels: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT t.label FROM tags t
        JOIN entry_tags et ON et.tag_id = t.id
        WHERE et.entry_id = ?
        ORDER BY t.label ASC
        "#
    )
    .bind(entry_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(labels.into_iter().map(|(label,)| label).collect())
}

async fn associate(conn: &mut SqliteConnection, entry_id: &str, label: &str) -> Result<(), sqlx::Error> {
    let tag = tags::get_or_create(conn, label).await?;

    // Already-linked pairs are ignored.
    sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)")
        .bind(entry_id)
        .bind(&tag.id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn dissociate(conn: &mut SqliteConnection, entry_id: &str, label: &str) -> Result<(), sqlx::Error> {
    let Some(tag) = tags::find_by_label(conn, label).await? else {
        return Ok(());
    };

    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ? AND tag_id = ?")
        .bind(entry_id)
        .bind(&tag.id)
        .execute(&mut *conn)
        .await?;

    tags::delete_if_orphaned(conn, &tag.id).await?;
    Ok(())
}

/// Attaches every label in `raw` to the entry and returns the labels applied.
pub async fn apply_tags(
    conn: &mut SqliteConnection,
    entry_id: &str,
    raw: &str,
) -> Result<BTreeSet<String>, sqlx::Error> {
    let labels = parse_labels(raw);
    for label in &labels {
        associate(conn, entry_id, label).await?;
    }
    Ok(labels)
}

/// Makes the entry's tags exactly `desired`. Removals happen before
/// additions, and every released tag is collected if nothing else uses it.
pub async fn reconcile_tags(
    conn: &mut SqliteConnection,
    entry_id: &str,
    desired: &BTreeSet<String>,
) -> Result<(), sqlx::Error> {
    let current: BTreeSet<String> = list_tags(conn, entry_id).await?.into_iter().collect();

    for label in current.difference(desired) {
        dissociate(conn, entry_id, label).await?;
    }

    for label in desired.difference(&current) {
        associate(conn, entry_id, label).await?;
    }

    Ok(())
}

/// Removes every association of the entry, collecting orphaned tags. Must run
/// before the entry row itself is deleted.
pub async fn delete_all_for_entry(conn: &mut SqliteConnection, entry_id: &str) -> Result<(), sqlx::Error> {
    let links: Vec<EntryTag> = sqlx::query_as("SELECT * FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .fetch_all(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .execute(&mut *conn)
        .await?;

    for link in links {
        tags::delete_if_orphaned(conn, &link.tag_id).await?;
    }

    Ok(())
}
