use sqlx::SqliteConnection;

use crate::models::Tag;

pub async fn find_by_label(
    conn: &mut SqliteConnection,
    label: &str,
) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tags WHERE label = ?")
        .bind(label)
        .fetch_optional(&mut *conn)
        .await
}

/// Returns the tag with exactly this label, creating it first if needed.
/// Repeated calls with the same label never produce a second row.
pub async fn get_or_create(conn: &mut SqliteConnection, label: &str) -> Result<Tag, sqlx::Error> {
    let tag = Tag::new(label.to_string());

    sqlx::query("INSERT OR IGNORE INTO tags (id, label, created_at) VALUES (?, ?, ?)")
        .bind(&tag.id)
        .bind(&tag.label)
        .bind(&tag.created_at)
        .execute(&mut *conn)
        .await?;

    sqlx::query_as("SELECT * FROM tags WHERE label = ?")
        .bind(label)
        .fetch_one(&mut *conn)
        .await
}

/// Deletes the tag if no entry references it any more. Returns whether a row
/// was removed.
pub async fn delete_if_orphaned(conn: &mut SqliteConnection, tag_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM tags
        WHERE id = ? AND NOT EXISTS (SELECT 1 FROM entry_tags WHERE tag_id = tags.id)
        "#
    )
    .bind(tag_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
