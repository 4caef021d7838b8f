use sqlx::SqlitePool;

use crate::error::JournalError;
use crate::services::users;

/// `journal create-user <username> <email> <password>`
pub async fn create_user(pool: &SqlitePool, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [username, email, password] = args else {
        return Err("usage: journal create-user <username> <email> <password>".into());
    };

    match users::register(pool, username, email, password).await {
        Ok(user) => {
            println!("Created user:");
            println!("  ID: {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Email: {}", user.email);
            Ok(())
        }
        Err(JournalError::Validation(errors)) => {
            let mut messages: Vec<String> = errors.into_values().collect();
            messages.sort();
            Err(messages.join("; ").into())
        }
        Err(e) => Err(e.into()),
    }
}
