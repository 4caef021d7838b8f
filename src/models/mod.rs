pub mod user;
pub mod entry;
pub mod tag;

pub use user::User;
pub use entry::{slugify, Entry, EntryInput};
pub use tag::{EntryTag, Tag};
