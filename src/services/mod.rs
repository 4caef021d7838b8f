//! Entry, tag and user operations. Each public operation that writes runs in
//! its own transaction; the tag store and association helpers take a
//! connection so they can be composed inside one.

pub mod entries;
pub mod entry_tags;
pub mod tags;
pub mod users;
