pub mod compare;
pub mod content_hash;
pub mod records;
