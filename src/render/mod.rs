//! Feed body markup and RSS serialization.

pub mod description;
pub mod feed;
