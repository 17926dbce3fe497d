// Core types and primitives

pub mod pagination;
pub mod strong_types;

pub use pagination::{Page, PageQuery, SortField, SortOrder};
pub use strong_types::{CommentId, PostId, Timestamp, UserId};
