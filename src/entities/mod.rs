// Entities - one module per table, each owning its queries

pub mod ent_comment;
pub mod ent_follow;
pub mod ent_post;
pub mod ent_reaction;
pub mod ent_user;
pub mod ent_verification_code;

pub use ent_comment::{CommentWithAuthor, EntComment};
pub use ent_follow::EntFollow;
pub use ent_post::{EntPost, Media, MediaKind, PostQuery, PostScope, PostWithAuthor};
pub use ent_reaction::Reaction;
pub use ent_user::{EntUser, NewUser, ProfileChanges};
pub use ent_verification_code::EntVerificationCode;
