// Response shapes. Nothing here carries a password hash or token version.

use serde::Serialize;

use crate::core::{CommentId, PostId, Timestamp, UserId};
use crate::entities::{CommentWithAuthor, EntUser, Media, PostWithAuthor};
use crate::infrastructure::{Ad, TokenPair};
use crate::services::gamification::GamificationLevel;

/// The public face of an author: nickname and avatar only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: UserId,
    pub nick_name: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub post_id: PostId,
    pub comment: String,
    pub user: AuthorSummary,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        CommentView {
            id: row.comment.id,
            post_id: row.comment.post_id,
            comment: row.comment.comment,
            user: AuthorSummary {
                id: row.comment.user_id,
                nick_name: row.author_nick_name,
                profile_image: row.author_profile_image,
            },
            created_at: row.comment.created_at,
            updated_at: row.comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
}

/// A post as the viewer sees it: counters, author, last comment and the viewer's own flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub user_id: UserId,
    pub user: AuthorSummary,
    pub description: Option<String>,
    pub multimedia: Vec<Media>,
    pub location: Option<Location>,
    pub likes: i64,
    pub total_comments: i64,
    pub last_comment: Option<CommentView>,
    pub is_liked: bool,
    pub is_bookmarked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PostView {
    pub fn assemble(
        row: PostWithAuthor,
        last_comment: Option<CommentView>,
        is_liked: bool,
        is_bookmarked: bool,
    ) -> Self {
        let post = row.post;
        let location = match (post.latitude, post.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
                city: post.city,
            }),
            _ => None,
        };

        PostView {
            id: post.id,
            user_id: post.user_id,
            user: AuthorSummary {
                id: post.user_id,
                nick_name: row.author_nick_name,
                profile_image: row.author_profile_image,
            },
            description: post.description,
            multimedia: post.multimedia.0,
            location,
            likes: post.likes,
            total_comments: post.total_comments,
            last_comment,
            is_liked,
            is_bookmarked,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Timeline entry when ads are mixed in.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedItem {
    Post(PostView),
    Ad(Ad),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub nick_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub gamification_level: GamificationLevel,
    pub number_of_followers: i64,
    pub number_of_following: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserView {
    /// The account owner's own view, email included.
    pub fn private(user: EntUser) -> Self {
        let email = user.email.clone();
        let mut view = Self::public(user);
        view.email = Some(email);
        view
    }

    pub fn public(user: EntUser) -> Self {
        UserView {
            id: user.id,
            nick_name: user.nick_name,
            email: None,
            name: user.name,
            last_name: user.last_name,
            gender: user.gender,
            profile_image: user.profile_image,
            cover_image: user.cover_image,
            description: user.description,
            is_verified: user.is_verified,
            gamification_level: GamificationLevel::from_level(user.gamification_level),
            number_of_followers: user.number_of_followers,
            number_of_following: user.number_of_following,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Row in follower/following lists and search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub nick_name: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    pub gamification_level: GamificationLevel,
}

impl From<EntUser> for UserSummary {
    fn from(user: EntUser) -> Self {
        UserSummary {
            id: user.id,
            nick_name: user.nick_name,
            name: user.name,
            last_name: user.last_name,
            profile_image: user.profile_image,
            gamification_level: GamificationLevel::from_level(user.gamification_level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub number_of_followers: i64,
    pub number_of_following: i64,
    pub number_of_posts: i64,
    pub number_of_comments: i64,
    pub number_of_likes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenValidation {
    pub valid: bool,
    pub user: UserView,
}
