// Services - business rules on top of the entity layer
pub mod ads_service;
pub mod auth_service;
pub mod engagement_service;
pub mod feed_service;
pub mod follow_service;
pub mod gamification;
pub mod post_service;
pub mod user_service;

pub use ads_service::AdService;
pub use auth_service::AuthService;
pub use engagement_service::EngagementService;
pub use feed_service::{FeedService, TimelineRequest};
pub use follow_service::FollowService;
pub use gamification::GamificationLevel;
pub use post_service::PostService;
pub use user_service::UserService;
