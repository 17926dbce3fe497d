use crate::core::UserId;

/// The authenticated user a request acts on behalf of.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: UserId,
    pub token_version: i64,
    pub request_id: String,
}

impl ViewerContext {
    pub fn new(user_id: UserId, token_version: i64) -> Self {
        ViewerContext {
            user_id,
            token_version,
            request_id: format!("req-{}", uuid::Uuid::new_v4()),
        }
    }
}
