// Request bodies and query strings

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::entities::{Media, ProfileChanges};

static NICK_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]{3,30}$").expect("nickname pattern is valid"));

pub fn is_valid_nick_name(nick_name: &str) -> bool {
    NICK_NAME_RE.is_match(nick_name)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "nickName must be 3 to 30 characters"))]
    pub nick_name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, max = 16, message = "totpCode is required"))]
    pub totp_code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refreshToken is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(length(min = 1, message = "newPassword is required"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 2200, message = "description is too long"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "multimedia must contain at least one item"))]
    pub multimedia: Vec<Media>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[serde(alias = "comment")]
    #[validate(length(min = 1, max = 1000, message = "content must be 1 to 1000 characters"))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 60))]
    pub name: Option<String>,
    #[validate(length(max = 60))]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    pub gender: Option<String>,
    #[validate(length(max = 2048))]
    pub profile_image: Option<String>,
    #[validate(length(max = 2048))]
    pub cover_image: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            name: req.name,
            last_name: req.last_name,
            gender: req.gender,
            profile_image: req.profile_image,
            cover_image: req.cover_image,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    #[validate(length(min = 1, message = "newPassword is required"))]
    pub new_password: String,
}

/// `GET /timeline`. Every field is a raw string so bad values can fall back to defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub scope: Option<String>,
    pub with_ads: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchQuery {
    pub input: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_name_pattern() {
        assert!(is_valid_nick_name("ana.maria_92"));
        assert!(!is_valid_nick_name("ab"));
        assert!(!is_valid_nick_name("has space"));
        assert!(!is_valid_nick_name("emoji🙂"));
    }

    #[test]
    fn empty_multimedia_fails_validation() {
        let req: CreatePostRequest = serde_json::from_str(r#"{"description":"hi"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreatePostRequest =
            serde_json::from_str(r#"{"multimedia":[{"url":"https://x/y.jpg","type":"image"}]}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn comment_accepts_either_field_name() {
        let a: CreateCommentRequest = serde_json::from_str(r#"{"content":"nice"}"#).unwrap();
        let b: CreateCommentRequest = serde_json::from_str(r#"{"comment":"nice"}"#).unwrap();
        assert_eq!(a.content, b.content);
    }
}
