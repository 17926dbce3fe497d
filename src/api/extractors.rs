// Request extractors shared by the handlers

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// `Json<T>` that also runs `T`'s field validation. Malformed bodies and failed rules both
/// come back as 400 with the usual `{message, status}` body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(Self(value))
    }
}

/// Parse an id taken from the path; anything that is not a decimal id is a 400.
pub fn parse_id<T: FromStr>(raw: &str, name: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PostId;

    #[test]
    fn path_ids_must_be_numeric() {
        assert_eq!(parse_id::<PostId>("42", "postId").unwrap(), PostId(42));
        let err = parse_id::<PostId>("not-an-id", "postId").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
