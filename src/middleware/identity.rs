use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::Error;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Caller identity forwarded by the upstream auth gateway. Session handling
/// and verification happen there; this service only needs the stable uid and
/// a display name.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Unauthorized("missing user identity".to_string()))?;

        // Display names may carry CJK characters, which are opaque bytes at
        // the header layer.
        let display_name = parts
            .headers
            .get(USER_NAME_HEADER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
            .unwrap_or_default();

        Ok(Identity { uid, display_name })
    }
}
