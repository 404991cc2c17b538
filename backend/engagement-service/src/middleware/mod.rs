/// HTTP middleware utilities for engagement-service
///
/// Authentication itself lives at the gateway: it validates the caller's
/// token and forwards the resolved identity in the `x-user-id` header. This
/// service only extracts that identity.
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Identity of the authenticated caller, as forwarded by the gateway.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get("x-user-id")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ErrorUnauthorized("Missing x-user-id header"))
            .and_then(|raw| {
                Uuid::parse_str(raw).map_err(|_| ErrorUnauthorized("Invalid user ID"))
            })
            .map(UserId);

        ready(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_rt::test]
    async fn test_extracts_forwarded_identity() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header(("x-user-id", id.to_string()))
            .to_http_request();

        let extracted = UserId::extract(&req).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[actix_rt::test]
    async fn test_rejects_missing_header() {
        let req = TestRequest::default().to_http_request();
        assert!(UserId::extract(&req).await.is_err());
    }

    #[actix_rt::test]
    async fn test_rejects_malformed_identity() {
        let req = TestRequest::default()
            .insert_header(("x-user-id", "not-a-uuid"))
            .to_http_request();
        assert!(UserId::extract(&req).await.is_err());
    }
}
