use serde_json::json;
use crate::BuiltIns::jwt;
use actix_web::{Error, HttpRequest};

#[derive(Debug)]
pub struct User {
    pub user_id: i64,
}

pub fn require_access(req: &HttpRequest, secret: &str) -> Result<User, Error> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let Some(auth_header) = auth_header else {
        return Err(actix_web::error::ErrorUnauthorized(
            json!({ "error": "Missing authorization header" }),
        ));
    };

    let token = auth_header.trim_start_matches("Bearer ").to_string();

    // Validate access token
    let claims = jwt::verify(&token, secret).map_err(|err| {
        log::error!("{:?}", err);
        actix_web::error::ErrorUnauthorized(
            json!({ "error": "Invalid authorization token" }),
        )
    })?;

    Ok(User {
        user_id: claims.sub,
    })
}
