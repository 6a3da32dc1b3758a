use sqlx::SqlitePool;
use crate::config::Config;
use crate::service::survey;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use crate::Middleware::Auth::require_access;

pub async fn task(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    survey_id: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    let user = require_access(&req, &config.jwt_secret)?;

    let result = survey::delete(
        &pool,
        &config.public_dir,
        user.user_id,
        survey_id.into_inner(),
    )
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(error) => Ok(error.to_response()),
    }
}
