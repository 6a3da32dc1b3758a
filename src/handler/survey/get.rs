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

    match survey::get(&pool, user.user_id, survey_id.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .json(detail)),
        Err(error) => Ok(error.to_response()),
    }
}
