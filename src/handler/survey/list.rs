use sqlx::SqlitePool;
use crate::config::Config;
use crate::service::survey;
use serde::{Deserialize, Serialize};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use crate::Middleware::Auth::require_access;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Query {
    page: Option<u32>,
    per_page: Option<u32>,
}

pub async fn task(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    query: web::Query<Query>,
) -> Result<HttpResponse, Error> {
    let user = require_access(&req, &config.jwt_secret)?;

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(5).min(50);

    match survey::list(&pool, user.user_id, page, per_page).await {
        Ok(page) => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .json(page)),
        Err(error) => Ok(error.to_response()),
    }
}
