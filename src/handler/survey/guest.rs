use sqlx::SqlitePool;
use crate::service::survey;
use actix_web::{web, Error, HttpResponse};

// Public view of a shared survey, no identity required.
pub async fn task(
    pool: web::Data<SqlitePool>,
    survey_id: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    match survey::get_public(&pool, survey_id.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .json(detail)),
        Err(error) => Ok(error.to_response()),
    }
}
