use sqlx::SqlitePool;
use crate::service::answer::{self, AnswerPayload};
use actix_web::{web, Error, HttpResponse};

// Anonymous submission; respondents carry no identity.
pub async fn task(
    pool: web::Data<SqlitePool>,
    survey_id: web::Path<i64>,
    form_data: web::Json<AnswerPayload>,
) -> Result<HttpResponse, Error> {
    match answer::submit(&pool, survey_id.into_inner(), form_data.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Created()
            .content_type("application/json")
            .json(detail)),
        Err(error) => Ok(error.to_response()),
    }
}
