use actix_web::web;
use crate::Handler;

pub fn router(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/surveys")
            //Owner's paginated list
            .route(web::get().to(Handler::Survey::List::task))
            //Create
            .route(web::post().to(Handler::Survey::Create::task)),
    )
    .service(
        web::resource("/surveys/{id}")
            .route(web::get().to(Handler::Survey::Get::task))
            .route(web::put().to(Handler::Survey::Update::task))
            .route(web::patch().to(Handler::Survey::Update::task))
            .route(web::delete().to(Handler::Survey::Delete::task)),
    )
    //Anonymous answering
    .route(
        "/surveys/{id}/answer",
        web::post().to(Handler::Survey::Answer::task),
    )
    //Guest view
    .route(
        "/survey-public/{id}",
        web::get().to(Handler::Survey::Guest::task),
    );
}
