use actix_web::{web, App, HttpServer};
use surveyor_backend::{builtins, config::Config, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::load();
    let port = config.port;

    let pool = builtins::sqlite::connect(&config.database_url)
        .await
        .expect("Database misconfigured!");

    let pool = web::Data::new(pool);
    let config = web::Data::new(config);

    log::info!("listening on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(config.clone())
            .configure(routes::survey::router)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
