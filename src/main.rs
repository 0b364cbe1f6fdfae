use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;
use mockable::DefaultClock;

use stadium_booking::config::StoreBackend;
use stadium_booking::database::{PgStore, init_database};
use stadium_booking::middleware::RequestIdMiddleware;
use stadium_booking::services::{LogNotifier, PgNotifier};
use stadium_booking::{AppState, BookingStore, Config, MemoryStore, NotificationSink, routes};

#[get("/health")]
async fn health(state: web::Data<Backend>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "store": state.0,
        "timestamp": chrono::Utc::now()
    }))
}

struct Backend(&'static str);

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env when present)
    let config = Config::from_env()?;

    env_logger::init();

    log::info!(
        "Starting stadium booking API (environment: {})",
        config.environment
    );

    let (store, notifier): (Arc<dyn BookingStore>, Arc<dyn NotificationSink>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let pool =
                    init_database(&config.database_url, config.database_max_connections).await?;
                log::info!("Database initialized");
                (
                    Arc::new(PgStore::new(pool.clone())),
                    Arc::new(PgNotifier::new(pool)),
                )
            }
            StoreBackend::Memory => {
                log::warn!("Using the in-memory store; data is lost on shutdown");
                (Arc::new(MemoryStore::new()), Arc::new(LogNotifier))
            }
        };

    let backend = web::Data::new(Backend(store.backend_tag()));
    let app_state = web::Data::new(AppState::new(store, notifier, Arc::new(DefaultClock)));
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    let allowed_origin = config.client_base_url.clone();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .app_data(backend.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&allowed_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(health)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
