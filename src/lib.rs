pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::checkout_service::CheckoutService;
use application::diagnostics_service::DiagnosticsService;
use config::{AppConfig, ConfigError};
use domain::ports::{PaymentGateway, ProductCatalog};
use errors::AppError;
use infrastructure::catalog_repo::DieselProductCatalog;
use infrastructure::stripe::StripeGateway;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payment::create_payment_intent,
        handlers::debug::debug_db,
    ),
    components(schemas(
        handlers::payment::CartLineItemRequest,
        handlers::payment::CreatePaymentIntentRequest,
        handlers::payment::CreatePaymentIntentResponse,
        handlers::payment::ErrorResponse,
        handlers::debug::DebugDbResponse,
        handlers::debug::DebugDbFailure,
        handlers::debug::ProductResponse,
        handlers::debug::CategoryResponse,
    )),
    tags(
        (name = "payment", description = "Checkout re-pricing and payment intents"),
        (name = "debug", description = "Read-only catalog inspection"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub diagnostics: Arc<DiagnosticsService>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        payments: Arc<dyn PaymentGateway>,
        currency: &str,
    ) -> Self {
        Self {
            checkout: Arc::new(CheckoutService::new(
                Arc::clone(&catalog),
                payments,
                currency,
            )),
            diagnostics: Arc::new(DiagnosticsService::new(catalog)),
        }
    }

    /// Wire the Diesel catalog and the Stripe gateway.
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Result<Self, ConfigError> {
        let payments = StripeGateway::new(&config.stripe_secret_key, &config.stripe_api_base)?;
        Ok(Self::new(
            Arc::new(DieselProductCatalog::new(pool)),
            Arc::new(payments),
            &config.currency,
        ))
    }
}

/// Route table, shared by the server and the HTTP tests.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(state.checkout))
            .app_data(web::Data::from(state.diagnostics))
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
            )
            .service(
                web::scope("/api")
                    .route(
                        "/payment",
                        web::post().to(handlers::payment::create_payment_intent),
                    )
                    .route("/debug-db", web::get().to(handlers::debug::debug_db)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .bind((host.to_string(), port))?
    .run())
}
