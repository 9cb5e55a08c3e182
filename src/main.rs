use std::io;

use bakery_checkout::config::AppConfig;
use bakery_checkout::{build_server, create_pool, run_migrations, AppState};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("{}", e);
        io::Error::other(e)
    })?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let state = AppState::from_config(pool, &config).map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (currency {})",
        config.host,
        config.port,
        config.currency
    );

    build_server(state, &config.host, config.port)?.await
}
