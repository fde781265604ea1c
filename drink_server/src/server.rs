use std::time::Duration;

use actix_cors::Cors;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use drink_engine::{DrinkApi, SqliteDatabase};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    routes::{configure_drink_routes, health, not_found},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    // One verifier for all workers, so that every worker sees the same key cache
    let verifier = web::Data::new(TokenVerifier::new(config.auth.clone()));
    info!(
        "🔑️ Tokens must be issued by {} for {}. Signing keys come from {}",
        config.auth.issuer, config.auth.audience, config.auth.jwks_url
    );
    let srv = HttpServer::new(move || {
        let drinks_api = DrinkApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("drinks::access_log"))
            .wrap(Cors::permissive())
            .app_data(web::Data::new(drinks_api))
            .app_data(verifier.clone())
            .service(health)
            .configure(configure_drink_routes::<SqliteDatabase>)
            .default_service(web::to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
