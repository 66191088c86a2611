use actix_web::{web, App, HttpServer, middleware::Compress};
use actix_cors::Cors;
use utoipa_swagger_ui::SwaggerUi;

use forum_api::openapi::ApiDoc;
use forum_api::repo::Repo;
use forum_api::routes::{config, AppState};
use forum_api::settings::Settings;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds; production sets the environment externally.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let settings = Settings::from_env()?;
    info!("Bootstrapping forum API");

    let repo = build_repo(&settings).await?;
    let openapi = ApiDoc::openapi();
    let state = web::Data::new(AppState { repo });

    let cors_origin = settings.cors_origin.clone();
    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .max_age(3600);
            if let Some(origin) = &cors_origin {
                c = c.allowed_origin(origin);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind(settings.bind_addr.as_str())?;

    info!("Listening on http://{}", settings.bind_addr);

    server.run().await?;
    Ok(())
}

#[cfg(feature = "postgres-store")]
async fn build_repo(settings: &Settings) -> anyhow::Result<Arc<dyn Repo>> {
    use anyhow::Context;
    use forum_api::repo::pg::PgRepo;
    use sqlx::postgres::PgPoolOptions;

    let db_url = settings
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for postgres-store")?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(db_url)
        .await
        .context("failed to connect to Postgres")?;
    let repo = PgRepo::new(pool);
    repo.migrate().await.context("failed to apply migrations")?;
    info!("Using Postgres repository backend");
    Ok(Arc::new(repo))
}

#[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
async fn build_repo(_settings: &Settings) -> anyhow::Result<Arc<dyn Repo>> {
    info!("Using in-memory repository backend");
    Ok(Arc::new(forum_api::repo::inmem::InMemRepo::new()))
}
