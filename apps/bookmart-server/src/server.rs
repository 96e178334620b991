use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use runtime::{AppConfig, CliArgs, DatabaseConfig};

use catalog::domain::service::{Service as CatalogService, ServiceConfig};
use catalog::gateways::local::CatalogLocalClient;
use catalog::infra::storage::migrations::Migrator as CatalogMigrator;
use storefront::domain::cart::CartService;
use storefront::domain::orders::OrderService;
use storefront::infra::storage::migrations::Migrator as StorefrontMigrator;

use crate::openapi::ApiDoc;

pub async fn run(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect(&config, &args).await?;

    tracing::info!("Running migrations");
    CatalogMigrator::up(&db, None)
        .await
        .context("catalog migrations failed")?;
    StorefrontMigrator::up(&db, None)
        .await
        .context("storefront migrations failed")?;

    let catalog_service = Arc::new(CatalogService::new(db.clone(), ServiceConfig::default()));
    let catalog_client = Arc::new(CatalogLocalClient::new(catalog_service.clone()));
    let carts = Arc::new(CartService::new(db.clone(), catalog_client));
    let orders = Arc::new(OrderService::new(db));

    let mut app = Router::new()
        .merge(catalog::api::rest::routes::router(catalog_service))
        .merge(storefront::api::rest::routes::router(carts, orders))
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if config.server.timeout_sec > 0 {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(
            config.server.timeout_sec,
        )));
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConnection> {
    let db_config = config.database.clone().unwrap_or(DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_conns: None,
        acquire_timeout_ms: None,
    });

    let mut dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        db_config.url.trim().to_string()
    };
    if dsn.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.data_dir))?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    if let Some(max_conns) = db_config.max_conns {
        opts.max_connections(max_conns);
    }
    opts.acquire_timeout(Duration::from_millis(
        db_config.acquire_timeout_ms.unwrap_or(5000),
    ));

    tracing::info!("Connecting to database: {dsn}");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))?;
    Ok(db)
}

/// Expand a relative sqlite DSN against the data directory so the database
/// lands in a predictable place regardless of cwd. In-memory DSNs pass
/// through untouched, file DSNs get create-if-missing mode.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {dsn})"))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut path = PathBuf::from(path_str);
    if path.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut out = String::from("sqlite://");
    out.push_str(&path.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) => {
            out.push('?');
            out.push_str(q);
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_passes_through() {
        let out = absolutize_sqlite_dsn("sqlite::memory:", Path::new("/tmp")).unwrap();
        assert_eq!(out, "sqlite::memory:");
        let out = absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/tmp")).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_path_joins_base_dir() {
        let out = absolutize_sqlite_dsn("sqlite://bookmart.db", Path::new("/tmp")).unwrap();
        assert_eq!(out, "sqlite:///tmp/bookmart.db?mode=rwc");
    }

    #[test]
    fn existing_query_is_preserved() {
        let out = absolutize_sqlite_dsn("sqlite:///data/b.db?mode=ro", Path::new("/tmp")).unwrap();
        assert_eq!(out, "sqlite:///data/b.db?mode=ro");
    }

    #[test]
    fn non_sqlite_scheme_is_rejected() {
        assert!(absolutize_sqlite_dsn("postgres://x/y", Path::new("/tmp")).is_err());
    }
}
