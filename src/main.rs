mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth;
use crate::features::auth::clients::FirebaseIdentityClient;
use crate::features::auth::model::AdminPolicy;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::AuthService;
use crate::features::banners::models::Banner;
use crate::features::banners::routes as banners_routes;
use crate::features::banners::services::BannerService;
use crate::features::catalog::routes as catalog_routes;
use crate::features::catalog::services::CatalogService;
use crate::features::entries::models::Entry;
use crate::features::entries::routes as entries_routes;
use crate::features::entries::services::EntryService;
use crate::features::pages::{routes as pages_routes, PagesState};
use crate::modules::store::Collection;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Open the document store (PostgreSQL when configured, in-memory otherwise)
    let store = database::open_store(config.database.as_ref()).await?;
    tracing::info!("Document store ready (backend: {})", store.backend());

    // Initialize auth
    let admin_policy = AdminPolicy::new(&config.auth.admin_emails);
    if admin_policy.allows_everyone() {
        tracing::warn!("ADMIN_EMAILS is empty. Every signed-in user has admin access.");
    }
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer(),
        config.auth.project_id.clone(),
        config.auth.jwt_leeway,
        admin_policy.clone(),
    ));
    let identity_client = Arc::new(FirebaseIdentityClient::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(identity_client, admin_policy));
    tracing::info!(
        "Auth configuration initialized (project: {})",
        config.auth.project_id
    );

    // Initialize catalog services
    let entries = Collection::<Entry>::new(
        Arc::clone(&store),
        config.catalog.entries_collection.clone(),
    );
    let banners = Collection::<Banner>::new(
        Arc::clone(&store),
        config.catalog.banners_collection.clone(),
    );
    let entry_service = Arc::new(EntryService::new(entries.clone()));
    let banner_service = Arc::new(BannerService::new(banners));
    let catalog_service = Arc::new(CatalogService::new(entries));
    tracing::info!(
        "Catalog services initialized (collections: {}, {})",
        config.catalog.entries_collection,
        config.catalog.banners_collection
    );

    // Initialize Admin Service
    let admin_service = Arc::new(AdminService::new(
        Arc::clone(&entry_service),
        Arc::clone(&banner_service),
    ));
    tracing::info!("Admin service initialized");

    let pages_state = Arc::new(PagesState {
        catalog: Arc::clone(&catalog_service),
        banners: Arc::clone(&banner_service),
        admin: Arc::clone(&admin_service),
        auth: Arc::clone(&auth_service),
        secure_cookies: config.app.secure_cookies,
    });

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .nest(
            "/api/admin",
            admin_routes::routes(Arc::clone(&admin_service)),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Admin pages (signed-out visitors are sent to the login page)
    let admin_pages = pages_routes::admin_routes(Arc::clone(&pages_state)).route_layer(
        axum::middleware::from_fn_with_state(jwt_validator.clone(), middleware::page_auth_middleware),
    );

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(catalog_routes::routes(catalog_service))
        .merge(entries_routes::routes(entry_service))
        .merge(banners_routes::routes(banner_service))
        .merge(pages_routes::public_routes(pages_state));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(admin_pages)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
