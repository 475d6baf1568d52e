//! Tenant Topology - server proposal service for multi-company tenants
//!
//! This application derives the server topology a tenant needs from its
//! companies, licenses, brands and integrations, and keeps the stored tenant
//! documents consistent with it.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use config::LogFormat;
use tenant_topology::{
    api, config,
    services::{CatalogProvider, ProposalService},
    AppConfig, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    // Check for --help flag
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    // Check for --version flag
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("Tenant Topology {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Check for --check-catalogs flag
    if args.iter().any(|arg| arg == "--check-catalogs") {
        return check_catalogs(config).await;
    }

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("Tenant Topology starting up");
    info!("Configuration loaded successfully");

    if config.store.is_none() {
        info!("Tenant store not configured, tenant endpoints are disabled");
    }

    let state = AppState::from_config(config.clone()).context("Failed to initialize services")?;

    // An unreadable catalog is reported here; requests retry it
    match ProposalService::load(state.catalogs.as_ref()).await {
        Ok(_) => info!("Catalogs loaded"),
        Err(e) => warn!("Catalogs not readable at startup: {}", e),
    }

    // Build the router
    let app = create_router(state, &config);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("HTTP server is ready to accept connections");

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Initialize the logging/tracing infrastructure
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            // Console-only logging (development mode)
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            // File-only logging (production mode)
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_both_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let rotation = if log_config.daily_rotation {
        tracing_appender::rolling::Rotation::DAILY
    } else {
        tracing_appender::rolling::Rotation::NEVER
    };

    let mut builder = tracing_appender::rolling::Builder::new()
        .rotation(rotation)
        .filename_prefix(&log_config.log_prefix);
    if log_config.max_log_files > 0 {
        builder = builder.max_log_files(log_config.max_log_files);
    }

    match builder.build(&log_config.log_dir) {
        Ok(file_appender) => tracing_appender::non_blocking(file_appender),
        Err(e) => {
            eprintln!(
                "Warning: Failed to open log file in {:?}, logging to stderr: {}",
                log_config.log_dir, e
            );
            tracing_appender::non_blocking(std::io::stderr())
        }
    }
}

/// Initialize console-only logging
fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
    }
}

/// Initialize file-only logging
fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Initialize both console and file logging
fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true)) // Console
                .with(fmt::layer().json().with_target(true).with_writer(writer)) // File
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false)) // Console
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                ) // File
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().with_target(true)) // Console
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                ) // File
                .init();
        }
    }
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, config: &AppConfig) -> Router {
    // The API is consumed by a browser front end served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Configure tracing for HTTP requests
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let router = Router::new()
        .nest("/api/v1", api::routes())
        .with_state(state);

    let router = match config.server.request_timeout_secs {
        Some(secs) if secs > 0 => {
            info!("Request timeout set to {}s", secs);
            router.layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(secs)))
        }
        _ => router,
    };

    router.layer(trace_layer).layer(cors)
}

/// Load every catalog once and report what was found
async fn check_catalogs(config: AppConfig) -> Result<()> {
    println!("Tenant Topology catalog check v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Catalog source: {:?}", config.catalogs.source);

    let state = AppState::from_config(config).context("Failed to initialize services")?;

    let rules = state
        .catalogs
        .rules()
        .await
        .context("Failed to load the rule catalog")?;
    let enabled = rules.iter().filter(|r| r.enabled).count();
    println!("Rules:           {} ({} enabled)", rules.len(), enabled);

    match state.catalogs.server_defaults().await {
        Ok(defaults) => println!("Server defaults: {}", defaults.len()),
        Err(e) => println!("Server defaults: unavailable ({})", e),
    }
    match state.catalogs.brands().await {
        Ok(brands) => println!("Brands:          {}", brands.len()),
        Err(e) => println!("Brands:          unavailable ({})", e),
    }

    let service = ProposalService::load(state.catalogs.as_ref())
        .await
        .context("Failed to build the proposal engine")?;
    println!("Compiled rules:  {}", service.rule_count());

    if service.rule_count() < enabled {
        println!();
        println!(
            "{} enabled rule(s) could not be compiled; run with RUST_LOG=warn for details.",
            enabled - service.rule_count()
        );
    }

    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"Tenant Topology {}

USAGE:
    tenant-topology [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --check-catalogs        Load the rule, server default and brand catalogs,
                            report what was found and exit.

ENVIRONMENT:
    TOPOLOGY_CONFIG         Path to configuration file (default: config.yaml)
    TOPOLOGY_HOST           Listen address
    TOPOLOGY_PORT           Listen port
    TOPOLOGY_STORE_URL      Tenant store base URL
    TOPOLOGY_DEFAULT_MODE   Deployment mode of new tenants
    TOPOLOGY_LOG_FORMAT     pretty, compact or json
    RUST_LOG                Log filter

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by TOPOLOGY_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/tenant-topology/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
