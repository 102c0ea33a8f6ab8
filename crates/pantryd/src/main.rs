// # pantryd - Pantry Daemon
//
// Thin integration layer for the pantry tracker. All inventory logic lives
// in pantry-core; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Registers store and capture backends
// 4. Builds the engine and serves the HTTP surface until shutdown
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Document Store
// - `PANTRY_STORE_TYPE`: Store type (firestore, file, memory)
// - `PANTRY_STORE_PROJECT_ID`: Cloud project id (for firestore)
// - `PANTRY_STORE_COLLECTION`: Collection name (for firestore, default "pantry")
// - `PANTRY_STORE_AUTH_TOKEN`: Bearer token (optional, for firestore)
// - `PANTRY_STORE_PATH`: Path to the store file (for file)
//
// ### Blob Store
// - `PANTRY_BLOB_TYPE`: Store type (firebase, file, memory)
// - `PANTRY_BLOB_BUCKET`: Storage bucket (for firebase)
// - `PANTRY_BLOB_AUTH_TOKEN`: Bearer token (optional, for firebase)
// - `PANTRY_BLOB_ROOT`: Root directory for objects (for file)
//
// ### Capture
// - `PANTRY_CAPTURE_TYPE`: Frame source type (http); unset disables capture
// - `PANTRY_CAPTURE_URL`: Camera snapshot URL (for http)
// - `PANTRY_CAPTURE_TIMEOUT_SECS`: Snapshot request timeout (default 10)
//
// ### Server
// - `PANTRY_LISTEN_ADDR`: HTTP listen address (default 127.0.0.1:8080)
// - `PANTRY_LOG_LEVEL`: Log level (trace, debug, info, warn, error)
//
// ## Example
//
// ```bash
// export PANTRY_STORE_TYPE=firestore
// export PANTRY_STORE_PROJECT_ID=pantry-tracker-dee91
// export PANTRY_BLOB_TYPE=firebase
// export PANTRY_BLOB_BUCKET=pantry-tracker-dee91.appspot.com
// export PANTRY_CAPTURE_TYPE=http
// export PANTRY_CAPTURE_URL=http://192.168.1.20:8080/photo.jpg
//
// pantryd
// ```

mod routes;

use anyhow::Result;
use pantry_core::config::{
    BlobStoreConfig, CaptureConfig, DocumentStoreConfig, EngineConfig, PantryConfig,
};
use pantry_core::{PantryEngine, StoreRegistry};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PantrydExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PantrydExitCode> for ExitCode {
    fn from(code: PantrydExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    store_type: String,
    store_project_id: Option<String>,
    store_collection: String,
    store_auth_token: Option<String>,
    store_path: Option<String>,
    blob_type: String,
    blob_bucket: Option<String>,
    blob_auth_token: Option<String>,
    blob_root: Option<String>,
    capture_type: Option<String>,
    capture_url: Option<String>,
    capture_timeout_secs: u64,
    listen_addr: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            store_type: env::var("PANTRY_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()),
            store_project_id: env::var("PANTRY_STORE_PROJECT_ID").ok(),
            store_collection: env::var("PANTRY_STORE_COLLECTION")
                .unwrap_or_else(|_| "pantry".to_string()),
            store_auth_token: env::var("PANTRY_STORE_AUTH_TOKEN").ok(),
            store_path: env::var("PANTRY_STORE_PATH").ok(),
            blob_type: env::var("PANTRY_BLOB_TYPE").unwrap_or_else(|_| "memory".to_string()),
            blob_bucket: env::var("PANTRY_BLOB_BUCKET").ok(),
            blob_auth_token: env::var("PANTRY_BLOB_AUTH_TOKEN").ok(),
            blob_root: env::var("PANTRY_BLOB_ROOT").ok(),
            capture_type: env::var("PANTRY_CAPTURE_TYPE").ok(),
            capture_url: env::var("PANTRY_CAPTURE_URL").ok(),
            capture_timeout_secs: env::var("PANTRY_CAPTURE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            listen_addr: env::var("PANTRY_LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            log_level: env::var("PANTRY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs comprehensive validation including:
    /// - Type enumeration validation
    /// - Required field presence per selected type
    /// - Placeholder value detection (common mistake)
    /// - Numeric range validation
    /// - Path and address format validation
    fn validate(&self) -> Result<()> {
        // Validate document store type and its requirements
        match self.store_type.as_str() {
            "firestore" => {
                let project_id = self.store_project_id.as_deref().unwrap_or_default();
                if project_id.is_empty() {
                    anyhow::bail!(
                        "PANTRY_STORE_PROJECT_ID is required when PANTRY_STORE_TYPE=firestore. \
                        Set it via: export PANTRY_STORE_PROJECT_ID=your-project-id"
                    );
                }

                // Check for obvious placeholder values (common mistake)
                let project_lower = project_id.to_lowercase();
                if project_lower.contains("your-project")
                    || project_lower.contains("replace_me")
                    || project_lower == "example"
                {
                    anyhow::bail!(
                        "PANTRY_STORE_PROJECT_ID appears to be a placeholder. \
                        Use the actual project id from your cloud console."
                    );
                }

                if self.store_collection.is_empty() {
                    anyhow::bail!("PANTRY_STORE_COLLECTION cannot be empty");
                }
            }
            "file" => {
                if let Some(ref path) = self.store_path {
                    if path.is_empty() {
                        anyhow::bail!(
                            "PANTRY_STORE_PATH cannot be empty when PANTRY_STORE_TYPE=file"
                        );
                    }

                    // Check parent directory exists or can be created
                    if let Some(parent) = std::path::Path::new(path).parent()
                        && !parent.as_os_str().is_empty()
                        && !parent.exists()
                    {
                        anyhow::bail!(
                            "PANTRY_STORE_PATH parent directory does not exist: {}. \
                                Create it first: mkdir -p {}",
                            parent.display(),
                            parent.display()
                        );
                    }
                } else {
                    anyhow::bail!(
                        "PANTRY_STORE_PATH is required when PANTRY_STORE_TYPE=file. \
                        Set it via: export PANTRY_STORE_PATH=/var/lib/pantry/pantry.json"
                    );
                }
            }
            "memory" => {}
            other => anyhow::bail!(
                "PANTRY_STORE_TYPE '{}' is not supported. \
                Supported types: firestore, file, memory",
                other
            ),
        }

        // Validate blob store type and its requirements
        match self.blob_type.as_str() {
            "firebase" => {
                if self.blob_bucket.as_deref().unwrap_or_default().is_empty() {
                    anyhow::bail!(
                        "PANTRY_BLOB_BUCKET is required when PANTRY_BLOB_TYPE=firebase. \
                        Set it via: export PANTRY_BLOB_BUCKET=your-project.appspot.com"
                    );
                }
            }
            "file" => {
                if self.blob_root.as_deref().unwrap_or_default().is_empty() {
                    anyhow::bail!(
                        "PANTRY_BLOB_ROOT is required when PANTRY_BLOB_TYPE=file. \
                        Set it via: export PANTRY_BLOB_ROOT=/var/lib/pantry/blobs"
                    );
                }
            }
            "memory" => {}
            other => anyhow::bail!(
                "PANTRY_BLOB_TYPE '{}' is not supported. \
                Supported types: firebase, file, memory",
                other
            ),
        }

        // Validate capture configuration when enabled
        if let Some(ref capture_type) = self.capture_type {
            match capture_type.as_str() {
                "http" => {
                    let url = self.capture_url.as_deref().unwrap_or_default();
                    if url.is_empty() {
                        anyhow::bail!(
                            "PANTRY_CAPTURE_URL is required when PANTRY_CAPTURE_TYPE=http"
                        );
                    }
                    if !url.starts_with("https://") && !url.starts_with("http://") {
                        anyhow::bail!(
                            "PANTRY_CAPTURE_URL must use HTTP or HTTPS scheme. Got: {}",
                            url
                        );
                    }
                }
                other => anyhow::bail!(
                    "PANTRY_CAPTURE_TYPE '{}' is not supported. Supported types: http",
                    other
                ),
            }

            if !(1..=120).contains(&self.capture_timeout_secs) {
                anyhow::bail!(
                    "PANTRY_CAPTURE_TIMEOUT_SECS must be between 1 and 120 seconds. Got: {}",
                    self.capture_timeout_secs
                );
            }
        }

        // Validate listen address
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!(
                "PANTRY_LISTEN_ADDR is not a valid socket address. Got: {}",
                self.listen_addr
            );
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "PANTRY_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Translate the environment configuration into core config types
    fn to_pantry_config(&self) -> PantryConfig {
        let store = match self.store_type.as_str() {
            "firestore" => DocumentStoreConfig::Firestore {
                project_id: self.store_project_id.clone().unwrap_or_default(),
                collection: self.store_collection.clone(),
                auth_token: self.store_auth_token.clone(),
            },
            "file" => DocumentStoreConfig::File {
                path: self.store_path.clone().unwrap_or_default(),
            },
            _ => DocumentStoreConfig::Memory,
        };

        let blobs = match self.blob_type.as_str() {
            "firebase" => BlobStoreConfig::Firebase {
                bucket: self.blob_bucket.clone().unwrap_or_default(),
                auth_token: self.blob_auth_token.clone(),
            },
            "file" => BlobStoreConfig::File {
                root: self.blob_root.clone().unwrap_or_default(),
            },
            _ => BlobStoreConfig::Memory,
        };

        let capture = self.capture_type.as_deref().map(|_| CaptureConfig::Http {
            url: self.capture_url.clone().unwrap_or_default(),
            timeout_secs: self.capture_timeout_secs,
        });

        PantryConfig {
            store,
            blobs,
            capture,
            engine: EngineConfig::default(),
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PantrydExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PantrydExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PantrydExitCode::ConfigError.into();
    }

    info!("Starting pantryd daemon");
    info!(
        "Store: {}, blobs: {}, capture: {}",
        config.store_type,
        config.blob_type,
        config.capture_type.as_deref().unwrap_or("disabled")
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PantrydExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            PantrydExitCode::RuntimeError
        } else {
            PantrydExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    // Create the registry and register backends
    let registry = StoreRegistry::new();
    pantry_core::registry::register_builtin(&registry);

    #[cfg(feature = "firebase")]
    {
        debug!("Registering Firebase backends");
        pantry_store_firebase::register(&registry);
    }

    #[cfg(feature = "capture-http")]
    {
        debug!("Registering HTTP frame source");
        pantry_capture_http::register(&registry);
    }

    // Build components from configuration
    let pantry_config = config.to_pantry_config();
    pantry_config.validate()?;

    let store = registry.create_document_store(&pantry_config.store).await?;
    let blobs = registry.create_blob_store(&pantry_config.blobs).await?;
    let frames = match pantry_config.capture {
        Some(ref capture_config) => Some(Arc::from(registry.create_frame_source(capture_config)?)),
        None => None,
    };

    info!(
        "Using document store '{}' and blob store '{}'",
        store.store_name(),
        blobs.store_name()
    );

    // Build the engine
    let (engine, mut event_rx) = PantryEngine::new(store, blobs, pantry_config.engine)?;
    let engine = Arc::new(engine);

    // Drain engine events into the log so the channel never fills up
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    // Initial synchronization. A failure here is not fatal: the daemon
    // starts with an empty snapshot and catches up on the next refresh.
    match engine.refresh().await {
        Ok(items) => info!("Initial sync: {} item(s)", items.len()),
        Err(e) => warn!("Initial sync failed, starting with empty snapshot: {}", e),
    }

    // Serve the HTTP surface until shutdown
    let state = Arc::new(routes::AppState { engine, frames });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {}", e);
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {}", e);
            return;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {}", e);
    } else {
        info!("Received shutdown signal: SIGINT");
    }
}
