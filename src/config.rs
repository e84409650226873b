// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Dispatch engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Batching and release configuration
    pub batching: BatchingConfig,

    /// Notification channel configuration
    pub notification: NotificationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Batching and release configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// A batch may be released once its combined total reaches this value
    pub release_threshold: Decimal,

    /// Release eligible batches automatically on intake instead of
    /// waiting for the operator
    pub auto_release: bool,

    /// Flat per-delivered-order fee used for the revenue metric
    pub delivery_fee: Decimal,

    /// Upper bound on a single notification dispatch
    pub dispatch_timeout_ms: u64,
}

impl BatchingConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Email provider API key; dispatch is disabled when unset
    pub api_key: Option<String>,

    /// Sender address, e.g. "Orders <orders@example.com>"
    pub from_address: String,

    /// Public site base URL for order-tracking links
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let batching_config = BatchingConfig {
            release_threshold: env::var("RELEASE_THRESHOLD")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(Decimal::new(100, 0)),
            auto_release: env::var("AUTO_RELEASE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            delivery_fee: env::var("DELIVERY_FEE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(Decimal::new(10, 0)),
            dispatch_timeout_ms: env::var("DISPATCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        };

        let notification_config = NotificationConfig {
            api_key: env::var("NOTIFY_API_KEY").ok().filter(|k| !k.is_empty()),
            from_address: env::var("NOTIFY_FROM")
                .unwrap_or_else(|_| "Orders <orders@example.com>".to_string()),
            base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        };

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            batching: batching_config,
            notification: notification_config,
            logging: logging_config,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::Config(format!("Failed to open config file: {}", e)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batching: BatchingConfig {
                release_threshold: Decimal::new(100, 0),
                auto_release: false,
                delivery_fee: Decimal::new(10, 0),
                dispatch_timeout_ms: 5000,
            },
            notification: NotificationConfig {
                api_key: None,
                from_address: "Orders <orders@example.com>".to_string(),
                base_url: "http://localhost:3000".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
