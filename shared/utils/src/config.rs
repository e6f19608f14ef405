use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

use bomdiff_models::FieldAliasTable;

use crate::bom::report::ReportStyle;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate]
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub aliases: FieldAliasTable,
    #[validate]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    #[validate(range(min = 1, message = "Port must be non-zero"))]
    pub port: u16,
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComparisonConfig {
    /// Upper bound on target documents per comparison run
    #[validate(range(min = 1, max = 50, message = "max_targets must be between 1 and 50"))]
    pub max_targets: u32,
    /// Where the CLI writes its JSON report
    pub output_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Highlight table rows with ANSI colors
    #[serde(default)]
    pub color: bool,
}

impl ReportConfig {
    pub fn style(&self) -> ReportStyle {
        if self.color {
            ReportStyle::ansi()
        } else {
            ReportStyle::plain()
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with BOMDIFF prefix
            .add_source(Environment::with_prefix("BOMDIFF").separator("__"));

        config.build()?.try_deserialize()
    }

    /// Load configuration, falling back to defaults when no source is usable
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 32 * 1024 * 1024, // 32MB
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_path: None,
            },
            aliases: FieldAliasTable::default(),
            comparison: ComparisonConfig {
                max_targets: 5,
                output_path: "comparison_output.json".to_string(),
            },
            report: ReportConfig::default(),
        }
    }
}
