// Configuration module entry point
// Layers defaults, config file, environment and command line

mod cli;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use cli::{CliArgs, DEFAULT_CONFIG_FILE};
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

pub const DEFAULT_PORT: u16 = 8888;

/// Environment variable prefix, e.g. `CALC_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CALC";

impl Config {
    /// Load configuration for the given command line
    pub fn load(args: &CliArgs) -> Result<Self, config::ConfigError> {
        let (path, required) = args.config_source();
        Self::load_from(path, required, args.port)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Later sources win: defaults, file, `CALC_*` environment, `port_override`.
    pub fn load_from(
        config_path: &str,
        required: bool,
        port_override: Option<u16>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "rust-calc/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_override_option("server.port", port_override.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
