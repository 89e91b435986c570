// Configuration module entry point
// Host configuration (file + environment) and the middleware option set

pub mod duration;
mod options;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use options::{DirectoryPolicy, ServeOptions, SetHeaders};
pub use types::{
    Config, Dotfiles, ExtensionsSetting, IndexSetting, LoggingConfig, MaxAgeSetting, NameList,
    PerformanceConfig, ServerConfig, StaticConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .set_default("serve.root", "public")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
