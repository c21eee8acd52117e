use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Roster server configuration
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "roster-server", version, about = "User registry with live presence")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "ROSTER_PORT", default_value = "3000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "ROSTER_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./roster.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "ROSTER_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Data directory for the SQLite database
    #[arg(long, env = "ROSTER_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// Comma-separated CORS origin allow-list, or "*" for any origin
    #[arg(long, env = "ROSTER_ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            config: "./roster.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            allowed_origins: "*".to_string(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (ROSTER_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("ROSTER_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Roster Server Configuration
# Place this file at ./roster.toml or specify with --config <path>
# All settings can be overridden via environment variables (ROSTER_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the SQLite database
# data_dir = "./data"

# Comma-separated CORS origin allow-list for browser clients.
# "*" (the default) allows any origin.
# allowed_origins = "https://app.example.com,https://staging.example.com"
"#
    .to_string()
}
