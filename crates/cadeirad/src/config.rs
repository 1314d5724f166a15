//! Daemon configuration.
//!
//! Each setting is taken from the first source that has it:
//! command-line flag, environment variable, TOML file (`--config`),
//! built-in default. Database fields left unset everywhere fall through to
//! libpq conventions inside the Postgres executor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use cadeira_store::PgSettings;
use clap::Parser;
use serde::Deserialize;

use crate::logging::LogFormat;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug, Default)]
#[command(name = "cadeirad", about = "cadeiras catalog API server", version)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "CADEIRAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Disable CORS headers.
    #[arg(long, env = "CORS_DISABLED")]
    pub no_cors: bool,

    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    #[arg(long, env = "DB_DATABASE")]
    pub db_database: Option<String>,

    /// Upper bound on pooled connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Per-statement deadline in seconds.
    #[arg(long, env = "DB_QUERY_TIMEOUT")]
    pub query_timeout: Option<u64>,

    /// Serve from a process-local table instead of Postgres.
    #[arg(long)]
    pub in_memory: bool,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Shape of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub cors: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<u32>,
    pub query_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Where cadeiras are stored.
#[derive(Debug, Clone)]
pub enum Backend {
    Postgres(PgSettings),
    Memory,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub cors: bool,
    pub backend: Backend,
}

impl Settings {
    /// Read the config file named by `cli` (if any) and resolve.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)
                .with_context(|| format!("read config {}", path.display()))?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(cli, file))
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let FileConfig { server, database } = file;

        let backend = if cli.in_memory {
            Backend::Memory
        } else {
            let defaults = PgSettings::default();
            Backend::Postgres(PgSettings {
                host: cli.db_host.clone().or(database.host),
                port: cli.db_port.or(database.port),
                user: cli.db_user.clone().or(database.user),
                password: cli.db_password.clone().or(database.password),
                database: cli.db_database.clone().or(database.database),
                max_connections: cli
                    .max_connections
                    .or(database.max_connections)
                    .unwrap_or(defaults.max_connections),
                query_timeout: cli
                    .query_timeout
                    .or(database.query_timeout_secs)
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.query_timeout),
            })
        };

        Self {
            port: cli.port.or(server.port).unwrap_or(DEFAULT_PORT),
            cors: !cli.no_cors && server.cors.unwrap_or(true),
            backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg(settings: &Settings) -> &PgSettings {
        match &settings.backend {
            Backend::Postgres(pg) => pg,
            Backend::Memory => panic!("expected postgres backend"),
        }
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::resolve(&Cli::default(), FileConfig::default());
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(settings.cors);
        let pg = pg(&settings);
        assert!(pg.host.is_none());
        assert_eq!(pg.max_connections, 10);
        assert_eq!(pg.query_timeout, Duration::from_secs(30));
    }

    #[test]
    fn parse_file() {
        let toml_str = r#"
[server]
port = 8080
cors = false

[database]
host = "db.local"
database = "loja"
query_timeout_secs = 5
"#;
        let file: FileConfig = toml::from_str(toml_str).unwrap();
        let settings = Settings::resolve(&Cli::default(), file);
        assert_eq!(settings.port, 8080);
        assert!(!settings.cors);
        let pg = pg(&settings);
        assert_eq!(pg.host.as_deref(), Some("db.local"));
        assert_eq!(pg.database.as_deref(), Some("loja"));
        assert_eq!(pg.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
[server]
port = 8080

[database]
host = "db.local"
"#,
        )
        .unwrap();
        let cli = Cli {
            port: Some(9000),
            db_host: Some("primary".to_string()),
            ..Cli::default()
        };
        let settings = Settings::resolve(&cli, file);
        assert_eq!(settings.port, 9000);
        assert_eq!(pg(&settings).host.as_deref(), Some("primary"));
    }

    #[test]
    fn no_cors_flag_wins_over_file() {
        let file: FileConfig = toml::from_str("[server]\ncors = true\n").unwrap();
        let cli = Cli {
            no_cors: true,
            ..Cli::default()
        };
        assert!(!Settings::resolve(&cli, file).cors);
    }

    #[test]
    fn in_memory_skips_postgres() {
        let cli = Cli {
            in_memory: true,
            ..Cli::default()
        };
        let settings = Settings::resolve(&cli, FileConfig::default());
        assert!(matches!(settings.backend, Backend::Memory));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("[server]\nhost = \"x\"\n").is_err());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "cadeirad",
            "--port",
            "4000",
            "--db-port",
            "6543",
            "--in-memory",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.port, Some(4000));
        assert_eq!(cli.db_port, Some(6543));
        assert!(cli.in_memory);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
