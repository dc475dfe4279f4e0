//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "stampa";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8090;
const DEFAULT_SITE_BASE_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_SITE_NAME: &str = "Stampa";
const DEFAULT_CONTENT_LIBRARY: &str = "content/library.toml";
const DEFAULT_SETTINGS_FILE: &str = "content/settings.toml";
const DEFAULT_ENGINE_PATH: &str = "wkhtmltopdf";
const DEFAULT_RESOURCE_ROOT: &str = "content";

/// Command-line arguments for the Stampa binary.
#[derive(Debug, Parser)]
#[command(name = "stampa", version, about = "Stampa PDF export server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STAMPA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Stampa HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the public site base URL used to absolutize content paths.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,

    /// Override the site name printed in document footers.
    #[arg(long = "site-name", value_name = "NAME")]
    pub site_name: Option<String>,

    /// Override the content library path.
    #[arg(long = "content-library", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub content_library: Option<PathBuf>,

    /// Override the settings record path.
    #[arg(long = "content-settings-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub content_settings_file: Option<PathBuf>,

    /// Override the HTML-to-PDF engine executable.
    #[arg(long = "render-engine-path", value_name = "PATH")]
    pub render_engine_path: Option<PathBuf>,

    /// Override the directory the engine may read resources from.
    #[arg(long = "render-resource-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub render_resource_root: Option<PathBuf>,

    /// Override the secret used to derive request tokens.
    #[arg(long = "auth-nonce-secret", value_name = "SECRET", hide_env_values = true, env = "STAMPA_NONCE_SECRET")]
    pub auth_nonce_secret: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub render: EngineSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: Url,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub library: PathBuf,
    pub settings_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub engine_path: PathBuf,
    pub resource_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub nonce_secret: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse the CLI and resolve settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("STAMPA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    content: RawContentSettings,
    render: RawEngineSettings,
    auth: RawAuthSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    base_url: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    library: Option<PathBuf>,
    settings_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEngineSettings {
    engine_path: Option<PathBuf>,
    resource_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    nonce_secret: Option<String>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
        if let Some(name) = overrides.site_name.as_ref() {
            self.site.name = Some(name.clone());
        }
        if let Some(path) = overrides.content_library.as_ref() {
            self.content.library = Some(path.clone());
        }
        if let Some(path) = overrides.content_settings_file.as_ref() {
            self.content.settings_file = Some(path.clone());
        }
        if let Some(path) = overrides.render_engine_path.as_ref() {
            self.render.engine_path = Some(path.clone());
        }
        if let Some(path) = overrides.render_resource_root.as_ref() {
            self.render.resource_root = Some(path.clone());
        }
        if let Some(secret) = overrides.auth_nonce_secret.as_ref() {
            self.auth.nonce_secret = Some(secret.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            site,
            content,
            render,
            auth,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            site: build_site_settings(site)?,
            content: build_content_settings(content),
            render: build_engine_settings(render),
            auth: build_auth_settings(auth)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }
    let addr = format!("{host}:{port}")
        .parse()
        .map_err(|err| LoadError::invalid("server.host", format!("{err}")))?;
    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(&level).map_err(|_| {
            LoadError::invalid(
                "logging.level",
                format!("`{level}` is not one of trace|debug|info|warn|error"),
            )
        })?,
        None => LevelFilter::INFO,
    };
    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let base_url = site
        .base_url
        .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string());
    let base_url = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("site.base_url", format!("{err}")))?;
    if base_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "site.base_url",
            "URL must be an absolute http(s) base",
        ));
    }
    let name = site.name.unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());
    Ok(SiteSettings { base_url, name })
}

fn build_content_settings(content: RawContentSettings) -> ContentSettings {
    ContentSettings {
        library: content
            .library
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_LIBRARY)),
        settings_file: content
            .settings_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
    }
}

fn build_engine_settings(render: RawEngineSettings) -> EngineSettings {
    EngineSettings {
        engine_path: render
            .engine_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_PATH)),
        resource_root: render
            .resource_root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCE_ROOT)),
    }
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let nonce_secret = auth.nonce_secret.unwrap_or_default();
    if nonce_secret.trim().is_empty() {
        return Err(LoadError::invalid(
            "auth.nonce_secret",
            "must be set (STAMPA__AUTH__NONCE_SECRET or --auth-nonce-secret)",
        ));
    }
    Ok(AuthSettings { nonce_secret })
}
