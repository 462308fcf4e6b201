use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration, loaded once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub notifier: NotifierConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin = AdminConfig {
            password: optional_var("ADMIN_PASSWORD"),
            session_token: optional_var("ADMIN_SESSION_TOKEN"),
            secure_cookie: environment == AppEnvironment::Production,
        };

        let supabase = match (
            optional_var("SUPABASE_URL"),
            optional_var("SUPABASE_SERVICE_ROLE_KEY"),
        ) {
            (Some(url), Some(service_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                service_key,
                table: optional_var("SUPABASE_TABLE")
                    .unwrap_or_else(|| DEFAULT_LISTINGS_TABLE.to_string()),
            }),
            _ => None,
        };

        let notifier = NotifierConfig {
            api_key: optional_var("RESEND_API_KEY"),
            from: optional_var("NOTIFY_EMAIL_FROM"),
            to: optional_var("NOTIFY_EMAIL_TO"),
            site_url: optional_var("PUBLIC_SITE_URL"),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admin,
            storage: StorageConfig { supabase },
            notifier,
        })
    }
}

pub const DEFAULT_LISTINGS_TABLE: &str = "profissionais";

/// Blank values are treated the same as unset ones.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Secrets backing the admin gate. The login password and the session token are distinct.
#[derive(Clone, Default)]
pub struct AdminConfig {
    pub password: Option<String>,
    pub session_token: Option<String>,
    pub secure_cookie: bool,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

/// Persistence settings. Without a hosted table the service keeps listings in memory.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub supabase: Option<SupabaseConfig>,
}

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub table: String,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("table", &self.table)
            .finish()
    }
}

/// Outbound e-mail settings for new-submission notices.
#[derive(Clone, Default)]
pub struct NotifierConfig {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub site_url: Option<String>,
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("site_url", &self.site_url)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
