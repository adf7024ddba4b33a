/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string; without it the in-memory store is used
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `SYSTEM_OWNER`: Owner of the default rows (default: system)
/// - `SEED_DEFAULTS`: Create default priorities and category at startup (default: false)
/// - `BOOTSTRAP_STAFF_USERNAME` / `BOOTSTRAP_STAFF_PASSWORD`: First staff account
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use todolist_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    /// `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    pub jwt: JwtConfig,

    pub ownership: OwnershipConfig,

    /// Staff account created at startup if missing
    pub bootstrap_staff: Option<BootstrapStaff>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Ownership of rows the server creates itself
#[derive(Debug, Clone)]
pub struct OwnershipConfig {
    /// Username recorded as `created_by` on seeded rows
    pub system_owner: String,

    /// Whether to seed the default rows at startup
    pub seed_defaults: bool,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            system_owner: "system".to_string(),
            seed_defaults: false,
        }
    }
}

/// Credentials of the first staff account
#[derive(Clone)]
pub struct BootstrapStaff {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapStaff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapStaff")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable cannot be parsed
    /// - Only one of the bootstrap staff variables is set
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: var("DATABASE_MAX_CONNECTIONS", "10")
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?,
            }),
            None => None,
        };

        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let seed_defaults = var("SEED_DEFAULTS", "false")
            .parse::<bool>()
            .map_err(|e| anyhow::anyhow!("SEED_DEFAULTS is invalid: {}", e))?;

        let bootstrap_staff = match (
            lookup("BOOTSTRAP_STAFF_USERNAME"),
            lookup("BOOTSTRAP_STAFF_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapStaff { username, password }),
            (None, None) => None,
            _ => anyhow::bail!(
                "BOOTSTRAP_STAFF_USERNAME and BOOTSTRAP_STAFF_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port,
                cors_origins,
            },
            database,
            jwt: JwtConfig { secret },
            ownership: OwnershipConfig {
                system_owner: var("SYSTEM_OWNER", "system"),
                seed_defaults,
            },
            bootstrap_staff,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
