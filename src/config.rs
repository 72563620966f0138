use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub min_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_number("APP_PORT").unwrap_or(8080),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "spa-backend".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "spa-frontend".into()),
            ttl_minutes: env_number("JWT_TTL_MINUTES").unwrap_or(5),
            refresh_ttl_minutes: env_number("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24),
        };
        let password = PasswordConfig {
            min_length: env_number("PASSWORD_MIN_LENGTH").unwrap_or(8),
        };
        Ok(Self {
            database_url,
            server,
            jwt,
            password,
        })
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
