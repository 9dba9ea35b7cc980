use anyhow::Context;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; tests pass a map instead of the process env.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => compose_database_url(&get)?,
        };
        let max_connections = get("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };
        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections,
            },
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Without DB_USER the driver falls back to its default auth (peer/trust).
fn compose_database_url<F>(get: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let name = get("DB_NAME").context("either DATABASE_URL or DB_NAME must be set")?;
    let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
    let port = get("DB_PORT").unwrap_or_else(|| "5432".into());
    let auth = match (get("DB_USER"), get("DB_PASSWORD")) {
        (Some(user), Some(password)) => format!("{user}:{password}@"),
        (Some(user), None) => format!("{user}@"),
        _ => String::new(),
    };
    Ok(format!("postgres://{auth}{host}:{port}/{name}"))
}
