use anyhow::{bail, Context, Result};

/// A job source declared through `JOB_SOURCES`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub name: String,
    /// `http(s)://` URL or a path to a JSON file.
    pub location: String,
    pub refresh_interval_hours: f64,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub sources: Vec<SourceConfig>,
    pub sync_tick_secs: u64,
    pub fetch_timeout_secs: u64,
    pub min_company_rating: f32,
    pub max_upload_bytes: usize,
    /// Largest job feed body an HTTP source will read.
    pub max_feed_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            sources: Vec::new(),
            sync_tick_secs: 300,
            fetch_timeout_secs: 30,
            min_company_rating: 3.5,
            max_upload_bytes: 5 * 1024 * 1024,
            max_feed_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            sources: match std::env::var("JOB_SOURCES") {
                Ok(raw) => parse_sources(&raw)?,
                Err(_) => defaults.sources,
            },
            sync_tick_secs: env_or("SYNC_TICK_SECS", defaults.sync_tick_secs)?,
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            min_company_rating: env_or("MIN_COMPANY_RATING", defaults.min_company_rating)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_feed_bytes: env_or("MAX_FEED_BYTES", defaults.max_feed_bytes)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Parses `name|location|refresh_hours` entries separated by semicolons. Commas are left
/// alone so feed URLs can carry query strings.
pub fn parse_sources(raw: &str) -> Result<Vec<SourceConfig>> {
    let mut sources = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        let [name, location, hours] = parts.as_slice() else {
            bail!("JOB_SOURCES entry '{entry}' must look like name|location|refresh_hours");
        };
        let refresh_interval_hours = hours
            .parse::<f64>()
            .with_context(|| format!("JOB_SOURCES entry '{entry}' has a bad refresh interval"))?;
        sources.push(SourceConfig {
            name: name.to_string(),
            location: location.to_string(),
            refresh_interval_hours,
        });
    }
    Ok(sources)
}
