use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone)]
pub struct ClarifaiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Argon2 cost parameters. Fixed per deployment.
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_ssl: bool,
    pub database_max_connections: u32,
    pub clarifai: ClarifaiConfig,
    pub hash: HashConfig,
    /// Offset used when presenting timestamps to clients.
    pub display_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let clarifai = ClarifaiConfig {
            api_key: std::env::var("API_KEY")?,
            base_url: std::env::var("CLARIFAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.clarifai.com".into()),
            timeout_secs: parsed_or("INFERENCE_TIMEOUT_SECS", 15),
        };
        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: parsed_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: parsed_or("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: parsed_or("ARGON2_PARALLELISM", defaults.parallelism),
        };
        let display_offset = match std::env::var("DISPLAY_UTC_OFFSET") {
            Ok(raw) => parse_utc_offset(&raw)?,
            Err(_) => UtcOffset::UTC,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("PORT", 3001),
            database_url,
            database_ssl: std::env::var("DATABASE_SSL")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
            clarifai,
            hash,
            display_offset,
        })
    }
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Accepts `UTC`, `Z`, or a signed `HH:MM` offset such as `+05:30`.
pub fn parse_utc_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        raw,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|e| anyhow::anyhow!("invalid DISPLAY_UTC_OFFSET {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_signed_offsets() {
        assert_eq!(parse_utc_offset("UTC").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_utc_offset(" z ").unwrap(), UtcOffset::UTC);
        assert_eq!(
            parse_utc_offset("+05:30").unwrap(),
            UtcOffset::from_hms(5, 30, 0).unwrap()
        );
        assert_eq!(
            parse_utc_offset("-08:00").unwrap(),
            UtcOffset::from_hms(-8, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_offset() {
        assert!(parse_utc_offset("tomorrow").is_err());
        assert!(parse_utc_offset("0530").is_err());
    }
}
