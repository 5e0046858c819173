use anyhow::Context;
use time::UtcOffset;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Reference clock for calendar-day boundaries.
    pub day_offset: UtcOffset,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "kidneyplate".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "kidneyplate-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let day_offset = match std::env::var("DAY_UTC_OFFSET_MINUTES") {
            Ok(v) => parse_offset_minutes(&v)?,
            Err(_) => UtcOffset::UTC,
        };
        Ok(Self {
            database_url,
            jwt,
            day_offset,
        })
    }
}

pub fn parse_offset_minutes(raw: &str) -> anyhow::Result<UtcOffset> {
    let minutes: i32 = raw
        .trim()
        .parse()
        .with_context(|| format!("DAY_UTC_OFFSET_MINUTES must be an integer, got {raw:?}"))?;
    minutes
        .checked_mul(60)
        .and_then(|secs| UtcOffset::from_whole_seconds(secs).ok())
        .with_context(|| format!("DAY_UTC_OFFSET_MINUTES out of range: {minutes}"))
}
