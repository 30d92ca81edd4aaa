use serde::Deserialize;

const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 30;
const MIN_SESSION_TIMEOUT_MINUTES: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are revoked on their next use.
    pub idle_timeout_minutes: i64,
}

/// Chat-completion provider settings. Any OpenAI-compatible endpoint works.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub llm: Option<LlmConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutriplan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutriplan-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };
        let session = SessionConfig {
            idle_timeout_minutes: session_timeout_minutes(
                std::env::var("SESSION_TIMEOUT_MINUTES").ok().as_deref(),
            ),
        };
        let llm = match std::env::var("OPENAI_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => Some(LlmConfig {
                api_key,
                base_url: std::env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
                model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
                max_tokens: env_parse("OPENAI_MAX_TOKENS").unwrap_or(4000),
                temperature: env_parse("OPENAI_TEMPERATURE").unwrap_or(0.7),
            }),
            _ => None,
        };
        Ok(Self {
            database_url,
            jwt,
            session,
            llm,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Unset or unparsable values fall back to 30 minutes; anything below
/// 5 minutes is raised to 5.
pub fn session_timeout_minutes(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(minutes) => minutes.max(MIN_SESSION_TIMEOUT_MINUTES),
        None => DEFAULT_SESSION_TIMEOUT_MINUTES,
    }
}
