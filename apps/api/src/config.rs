use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Optional client timeout. Unset means the HTTP client's own defaults apply.
    pub http_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub portfolio: PortfolioConfig,
    pub embedding: EmbeddingConfig,
    pub persona: Persona,
}

/// Where the portfolio source table lives and where its index is persisted.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub csv_path: PathBuf,
    pub store_path: PathBuf,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    Hashing,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub openai_api_key: Option<String>,
}

/// The sender the drafted emails are written as.
#[derive(Debug, Clone)]
pub struct Persona {
    pub sender_name: String,
    pub sender_title: String,
    pub company_name: String,
    pub company_pitch: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            sender_name: "Mohan".to_string(),
            sender_title: "business development executive".to_string(),
            company_name: "AtliQ".to_string(),
            company_pitch: "an AI & Software Consulting company dedicated to facilitating \
                the seamless integration of business processes through automated tools. \
                Over our experience, we have empowered numerous enterprises with tailored \
                solutions, fostering scalability, process optimization, cost reduction, and \
                heightened overall efficiency."
                .to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Persona::default();

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            llm_model: env_or("LLM_MODEL", crate::llm_client::DEFAULT_MODEL),
            port: env_or("PORT", "8501")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            http_timeout_secs: optional_env("HTTP_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            user_agent: env_or(
                "USER_AGENT",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            ),
            portfolio: PortfolioConfig {
                csv_path: env_or("PORTFOLIO_CSV", "resource/my_portfolio.csv").into(),
                store_path: env_or("VECTORSTORE_PATH", "vectorstore/portfolio.sqlite").into(),
                collection: env_or("PORTFOLIO_COLLECTION", "portfolio"),
            },
            embedding: embedding_from_env()?,
            persona: Persona {
                sender_name: env_or("SENDER_NAME", &defaults.sender_name),
                sender_title: env_or("SENDER_TITLE", &defaults.sender_title),
                company_name: env_or("COMPANY_NAME", &defaults.company_name),
                company_pitch: env_or("COMPANY_PITCH", &defaults.company_pitch),
            },
        })
    }
}

fn embedding_from_env() -> Result<EmbeddingConfig> {
    let provider = parse_provider(&env_or("EMBEDDING_PROVIDER", "hashing"))?;
    let openai_api_key = optional_env("OPENAI_API_KEY");

    if provider == EmbeddingProviderKind::OpenAi && openai_api_key.is_none() {
        bail!("OPENAI_API_KEY is required when EMBEDDING_PROVIDER=openai");
    }

    Ok(EmbeddingConfig {
        provider,
        model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
        openai_api_key,
    })
}

fn parse_provider(value: &str) -> Result<EmbeddingProviderKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "hashing" | "local" => Ok(EmbeddingProviderKind::Hashing),
        "openai" => Ok(EmbeddingProviderKind::OpenAi),
        other => bail!("Unknown EMBEDDING_PROVIDER '{other}' (expected 'hashing' or 'openai')"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
