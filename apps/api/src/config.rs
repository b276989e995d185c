use anyhow::{bail, Context, Result};

const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScorerKind {
    Llm,
    Keyword,
}

/// Groq chat-completion settings shared by every LLM call.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct SerpSettings {
    pub api_key: String,
    pub base_url: String,
    pub engine: String,
}

#[derive(Debug, Clone)]
pub struct DeepgramSettings {
    pub api_key: String,
    pub base_url: String,
    pub stt_model: String,
    pub tts_model: String,
}

/// Artifact bucket for interview audio and reports. MinIO locally, S3 in prod.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or out of range.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub llm: LlmSettings,
    pub serp: SerpSettings,
    pub deepgram: DeepgramSettings,
    pub checkpoint_backend: CheckpointBackend,
    pub match_scorer: MatchScorerKind,
    pub database_url: Option<String>,
    pub s3: Option<S3Settings>,
    /// Browser origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = match or_default("ENVIRONMENT", "dev").as_str() {
            "dev" => Environment::Dev,
            "prod" => Environment::Prod,
            other => bail!("ENVIRONMENT must be 'dev' or 'prod', got '{other}'"),
        };

        let max_tokens = or_default("LLM_MAX_TOKENS", "2500")
            .parse::<u32>()
            .context("LLM_MAX_TOKENS must be an integer")?;
        if !(100..=10_000).contains(&max_tokens) {
            bail!("LLM_MAX_TOKENS must be between 100 and 10000, got {max_tokens}");
        }

        let temperature = or_default("LLM_TEMPERATURE", "0.7")
            .parse::<f32>()
            .context("LLM_TEMPERATURE must be a number")?;
        if !(0.0..=2.0).contains(&temperature) {
            bail!("LLM_TEMPERATURE must be between 0.0 and 2.0, got {temperature}");
        }

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let checkpoint_backend = match or_default("CHECKPOINT_BACKEND", "memory").as_str() {
            "memory" => CheckpointBackend::Memory,
            "postgres" => CheckpointBackend::Postgres,
            other => bail!("CHECKPOINT_BACKEND must be 'memory' or 'postgres', got '{other}'"),
        };
        if checkpoint_backend == CheckpointBackend::Postgres && database_url.is_none() {
            bail!("CHECKPOINT_BACKEND=postgres requires DATABASE_URL");
        }

        let match_scorer = match or_default("MATCH_SCORER", "llm").as_str() {
            "llm" => MatchScorerKind::Llm,
            "keyword" => MatchScorerKind::Keyword,
            other => bail!("MATCH_SCORER must be 'llm' or 'keyword', got '{other}'"),
        };

        // S3 is optional: all four variables or none.
        let s3 = match (
            lookup("S3_BUCKET"),
            lookup("S3_ENDPOINT"),
            lookup("AWS_ACCESS_KEY_ID"),
            lookup("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(bucket), Some(endpoint), Some(access_key_id), Some(secret_access_key)) => {
                Some(S3Settings {
                    bucket,
                    endpoint,
                    access_key_id,
                    secret_access_key,
                })
            }
            _ => None,
        };

        let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            environment,
            llm: LlmSettings {
                api_key: require("GROQ_API_KEY")?,
                base_url: or_default("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL),
                model: or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL),
                max_tokens,
                temperature,
            },
            serp: SerpSettings {
                api_key: require("SERPAPI_API_KEY")?,
                base_url: or_default("SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE_URL),
                engine: or_default("SERP_ENGINE", "google_jobs"),
            },
            deepgram: DeepgramSettings {
                api_key: require("DEEPGRAM_API_KEY")?,
                base_url: or_default("DEEPGRAM_BASE_URL", DEFAULT_DEEPGRAM_BASE_URL),
                stt_model: or_default("DEEPGRAM_STT_MODEL", "nova-2"),
                tts_model: or_default("DEEPGRAM_TTS_MODEL", "aura-asteria-en"),
            },
            checkpoint_backend,
            match_scorer,
            database_url,
            s3,
            cors_origins,
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
