//! Server configuration

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Base URL of the downstream records API, substituted into every
    /// generated request URL
    pub fhir_base_url: String,
    /// Optional API key; auth is disabled when unset
    pub api_key: Option<String>,
    /// Optional Hugging Face Inference API token; remote classification
    /// and NER are disabled when unset
    pub hf_api_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".into()),
            fhir_base_url: std::env::var("FHIR_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/fhir".into()),
            api_key: std::env::var("API_KEY").ok(),
            hf_api_token: std::env::var("HF_API_TOKEN").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        }
    }
}
