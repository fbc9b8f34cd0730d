use std::env;

/// Placeholder shipped in sample configs; treated the same as an unset key.
const GEMINI_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firebase,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    // Plan store
    pub store_backend: StoreBackend,
    pub firebase_database_url: Option<String>,
    pub firebase_auth: Option<String>,
    pub plan_collection: String,
    // Advice service (optional)
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        let optional = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let store_backend = match var("PLAN_STORE_BACKEND", "firebase").to_lowercase().as_str() {
            "firebase" => StoreBackend::Firebase,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("Unknown PLAN_STORE_BACKEND: {}", other),
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse()?,
            app_base_url: var("APP_BASE_URL", "http://localhost"),
            store_backend,
            firebase_database_url: optional("FIREBASE_DATABASE_URL"),
            firebase_auth: optional("FIREBASE_AUTH"),
            plan_collection: var("PLAN_COLLECTION", "weekly_plans"),
            gemini_api_key: optional("GEMINI_API_KEY").filter(|k| k != GEMINI_KEY_PLACEHOLDER),
            gemini_model: var("GEMINI_MODEL", "gemini-2.0-flash-exp"),
            gemini_base_url: var(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
        })
    }
}
