use anyhow::Result;

/// Engine configuration loaded from environment variables.
///
/// The embedding credential is optional by design: without it the engine
/// still works, ranking by keyword overlap instead of embeddings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. `None` means the index is built without embeddings
    /// and every retrieval uses the keyword fallback.
    pub google_api_key: Option<String>,
    /// Path to the candidate's master profile JSON.
    pub profile_path: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            profile_path: std::env::var("PROFILE_PATH")
                .unwrap_or_else(|_| "data/master_profile.json".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
