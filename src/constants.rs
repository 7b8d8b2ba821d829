// Shared constants, loaded from the environment where it makes sense.

use std::env;
use std::time::Duration;

/// File name of the committed blueprint in the target repository.
pub const BLUEPRINT_FILE_NAME: &str = "admin_tools_blueprint.json";

/// Commit message used when none is supplied.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Automated admin_tools blueprint update";

/// Models offered in the web UI selector.
pub const MODELS: &[&str] = &["gpt-5", "gpt-4o", "gpt-4", "gpt-3.5-turbo"];

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref OPENAI_API_BASE: String = env::var("OPENAI_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    pub static ref GITHUB_API_BASE: String = env::var("GITHUB_API_BASE").unwrap_or_else(|_| "https://api.github.com".to_string());
    // Fallback credentials when the sidebar fields are left empty.
    pub static ref OPENAI_API_KEY: String = env::var("OPENAI_API_KEY").unwrap_or_default();
    pub static ref GITHUB_TOKEN: String = env::var("GITHUB_TOKEN").unwrap_or_default();
    pub static ref DEFAULT_MODEL: String = env::var("ARCHITECT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
    pub static ref DEFAULT_BRANCH: String = env::var("ARCHITECT_BRANCH").unwrap_or_else(|_| "main".to_string());
    pub static ref BLUEPRINT_FOLDER: String = env::var("ARCHITECT_FOLDER").unwrap_or_else(|_| "admin_tools".to_string());
    pub static ref HTTP_TIMEOUT_SECS: u64 = env::var("ARCHITECT_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(120);
}

/// Timeout applied to each outbound vendor API request.
pub fn http_timeout() -> Duration {
    Duration::from_secs(*HTTP_TIMEOUT_SECS)
}
