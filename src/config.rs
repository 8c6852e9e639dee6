use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ORGANIZATION: &str = "The NSS Unit Of Atlas SkillTech University";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub model: String,
    pub base_url: String,
    pub organization: String,
    /// `None` means the request may block indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key_file: PathBuf,
    pub stylesheet: PathBuf,
    pub output_dir: PathBuf,
    /// Fallback credential when the key file is absent.
    pub env_api_key: Option<String>,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key_file: PathBuf::from("api_key.txt"),
            stylesheet: PathBuf::from("styles.css"),
            output_dir: PathBuf::from("."),
            env_api_key: None,
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` from the working directory, then read overrides from the environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let timeout = get("REPORT_AI_TIMEOUT_SECS").and_then(|v| match v.parse::<u64>() {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                log::warn!("Ignoring REPORT_AI_TIMEOUT_SECS={:?}: not a number", v);
                None
            }
        });

        AppConfig {
            api_key_file: get("REPORT_API_KEY_FILE").map(PathBuf::from).unwrap_or(defaults.api_key_file),
            stylesheet: get("REPORT_STYLESHEET").map(PathBuf::from).unwrap_or(defaults.stylesheet),
            output_dir: get("REPORT_OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            env_api_key: get("GEMINI_API_KEY"),
            ai: AiConfig {
                model: get("GEMINI_MODEL").unwrap_or(defaults.ai.model),
                base_url: get("GEMINI_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.ai.base_url),
                organization: get("REPORT_ORGANIZATION").unwrap_or(defaults.ai.organization),
                timeout,
            },
        }
    }
}
