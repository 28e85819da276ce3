use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://quiz.db";
const DEFAULT_CLIENT_SECRET: &str = "client_secret.json";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8501/";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub client_secret_path: PathBuf,
    pub redirect_uri: Url,
    pub chatgpt_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let redirect_uri = get("GOOGLE_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let redirect_uri = Url::parse(&redirect_uri).map_err(ConfigError::RedirectUri)?;

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            client_secret_path: get("GOOGLE_CLIENT_SECRET")
                .unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string())
                .into(),
            redirect_uri,
            chatgpt_api_key: get("CHATGPT_API_KEY"),
        })
    }
}
