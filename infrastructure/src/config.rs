use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://na-itssu-api.jun0.dev";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub chatbot_base_url: String,
    pub store_path: PathBuf,
    /// Applies to plain JSON requests; streaming replies are not cut off.
    pub timeout: Duration,
    /// Set when the chatbot URL came from the environment or a builder call.
    chatbot_url_pinned: bool,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        let api_base_url = env::var("NAITSSU_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let pinned = env::var("NAITSSU_CHATBOT_BASE_URL").ok();
        let chatbot_url_pinned = pinned.is_some();
        let chatbot_base_url =
            pinned.unwrap_or_else(|| Self::chatbot_url_for(&api_base_url));
        let store_path = env::var("NAITSSU_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_store_path());
        let timeout = env::var("NAITSSU_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            api_base_url,
            chatbot_base_url,
            store_path,
            timeout: Duration::from_secs(timeout),
            chatbot_url_pinned,
        }
    }

    /// Points the REST client at another backend. The chatbot follows it
    /// unless its URL was set explicitly.
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        let url = url.trim_end_matches('/').to_string();
        if !self.chatbot_url_pinned {
            self.chatbot_base_url = Self::chatbot_url_for(&url);
        }
        self.api_base_url = url;
        self
    }

    pub fn with_chatbot_base_url(mut self, url: &str) -> Self {
        self.chatbot_base_url = url.trim_end_matches('/').to_string();
        self.chatbot_url_pinned = true;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    fn chatbot_url_for(api_base_url: &str) -> String {
        format!("{}/api/chatbot", api_base_url.trim_end_matches('/'))
    }

    fn default_store_path() -> PathBuf {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let mut path = PathBuf::from(home);
        path.push(".local");
        path.push("share");
        path.push("naitssu");
        path.push("store.db");
        path
    }
}
