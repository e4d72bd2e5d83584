#[derive(Clone)]
pub struct Config {
    /// Base URL of the task backend, without a trailing slash.
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("TASKS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }
}
