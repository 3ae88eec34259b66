use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub upright_api_key: String,
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    pub state_path: PathBuf,
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("upright_api_key", &"[redacted]")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("state_path", &self.state_path)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
