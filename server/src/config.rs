pub(crate) use common::config::{
    ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "xo_server_config.yaml";

pub fn get_config_manager(
    file_path: &str,
) -> ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(file_path)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub static_files_path: String,
    pub bot_think_delay_ms: u64,
    pub cleanup_check_interval_secs: u64,
    pub session_inactivity_timeout_secs: u64,
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address must not be empty".to_string());
        }
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err("bind_address must be a valid socket address".to_string());
        }
        if self.static_files_path.is_empty() {
            return Err("static_files_path must not be empty".to_string());
        }
        if self.bot_think_delay_ms > 10_000 {
            return Err("bot_think_delay_ms must not exceed 10000".to_string());
        }
        if self.cleanup_check_interval_secs == 0 {
            return Err("cleanup_check_interval_secs must be greater than 0".to_string());
        }
        if self.session_inactivity_timeout_secs == 0 {
            return Err("session_inactivity_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_files_path: "./web".to_string(),
            bot_think_delay_ms: 600,
            cleanup_check_interval_secs: 300,
            session_inactivity_timeout_secs: 3600,
        }
    }
}
