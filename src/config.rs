use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8989;
pub const MAX_CONNECTIONS: usize = 10;
pub const DEFAULT_LOG_FILE: &str = "server.log";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_clients: usize,
    /// `None` keeps every chat line.
    pub history_limit: Option<usize>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clients: MAX_CONNECTIONS,
            history_limit: None,
        }
    }
}

/// Where the activity log goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr(), "0.0.0.0:8989");
        assert_eq!(config.max_clients, 10);
        assert_eq!(config.history_limit, None);
    }
}
