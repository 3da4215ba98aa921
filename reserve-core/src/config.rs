use reserve_client::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

/// 预订客户端配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | RESERVE_API_URL | http://localhost:3000 | 预订 API 地址 |
/// | RESERVE_API_TOKEN | (none) | Bearer token |
/// | RESERVE_DATA_DIR | ./data | 本地数据目录 (数据库、日志) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SESSION_TTL_SECS | 900 | 会话有效期(秒) |
/// | BOOKING_DURATION_MINUTES | 120 | 预订时长(分钟) |
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    /// 存放 `reserve.redb` 和 `logs/`
    pub data_dir: PathBuf,
    pub request_timeout_ms: u64,
    pub session_ttl_secs: u64,
    pub booking_duration_minutes: u32,
}

impl Config {
    /// 从环境变量加载配置，未设置时使用默认值
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("RESERVE_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            api_token: std::env::var("RESERVE_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            data_dir: std::env::var("RESERVE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            booking_duration_minutes: std::env::var("BOOKING_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(120),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(api_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_env();
        config.api_url = api_url.into();
        config.data_dir = data_dir.into();
        config
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_url.clone()).with_timeout_ms(self.request_timeout_ms);
        match &self.api_token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// redb 数据库文件
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("reserve.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_client_config() {
        let config = Config::with_overrides("http://api.test:8080", "/tmp/reserve");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/reserve/reserve.redb"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/reserve/logs"));

        let client = config.client_config();
        assert_eq!(client.base_url, "http://api.test:8080");
        assert_eq!(client.timeout_ms, config.request_timeout_ms);
    }
}
