use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load a YAML config file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request deadline for the chat route; `0` disables it.
    #[serde(default)]
    pub request_timeout_seconds: u64,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Path the chat-completion handler is mounted on.
    #[serde(default = "default_route")]
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: 0,
            max_body_bytes: default_max_body_bytes(),
            route: default_route(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_route() -> String {
    "/ai".to_string()
}

// ============================================================================
// GatewayConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Reject unknown provider names instead of routing them through GROQ.
    #[serde(default)]
    pub strict_providers: bool,
    #[serde(default = "default_openrouter_referer")]
    pub openrouter_referer: String,
    #[serde(default = "default_openrouter_title")]
    pub openrouter_title: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            strict_providers: false,
            openrouter_referer: default_openrouter_referer(),
            openrouter_title: default_openrouter_title(),
        }
    }
}

fn default_openrouter_referer() -> String {
    "https://your-site.com".to_string()
}

fn default_openrouter_title() -> String {
    "NSTA".to_string()
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_groq")]
    pub groq: ProviderConfig,
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
    #[serde(default = "default_openrouter")]
    pub openrouter: ProviderConfig,
    #[serde(default = "default_gemini")]
    pub gemini: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            groq: default_groq(),
            openai: default_openai(),
            openrouter: default_openrouter(),
            gemini: default_gemini(),
        }
    }
}

/// Endpoint and default model for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub default_model: String,
}

const DEFAULT_CHAT_MODEL: &str = "llama3-8b-8192";

fn default_groq() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://api.groq.com/openai/v1".to_string(),
        default_model: DEFAULT_CHAT_MODEL.to_string(),
    }
}

fn default_openai() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://api.openai.com/v1".to_string(),
        default_model: DEFAULT_CHAT_MODEL.to_string(),
    }
}

fn default_openrouter() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://openrouter.ai/api/v1".to_string(),
        default_model: DEFAULT_CHAT_MODEL.to_string(),
    }
}

fn default_gemini() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        default_model: "gemini-1.5-flash".to_string(),
    }
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 0);
        assert_eq!(config.server.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.server.route, "/ai");
        assert!(!config.gateway.strict_providers);
        assert_eq!(config.gateway.openrouter_title, "NSTA");
        assert_eq!(config.providers.groq.default_model, "llama3-8b-8192");
        assert_eq!(config.providers.gemini.default_model, "gemini-1.5-flash");
        assert_eq!(config.providers.openai.base_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(&missing_path).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
  request_timeout_seconds: 60
  max_body_bytes: 8388608
  route: "/api/ai"
gateway:
  strict_providers: true
  openrouter_referer: "https://dashboard.example.com"
  openrouter_title: "Dashboard"
providers:
  groq:
    base_url: "http://localhost:9000/v1"
    default_model: "llama-3.1-8b-instant"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_seconds, 60);
        assert_eq!(config.server.max_body_bytes, 8 * 1024 * 1024);
        assert_eq!(config.server.route, "/api/ai");
        assert!(config.gateway.strict_providers);
        assert_eq!(
            config.gateway.openrouter_referer,
            "https://dashboard.example.com"
        );
        assert_eq!(config.providers.groq.base_url, "http://localhost:9000/v1");
        assert_eq!(config.providers.groq.default_model, "llama-3.1-8b-instant");
        assert_eq!(config.providers.openai, default_openai()); // default
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0"); // default
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_seconds, 0); // default
        assert_eq!(config.providers.gemini, default_gemini()); // default
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }
}
