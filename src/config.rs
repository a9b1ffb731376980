use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Which search + completion provider pair to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Bing Web/Image Search + Azure OpenAI chat completions.
    Azure,
    /// Serper.dev search + OpenRouter chat completions.
    OpenRouter,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub provider: ProviderKind,
    pub bing_api_key: Option<String>,
    pub bing_endpoint: String,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_deployment: String,
    pub serper_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let provider = match env::var("PROVIDER").as_deref() {
            Ok("openrouter") => ProviderKind::OpenRouter,
            Ok("azure") | Err(_) => ProviderKind::Azure,
            Ok(other) => {
                tracing::warn!("Unknown PROVIDER '{}', falling back to azure", other);
                ProviderKind::Azure
            }
        };

        let config = Config {
            server_addr: SocketAddr::new(ip, port),
            provider,
            bing_api_key: env::var("BING_API_KEY").ok(),
            bing_endpoint: env::var("BING_ENDPOINT")
                .unwrap_or_else(|_| "https://api.bing.microsoft.com/v7.0".to_string()),
            azure_openai_api_key: env::var("AZURE_OPENAI_API_KEY").ok(),
            azure_openai_endpoint: env::var("AZURE_OPENAI_ENDPOINT").ok(),
            azure_openai_deployment: env::var("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            serper_api_key: env::var("SERPER_API_KEY").ok(),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok(),
            openrouter_model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "deepseek/deepseek-chat-v3-0324".to_string()),
        };

        config.warn_missing_credentials();
        Ok(config)
    }

    // Missing credentials are a warning at boot, not a hard failure; the
    // affected adapter reports the problem when it is actually called.
    fn warn_missing_credentials(&self) {
        match self.provider {
            ProviderKind::Azure => {
                if self.bing_api_key.is_none() {
                    tracing::warn!("BING_API_KEY is not set; web and image search will fail");
                }
                if self.azure_openai_api_key.is_none() {
                    tracing::warn!("AZURE_OPENAI_API_KEY is not set; extraction will fail");
                }
                if self.azure_openai_endpoint.is_none() {
                    tracing::warn!("AZURE_OPENAI_ENDPOINT is not set; extraction will fail");
                }
            }
            ProviderKind::OpenRouter => {
                if self.serper_api_key.is_none() {
                    tracing::warn!("SERPER_API_KEY is not set; web and image search will fail");
                }
                if self.openrouter_api_key.is_none() {
                    tracing::warn!("OPENROUTER_API_KEY is not set; extraction will fail");
                }
            }
        }
    }
}
