use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

use super::{CLIENT, ImageCandidate, MAX_COMPLETION_TOKENS, SearchResult, TEMPERATURE, TOP_P};

const API_VERSION: &str = "2024-02-15-preview";

/// Bing Web/Image Search v7 plus Azure OpenAI chat completions.
pub struct AzureBackend {
    bing_endpoint: String,
    bing_api_key: Option<String>,
    openai_endpoint: Option<String>,
    openai_api_key: Option<String>,
    deployment: String,
}

impl AzureBackend {
    pub fn new(config: &Config) -> Self {
        AzureBackend {
            bing_endpoint: config.bing_endpoint.clone(),
            bing_api_key: config.bing_api_key.clone(),
            openai_endpoint: config.azure_openai_endpoint.clone(),
            openai_api_key: config.azure_openai_api_key.clone(),
            deployment: config.azure_openai_deployment.clone(),
        }
    }

    fn bing_key(&self) -> Result<&str> {
        self.bing_api_key
            .as_deref()
            .ok_or_else(|| AppError::Search("BING_API_KEY is not configured".to_string()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingWebResponse {
    web_pages: Option<BingWebPages>,
}

#[derive(Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingWebResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    display_url: String,
}

#[derive(Deserialize)]
struct BingImageResponse {
    #[serde(default)]
    value: Vec<BingImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingImage {
    content_url: Option<String>,
    thumbnail_url: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    host_page_url: String,
    width: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl super::ProviderBackend for AzureBackend {
    async fn web_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.bing_endpoint);
        let response = CLIENT
            .get(&url)
            .header("Ocp-Apim-Subscription-Key", self.bing_key()?)
            .query(&[
                ("q", query),
                ("mkt", "en-IN"),
                ("setLang", "en"),
                ("count", "10"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Bing web search: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Bing web search returned {}",
                response.status()
            )));
        }

        let body: BingWebResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Bing web search body: {}", e)))?;

        let results = body
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !r.name.is_empty() && !r.url.is_empty())
            .map(|r| SearchResult {
                name: r.name,
                url: r.url,
                snippet: r.snippet,
                display_url: r.display_url,
            })
            .collect();

        Ok(results)
    }

    async fn image_search(&self, query: &str) -> Result<Vec<ImageCandidate>> {
        let url = format!("{}/images/search", self.bing_endpoint);
        let response = CLIENT
            .get(&url)
            .header("Ocp-Apim-Subscription-Key", self.bing_key()?)
            .query(&[
                ("q", query),
                ("mkt", "en-IN"),
                ("setLang", "en"),
                ("count", "10"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Bing image search: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Bing image search returned {}",
                response.status()
            )));
        }

        let body: BingImageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Bing image search body: {}", e)))?;

        let candidates = body
            .value
            .into_iter()
            .filter_map(|img| {
                let full_resolution = img.content_url.is_some();
                let url = img.content_url.or(img.thumbnail_url)?;
                if url.is_empty() || img.name.is_empty() {
                    return None;
                }
                Some(ImageCandidate {
                    url,
                    name: img.name,
                    source_page: img.host_page_url,
                    width: img.width,
                    full_resolution,
                })
            })
            .collect();

        Ok(candidates)
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let endpoint = self.openai_endpoint.as_deref().ok_or_else(|| {
            AppError::Completion("AZURE_OPENAI_ENDPOINT is not configured".to_string())
        })?;
        let api_key = self.openai_api_key.as_deref().ok_or_else(|| {
            AppError::Completion("AZURE_OPENAI_API_KEY is not configured".to_string())
        })?;

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            self.deployment,
            API_VERSION
        );

        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_COMPLETION_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = CLIENT
            .post(&url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("Azure OpenAI: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Completion(format!(
                "Azure OpenAI returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Azure OpenAI body: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Completion("Azure OpenAI returned no choices".to_string()))
    }
}
