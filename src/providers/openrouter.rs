use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

use super::{CLIENT, ImageCandidate, MAX_COMPLETION_TOKENS, SearchResult, TEMPERATURE, TOP_P};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
const SERPER_IMAGES_URL: &str = "https://google.serper.dev/images";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Serper.dev search plus OpenRouter chat completions.
pub struct OpenRouterBackend {
    serper_api_key: Option<String>,
    openrouter_api_key: Option<String>,
    model: String,
}

impl OpenRouterBackend {
    pub fn new(config: &Config) -> Self {
        OpenRouterBackend {
            serper_api_key: config.serper_api_key.clone(),
            openrouter_api_key: config.openrouter_api_key.clone(),
            model: config.openrouter_model.clone(),
        }
    }

    fn serper_key(&self) -> Result<&str> {
        self.serper_api_key
            .as_deref()
            .ok_or_else(|| AppError::Search("SERPER_API_KEY is not configured".to_string()))
    }
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: u32,
}

impl<'a> SerperRequest<'a> {
    fn india(query: &'a str) -> Self {
        SerperRequest {
            q: query,
            gl: "in",
            hl: "en",
            num: 10,
        }
    }
}

#[derive(Deserialize)]
struct SerperSearchResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Deserialize)]
struct SerperImageResponse {
    #[serde(default)]
    images: Vec<SerperImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerperImage {
    image_url: Option<String>,
    thumbnail_url: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    image_width: Option<u32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[async_trait]
impl super::ProviderBackend for OpenRouterBackend {
    async fn web_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response = CLIENT
            .post(SERPER_SEARCH_URL)
            .header("X-API-KEY", self.serper_key()?)
            .json(&SerperRequest::india(query))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Serper web search: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Serper web search returned {}",
                response.status()
            )));
        }

        let body: SerperSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Serper web search body: {}", e)))?;

        let results = body
            .organic
            .into_iter()
            .filter(|r| !r.title.is_empty() && !r.link.is_empty())
            .map(|r| SearchResult {
                name: r.title,
                display_url: r.link.clone(),
                url: r.link,
                snippet: r.snippet,
            })
            .collect();

        Ok(results)
    }

    async fn image_search(&self, query: &str) -> Result<Vec<ImageCandidate>> {
        let response = CLIENT
            .post(SERPER_IMAGES_URL)
            .header("X-API-KEY", self.serper_key()?)
            .json(&SerperRequest::india(query))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Serper image search: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Serper image search returned {}",
                response.status()
            )));
        }

        let body: SerperImageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Serper image search body: {}", e)))?;

        let candidates = body
            .images
            .into_iter()
            .filter_map(|img| {
                let full_resolution = img.image_url.is_some();
                let url = img.image_url.or(img.thumbnail_url)?;
                if url.is_empty() || img.title.is_empty() {
                    return None;
                }
                Some(ImageCandidate {
                    url,
                    name: img.title,
                    source_page: img.link,
                    width: img.image_width,
                    full_resolution,
                })
            })
            .collect();

        Ok(candidates)
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let api_key = self.openrouter_api_key.as_deref().ok_or_else(|| {
            AppError::Completion("OPENROUTER_API_KEY is not configured".to_string())
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = CLIENT
            .post(OPENROUTER_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("OpenRouter: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Completion(format!(
                "OpenRouter returned {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("OpenRouter body: {}", e)))?;

        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AppError::Completion("Invalid response format from OpenRouter".to_string())
            })?
            .to_string();

        Ok(reply)
    }
}
