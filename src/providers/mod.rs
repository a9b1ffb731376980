use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};

use crate::config::{Config, ProviderKind};
use crate::error::Result;

pub mod azure;
pub mod openrouter;

// Every outbound call (search or completion) is bound by the same budget.
// A single client is shared so connections get reused across requests.
pub(crate) static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(20))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

// Low-variance sampling: repeated calls for the same car should extract the
// same record as often as the model allows.
pub(crate) const TEMPERATURE: f32 = 0.2;
pub(crate) const TOP_P: f32 = 0.9;
pub(crate) const MAX_COMPLETION_TOKENS: u32 = 600;

/// One normalized web-search hit, in provider relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub url: String,
    pub snippet: String,
    pub display_url: String,
}

/// One normalized image-search hit. `full_resolution` is set when the
/// provider exposed an original-resolution URL rather than only a thumbnail.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub url: String,
    pub name: String,
    pub source_page: String,
    pub width: Option<u32>,
    pub full_resolution: bool,
}

/// The capability set the request pipeline needs from the outside world.
/// Concrete backends pair a search provider with a completion provider and
/// are selected once at startup.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// Web search with Indian-English locale parameters. Results missing a
    /// name or URL are dropped at this boundary.
    async fn web_search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Image search with the same locale parameters.
    async fn image_search(&self, query: &str) -> Result<Vec<ImageCandidate>>;

    /// Single chat-completion round trip; returns the raw model text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

pub fn backend_from_config(config: &Config) -> Arc<dyn ProviderBackend> {
    match config.provider {
        ProviderKind::Azure => Arc::new(azure::AzureBackend::new(config)),
        ProviderKind::OpenRouter => Arc::new(openrouter::OpenRouterBackend::new(config)),
    }
}

/// Picks the single best image: any original-resolution candidate first,
/// then the widest, then whatever the provider ranked first.
pub fn pick_best_image(candidates: &[ImageCandidate]) -> Option<&ImageCandidate> {
    if let Some(full) = candidates.iter().find(|c| c.full_resolution) {
        return Some(full);
    }
    if let Some(widest) = candidates
        .iter()
        .filter(|c| c.width.is_some())
        .max_by_key(|c| c.width)
    {
        return Some(widest);
    }
    candidates.first()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, width: Option<u32>, full_resolution: bool) -> ImageCandidate {
        ImageCandidate {
            url: url.to_string(),
            name: "Tata Nexon".to_string(),
            source_page: "https://example.com/nexon".to_string(),
            width,
            full_resolution,
        }
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(pick_best_image(&[]).is_none());
    }

    #[test]
    fn widest_candidate_wins_without_full_resolution() {
        let candidates = vec![
            candidate("a", Some(100), false),
            candidate("b", Some(500), false),
            candidate("c", Some(300), false),
        ];
        assert_eq!(pick_best_image(&candidates).unwrap().url, "b");
    }

    #[test]
    fn full_resolution_beats_width() {
        let candidates = vec![
            candidate("thumb", Some(4000), false),
            candidate("original", Some(200), true),
        ];
        assert_eq!(pick_best_image(&candidates).unwrap().url, "original");
    }

    #[test]
    fn falls_back_to_provider_order_without_widths() {
        let candidates = vec![candidate("first", None, false), candidate("second", None, false)];
        assert_eq!(pick_best_image(&candidates).unwrap().url, "first");
    }
}
