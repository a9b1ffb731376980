use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// The externally visible lookup result.
#[derive(Debug, Serialize)]
pub struct ResponsePayload {
    pub query: String,
    pub brand: Option<String>,
    pub model: String,
    pub one_sentence_info: Option<String>,
    pub prices: PriceBlock,
    pub basis: String,
    pub image: Option<ImageInfo>,
    pub sources: Vec<String>,
    pub last_checked: String,
    pub disclaimer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PriceBlock {
    pub starting_inr: Option<i64>,
    pub starting_lakhs: Option<String>,
    pub top_variant_inr: Option<i64>,
    pub top_variant_lakhs: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageInfo {
    pub url: String,
    pub name: String,
    pub source_page: String,
}
