use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;
use crate::providers::{ProviderBackend, SearchResult};

/// How many search snippets the model gets to see.
pub const MAX_SNIPPETS: usize = 8;
/// How many source URLs a record may carry.
pub const MAX_SOURCES: usize = 4;

pub const FALLBACK_INFO: &str = "Could not reliably extract details from sources.";

const SYSTEM_PROMPT: &str = "You are a data extraction assistant for the Indian car market. \
From the numbered search results you are given, extract pricing details for the requested car \
and respond with a single JSON object containing exactly these keys: \
\"brand\", \"model\", \"one_sentence_info\", \"starting_price_inr\", \"top_variant_price_inr\", \
\"ex_showroom_or_on_road\", \"sources\", \"last_checked\". \
Prices are integers in Indian rupees. When sources disagree on a price, prefer the \
manufacturer's own site, then large auto publications (CarDekho, CarWale, ZigWheels, Autocar \
India), then anything else. If you are not certain about a price, emit null instead of \
guessing. \"sources\" is an array of up to 4 URLs you actually used, and \"last_checked\" is \
the current date in ISO-8601 format. Respond with the bare JSON object only, no prose and no \
markdown fences.";

/// The shape we ask the model to produce. Missing keys deserialize to null
/// rather than failing the whole parse; the assembler fills in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub one_sentence_info: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub starting_price_inr: Option<i64>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub top_variant_price_inr: Option<i64>,
    #[serde(default, rename = "ex_showroom_or_on_road")]
    pub basis: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
}

// Models occasionally quote prices as strings ("₹8,00,000" is still dropped,
// but "800000" is salvageable). Anything non-numeric becomes null.
fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Numbered snippet list for the user message, capped at [`MAX_SNIPPETS`].
pub fn user_prompt(query: &str, results: &[SearchResult]) -> String {
    let mut prompt = String::with_capacity(256 + results.len() * 200);
    prompt.push_str(&format!("Car: {}\n\nSearch results:\n", query));
    for (i, result) in results.iter().take(MAX_SNIPPETS).enumerate() {
        prompt.push_str(&format!(
            "{}. {} ({})\n{}\n\n",
            i + 1,
            result.name,
            result.url,
            result.snippet
        ));
    }
    prompt
}

/// Runs one extraction round trip. Transport failures from the completion
/// provider propagate; malformed completion text never does.
pub async fn run(
    backend: &dyn ProviderBackend,
    query: &str,
    results: &[SearchResult],
) -> Result<ExtractionRecord> {
    let raw = backend
        .complete(system_prompt(), &user_prompt(query, results))
        .await?;
    Ok(parse_extraction(&raw, query, results))
}

/// Parses the raw completion text into a record, or synthesizes the
/// deterministic fallback when the text is not a usable JSON object.
pub fn parse_extraction(raw: &str, query: &str, results: &[SearchResult]) -> ExtractionRecord {
    match serde_json::from_str::<ExtractionRecord>(strip_to_json(raw)) {
        Ok(mut record) => {
            record.sources.truncate(MAX_SOURCES);
            record
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "completion was not valid JSON, using fallback record");
            fallback_record(query, results)
        }
    }
}

// Models wrap JSON in markdown fences or a leading sentence often enough
// that we slice from the first '{' to the last '}' before parsing.
fn strip_to_json(raw: &str) -> &str {
    let raw = raw.trim();
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

/// The well-typed record returned when the model's output is unusable.
pub fn fallback_record(query: &str, results: &[SearchResult]) -> ExtractionRecord {
    ExtractionRecord {
        brand: None,
        model: Some(query.to_string()),
        one_sentence_info: Some(FALLBACK_INFO.to_string()),
        starting_price_inr: None,
        top_variant_price_inr: None,
        basis: None,
        sources: first_source_urls(results),
        last_checked: Some(Utc::now().to_rfc3339()),
    }
}

/// First [`MAX_SOURCES`] distinct result URLs, insertion order preserved.
pub fn first_source_urls(results: &[SearchResult]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::with_capacity(MAX_SOURCES);
    for result in results {
        if !urls.contains(&result.url) {
            urls.push(result.url.clone());
        }
        if urls.len() == MAX_SOURCES {
            break;
        }
    }
    urls
}
