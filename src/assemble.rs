use chrono::Utc;

use crate::api::models::{ImageInfo, PriceBlock, ResponsePayload};
use crate::extract::{ExtractionRecord, first_source_urls};
use crate::providers::{ImageCandidate, SearchResult};

pub const DEFAULT_BASIS: &str = "ex-showroom (likely)";

pub const DISCLAIMER: &str = "Prices are indicative, compiled from public web sources, and may \
be outdated or vary by city and dealer. Confirm with an authorized dealer before purchase.";

/// Renders a rupee amount in lakhs with two decimals. Pure and idempotent in
/// the sense that the same amount always formats to the same string.
pub fn to_lakhs(amount: Option<i64>) -> Option<String> {
    amount.map(|inr| format!("{:.2} lakhs", inr as f64 / 100_000.0))
}

/// Merges the extraction record, the selected image, and the raw web results
/// into the final payload. Pure function of its inputs apart from the
/// timestamp taken when the record carries none.
pub fn assemble(
    query: &str,
    record: ExtractionRecord,
    image: Option<&ImageCandidate>,
    web_results: &[SearchResult],
) -> ResponsePayload {
    let model = record
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| query.to_string());

    let basis = record
        .basis
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASIS.to_string());

    let sources = if record.sources.is_empty() {
        first_source_urls(web_results)
    } else {
        record.sources
    };

    let last_checked = record
        .last_checked
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    ResponsePayload {
        query: query.to_string(),
        brand: record.brand,
        model,
        one_sentence_info: record.one_sentence_info,
        prices: PriceBlock {
            starting_lakhs: to_lakhs(record.starting_price_inr),
            starting_inr: record.starting_price_inr,
            top_variant_lakhs: to_lakhs(record.top_variant_price_inr),
            top_variant_inr: record.top_variant_price_inr,
        },
        basis,
        image: image.map(|img| ImageInfo {
            url: img.url.clone(),
            name: img.name.clone(),
            source_page: img.source_page.clone(),
        }),
        sources,
        last_checked,
        disclaimer: DISCLAIMER,
    }
}
