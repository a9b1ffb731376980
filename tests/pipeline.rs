use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use car_price_lookup::{
    AppState,
    api::create_router,
    error::{AppError, Result},
    providers::{ImageCandidate, ProviderBackend, SearchResult},
};

const COMPLETION_JSON: &str = r#"{
    "brand": "Tata",
    "model": "Nexon",
    "one_sentence_info": "The Nexon is Tata's compact SUV with petrol, diesel and EV variants.",
    "starting_price_inr": 800000,
    "top_variant_price_inr": 1550000,
    "ex_showroom_or_on_road": "ex-showroom",
    "sources": ["https://www.tatamotors.com/nexon", "https://www.cardekho.com/nexon"],
    "last_checked": "2025-01-01T00:00:00Z"
}"#;

/// Canned backend; each capability can be flipped to fail with a transport
/// style error.
struct MockBackend {
    completion: String,
    fail_web_search: bool,
    fail_completion: bool,
}

impl MockBackend {
    fn happy() -> Self {
        MockBackend {
            completion: COMPLETION_JSON.to_string(),
            fail_web_search: false,
            fail_completion: false,
        }
    }
}

#[async_trait]
impl ProviderBackend for MockBackend {
    async fn web_search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        if self.fail_web_search {
            return Err(AppError::Search("connection refused".to_string()));
        }
        Ok((1..=5)
            .map(|i| SearchResult {
                name: format!("Tata Nexon price page {}", i),
                url: format!("https://site{}.in/nexon", i),
                snippet: "Tata Nexon price starts at Rs. 8.00 Lakh ex-showroom.".to_string(),
                display_url: format!("site{}.in", i),
            })
            .collect())
    }

    async fn image_search(&self, _query: &str) -> Result<Vec<ImageCandidate>> {
        Ok(vec![
            ImageCandidate {
                url: "https://img.in/nexon-thumb.jpg".to_string(),
                name: "Tata Nexon thumbnail".to_string(),
                source_page: "https://site1.in/nexon".to_string(),
                width: Some(300),
                full_resolution: false,
            },
            ImageCandidate {
                url: "https://img.in/nexon-full.jpg".to_string(),
                name: "Tata Nexon".to_string(),
                source_page: "https://site2.in/nexon".to_string(),
                width: Some(1920),
                full_resolution: true,
            },
        ])
    }

    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        if self.fail_completion {
            return Err(AppError::Completion("bad gateway".to_string()));
        }
        Ok(self.completion.clone())
    }
}

fn app(backend: MockBackend) -> axum::Router {
    create_router(AppState {
        backend: Arc::new(backend),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liveness_check_returns_ok() {
    let response = app(MockBackend::happy())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn successful_lookup_returns_the_assembled_payload() {
    let response = app(MockBackend::happy())
        .oneshot(
            Request::builder()
                .uri("/api/search?q=Tata%20Nexon")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["query"], "Tata Nexon");
    assert_eq!(json["model"], "Nexon");
    assert_eq!(json["brand"], "Tata");
    assert_eq!(json["prices"]["starting_inr"], 800000);
    assert_eq!(json["prices"]["starting_lakhs"], "8.00 lakhs");
    assert_eq!(json["prices"]["top_variant_lakhs"], "15.50 lakhs");
    assert_eq!(json["basis"], "ex-showroom");
    assert_eq!(json["image"]["url"], "https://img.in/nexon-full.jpg");
    assert_eq!(json["sources"][0], "https://www.tatamotors.com/nexon");
    assert!(json["disclaimer"].as_str().unwrap().contains("dealer"));
}

#[tokio::test]
async fn malformed_completion_still_returns_200_with_fallback() {
    let backend = MockBackend {
        completion: "I'm sorry, I can't produce JSON today.".to_string(),
        ..MockBackend::happy()
    };
    let response = app(backend)
        .oneshot(
            Request::builder()
                .uri("/api/search?q=Tata%20Nexon")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["model"], "Tata Nexon");
    assert!(json["prices"]["starting_inr"].is_null());
    assert!(json["prices"]["starting_lakhs"].is_null());
    assert_eq!(json["basis"], "ex-showroom (likely)");
    // First four distinct web result URLs back the fallback record.
    assert_eq!(json["sources"].as_array().unwrap().len(), 4);
    assert_eq!(json["sources"][0], "https://site1.in/nexon");
}

#[tokio::test]
async fn missing_query_is_a_400_with_an_error_key() {
    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let response = app(MockBackend::happy())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing car name in 'q' parameter");
    }
}

#[tokio::test]
async fn web_search_transport_error_is_a_500_with_details() {
    let backend = MockBackend {
        fail_web_search: true,
        ..MockBackend::happy()
    };
    let response = app(backend)
        .oneshot(
            Request::builder()
                .uri("/api/search?q=Tata%20Nexon")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Search failed");
    assert!(json["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn completion_transport_error_is_not_masked() {
    let backend = MockBackend {
        fail_completion: true,
        ..MockBackend::happy()
    };
    let response = app(backend)
        .oneshot(
            Request::builder()
                .uri("/api/search?q=Tata%20Nexon")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Search failed");
    assert!(json["details"].as_str().unwrap().contains("bad gateway"));
}
