use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};

use scriptaudit_ai::{CompletionProvider, ProviderError};
use scriptaudit_core::{AnalysisId, AnalysisResult};
use scriptaudit_api::app::{self, services::AppServices};
use scriptaudit_infra::{AnalysisRunner, CannedProvider, UnconfiguredProvider};

const HAPPY_PATH: &str = r#"{"analysis":{"technicalTerms":["API"],"readabilityScore":8,"suggestions":["clarify X"],"overallScore":8,"prioritizedImprovements":["add examples"],"sections":{"introduction":{"score":8,"suggestions":[],"readabilityMetrics":{"fleschKincaid":10,"wordsPerSentence":12,"technicalTerms":[]}}}},"rewrittenScript":{"learningObjectives":["understand API"],"introduction":"Hi","mainContent":"Body","conclusion":"End","callToAction":"Go"}}"#;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(provider: Arc<dyn CompletionProvider>) -> Self {
        // Same router as prod, fast retries, ephemeral port.
        let runner = AnalysisRunner {
            max_retries: 1,
            base_backoff: Duration::from_millis(1),
        };
        let app = app::build_app(AppServices::new(provider, runner));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn analyze(&self, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/analyze", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn error_code(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(Arc::new(UnconfiguredProvider)).await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn clean_response_is_returned_as_is() {
    let provider = Arc::new(CannedProvider::new(HAPPY_PATH));
    let srv = TestServer::spawn(provider.clone()).await;

    let res = srv
        .analyze(json!({ "script": "Welcome to APIs.", "model": "google/gemini-pro" }))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-analysis-outcome"], "complete");
    let id = res.headers()["x-analysis-id"].to_str().unwrap().to_string();
    assert!(id.parse::<AnalysisId>().is_ok());

    let body: AnalysisResult = res.json().await.unwrap();
    let expected: AnalysisResult = serde_json::from_str(HAPPY_PATH).unwrap();
    assert_eq!(body, expected);

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model, "google/gemini-pro");
    assert!(sent[0].prompt.contains("Welcome to APIs."));
}

#[tokio::test]
async fn messy_response_is_normalized() {
    let raw = format!("Here is your analysis:\n```json\n{HAPPY_PATH}\n```\n\nHope this helps!");
    let srv = TestServer::spawn(Arc::new(CannedProvider::new(raw))).await;

    let res = srv.analyze(json!({ "script": "s", "model": "m" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-analysis-outcome"], "complete");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["rewrittenScript"]["callToAction"], "Go");
}

#[tokio::test]
async fn garbage_response_falls_back_to_the_script() {
    let srv = TestServer::spawn(Arc::new(CannedProvider::new("<html>502</html>"))).await;

    let res = srv
        .analyze(json!({ "script": "My script about ownership.", "model": "m" }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-analysis-outcome"], "fallback");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["rewrittenScript"]["introduction"], "My script about ownership.");
    assert_eq!(body["analysis"]["overallScore"], 7.0);
}

#[tokio::test]
async fn truncated_response_is_partially_filled() {
    let cut = HAPPY_PATH.find(",\"callToAction\"").unwrap();
    let srv = TestServer::spawn(Arc::new(CannedProvider::new(&HAPPY_PATH[..cut]))).await;

    let res = srv.analyze(json!({ "script": "s", "model": "m" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-analysis-outcome"], "partial");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["rewrittenScript"]["conclusion"], "End");
    assert_eq!(
        body["rewrittenScript"]["callToAction"],
        "[Call to action needs to be added]"
    );
}

#[tokio::test]
async fn request_validation_errors() {
    let srv = TestServer::spawn(Arc::new(CannedProvider::new(HAPPY_PATH))).await;

    let res = reqwest::Client::new()
        .post(format!("{}/api/analyze", srv.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "invalid_request_body");

    let cases = [
        (json!({ "model": "m" }), "missing_required_fields"),
        (json!({ "script": "", "model": "m" }), "missing_required_fields"),
        (json!({ "script": "   ", "model": "m" }), "invalid_script"),
        (json!({ "script": ["a"], "model": "m" }), "invalid_script"),
        (json!({ "script": "s", "model": "  " }), "invalid_model"),
        (json!({ "script": "s", "model": 3 }), "invalid_model"),
    ];
    for (body, expected) in cases {
        let res = srv.analyze(body.clone()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(error_code(res).await, expected, "body: {body}");
    }
}

#[tokio::test]
async fn unconfigured_provider_is_service_unavailable() {
    let srv = TestServer::spawn(Arc::new(UnconfiguredProvider)).await;

    let res = srv.analyze(json!({ "script": "s", "model": "m" })).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(res).await, "provider_unconfigured");
}

#[tokio::test]
async fn provider_failure_after_retries_is_bad_gateway() {
    let provider = Arc::new(CannedProvider::scripted(vec![Err(ProviderError::Status {
        status: 500,
        body: "upstream exploded".into(),
    })]));
    let srv = TestServer::spawn(provider.clone()).await;

    let res = srv.analyze(json!({ "script": "s", "model": "m" })).await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(res).await, "analysis_failed");
    assert_eq!(provider.calls(), 2);
}
