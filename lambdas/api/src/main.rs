use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::{
    prices::{KnownPriceTable, PriceExtractor, PriceLookupTool, SerpApiClient},
    reports::SearchResponse,
    speech::{AudioClip, SpeechmaticsClient, Transcriber},
};
use planner::{AgentPlanner, GroqClient, MedicinePriceTool, Planner};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use ulid::Ulid;

mod config;

use config::Config;

/// Multipart field carrying the recording.
const AUDIO_FIELD: &str = "audio";
const AUDIO_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    planner: Arc<dyn Planner>,
    planner_timeout: Duration,
    transcriber: Option<Arc<dyn Transcriber>>,
    transcription_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
struct VoiceSearchResponse {
    text: String,
}

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env().inspect_err(|e| tracing::error!("{}", e))?;

    let search = SerpApiClient::new(&config.serpapi_api_key, config.search_timeout)?
        .with_base_url(&config.serpapi_base_url);
    let extractor = PriceExtractor::new(Arc::new(search), Arc::new(KnownPriceTable::jan_aushadhi()));
    let prices_tool = MedicinePriceTool::new(PriceLookupTool::new(extractor));

    let model = GroqClient::new(&config.groq_api_key, &config.groq_model, config.planner_timeout)?
        .with_base_url(&config.groq_base_url);
    let planner = AgentPlanner::new(Arc::new(model), vec![Arc::new(prices_tool)])
        .with_max_rounds(config.planner_max_rounds);

    let transcriber: Option<Arc<dyn Transcriber>> = match &config.speechmatics_api_key {
        Some(api_key) => {
            let client = SpeechmaticsClient::new(api_key, config.transcription_timeout)?
                .with_base_url(&config.speechmatics_base_url);
            Some(Arc::new(client) as Arc<dyn Transcriber>)
        }
        None => {
            tracing::warn!("SPEECHMATICS_API_KEY is not set, voice search is disabled");
            None
        }
    };

    let state = AppState {
        planner: Arc::new(planner),
        planner_timeout: config.planner_timeout,
        transcriber,
        transcription_timeout: config.transcription_timeout,
    };

    let app = router(state);

    // The Lambda runtime sets this; anywhere else we serve plain HTTP.
    if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        let app = tower::ServiceBuilder::new()
            .layer(axum_aws_lambda::LambdaLayer::default())
            .service(app);

        lambda_http::run(app).await?;
    } else {
        let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
        tracing::info!("Listening on {}", config.bind_addr);

        axum::serve(listener, app).await?;
    }

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search_medicine))
        .route(
            "/voice-search",
            post(voice_search).layer(DefaultBodyLimit::max(AUDIO_UPLOAD_LIMIT)),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Health check
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// Search medicine prices
async fn search_medicine(
    State(state): State<AppState>,
    Json(input): Json<SearchInput>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let query = input.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    let request_id = Ulid::new().to_string();
    let span = tracing::info_span!("search", %request_id);

    async move {
        tracing::info!("Received search query: {}", query);

        let report_text = tokio::time::timeout(state.planner_timeout, state.planner.plan(&query))
            .await
            .map_err(|_| {
                tracing::error!("Planner timed out after {:?}", state.planner_timeout);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Planner timed out after {}s", state.planner_timeout.as_secs()),
                )
            })?
            .map_err(|e| {
                tracing::error!("Planner failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })?;

        Ok(Json(SearchResponse::from_report_text(&report_text)))
    }
    .instrument(span)
    .await
}

// Transcribe a spoken query
async fn voice_search(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut clip = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or(AUDIO_FIELD).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        if !bytes.is_empty() {
            clip = Some(AudioClip::new(file_name, content_type, bytes.to_vec()));
        }
        break;
    }

    let Some(clip) = clip else {
        return Err((StatusCode::BAD_REQUEST, "No audio file uploaded".to_string()));
    };

    let request_id = Ulid::new().to_string();
    let span = tracing::info_span!("voice_search", %request_id);

    async move {
        tracing::info!("Received audio file: {} ({} bytes)", clip.file_name, clip.bytes.len());

        let transcriber = state.transcriber.as_ref().ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SPEECHMATICS_API_KEY is not configured".to_string(),
            )
        })?;

        let text = tokio::time::timeout(state.transcription_timeout, transcriber.transcribe(clip))
            .await
            .map_err(|_| {
                tracing::error!("Transcription timed out after {:?}", state.transcription_timeout);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!(
                        "Transcription timed out after {}s",
                        state.transcription_timeout.as_secs()
                    ),
                )
            })?
            .map_err(|e| {
                tracing::error!("Voice processing failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })?;

        tracing::info!("Transcription: {}", text);
        Ok(Json(VoiceSearchResponse { text }))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::{json, Value};
    use domain::Error;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "voice-boundary";

    enum FakePlanner {
        Report(&'static str),
        Failing,
        Stalled,
    }

    #[async_trait]
    impl Planner for FakePlanner {
        async fn plan(&self, _query: &str) -> anyhow::Result<String> {
            match self {
                Self::Report(text) => Ok(text.to_string()),
                Self::Failing => anyhow::bail!("Groq error (429 Too Many Requests): rate limited"),
                Self::Stalled => std::future::pending().await,
            }
        }
    }

    struct FakeTranscriber {
        transcript: Result<&'static str, &'static str>,
        received: Mutex<Vec<AudioClip>>,
    }

    impl FakeTranscriber {
        fn new(transcript: Result<&'static str, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                transcript,
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, clip: AudioClip) -> Result<String, Error> {
            self.received.lock().unwrap().push(clip);
            self.transcript
                .map(str::to_string)
                .map_err(|message| Error::Transcription {
                    message: message.to_string(),
                })
        }
    }

    fn app_with(planner: FakePlanner, transcriber: Option<Arc<FakeTranscriber>>) -> Router {
        router(AppState {
            planner: Arc::new(planner),
            planner_timeout: Duration::from_millis(50),
            transcriber: transcriber.map(|t| t as Arc<dyn Transcriber>),
            transcription_timeout: Duration::from_millis(50),
        })
    }

    fn app(planner: FakePlanner) -> Router {
        app_with(planner, None)
    }

    fn voice_request(field: &str, audio: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"query.webm\"\r\n\
             Content-Type: audio/webm\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(audio);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/voice-search")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(FakePlanner::Failing)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn search_returns_validated_report() {
        let planner = FakePlanner::Report(
            "ACTIVE_COMPOSITION: Paracetamol 650mg\n\
             MEDICINES:\n\
             - NAME: Dolo 650 | TYPE: Original | PRICE: ₹30 | URL: http://a\n\
             - NAME: Jan Aushadhi Paracetamol | TYPE: Generic | PRICE: ₹0.50 | URL: N/A\n\
             - NAME: BrandX | TYPE: Generic | PRICE: ₹35 | URL: http://c",
        );

        let response = app(planner)
            .oneshot(search_request(r#"{"query":"Dolo 650"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            json!({
                "result": {
                    "active_composition": "Paracetamol 650mg",
                    "medicines": [
                        {"name": "Dolo 650", "type": "Original", "price": "₹30", "url": "http://a"},
                        {"name": "Jan Aushadhi Paracetamol", "type": "Generic", "price": "₹0.50", "url": "#"}
                    ]
                }
            })
        );
    }

    #[tokio::test]
    async fn unparseable_report_is_returned_raw() {
        let response = app(FakePlanner::Report("Sorry, no prices today."))
            .oneshot(search_request(r#"{"query":"Dolo 650"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["result"]["active_composition"], "Unknown");
        assert_eq!(body["result"]["medicines"], json!([]));
        assert_eq!(body["result"]["raw_text"], "Sorry, no prices today.");
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        for body in [r#"{"query":"   "}"#, r#"{}"#] {
            let response = app(FakePlanner::Report("unused"))
                .oneshot(search_request(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_text(response).await, "Query is required");
        }
    }

    #[tokio::test]
    async fn planner_failure_is_a_server_error() {
        let response = app(FakePlanner::Failing)
            .oneshot(search_request(r#"{"query":"Pan 40"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("rate limited"));
    }

    #[tokio::test]
    async fn stalled_planner_times_out() {
        let response = app(FakePlanner::Stalled)
            .oneshot(search_request(r#"{"query":"Pan 40"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("Planner timed out"));
    }

    #[tokio::test]
    async fn voice_search_returns_transcript() {
        let transcriber = FakeTranscriber::new(Ok("Dolo 650"));

        let response = app_with(FakePlanner::Failing, Some(transcriber.clone()))
            .oneshot(voice_request("audio", b"OggS-fake-audio"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"text": "Dolo 650"}));

        let received = transcriber.received.lock().unwrap();
        assert_eq!(
            *received,
            [AudioClip::new(
                "query.webm".to_string(),
                Some("audio/webm".to_string()),
                b"OggS-fake-audio".to_vec(),
            )]
        );
    }

    #[tokio::test]
    async fn voice_search_without_audio_is_rejected() {
        let transcriber = FakeTranscriber::new(Ok("unused"));

        for request in [voice_request("file", b"OggS"), voice_request("audio", b"")] {
            let response = app_with(FakePlanner::Failing, Some(transcriber.clone()))
                .oneshot(request)
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_text(response).await, "No audio file uploaded");
        }
        assert!(transcriber.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transcription_failure_is_a_server_error() {
        let transcriber = FakeTranscriber::new(Err("Job failed with status: rejected"));

        let response = app_with(FakePlanner::Failing, Some(transcriber))
            .oneshot(voice_request("audio", b"OggS"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Transcription error: Job failed with status: rejected"
        );
    }

    #[tokio::test]
    async fn voice_search_needs_a_transcriber() {
        let response = app(FakePlanner::Failing)
            .oneshot(voice_request("audio", b"OggS"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "SPEECHMATICS_API_KEY is not configured");
    }
}
