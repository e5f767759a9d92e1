use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use regex_wizard::{
    ai::gemini::GeminiClient,
    tester, AiConfig, AiError, AiService, GenerationSession, GenerationStatus, Highlight,
    RegexSolution, TesterOutcome,
};

// Application state
#[derive(Clone)]
pub struct AppState {
    /// None when the credential was missing at startup; generation then
    /// fails immediately without a network call.
    pub service: Option<Arc<dyn AiService>>,
    pub session: Arc<Mutex<GenerationSession>>,
}

// API types
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: GenerationStatus,
    pub result: Option<RegexSolution>,
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TestRequest {
    pub preview_pattern: Option<String>,
    pub sample_text: String,
}

#[derive(Serialize, Deserialize)]
pub struct TestReport {
    pub outcome: TesterOutcome,
    pub notice: Option<String>,
    pub highlight: Highlight,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("regex_wizard=info,regex_wizard_web_server=info,tower_http=debug")
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AiConfig::from_env();
    let service: Option<Arc<dyn AiService>> = match GeminiClient::new(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!("Pattern generation disabled: {}", err);
            None
        }
    };

    let app_state = AppState {
        service,
        session: Arc::new(Mutex::new(GenerationSession::new())),
    };

    let app = create_router(app_state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        // Serve the single-page surface
        .nest_service("/", ServeDir::new("static"))
        // API routes
        .route("/api/health", get(health_check))
        .route("/api/generate", post(generate))
        .route("/api/result", get(current_result))
        .route("/api/test", post(run_test))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

fn snapshot(session: &GenerationSession) -> SessionSnapshot {
    SessionSnapshot {
        status: session.status(),
        result: session.result().cloned(),
        error_message: session.error_message().map(String::from),
    }
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        success: true,
        data: Some("OK".to_string()),
        error: None,
    })
}

// Submit a prompt for generation
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Json<ApiResponse<SessionSnapshot>> {
    let started = {
        let mut session = state.session.lock().await;
        session.begin(&request.prompt)
    };

    if !started {
        let session = state.session.lock().await;
        return Json(ApiResponse {
            success: false,
            data: Some(snapshot(&session)),
            error: Some(
                "Prompt is empty or a generation request is already in flight".to_string(),
            ),
        });
    }

    // The session lock is not held across the provider call; `begin` already
    // flipped the status so competing submits see Loading and bounce.
    let outcome = match &state.service {
        Some(service) => service.generate_solution(&request.prompt).await,
        None => Err(AiError::AuthenticationError),
    };

    let mut session = state.session.lock().await;
    session.complete(outcome);

    let success = session.status() == GenerationStatus::Success;
    let error = session.error_message().map(String::from);
    Json(ApiResponse {
        success,
        data: Some(snapshot(&session)),
        error,
    })
}

// Current status/result snapshot
async fn current_result(State(state): State<AppState>) -> Json<ApiResponse<SessionSnapshot>> {
    let session = state.session.lock().await;
    Json(ApiResponse {
        success: true,
        data: Some(snapshot(&session)),
        error: None,
    })
}

// Run the live tester against a preview pattern and sample text
async fn run_test(Json(request): Json<TestRequest>) -> Json<ApiResponse<TestReport>> {
    let outcome = tester::evaluate(request.preview_pattern.as_deref(), &request.sample_text);
    let report = TestReport {
        notice: outcome.notice(),
        highlight: tester::highlight(&request.sample_text, &outcome),
        outcome,
    };

    Json(ApiResponse {
        success: true,
        data: Some(report),
        error: None,
    })
}
