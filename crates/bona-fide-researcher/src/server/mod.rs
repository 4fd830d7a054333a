//! HTTP service for researcher verification.
//!
//! Verification runs for tens of seconds against external APIs, so the
//! service works asynchronously: `POST /verify` submits one or more
//! background jobs and returns immediately with job IDs, the final report is
//! POSTed to the caller-supplied callback URL, and `GET /status/{job_id}`
//! exposes the job state in the meantime.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::error::VerifyError;
use crate::formatters::compact_report;
use crate::models::Researcher;
use crate::pipeline::{default_sources, verify_researcher};

/// Lifecycle state of a verification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    FinishedSuccess,
    FinishedError,
}

/// A submitted verification job and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Current job state.
    pub status: JobStatus,

    /// Submission time.
    pub submitted_at: DateTime<Utc>,

    /// Verification report, present once the job finished successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure description, present once the job finished with an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Set when the job finished but its callback delivery failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_error: Option<String>,
}

impl Job {
    fn running() -> Self {
        Self {
            status: JobStatus::Running,
            submitted_at: Utc::now(),
            result: None,
            error_message: None,
            callback_error: None,
        }
    }
}

/// One researcher verification request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearcherRequest {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub uncertain_name_order: bool,
    #[serde(default)]
    pub limit_results: Option<usize>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Verify request body: either one researcher at the top level or a
/// `researchers` list.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    researchers: Option<Vec<ResearcherRequest>>,

    #[serde(flatten)]
    single: ResearcherRequest,
}

impl VerifyRequest {
    fn into_requests(self) -> Vec<ResearcherRequest> {
        self.researchers.unwrap_or_else(|| vec![self.single])
    }
}

/// Shared state for HTTP handlers.
pub struct AppState {
    config: Config,
    jobs: RwLock<HashMap<Uuid, Job>>,
    /// Plain client for callback delivery.
    callback_client: reqwest::Client,
}

fn app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    // Bounded so a hanging callback target cannot pin a delivery task forever.
    let callback_client = reqwest::Client::builder().timeout(config.request_timeout).build()?;

    Ok(Arc::new(AppState { config, jobs: RwLock::new(HashMap::new()), callback_client }))
}

/// Create the HTTP router for the verification service.
///
/// # Errors
///
/// Returns error if the callback HTTP client cannot be initialized.
pub fn create_router(config: Config) -> anyhow::Result<Router> {
    let state = app_state(config)?;

    Ok(Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/verify", post(handle_verify))
        .route("/status/{job_id}", get(handle_job_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the HTTP service until interrupted.
///
/// # Errors
///
/// Returns error if the listener cannot bind or the server fails.
pub async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    let router = create_router(config)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("verification service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("verification service shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "bona-fide-researcher",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Check the static bearer token, when one is configured.
fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = state.config.auth_token.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented == Some(expected) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Invalid or missing bearer token").into_response())
    }
}

/// Reject requests the job runner could not act on.
fn validate_request(request: &ResearcherRequest) -> Result<(), VerifyError> {
    if matches!(request.limit_results, Some(limit) if limit < 1) {
        return Err(VerifyError::validation(
            "limit_results",
            "Invalid 'limit_results' value: 0. The value should be an integer greater than 0.",
        ));
    }

    if request.callback_url.as_deref().unwrap_or("").is_empty() {
        return Err(VerifyError::validation(
            "callback_url",
            "Missing 'callback_url' parameter. The search result is returned to the callback \
             URL so it must be provided.",
        ));
    }

    Ok(())
}

fn error_response(error: &VerifyError) -> Response {
    let status = match error {
        VerifyError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string()).into_response()
}

async fn handle_verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<VerifyRequest>,
) -> Response {
    if let Err(response) = check_auth(&state, &headers) {
        return response;
    }

    let requests = request.into_requests();

    for request in &requests {
        if let Err(error) = validate_request(request) {
            return error_response(&error);
        }
    }

    let mut job_responses = Vec::with_capacity(requests.len());

    for request in requests {
        let job_id = Uuid::new_v4();
        state.jobs.write().await.insert(job_id, Job::running());

        let researcher_name = format!(
            "{} {}",
            request.given_name.as_deref().unwrap_or(""),
            request.surname.as_deref().unwrap_or("")
        );
        let callback_url = request.callback_url.clone().unwrap_or_default();

        job_responses.push(json!({
            "job_id": job_id,
            "researcher_name": researcher_name,
            "status": JobStatus::Running,
            "message": format!(
                "Your job has been submitted and assigned an ID: {job_id}. Please wait for \
                 the response on the callback URL: {callback_url}. You can track the progress \
                 of the job by calling the status endpoint: /status/{job_id}"
            ),
        }));

        tokio::spawn(run_job(Arc::clone(&state), job_id, request));
    }

    (StatusCode::ACCEPTED, Json(Value::Array(job_responses))).into_response()
}

async fn handle_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Response {
    match state.jobs.read().await.get(&job_id) {
        Some(job) => Json(job.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"status": "NOT_FOUND"}))).into_response(),
    }
}

/// Execute one verification job and deliver its report to the callback URL.
async fn run_job(state: Arc<AppState>, job_id: Uuid, request: ResearcherRequest) {
    let callback_url = request.callback_url.clone().unwrap_or_default();
    let limit = request.limit_results;

    let researcher = Researcher {
        given_name: request.given_name,
        surname: request.surname,
        email: request.email,
        orcid: request.orcid,
        affiliation: request.affiliation,
        uncertain_name_order: request.uncertain_name_order,
    };

    let report = match default_sources(&state.config) {
        Ok(sources) => {
            let aggregator = verify_researcher(researcher.clone(), &state.config, &sources).await;
            Ok(compact_report(&researcher, &aggregator.summaries(limit)))
        }
        Err(error) => Err(error.to_string()),
    };

    match report {
        Ok(result) => {
            // Record the outcome and release the lock before delivering the
            // callback; the status endpoint stays readable while the POST to
            // a possibly slow callback target is in flight.
            {
                let mut jobs = state.jobs.write().await;
                let Some(job) = jobs.get_mut(&job_id) else {
                    return;
                };
                job.status = JobStatus::FinishedSuccess;
                job.result = Some(result.clone());
            }

            let payload = json!({
                "job_id": job_id,
                "status": JobStatus::FinishedSuccess,
                "result": result,
            });

            let delivery =
                state.callback_client.post(&callback_url).json(&payload).send().await;
            if let Err(error) = delivery {
                tracing::warn!(%job_id, %error, "callback delivery failed");
                if let Some(job) = state.jobs.write().await.get_mut(&job_id) {
                    job.callback_error = Some(error.to_string());
                }
            }
        }
        Err(message) => {
            tracing::warn!(%job_id, error = %message, "verification job failed");
            let mut jobs = state.jobs.write().await;
            let Some(job) = jobs.get_mut(&job_id) else {
                return;
            };
            job.status = JobStatus::FinishedError;
            job.error_message = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_status_stays_readable_during_callback_delivery() {
        let mock_server = MockServer::start().await;

        // Empty pages from every source so the job itself finishes quickly.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        // Slow callback target keeps the delivery in flight.
        Mock::given(method("POST"))
            .and(url_path("/callback"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let state = app_state(Config::for_testing(&mock_server.uri())).unwrap();
        let job_id = Uuid::new_v4();
        state.jobs.write().await.insert(job_id, Job::running());

        let request = ResearcherRequest {
            given_name: Some("Jane".to_string()),
            surname: Some("Doe".to_string()),
            email: None,
            orcid: None,
            affiliation: None,
            uncertain_name_order: false,
            limit_results: None,
            callback_url: Some(format!("{}/callback", mock_server.uri())),
        };

        let handle = tokio::spawn(run_job(Arc::clone(&state), job_id, request));

        // Wait for the verification to finish and the callback POST to start.
        tokio::time::sleep(Duration::from_millis(800)).await;

        let jobs = tokio::time::timeout(Duration::from_millis(200), state.jobs.read())
            .await
            .expect("job map must stay readable while the callback is in flight");
        assert_eq!(jobs.get(&job_id).unwrap().status, JobStatus::FinishedSuccess);
        drop(jobs);

        handle.await.unwrap();
        assert!(state.jobs.read().await.get(&job_id).unwrap().callback_error.is_none());
    }

    #[test]
    fn test_job_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&JobStatus::FinishedSuccess).unwrap(),
            "\"FINISHED_SUCCESS\""
        );
        assert_eq!(serde_json::to_string(&JobStatus::Running).unwrap(), "\"RUNNING\"");
    }

    #[test]
    fn test_verify_request_single_researcher() {
        let request: VerifyRequest = serde_json::from_value(json!({
            "given_name": "Jane",
            "surname": "Doe",
            "callback_url": "http://localhost/cb"
        }))
        .unwrap();

        let requests = request.into_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].given_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_verify_request_researcher_list() {
        let request: VerifyRequest = serde_json::from_value(json!({
            "researchers": [
                {"given_name": "Jane", "surname": "Doe", "callback_url": "http://localhost/cb"},
                {"given_name": "Alex", "surname": "Roe", "callback_url": "http://localhost/cb"}
            ]
        }))
        .unwrap();

        assert_eq!(request.into_requests().len(), 2);
    }

    #[test]
    fn test_validate_request_rejects_missing_callback() {
        let request = ResearcherRequest {
            given_name: Some("Jane".to_string()),
            surname: Some("Doe".to_string()),
            email: None,
            orcid: None,
            affiliation: None,
            uncertain_name_order: false,
            limit_results: None,
            callback_url: None,
        };

        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_validate_request_rejects_zero_limit() {
        let request = ResearcherRequest {
            given_name: Some("Jane".to_string()),
            surname: Some("Doe".to_string()),
            email: None,
            orcid: None,
            affiliation: None,
            uncertain_name_order: false,
            limit_results: Some(0),
            callback_url: Some("http://localhost/cb".to_string()),
        };

        assert!(validate_request(&request).is_err());
    }
}
