//! A fake GitHub API served by axum on a random local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinHandle;

use deploy_core::github::{
    CommitAuthor, CommitDetails, CompareCommit, Comparison, Deployment, DeploymentRequest,
    DeploymentStatus, GitHubClient, Release,
};

#[derive(Default)]
pub struct FakeState {
    next_id: u64,
    /// Deployments created through the API, keyed by `owner/repo`.
    pub deployments: HashMap<String, Vec<Deployment>>,
    pub requests: Vec<DeploymentRequest>,
    /// Status history returned for every deployment, newest first.
    pub statuses: Vec<DeploymentStatus>,
    pub status_polls: usize,
    /// Number of status polls answered with a 500 before serving `statuses`.
    pub status_errors: usize,
    /// Previous deployments returned by the list endpoint.
    pub history: Vec<Deployment>,
    pub environment_queries: Vec<String>,
    pub commits: Vec<CompareCommit>,
    pub compare_ranges: Vec<String>,
    /// Status and message returned instead of creating a deployment.
    pub create_error: Option<(u16, String)>,
    pub releases: Vec<Release>,
    /// Release assets keyed by `{tag}/{file}`.
    pub assets: HashMap<String, Vec<u8>>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeGitHub {
    pub state: Shared,
    pub url: String,
    handle: JoinHandle<()>,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/deployments",
                post(create_deployment).get(list_deployments),
            )
            .route(
                "/repos/{owner}/{repo}/deployments/{id}/statuses",
                get(list_statuses),
            )
            .route("/repos/{owner}/{repo}/compare/{range}", get(compare))
            .route("/repos/{owner}/{repo}/releases", get(list_releases))
            .route(
                "/{owner}/{repo}/releases/download/{tag}/{file}",
                get(download),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            url: format!("http://{}", addr),
            handle,
        }
    }

    pub fn client(&self) -> GitHubClient {
        GitHubClient::new(&self.url, Some("test-token".to_string())).unwrap()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn set_statuses(&self, states: &[&str]) {
        self.with_state(|s| {
            s.statuses = states
                .iter()
                .map(|state| {
                    DeploymentStatus::new(*state)
                        .with_target_url(format!("https://ci.example.com/builds/{}", state))
                })
                .collect();
        });
    }
}

impl Drop for FakeGitHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn commit(sha: &str, author: &str, message: &str) -> CompareCommit {
    CompareCommit {
        sha: sha.to_string(),
        commit: CommitDetails {
            message: message.to_string(),
            author: Some(CommitAuthor {
                name: author.to_string(),
            }),
        },
    }
}

pub fn previous_deployment(id: u64, sha: &str, environment: &str) -> Deployment {
    Deployment {
        id,
        sha: Some(sha.to_string()),
        reference: "master".to_string(),
        task: Some("deploy".to_string()),
        environment: Some(environment.to_string()),
        description: None,
        created_at: None,
    }
}

fn api_error(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": message }))).into_response()
}

async fn create_deployment(
    State(state): State<Shared>,
    Path((owner, repo)): Path<(String, String)>,
    Json(request): Json<DeploymentRequest>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some((status, message)) = state.create_error.clone() {
        return api_error(status, &message);
    }

    state.next_id += 1;
    let deployment = Deployment {
        id: state.next_id,
        sha: Some("abcd".to_string()),
        reference: request.reference.clone(),
        task: Some(request.task.clone()),
        environment: Some(request.environment.clone()),
        description: request.description.clone(),
        created_at: None,
    };

    state.requests.push(request);
    state
        .deployments
        .entry(format!("{}/{}", owner, repo))
        .or_default()
        .push(deployment.clone());

    (StatusCode::CREATED, Json(deployment)).into_response()
}

async fn list_deployments(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Deployment>> {
    let mut state = state.lock().unwrap();
    let environment = query.get("environment").cloned().unwrap_or_default();
    state.environment_queries.push(environment.clone());
    let matching = state
        .history
        .iter()
        .filter(|d| d.environment.as_deref() == Some(environment.as_str()))
        .cloned()
        .collect();
    Json(matching)
}

async fn list_statuses(
    State(state): State<Shared>,
    Path((_owner, _repo, _id)): Path<(String, String, u64)>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.status_polls += 1;
    if state.status_polls <= state.status_errors {
        return api_error(500, "Server Error");
    }
    Json(state.statuses.clone()).into_response()
}

async fn compare(
    State(state): State<Shared>,
    Path((_owner, _repo, range)): Path<(String, String, String)>,
) -> Json<Comparison> {
    let mut state = state.lock().unwrap();
    state.compare_ranges.push(range);
    Json(Comparison {
        commits: state.commits.clone(),
    })
}

async fn list_releases(State(state): State<Shared>) -> Json<Vec<Release>> {
    Json(state.lock().unwrap().releases.clone())
}

async fn download(
    State(state): State<Shared>,
    Path((_owner, _repo, tag, file)): Path<(String, String, String, String)>,
) -> Response {
    let state = state.lock().unwrap();
    match state.assets.get(&format!("{}/{}", tag, file)) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => api_error(404, "Not Found"),
    }
}
