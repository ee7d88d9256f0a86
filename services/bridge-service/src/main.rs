use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use sb_api_types::{
    NetworkListResponse, PairRequest, PairResponse, ProposalApproveRequest, ProposalRejectRequest,
    ProposalRejectResponse, ProposalReviewRequest, ProposalReviewResponse,
};
use sb_bridge_core::{ApproveError, BridgeCore};
use sb_networks::RegistryResolver;
use sb_sign_relay::RelaySignClient;
use sb_store::{RocksDbSessionStore, SessionRecord};
use sb_wallet_client::HttpWalletApi;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

mod sessions;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Clone)]
struct AppState {
    core: Arc<BridgeCore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let db_path =
        std::env::var("BRIDGE_DB_PATH").unwrap_or_else(|_| "./data/sessionbridge-db".to_owned());
    let store = RocksDbSessionStore::open_default(&db_path)?;

    let core = BridgeCore::new(
        Arc::new(RelaySignClient::default()),
        Arc::new(HttpWalletApi::default()),
        Arc::new(store),
        Arc::new(RegistryResolver),
    );
    let state = AppState {
        core: Arc::new(core),
    };

    let port: u16 = std::env::var("BRIDGE_LISTEN_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8081);

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("bridge-service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/networks", get(networks))
        .route("/pair", post(pair))
        .route("/proposal/review", post(proposal_review))
        .route("/proposal/approve", post(proposal_approve))
        .route("/proposal/reject", post(proposal_reject))
        .route("/sessions", get(sessions::list_sessions))
        .route("/session/{topic}", delete(sessions::disconnect_session))
        // The review UI is served from another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "bridge-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "bridge-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn networks() -> Json<NetworkListResponse> {
    Json(NetworkListResponse {
        networks: sb_networks::all(),
    })
}

async fn pair(State(state): State<AppState>, Json(request): Json<PairRequest>) -> ApiResult<PairResponse> {
    let uri = request.uri.trim();
    if uri.is_empty() {
        return Err(bad_request("uri is required"));
    }
    if !uri.starts_with("wc:") {
        return Err(bad_request("uri must use the wc: scheme"));
    }

    state.core.pair(uri).await.map_err(internal_error)?;

    Ok(Json(PairResponse { paired: true }))
}

async fn proposal_review(
    State(state): State<AppState>,
    Json(request): Json<ProposalReviewRequest>,
) -> ApiResult<ProposalReviewResponse> {
    let chains = state
        .core
        .review_proposal(&request.proposal)
        .await
        .map_err(internal_error)?;

    Ok(Json(ProposalReviewResponse { chains }))
}

async fn proposal_approve(
    State(state): State<AppState>,
    Json(request): Json<ProposalApproveRequest>,
) -> ApiResult<SessionRecord> {
    if request.selected_account_ids.is_empty() {
        return Err(bad_request("at least one account must be selected"));
    }

    let record = state
        .core
        .approve_proposal(&request.proposal, &request.selected_account_ids)
        .await
        .map_err(|err| match err {
            ApproveError::Selection(_) => bad_request_from(err),
            ApproveError::Seam(_) => internal_error(err),
        })?;

    Ok(Json(record))
}

async fn proposal_reject(
    State(state): State<AppState>,
    Json(request): Json<ProposalRejectRequest>,
) -> ApiResult<ProposalRejectResponse> {
    state
        .core
        .reject_proposal(request.proposal_id, request.reason)
        .await
        .map_err(internal_error)?;

    Ok(Json(ProposalRejectResponse { rejected: true }))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

fn bad_request_from(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn not_found(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use sb_api_types::Account;
    use sb_sign_client::NoopSignClient;
    use sb_store::InMemorySessionStore;
    use sb_wallet_client::{StaticWalletApi, WalletApi, WalletApiError};
    use tower::ServiceExt;

    fn test_router(accounts: Vec<Account>) -> Router {
        let core = BridgeCore::new(
            Arc::new(NoopSignClient),
            Arc::new(StaticWalletApi::new(accounts)),
            Arc::new(InMemorySessionStore::default()),
            Arc::new(RegistryResolver),
        );
        router(AppState {
            core: Arc::new(core),
        })
    }

    fn bsc_account() -> Account {
        Account {
            id: "a1".to_owned(),
            name: "BNB 1".to_owned(),
            address: "0xccc".to_owned(),
            currency: "bsc".to_owned(),
            balance: "3.5".to_owned(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    fn review_proposal() -> serde_json::Value {
        serde_json::json!({
            "id": 42,
            "proposer": { "name": "Example Dapp", "url": "https://dapp.example" },
            "requiredNamespaces": {
                "eip155": {
                    "chains": ["eip155:137"],
                    "methods": ["eth_sendTransaction"],
                    "events": ["chainChanged"]
                }
            },
            "optionalNamespaces": {
                "eip155": { "chains": ["eip155:56", "eip155:1"], "methods": ["eth_sign"], "events": [] }
            }
        })
    }

    #[tokio::test]
    async fn health_responds() {
        let response = test_router(Vec::new())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn networks_lists_the_registry() {
        let response = test_router(Vec::new())
            .oneshot(
                Request::builder()
                    .uri("/networks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let networks = body["networks"].as_array().unwrap();
        assert!(networks.iter().any(|n| n["chain"] == "ethereum" && n["chainId"] == 1));
    }

    #[tokio::test]
    async fn review_returns_sorted_chains() {
        let request = post_json(
            "/proposal/review",
            serde_json::json!({ "proposal": review_proposal() }),
        );
        let response = test_router(vec![bsc_account()]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let chains = body["chains"].as_array().unwrap();
        let keys: Vec<&str> = chains.iter().map(|c| c["chain"].as_str().unwrap()).collect();
        assert_eq!(keys, vec!["polygon", "bsc", "ethereum"]);
        assert_eq!(chains[0]["isRequired"], true);
        assert_eq!(chains[1]["accounts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approve_with_empty_selection_is_rejected() {
        let request = post_json(
            "/proposal/approve",
            serde_json::json!({ "proposal": review_proposal(), "selectedAccountIds": [] }),
        );
        let response = test_router(vec![bsc_account()]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn approve_with_uncovered_required_chain_is_rejected() {
        // The bsc account cannot cover the required polygon chain.
        let request = post_json(
            "/proposal/approve",
            serde_json::json!({ "proposal": review_proposal(), "selectedAccountIds": ["a1"] }),
        );
        let response = test_router(vec![bsc_account()]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    struct OutageWalletApi;

    #[async_trait]
    impl WalletApi for OutageWalletApi {
        async fn list_accounts(&self) -> Result<Vec<Account>, WalletApiError> {
            Err(WalletApiError::Status {
                status: 503,
                body: "wallet api unavailable".to_owned(),
            })
        }
    }

    #[tokio::test]
    async fn approve_reports_wallet_outage_as_server_error() {
        let core = BridgeCore::new(
            Arc::new(NoopSignClient),
            Arc::new(OutageWalletApi),
            Arc::new(InMemorySessionStore::default()),
            Arc::new(RegistryResolver),
        );
        let app = router(AppState {
            core: Arc::new(core),
        });

        let request = post_json(
            "/proposal/approve",
            serde_json::json!({ "proposal": review_proposal(), "selectedAccountIds": ["a1"] }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn approve_then_list_then_disconnect() {
        let app = test_router(vec![bsc_account()]);

        let proposal = serde_json::json!({
            "id": 42,
            "proposer": { "name": "Example Dapp", "url": "https://dapp.example" },
            "requiredNamespaces": {
                "eip155": { "chains": ["eip155:56"], "methods": ["eth_sendTransaction"], "events": [] }
            }
        });
        let response = app
            .clone()
            .oneshot(post_json(
                "/proposal/approve",
                serde_json::json!({ "proposal": proposal, "selectedAccountIds": ["a1"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        let topic = record["topic"].as_str().unwrap().to_owned();
        assert_eq!(record["peerName"], "Example Dapp");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/session/{topic}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/session/{topic}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pair_rejects_non_wc_uris() {
        let request = post_json("/pair", serde_json::json!({ "uri": "https://dapp.example" }));
        let response = test_router(Vec::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = post_json(
            "/pair",
            serde_json::json!({ "uri": "wc:topic@2?relay-protocol=irn" }),
        );
        let response = test_router(Vec::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
