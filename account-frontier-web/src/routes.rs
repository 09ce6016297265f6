//! HTTP API
//!
//! Read-only views of the tracker plus the profile lookup. Handlers never
//! write to the frontier.

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use account_frontier_app::AppState;
use account_frontier_core::types::{AccountRecord, TrackerStatus};
use account_frontier_prober::ProfileOutcome;

/// Register every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .route("/latest", web::get().to(latest))
            .route("/status", web::get().to(status))
            .route("/users/{id}/profile", web::get().to(profile)),
    );
}

#[derive(Debug, Serialize)]
struct LatestResponse {
    status: &'static str,
    searching: bool,
    account: Option<AccountRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(flatten)]
    tracker: TrackerStatus,
    started_at: DateTime<Utc>,
    uptime_secs: i64,
}

fn error_response(mut builder: actix_web::HttpResponseBuilder, message: String) -> HttpResponse {
    builder.json(json!({ "error": message }))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

async fn latest(state: web::Data<AppState>) -> impl Responder {
    let status = state.status().await;
    let body = LatestResponse {
        status: if status.is_initializing() {
            "initializing"
        } else {
            "ok"
        },
        searching: status.searching,
        account: status.current,
    };
    HttpResponse::Ok().json(body)
}

async fn status(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now();
    HttpResponse::Ok().json(StatusResponse {
        tracker: state.status().await,
        started_at: state.started_at,
        uptime_secs: (now - state.started_at).num_seconds(),
    })
}

async fn profile(state: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    if id == 0 {
        return error_response(
            HttpResponse::BadRequest(),
            "account id must be positive".to_string(),
        );
    }

    match state.prober.fetch_profile(id).await {
        ProfileOutcome::Found(details) => HttpResponse::Ok().json(details),
        ProfileOutcome::Absent => {
            error_response(HttpResponse::NotFound(), format!("account {id} not found"))
        }
        ProfileOutcome::Indeterminate(e) => {
            tracing::warn!("Profile lookup for {id} failed: {e}");
            error_response(HttpResponse::BadGateway(), e.to_string())
        }
    }
}
