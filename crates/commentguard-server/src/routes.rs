//! HTTP routes and handlers

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use commentguard_core::CommentStatus;
use commentguard_telemetry::{AuditAction, AuditEvent};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiJson, AppError};
use crate::manual::{self, ManualModeration};
use crate::policies::{self, CreatePolicy, UpdatePolicy};
use crate::security::{extract_bearer, owner_token_matches};
use crate::state::AppState;
use crate::submission::{self, SubmitComment};
use crate::websites::{self, CreateWebsite, PublicComment};

type ApiResult<T> = Result<T, AppError>;

pub fn create_router(state: AppState) -> Router {
    let owner = Router::new()
        .route("/api/websites", get(list_websites).post(create_website))
        .route("/api/websites/:website_id/comments", get(list_comments))
        .route(
            "/api/websites/:website_id/comments/:comment_id/moderate",
            post(moderate_comment),
        )
        .route(
            "/api/websites/:website_id/moderation-prompts",
            get(list_policies).post(create_policy),
        )
        .route(
            "/api/websites/:website_id/moderation-prompts/rerun",
            post(rerun_moderation),
        )
        .route(
            "/api/websites/:website_id/moderation-prompts/:prompt_id",
            patch(update_policy).delete(delete_policy),
        )
        .route("/api/audit", get(audit_log))
        .route("/api/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    let max_body = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/embed/:website_id/comment", post(submit_comment))
        .route("/embed/:website_id/comments", get(public_comments))
        .merge(owner)
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject owner requests without the configured bearer token
async fn require_owner(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.owner_token.as_deref() {
        let presented = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer);

        if !owner_token_matches(expected, presented) {
            warn!(path = %req.uri().path(), "Rejected owner request");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn fallback() -> AppError {
    AppError::NotFound("Not found".to_string())
}

// Embed widget

async fn submit_comment(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
    ApiJson(body): ApiJson<SubmitComment>,
) -> ApiResult<(StatusCode, Json<PublicComment>)> {
    let comment = submission::submit_comment(
        state.store.as_ref(),
        state.moderator.as_ref(),
        website_id,
        body,
    )
    .await?;

    if comment.status == CommentStatus::Approved {
        Ok((StatusCode::CREATED, Json(comment.into())))
    } else {
        Err(AppError::Rejected)
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    url: String,
}

async fn public_comments(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<PublicComment>>> {
    let comments = websites::public_comments(state.store.as_ref(), website_id, &query.url).await?;
    Ok(Json(comments))
}

// Websites and comments

async fn create_website(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateWebsite>,
) -> ApiResult<impl IntoResponse> {
    let website = websites::create_website(state.store.as_ref(), body).await?;
    state.record(
        AuditEvent::new(AuditAction::WebsiteCreated, "website")
            .with_entity_id(website.id)
            .with_meta("domain", &website.domain),
    );
    info!(website_id = %website.id, domain = %website.domain, "Website created");
    Ok((StatusCode::CREATED, Json(website)))
}

async fn list_websites(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(websites::list_websites(state.store.as_ref()).await?))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        websites::website_comments(state.store.as_ref(), website_id).await?,
    ))
}

async fn moderate_comment(
    State(state): State<AppState>,
    Path((website_id, comment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<ManualModeration>,
) -> ApiResult<impl IntoResponse> {
    let comment =
        manual::moderate_manually(state.store.as_ref(), website_id, comment_id, body.status)
            .await?;
    state.record(
        AuditEvent::new(AuditAction::CommentModerated, "comment")
            .with_entity_id(comment.id)
            .with_meta("website_id", website_id)
            .with_meta("status", comment.status),
    );
    Ok(Json(comment))
}

// Moderation prompts

async fn list_policies(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        policies::list_policies(state.store.as_ref(), website_id).await?,
    ))
}

async fn create_policy(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
    ApiJson(body): ApiJson<CreatePolicy>,
) -> ApiResult<impl IntoResponse> {
    let policy = policies::create_policy(state.store.as_ref(), website_id, body).await?;
    state.record(
        AuditEvent::new(AuditAction::PolicyCreated, "moderation_prompt")
            .with_entity_id(policy.id)
            .with_meta("website_id", website_id)
            .with_meta("is_active", policy.is_active),
    );
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn update_policy(
    State(state): State<AppState>,
    Path((website_id, prompt_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdatePolicy>,
) -> ApiResult<impl IntoResponse> {
    let policy = policies::update_policy(state.store.as_ref(), website_id, prompt_id, body).await?;
    state.record(
        AuditEvent::new(AuditAction::PolicyUpdated, "moderation_prompt")
            .with_entity_id(policy.id)
            .with_meta("website_id", website_id)
            .with_meta("is_active", policy.is_active),
    );
    Ok(Json(policy))
}

async fn delete_policy(
    State(state): State<AppState>,
    Path((website_id, prompt_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    policies::delete_policy(state.store.as_ref(), website_id, prompt_id).await?;
    state.record(
        AuditEvent::new(AuditAction::PolicyDeleted, "moderation_prompt")
            .with_entity_id(prompt_id)
            .with_meta("website_id", website_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn rerun_moderation(
    State(state): State<AppState>,
    Path(website_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let report = state.rerun.rerun(website_id).await?;
    state.record(
        AuditEvent::new(AuditAction::ModerationRerun, "website")
            .with_entity_id(website_id)
            .with_meta("selected", report.selected)
            .with_meta("processed", report.processed)
            .with_meta("failed", report.failed)
            .with_meta("skipped", report.skipped),
    );
    Ok((StatusCode::ACCEPTED, Json(report)))
}

// Telemetry

async fn audit_log(State(state): State<AppState>) -> Json<serde_json::Value> {
    let trail = state.audit.lock();
    Json(json!({
        "verified": trail.verify(),
        "events": trail.events(),
    }))
}

async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.metrics.snapshot();
    Json(json!({
        "decisions": snapshot,
        "total": snapshot.total(),
        "avgLatencyUs": snapshot.avg_latency_us(),
    }))
}
