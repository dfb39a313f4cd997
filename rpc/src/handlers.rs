//! Request handlers and their DTOs.

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use listwise_claims::{ClaimView, DnsInstructions, MethodData, ResendReceipt};
use listwise_types::{
    Business, BusinessClaimStatus, BusinessId, ClaimId, ClaimStatus, Decision, Notification,
    NotificationId, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::identity::Identity;
use crate::pagination::{next_cursor, PaginationMeta, PaginationParams};
use crate::server::AppState;

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBusinessRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BusinessResponse {
    pub business_id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub claim_status: BusinessClaimStatus,
    pub created_at: Timestamp,
}

impl From<Business> for BusinessResponse {
    fn from(b: Business) -> Self {
        Self {
            business_id: b.id.get(),
            name: b.name,
            owner_id: b.owner_id.map(|u| u.as_str().to_string()),
            claim_status: b.claim_status,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InitiateClaimResponse {
    pub claim: ClaimView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_record: Option<DnsInstructions>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    /// Required for email claims, ignored for DNS.
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub claim_id: u64,
    pub decision: Decision,
    pub business: BusinessResponse,
}

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub status: Option<String>,
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

impl ListClaimsQuery {
    fn page(&self) -> PaginationParams {
        PaginationParams {
            cursor: self.cursor.clone(),
            count: self.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListClaimsResponse {
    pub claims: Vec<ClaimView>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

// ── Extraction helpers ────────────────────────────────────────────────────

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, RpcError> {
    raw.parse()
        .map_err(|_| RpcError::InvalidRequest(format!("invalid {what} id: {raw}")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, RpcError> {
    params
        .map(|Query(v)| v)
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn register_business(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<RegisterBusinessRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BusinessResponse>), RpcError> {
    identity.require_moderator()?;
    let req = body(payload)?;
    let business = state.service.register_business(&req.name)?;
    Ok((StatusCode::CREATED, Json(business.into())))
}

pub async fn get_business(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<BusinessResponse>, RpcError> {
    let id: BusinessId = parse_id(&id, "business")?;
    Ok(Json(state.service.get_business(id)?.into()))
}

pub async fn vacate_business(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<BusinessResponse>, RpcError> {
    let moderator = identity.require_moderator()?;
    let id: BusinessId = parse_id(&id, "business")?;
    Ok(Json(state.service.vacate(id, moderator)?.into()))
}

pub async fn initiate_claim(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    payload: Result<Json<MethodData>, JsonRejection>,
) -> Result<(StatusCode, Json<InitiateClaimResponse>), RpcError> {
    let id: BusinessId = parse_id(&id, "business")?;
    let data = body(payload)?;
    let initiated = state
        .service
        .initiate(id, &identity.user_id, data)
        .await?;
    let cooldown = state.service.policy().resend_cooldown_secs;
    Ok((
        StatusCode::CREATED,
        Json(InitiateClaimResponse {
            claim: ClaimView::from_claim(&initiated.claim, cooldown),
            dns_record: initiated.dns_instructions,
        }),
    ))
}

pub async fn verify_claim(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<ClaimView>, RpcError> {
    let id: BusinessId = parse_id(&id, "business")?;
    // Document and DNS checks are sent without a body. A declared JSON body must parse.
    let req = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => VerifyRequest::default(),
        other => body(other)?,
    };
    let code = req.code.unwrap_or_default();
    let claim = state.service.verify(id, &identity.user_id, &code).await?;
    Ok(Json(ClaimView::from_claim(
        &claim,
        state.service.policy().resend_cooldown_secs,
    )))
}

pub async fn resend_code(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ResendReceipt>, RpcError> {
    let id: BusinessId = parse_id(&id, "business")?;
    Ok(Json(state.service.resend(id, &identity.user_id).await?))
}

pub async fn my_claim(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ClaimView>, RpcError> {
    let id: BusinessId = parse_id(&id, "business")?;
    Ok(Json(state.service.claim_status(id, &identity.user_id)?))
}

pub async fn list_claims(
    State(state): State<AppState>,
    identity: Identity,
    params: Result<Query<ListClaimsQuery>, QueryRejection>,
) -> Result<Json<ListClaimsResponse>, RpcError> {
    identity.require_moderator()?;
    let params = query(params)?;
    let status = params
        .status
        .as_deref()
        .map(ClaimStatus::from_str)
        .transpose()
        .map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let page = params.page();
    let offset = page
        .decode_offset()
        .ok_or_else(|| RpcError::InvalidRequest("malformed cursor".into()))?;
    let count = page.effective_count();
    let claims = state
        .service
        .list_claims(status, offset, count as usize)?;
    let cursor = next_cursor(offset, claims.len(), count);
    Ok(Json(ListClaimsResponse {
        claims,
        pagination: PaginationMeta { cursor },
    }))
}

pub async fn decide_claim(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, RpcError> {
    let moderator = identity.require_moderator()?;
    let claim_id: ClaimId = parse_id(&id, "claim")?;
    let req = body(payload)?;
    let business = state
        .service
        .decide(claim_id, req.decision, moderator)
        .await?;
    Ok(Json(DecisionResponse {
        claim_id: claim_id.get(),
        decision: req.decision,
        business: business.into(),
    }))
}

pub async fn notifications(
    State(state): State<AppState>,
    identity: Identity,
    params: Result<Query<NotificationsQuery>, QueryRejection>,
) -> Result<Json<NotificationsResponse>, RpcError> {
    let params = query(params)?;
    let notifications = state
        .service
        .notifications(&identity.user_id, params.unread_only)?;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(NotificationsResponse {
        unread,
        notifications,
    }))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Notification>, RpcError> {
    let id: NotificationId = parse_id(&id, "notification")?;
    Ok(Json(
        state.service.mark_notification_read(&identity.user_id, id)?,
    ))
}
