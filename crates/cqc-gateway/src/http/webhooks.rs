//! Gateway-style (WhatsApp via gateway) inbound webhook — POST /webhooks/gateway.
//!
//! Carries `from` (E.164) and `text`, plus `X-Tenant-ID`/`X-Vertical-Mode`
//! headers when a pre-hop service has already resolved the route (spec §6).
//! Absent those headers, the Channel Router resolves it the same way the
//! Telegram adapter does.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use cqc_core::types::{BotResponse, Channel, Language, Message as CqcMessage, TenantId};
use cqc_router::RouteOutcome;
use cqc_workers::Notifier;

use crate::app::AppState;
use crate::notifier::GatewayNotifier;

const TENANT_HEADER: &str = "x-tenant-id";
const VERTICAL_HEADER: &str = "x-vertical-mode";

#[derive(Debug, Deserialize)]
pub struct GatewayInbound {
    pub from: String,
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GatewayInbound>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if state.webhook.enabled {
        verify_bearer_token(&headers, state.webhook.secret.as_deref()).map_err(|reason| auth_error(&reason))?;
    }

    let channel_identity = payload.from.clone();
    let text = payload.text.clone().unwrap_or_default();

    let outcome = match (
        headers.get(TENANT_HEADER).and_then(|v| v.to_str().ok()),
        headers.get(VERTICAL_HEADER).and_then(|v| v.to_str().ok()),
    ) {
        (Some(tenant_header), Some(vertical_header)) => RouteOutcome::Routed {
            tenant_id: TenantId::from(tenant_header),
            vertical: vertical_header.to_string(),
        },
        _ => state.router().resolve(&channel_identity, &text).map_err(|e| {
            warn!(error = %e, "gateway: channel router failed");
            error_response(e.into())
        })?,
    };

    let tenant_id = match outcome {
        RouteOutcome::MenuFallback => {
            return Ok(Json(json!({
                "text": cqc_state::messages::text(Language::En, "menu_fallback"),
            })));
        }
        RouteOutcome::Routed { tenant_id, .. } => tenant_id,
    };

    let cqc_message = CqcMessage {
        tenant_hint: Some(tenant_id.clone()),
        channel: Channel::Gateway,
        channel_identity: channel_identity.clone(),
        text: payload.text.clone(),
        button_payload: None,
        contact: None,
        has_voice: false,
        has_media: false,
        locale_hint: None,
    };

    let response = state
        .machine()
        .process(&tenant_id, &channel_identity, &cqc_message)
        .await
        .map_err(|e| {
            warn!(error = %e, "gateway: state machine turn failed");
            error_response(e)
        })?;

    if let Some(alert) = response.admin_alert.clone() {
        let notifier = GatewayNotifier::new(state.webhook.outbound_url.clone());
        if let Err(e) = notifier.send_admin_alert(alert).await {
            warn!(error = %e, "gateway: failed to deliver admin alert");
        }
    }

    info!(tenant_id = %tenant_id, "gateway webhook turn processed");
    Ok(Json(render(&response)))
}

fn render(response: &BotResponse) -> Value {
    json!({
        "text": response.text,
        "buttons": response.buttons,
        "request_contact": response.request_contact,
        "document_ref": response.document_ref,
    })
}

fn verify_bearer_token(headers: &HeaderMap, secret: Option<&str>) -> Result<(), String> {
    let expected = secret.ok_or_else(|| "no bearer token configured for this source".to_string())?;

    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing Authorization header".to_string())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header must use Bearer scheme".to_string())?;

    if token == expected {
        Ok(())
    } else {
        Err("bearer token mismatch".to_string())
    }
}

fn auth_error(reason: &str) -> (StatusCode, Json<Value>) {
    warn!(reason = %reason, "gateway webhook authentication failed");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "authentication failed", "reason": reason})),
    )
}

/// Maps the error taxonomy to a transport status per spec §7: validation and
/// integrity failures are the caller's fault (4xx); dependency failures are
/// retryable (503); configuration/database/serialization failures are ours.
fn error_response(err: cqc_core::CqcError) -> (StatusCode, Json<Value>) {
    use cqc_core::CqcError;
    let status = match &err {
        CqcError::Validation(_) => StatusCode::BAD_REQUEST,
        CqcError::Integrity(_) => StatusCode::CONFLICT,
        CqcError::TransientDependency(_) | CqcError::FatalDependency(_) => StatusCode::SERVICE_UNAVAILABLE,
        CqcError::Configuration(_) | CqcError::Database(_) | CqcError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"error": err.code()})))
}
