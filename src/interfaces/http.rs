use axum::extract::{Extension, Query};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::domain::account::AccountId;
use crate::domain::command::Command;
use crate::domain::completion::Completion;
use crate::domain::ports::EventPublisherArc;
use crate::error::TransferError;

pub fn router(publisher: EventPublisherArc) -> Router {
    Router::new()
        .route("/account/create", post(create_account))
        .route("/account/info", get(account_info))
        .route("/account/transfer", post(transfer))
        .layer(Extension(publisher))
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account: AccountId,
    pub to_account: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    pub account: String,
}

async fn create_account(
    Extension(publisher): Extension<EventPublisherArc>,
    Json(body): Json<CreateAccountRequest>,
) -> Response {
    let (completion, handle) = Completion::new();
    let command = Command::Create {
        initial_amount: body.amount,
        completion,
    };
    dispatch(&publisher, command, handle).await
}

async fn account_info(
    Extension(publisher): Extension<EventPublisherArc>,
    Query(params): Query<InfoParams>,
) -> Response {
    // Parsed by hand so a malformed id is a client error, not a queued
    // command.
    let id: AccountId = match params.account.parse() {
        Ok(id) => id,
        Err(err) => {
            return json_error(StatusCode::BAD_REQUEST, "invalid_argument", err.to_string());
        }
    };

    let (completion, handle) = Completion::new();
    let command = Command::Info { id, completion };
    dispatch(&publisher, command, handle).await
}

async fn transfer(
    Extension(publisher): Extension<EventPublisherArc>,
    Json(body): Json<TransferRequest>,
) -> Response {
    let (completion, handle) = Completion::new();
    let command = Command::Transfer {
        from: body.from_account,
        to: body.to_account,
        amount: body.amount,
        completion,
    };
    dispatch(&publisher, command, handle).await
}

/// Publish the command and await its outcome. The success payload is already
/// serialized by the worker and is passed through verbatim.
async fn dispatch(
    publisher: &EventPublisherArc,
    command: Command,
    handle: crate::domain::completion::CompletionHandle,
) -> Response {
    if let Err(err) = publisher.publish_event(command).await {
        tracing::warn!(error = %err, "rejecting request: queue unavailable");
        return error_response(&TransferError::Overloaded);
    }

    match handle.wait().await {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &TransferError) -> Response {
    match err {
        TransferError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg.clone())
        }
        TransferError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        TransferError::InsufficientFunds { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_funds",
            err.to_string(),
        ),
        TransferError::Overloaded => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "overloaded",
            err.to_string(),
        ),
        TransferError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure during request processing");
            // Opaque to the client; details stay in the log.
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "problems during request processing",
            )
        }
    }
}

fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
