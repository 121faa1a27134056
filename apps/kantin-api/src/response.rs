//! Success envelope: `{ "status": true, "data": ... }` with an optional
//! `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

/// 200 with `data`.
pub fn ok<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, None, data)
}

/// 200 with `message` and `data`.
pub fn ok_with_message<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::OK, Some(message.into()), data)
}

/// 201 with `message` and `data`.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::CREATED, Some(message.into()), data)
}

fn respond<T: Serialize>(status: StatusCode, message: Option<String>, data: T) -> Response {
    let body = Envelope {
        status: true,
        message,
        data,
    };
    (status, Json(body)).into_response()
}
