//! API types for HTTP endpoints and request/response structures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ServiceKind;

/// Payload for registering a customer or an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPartyRequest {
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}

/// Payload for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	pub customer_id: String,
	pub service: ServiceKind,
	pub description: String,
}

/// Payload for an order/quotation/realisation transition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
	/// Actor invoking the transition.
	pub author_id: String,
	/// Optional note recorded in the history ledger.
	#[serde(default)]
	pub comment: Option<String>,
}

/// Payload for creating a quotation manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuotationRequest {
	pub order_id: String,
	pub price: u64,
	pub details: String,
	/// Employee creating the quotation.
	#[serde(default)]
	pub owner_id: Option<String>,
}

/// Payload for creating a realisation manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRealisationRequest {
	pub order_id: String,
	pub employee_id: String,
	/// Employee creating the realisation by hand.
	#[serde(default)]
	pub created_by: Option<String>,
}

/// Response returned when a lifecycle operation is queued for processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
	/// Correlation id; poll `/api/jobs/{id}` for the outcome.
	pub job_id: String,
	/// Name of the queued operation.
	pub operation: String,
}

/// Error body returned by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

/// Errors surfaced by the HTTP layer.
///
/// Domain errors are mapped onto these variants so handlers can return a
/// single error type.
#[derive(Debug)]
pub enum ApiError {
	/// Referenced entity does not exist (404).
	NotFound { message: String },
	/// Authorization predicate failed (403).
	Forbidden { message: String },
	/// Malformed request or illegal transition (400).
	BadRequest { message: String },
	/// Unexpected failure (500).
	InternalServerError { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::NotFound { .. } => 404,
			ApiError::Forbidden { .. } => 403,
			ApiError::BadRequest { .. } => 400,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message) = match self {
			ApiError::NotFound { message } => ("not_found", message),
			ApiError::Forbidden { message } => ("forbidden", message),
			ApiError::BadRequest { message } => ("bad_request", message),
			ApiError::InternalServerError { message } => ("internal_server_error", message),
		};
		ErrorResponse {
			error: error.to_string(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			404 => StatusCode::NOT_FOUND,
			403 => StatusCode::FORBIDDEN,
			400 => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		(status, Json(self.to_error_response())).into_response()
	}
}
