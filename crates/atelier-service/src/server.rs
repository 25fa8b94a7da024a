//! HTTP server for the atelier API.
//!
//! Registration and reads are served synchronously; lifecycle mutations
//! are queued on the dispatcher and answered with `202 Accepted` plus a
//! job id the caller can poll under `/api/jobs/{id}`.

use atelier_config::ApiConfig;
use atelier_core::{DispatchError, Engine, JobRecord, Operation};
use atelier_storage::StorageError;
use atelier_types::{
	ApiError, CreateOrderRequest, CreateQuotationRequest, CreateRealisationRequest, Customer,
	Employee, JobAccepted, Order, Quotation, Realisation, RegisterPartyRequest, TransitionRequest,
};
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<Engine>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for all endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<Engine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/customers", post(register_customer).get(list_customers))
				.route("/customers/{id}", get(get_customer))
				.route("/employees", post(register_employee).get(list_employees))
				.route("/employees/{id}", get(get_employee))
				.route("/orders", post(create_order).get(list_orders))
				.route("/orders/{id}", get(get_order))
				.route("/orders/{id}/validate", post(validate_order))
				.route("/orders/{id}/reject", post(reject_order))
				.route("/orders/{id}/cancel", post(cancel_order))
				.route("/quotations", post(create_quotation).get(list_quotations))
				.route("/quotations/{id}", get(get_quotation))
				.route("/quotations/{id}/validate", post(validate_quotation))
				.route("/quotations/{id}/cancel", post(cancel_quotation))
				.route("/quotations/{id}/accept", post(accept_quotation))
				.route("/quotations/{id}/reject", post(reject_quotation))
				.route(
					"/realisations",
					post(create_realisation).get(list_realisations),
				)
				.route("/realisations/{id}", get(get_realisation))
				.route("/realisations/{id}/start", post(start_realisation))
				.route("/realisations/{id}/complete", post(complete_realisation))
				.route("/jobs/{id}", get(get_job)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Atelier API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Maps repository errors from the synchronous read paths.
fn storage_error(entity: &str, id: &str, err: StorageError) -> ApiError {
	match err {
		StorageError::NotFound => ApiError::NotFound {
			message: format!("{} {} not found", entity, id),
		},
		other => ApiError::InternalServerError {
			message: other.to_string(),
		},
	}
}

/// Maps dispatcher errors on submission and polling.
fn dispatch_error(err: DispatchError) -> ApiError {
	match err {
		DispatchError::JobNotFound(id) => ApiError::NotFound {
			message: format!("Job {} not found", id),
		},
		other => ApiError::InternalServerError {
			message: other.to_string(),
		},
	}
}

/// Queues an operation and answers with its job handle.
async fn submit(
	state: &AppState,
	operation: Operation,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	let handle = state
		.engine
		.submit(operation)
		.await
		.map_err(dispatch_error)?;

	Ok((
		StatusCode::ACCEPTED,
		Json(JobAccepted {
			job_id: handle.id,
			operation: handle.operation.to_string(),
		}),
	))
}

// ---- parties ----

/// Handles POST /api/customers requests.
async fn register_customer(
	State(state): State<AppState>,
	Json(payload): Json<RegisterPartyRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
	let customer = state
		.engine
		.customers()
		.create(&payload.first_name, &payload.last_name, &payload.email)
		.await
		.map_err(|e| ApiError::InternalServerError {
			message: e.to_string(),
		})?;

	Ok((StatusCode::CREATED, Json(customer)))
}

/// Handles GET /api/customers/{id} requests.
async fn get_customer(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Customer>, ApiError> {
	let customer = state
		.engine
		.customers()
		.read(&id)
		.await
		.map_err(|e| storage_error("Customer", &id, e))?;
	Ok(Json(customer))
}

/// Handles GET /api/customers requests.
async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, ApiError> {
	let customers = state
		.engine
		.customers()
		.read_all()
		.await
		.map_err(|e| ApiError::InternalServerError {
			message: e.to_string(),
		})?;
	Ok(Json(customers))
}

/// Handles POST /api/employees requests.
async fn register_employee(
	State(state): State<AppState>,
	Json(payload): Json<RegisterPartyRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
	let employee = state
		.engine
		.employees()
		.create(&payload.first_name, &payload.last_name, &payload.email)
		.await
		.map_err(|e| ApiError::InternalServerError {
			message: e.to_string(),
		})?;

	Ok((StatusCode::CREATED, Json(employee)))
}

/// Handles GET /api/employees/{id} requests.
async fn get_employee(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Employee>, ApiError> {
	let employee = state
		.engine
		.employees()
		.read(&id)
		.await
		.map_err(|e| storage_error("Employee", &id, e))?;
	Ok(Json(employee))
}

/// Handles GET /api/employees requests.
async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
	let employees = state
		.engine
		.employees()
		.read_all()
		.await
		.map_err(|e| ApiError::InternalServerError {
			message: e.to_string(),
		})?;
	Ok(Json(employees))
}

// ---- orders ----

/// Handles POST /api/orders requests: queues the order creation.
async fn create_order(
	State(state): State<AppState>,
	Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CreateOrder {
			customer_id: payload.customer_id,
			service: payload.service,
			description: payload.description,
		},
	)
	.await
}

/// Handles GET /api/orders/{id} requests.
async fn get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	let order = state.engine.orders().get(&id).await?;
	Ok(Json(order))
}

/// Handles GET /api/orders requests.
async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
	let orders = state.engine.orders().list().await?;
	Ok(Json(orders))
}

/// Handles POST /api/orders/{id}/validate requests.
async fn validate_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::ValidateOrder {
			order_id: id,
			author_id: payload.author_id,
			comment: payload.comment,
		},
	)
	.await
}

/// Handles POST /api/orders/{id}/reject requests.
async fn reject_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::RejectOrder {
			order_id: id,
			author_id: payload.author_id,
			comment: payload.comment,
		},
	)
	.await
}

/// Handles POST /api/orders/{id}/cancel requests.
async fn cancel_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CancelOrder {
			order_id: id,
			author_id: payload.author_id,
			comment: payload.comment,
		},
	)
	.await
}

// ---- quotations ----

/// Handles POST /api/quotations requests: queues a manual quotation.
async fn create_quotation(
	State(state): State<AppState>,
	Json(payload): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CreateQuotation {
			order_id: payload.order_id,
			price: payload.price,
			details: payload.details,
			owner_id: payload.owner_id,
		},
	)
	.await
}

/// Handles GET /api/quotations/{id} requests.
async fn get_quotation(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Quotation>, ApiError> {
	let quotation = state.engine.quotations().get(&id).await?;
	Ok(Json(quotation))
}

/// Handles GET /api/quotations requests.
async fn list_quotations(State(state): State<AppState>) -> Result<Json<Vec<Quotation>>, ApiError> {
	let quotations = state.engine.quotations().list().await?;
	Ok(Json(quotations))
}

/// Handles POST /api/quotations/{id}/validate requests.
async fn validate_quotation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::ValidateQuotation {
			quotation_id: id,
			author_id: payload.author_id,
		},
	)
	.await
}

/// Handles POST /api/quotations/{id}/cancel requests.
async fn cancel_quotation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CancelQuotation {
			quotation_id: id,
			author_id: payload.author_id,
		},
	)
	.await
}

/// Handles POST /api/quotations/{id}/accept requests.
async fn accept_quotation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::AcceptQuotation {
			quotation_id: id,
			author_id: payload.author_id,
		},
	)
	.await
}

/// Handles POST /api/quotations/{id}/reject requests.
async fn reject_quotation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::RejectQuotation {
			quotation_id: id,
			author_id: payload.author_id,
		},
	)
	.await
}

// ---- realisations ----

/// Handles POST /api/realisations requests: queues a manual realisation.
async fn create_realisation(
	State(state): State<AppState>,
	Json(payload): Json<CreateRealisationRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CreateRealisation {
			order_id: payload.order_id,
			employee_id: payload.employee_id,
			created_by: payload.created_by,
		},
	)
	.await
}

/// Handles GET /api/realisations/{id} requests.
async fn get_realisation(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Realisation>, ApiError> {
	let realisation = state.engine.realisations().get(&id).await?;
	Ok(Json(realisation))
}

/// Handles GET /api/realisations requests.
async fn list_realisations(
	State(state): State<AppState>,
) -> Result<Json<Vec<Realisation>>, ApiError> {
	let realisations = state.engine.realisations().list().await?;
	Ok(Json(realisations))
}

/// Handles POST /api/realisations/{id}/start requests.
async fn start_realisation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::StartRealisation {
			realisation_id: id,
			author_id: Some(payload.author_id),
		},
	)
	.await
}

/// Handles POST /api/realisations/{id}/complete requests.
async fn complete_realisation(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(payload): Json<TransitionRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ApiError> {
	submit(
		&state,
		Operation::CompleteRealisation {
			realisation_id: id,
			author_id: Some(payload.author_id),
		},
	)
	.await
}

// ---- jobs ----

/// Handles GET /api/jobs/{id} requests.
async fn get_job(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<JobRecord>, ApiError> {
	let record = state.engine.job(&id).await.map_err(dispatch_error)?;
	Ok(Json(record))
}
