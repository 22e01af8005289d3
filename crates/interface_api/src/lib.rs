//! HTTP API Layer
//!
//! This crate provides the REST API for the rent ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for payments, ledgers and the property registry
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(ports, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::CoreError;
use domain_billing::{LedgerPorts, LedgerReporter, PaymentAllocator};

use crate::config::ApiConfig;
use crate::handlers::{health, ledger, payments, tenants, units};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ports: LedgerPorts,
    pub allocator: Arc<PaymentAllocator>,
    pub reporter: Arc<LedgerReporter>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the billing services over `ports`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the billing settings are invalid
    pub fn new(ports: LedgerPorts, config: ApiConfig) -> Result<Self, CoreError> {
        let billing = config.billing()?;
        Ok(Self {
            allocator: Arc::new(PaymentAllocator::new(ports.clone(), billing)),
            reporter: Arc::new(LedgerReporter::new(&ports)),
            ports,
            config,
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let payment_routes = Router::new()
        .route("/", get(payments::list_transactions).post(payments::allocate))
        .route("/:id/reverse", post(payments::reverse));

    let unit_routes = Router::new()
        .route("/", get(units::list_units).post(units::create_unit))
        .route("/:id", get(units::get_unit))
        .route("/:id/ledger/:year", get(ledger::unit_year))
        .route("/:id/received", get(ledger::total_received))
        .route("/:id/tenants", get(units::list_tenants).post(units::assign_tenant))
        .route("/:id/tenants/:tenant_id", delete(units::end_occupancy));

    let tenant_routes = Router::new()
        .route("/", get(tenants::list_tenants).post(tenants::create_tenant))
        .route("/:id", get(tenants::get_tenant).delete(tenants::deactivate_tenant));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/units", unit_routes)
        .nest("/tenants", tenant_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
