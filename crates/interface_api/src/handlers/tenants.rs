//! Tenant handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::TenantId;
use domain_property::{PropertyPort, RosterEntry, Tenant};

use crate::auth::{permissions, require, Claims};
use crate::dto::property::*;
use crate::{error::ApiError, AppState};

/// Registers a tenant
pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateTenantBody>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    require(&claims, permissions::PROPERTY_WRITE)?;
    body.validate()?;
    let tenant = state.ports.property.create_tenant(body.into()).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// Every tenant with their assignment history, including unassigned ones
pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    require(&claims, permissions::PROPERTY_READ)?;
    Ok(Json(state.ports.property.tenant_roster().await?))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, ApiError> {
    require(&claims, permissions::PROPERTY_READ)?;
    Ok(Json(state.ports.property.get_tenant(TenantId::from_uuid(id)).await?))
}

/// Marks a tenant inactive and ends their occupancies
pub async fn deactivate_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(query): Query<EndDateQuery>,
) -> Result<Json<Tenant>, ApiError> {
    require(&claims, permissions::PROPERTY_WRITE)?;
    let end = query
        .end_date
        .unwrap_or_else(|| state.config.timezone.local_date(Utc::now()));
    Ok(Json(state.ports.property.deactivate_tenant(TenantId::from_uuid(id), end).await?))
}
