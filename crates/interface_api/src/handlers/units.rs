//! Unit and occupancy handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{TenantId, UnitId};
use domain_property::{Occupancy, PropertyPort, Tenant, Unit};

use crate::auth::{permissions, require, Claims};
use crate::dto::property::*;
use crate::{error::ApiError, AppState};

/// Lists all units ordered by number
pub async fn list_units(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    require(&claims, permissions::PROPERTY_READ)?;
    Ok(Json(state.ports.property.list_units().await?))
}

pub async fn get_unit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Unit>, ApiError> {
    require(&claims, permissions::PROPERTY_READ)?;
    Ok(Json(state.ports.property.get_unit(UnitId::from_uuid(id)).await?))
}

/// Registers a unit
pub async fn create_unit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateUnitBody>,
) -> Result<(StatusCode, Json<Unit>), ApiError> {
    require(&claims, permissions::PROPERTY_WRITE)?;
    body.validate()?;
    let unit = state.ports.property.create_unit(body.into()).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// Tenants currently assigned to a unit
pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    require(&claims, permissions::PROPERTY_READ)?;
    Ok(Json(state.ports.property.active_tenants(UnitId::from_uuid(id)).await?))
}

/// Assigns a tenant to a unit
pub async fn assign_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignTenantBody>,
) -> Result<(StatusCode, Json<Occupancy>), ApiError> {
    require(&claims, permissions::PROPERTY_WRITE)?;
    let start = body
        .start_date
        .unwrap_or_else(|| state.config.timezone.local_date(Utc::now()));

    let occupancy = state
        .ports
        .property
        .assign_tenant(UnitId::from_uuid(id), TenantId::from_uuid(body.tenant_id), start)
        .await?;
    Ok((StatusCode::CREATED, Json(occupancy)))
}

/// Ends a tenant's occupancy of a unit
pub async fn end_occupancy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, tenant_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<EndDateQuery>,
) -> Result<Json<Occupancy>, ApiError> {
    require(&claims, permissions::PROPERTY_WRITE)?;
    let end = query
        .end_date
        .unwrap_or_else(|| state.config.timezone.local_date(Utc::now()));

    let occupancy = state
        .ports
        .property
        .end_occupancy(UnitId::from_uuid(id), TenantId::from_uuid(tenant_id), end)
        .await?;
    Ok(Json(occupancy))
}
