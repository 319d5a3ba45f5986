//! Dashboard endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{Activity, DashboardStats, Envelope},
    services::policy::{authorize, Action},
    AppState,
};

use super::{ApiQuery, AuthenticatedUser};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    /// Number of entries (default 10)
    pub limit: Option<usize>,
}

/// Library-wide figures for today
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Envelope<DashboardStats>>> {
    authorize(&claims, Action::ViewDashboard)?;
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(Envelope::ok(stats)))
}

/// Latest circulation and membership events
#[utoipa::path(
    get,
    path = "/dashboard/activity",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Recent activity, newest first", body = Vec<Activity>)
    )
)]
pub async fn get_activity(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> AppResult<Json<Envelope<Vec<Activity>>>> {
    authorize(&claims, Action::ViewDashboard)?;
    let activity = state.services.dashboard.recent_activity(query.limit).await?;
    Ok(Json(Envelope::ok(activity)))
}
