//! services/api/src/web/activities.rs
//!
//! Handlers for the activity catalogue.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use camptime_core::domain::{Activity, ActivityDraft};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::http_error;
use crate::web::middleware::Stamm;
use crate::web::state::AppState;
use crate::web::wire::non_blank;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes.
    pub duration: i32,
    pub category: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub min_participants: Option<i32>,
    #[serde(default)]
    pub max_participants: Option<i32>,
}

impl ActivityRequest {
    fn into_draft(self) -> Result<ActivityDraft, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Activity name is required".to_string());
        }
        if self.duration <= 0 {
            return Err("duration must be a positive number of minutes".to_string());
        }
        if let (Some(min), Some(max)) = (self.min_participants, self.max_participants) {
            if min > max {
                return Err("minParticipants must not exceed maxParticipants".to_string());
            }
        }
        Ok(ActivityDraft {
            name,
            description: non_blank(self.description),
            duration: self.duration,
            category: self.category.trim().to_string(),
            materials: self
                .materials
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            min_participants: self.min_participants,
            max_participants: self.max_participants,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub category: String,
    pub materials: Vec<String>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        Self {
            id: a.id,
            name: a.name,
            description: a.description,
            duration: a.duration,
            category: a.category,
            materials: a.materials,
            min_participants: a.min_participants,
            max_participants: a.max_participants,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/activities",
    responses((status = 200, description = "All activities of the stamm", body = [ActivityResponse])),
    security(("bearer_token" = []))
)]
pub async fn list_activities_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let activities = state
        .db
        .list_activities(&stamm)
        .await
        .map_err(http_error("fetch activities"))?;
    Ok(Json(
        activities
            .into_iter()
            .map(ActivityResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses(
        (status = 200, description = "The activity", body = ActivityResponse),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let activity = state
        .db
        .get_activity(&stamm, activity_id)
        .await
        .map_err(http_error("fetch activity"))?;
    Ok(Json(ActivityResponse::from(activity)))
}

#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = ActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = ActivityResponse),
        (status = 400, description = "Invalid activity")
    ),
    security(("bearer_token" = []))
)]
pub async fn create_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Json(req): Json<ActivityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let activity = state
        .db
        .create_activity(&stamm, &draft)
        .await
        .map_err(http_error("create activity"))?;
    info!(activity_id = %activity.id, %stamm, "Created activity");
    Ok((StatusCode::CREATED, Json(ActivityResponse::from(activity))))
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    request_body = ActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = ActivityResponse),
        (status = 400, description = "Invalid activity"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(activity_id): Path<Uuid>,
    Json(req): Json<ActivityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let activity = state
        .db
        .update_activity(&stamm, activity_id, &draft)
        .await
        .map_err(http_error("update activity"))?;
    Ok(Json(ActivityResponse::from(activity)))
}

/// Delete an activity. It is also removed from every meeting it was attached to.
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .delete_activity(&stamm, activity_id)
        .await
        .map_err(http_error("delete activity"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> ActivityRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn materials_are_trimmed_and_blank_ones_dropped() {
        let draft = request(json!({
            "name": "Schnitzeljagd",
            "duration": 45,
            "category": "Spiel",
            "materials": [" Kreide ", "", "Karte"],
            "minParticipants": 4
        }))
        .into_draft()
        .unwrap();
        assert_eq!(draft.materials, vec!["Kreide".to_string(), "Karte".to_string()]);
        assert_eq!(draft.min_participants, Some(4));
        assert_eq!(draft.max_participants, None);
    }

    #[test]
    fn invalid_activities_are_rejected() {
        let base = json!({"name": "Knoten", "duration": 30, "category": "Technik"});
        assert!(request(base.clone()).into_draft().is_ok());

        let mut zero = base.clone();
        zero["duration"] = json!(0);
        assert!(request(zero).into_draft().is_err());

        let mut unnamed = base.clone();
        unnamed["name"] = json!(" ");
        assert!(request(unnamed).into_draft().is_err());

        let mut bounds = base;
        bounds["minParticipants"] = json!(10);
        bounds["maxParticipants"] = json!(5);
        assert!(request(bounds).into_draft().is_err());
    }
}
