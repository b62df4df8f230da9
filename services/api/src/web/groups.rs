//! services/api/src/web/groups.rs
//!
//! Handlers for scout groups, their leaders and their meeting schedule.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use camptime_core::domain::{Group, GroupDraft, Leader, Recurrence};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::http_error;
use crate::web::middleware::Stamm;
use crate::web::state::AppState;
use crate::web::wire::{format_time, lenient_int, non_blank, parse_time};

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderPayload {
    pub first_name: String,
    pub last_name: String,
}

/// The meeting schedule as sent by clients. Numbers may arrive as strings.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTimeInput {
    /// 0 = Sunday ... 6 = Saturday.
    #[serde(default, deserialize_with = "lenient_int")]
    pub weekday: Option<i64>,
    /// Every N weeks.
    #[serde(default, deserialize_with = "lenient_int")]
    pub frequency: Option<i64>,
    /// `HH:MM`
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl MeetingTimeInput {
    fn into_domain(self) -> Result<Recurrence, String> {
        let weekday = match self.weekday {
            None => None,
            Some(w @ 0..=6) => Some(w as u8),
            Some(w) => return Err(format!("weekday must be between 0 and 6, got {}", w)),
        };
        let frequency = match self.frequency {
            None => None,
            Some(f) if (1..=i32::MAX as i64).contains(&f) => Some(f as i32),
            Some(f) => return Err(format!("frequency must be a positive number, got {}", f)),
        };
        let time = non_blank(self.time).map(|t| parse_time(&t)).transpose()?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("endDate must not be before startDate".to_string());
            }
        }
        Ok(Recurrence {
            weekday,
            frequency,
            time,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTimeResponse {
    pub weekday: Option<u8>,
    pub frequency: Option<i32>,
    pub time: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<Recurrence> for MeetingTimeResponse {
    fn from(r: Recurrence) -> Self {
        Self {
            weekday: r.weekday,
            frequency: r.frequency,
            time: r.time.map(format_time),
            start_date: r.start_date,
            end_date: r.end_date,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meeting_time: MeetingTimeInput,
    #[serde(default)]
    pub leaders: Vec<LeaderPayload>,
}

impl GroupRequest {
    fn into_draft(self) -> Result<GroupDraft, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("Group name is required".to_string());
        }
        let leaders = self
            .leaders
            .into_iter()
            .filter(|l| !(l.first_name.trim().is_empty() && l.last_name.trim().is_empty()))
            .map(|l| Leader {
                first_name: l.first_name.trim().to_string(),
                last_name: l.last_name.trim().to_string(),
            })
            .collect();
        Ok(GroupDraft {
            name,
            description: non_blank(self.description),
            recurrence: self.meeting_time.into_domain()?,
            leaders,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub meeting_time: MeetingTimeResponse,
    pub member_count: i64,
    pub leaders: Vec<LeaderPayload>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            meeting_time: group.recurrence.into(),
            member_count: group.member_count,
            leaders: group
                .leaders
                .into_iter()
                .map(|l| LeaderPayload {
                    first_name: l.first_name,
                    last_name: l.last_name,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List all groups of the caller's stamm.
#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups with leaders and member counts", body = [GroupResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "No stamm assigned")
    ),
    security(("bearer_token" = []))
)]
pub async fn list_groups_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let groups = state
        .db
        .list_groups(&stamm)
        .await
        .map_err(http_error("fetch groups"))?;
    Ok(Json(
        groups.into_iter().map(GroupResponse::from).collect::<Vec<_>>(),
    ))
}

/// Fetch one group.
#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group", body = GroupResponse),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let group = state
        .db
        .get_group(&stamm, group_id)
        .await
        .map_err(http_error("fetch group"))?;
    Ok(Json(GroupResponse::from(group)))
}

/// Create a group together with its leaders.
#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid schedule or missing name"),
        (status = 409, description = "A group with this name exists")
    ),
    security(("bearer_token" = []))
)]
pub async fn create_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Json(req): Json<GroupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let group = state
        .db
        .create_group(&stamm, &draft)
        .await
        .map_err(http_error("create group"))?;
    info!(group_id = %group.id, %stamm, "Created group");
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// Update a group and replace its leaders.
#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 400, description = "Invalid schedule or missing name"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "A group with this name exists")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<GroupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let group = state
        .db
        .update_group(&stamm, group_id, &draft)
        .await
        .map_err(http_error("update group"))?;
    Ok(Json(GroupResponse::from(group)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::json;

    fn request(value: serde_json::Value) -> GroupRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn schedule_numbers_may_be_strings() {
        let draft = request(json!({
            "name": "Wölflinge",
            "meetingTime": {"weekday": "2", "frequency": "2", "time": "17:30"},
            "leaders": [{"firstName": "Anna", "lastName": "Muster"}]
        }))
        .into_draft()
        .unwrap();
        assert_eq!(draft.recurrence.weekday, Some(2));
        assert_eq!(draft.recurrence.frequency, Some(2));
        assert_eq!(draft.recurrence.time, NaiveTime::from_hms_opt(17, 30, 0));
        assert_eq!(draft.leaders.len(), 1);
    }

    #[test]
    fn missing_schedule_means_no_weekday() {
        let draft = request(json!({"name": "Rover"})).into_draft().unwrap();
        assert_eq!(draft.recurrence, Recurrence::default());
        assert!(draft.leaders.is_empty());
    }

    #[test]
    fn invalid_schedules_are_rejected() {
        for meeting_time in [
            json!({"weekday": 7}),
            json!({"weekday": -1}),
            json!({"weekday": 1, "frequency": 0}),
            json!({"weekday": 1, "time": "7pm"}),
            json!({"weekday": 1, "startDate": "2026-12-01", "endDate": "2026-11-01"}),
        ] {
            let result =
                request(json!({"name": "Pfadis", "meetingTime": meeting_time.clone()})).into_draft();
            assert!(result.is_err(), "accepted {meeting_time}");
        }
    }

    #[test]
    fn blank_names_and_leaders_are_dropped() {
        assert!(request(json!({"name": "  "})).into_draft().is_err());
        let draft = request(json!({
            "name": "Jupfis",
            "description": " ",
            "leaders": [{"firstName": " ", "lastName": ""}, {"firstName": "Ben", "lastName": "K"}]
        }))
        .into_draft()
        .unwrap();
        assert_eq!(draft.description, None);
        assert_eq!(draft.leaders, vec![Leader { first_name: "Ben".into(), last_name: "K".into() }]);
    }

    #[test]
    fn response_uses_camel_case_and_short_times() {
        let group = Group {
            id: Uuid::nil(),
            name: "Wölflinge".into(),
            description: None,
            recurrence: Recurrence {
                weekday: Some(0),
                frequency: None,
                time: NaiveTime::from_hms_opt(10, 0, 0),
                start_date: None,
                end_date: None,
            },
            member_count: 12,
            leaders: vec![],
        };
        let value = serde_json::to_value(GroupResponse::from(group)).unwrap();
        assert_eq!(value["memberCount"], 12);
        assert_eq!(value["meetingTime"]["weekday"], 0);
        assert_eq!(value["meetingTime"]["time"], "10:00");
    }
}
