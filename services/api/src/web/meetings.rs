//! services/api/src/web/meetings.rs
//!
//! Handlers for the upcoming-meetings list and the meeting mutations.
//!
//! Meeting ids on the wire are either the UUID of a stored meeting or
//! `calc_<groupId>_<YYYY-MM-DD>` for a meeting that is only computed so far.
//! They are parsed into a `MeetingRef` before reaching the meeting service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use camptime_core::domain::{MeetingActivity, MeetingDraft, MeetingOccurrence, MeetingRef};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::http_error;
use crate::web::middleware::Stamm;
use crate::web::state::AppState;
use crate::web::wire::{format_time, non_blank, parse_time};

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MeetingActivityResponse {
    pub id: Uuid,
    pub name: String,
    pub duration: i32,
}

impl From<MeetingActivity> for MeetingActivityResponse {
    fn from(a: MeetingActivity) -> Self {
        Self {
            id: a.id,
            name: a.name,
            duration: a.duration,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    /// A meeting UUID, or `calc_<groupId>_<date>` for computed meetings.
    pub id: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub title: String,
    pub activities: Vec<MeetingActivityResponse>,
    pub is_cancelled: bool,
    pub is_calculated: bool,
}

impl From<MeetingOccurrence> for MeetingResponse {
    fn from(m: MeetingOccurrence) -> Self {
        Self {
            id: m.id.to_string(),
            group_id: m.group_id,
            group_name: m.group_name,
            date: m.date,
            time: m.time.map(format_time),
            title: m.title,
            activities: m.activities.into_iter().map(Into::into).collect(),
            is_cancelled: m.is_cancelled,
            is_calculated: m.is_calculated,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub group_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM`; defaults to the group's meeting time.
    #[serde(default)]
    pub time: Option<String>,
    /// Defaults to `<group name> Gruppenstunde`.
    #[serde(default)]
    pub title: Option<String>,
}

impl CreateMeetingRequest {
    fn into_draft(self) -> Result<MeetingDraft, String> {
        let time = non_blank(self.time).map(|t| parse_time(&t)).transpose()?;
        Ok(MeetingDraft {
            group_id: self.group_id,
            date: self.date,
            time,
            title: non_blank(self.title),
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreatedMeetingResponse {
    pub id: Uuid,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddActivityRequest {
    /// A meeting UUID or a computed meeting id.
    pub meeting_id: String,
    pub activity_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingIdResponse {
    /// The id of the stored meeting, also when a computed one was given.
    pub meeting_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub meeting_id: Uuid,
    pub is_cancelled: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ClearActivitiesResponse {
    pub removed: u64,
}

fn parse_ref(raw: &str) -> Result<MeetingRef, (StatusCode, String)> {
    raw.parse::<MeetingRef>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// The next meetings of the caller's stamm, stored and computed alike.
#[utoipa::path(
    get,
    path = "/api/meetings",
    responses(
        (status = 200, description = "At most eight upcoming meetings, ordered by date and time", body = [MeetingResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "No stamm assigned")
    ),
    security(("bearer_token" = []))
)]
pub async fn upcoming_meetings_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let meetings = state
        .meetings
        .upcoming(&stamm, today)
        .await
        .map_err(http_error("fetch meetings"))?;
    Ok(Json(
        meetings
            .into_iter()
            .map(MeetingResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Store a meeting directly.
#[utoipa::path(
    post,
    path = "/api/meetings",
    request_body = CreateMeetingRequest,
    responses(
        (status = 201, description = "Meeting created", body = CreatedMeetingResponse),
        (status = 400, description = "Invalid time"),
        (status = 404, description = "Group not found"),
        (status = 409, description = "The group already has a meeting on this date")
    ),
    security(("bearer_token" = []))
)]
pub async fn create_meeting_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let id = state
        .meetings
        .create_meeting(&stamm, &draft)
        .await
        .map_err(http_error("create meeting"))?;
    info!(meeting_id = %id, group_id = %draft.group_id, date = %draft.date, "Created meeting");
    Ok((StatusCode::CREATED, Json(CreatedMeetingResponse { id })))
}

/// Attach an activity to a meeting, storing a computed meeting first.
#[utoipa::path(
    post,
    path = "/api/meetings/activity",
    request_body = AddActivityRequest,
    responses(
        (status = 200, description = "Activity attached", body = MeetingIdResponse),
        (status = 400, description = "Malformed meeting id"),
        (status = 404, description = "Meeting, group or activity not found"),
        (status = 500, description = "The change was rolled back")
    ),
    security(("bearer_token" = []))
)]
pub async fn add_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Json(req): Json<AddActivityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let meeting = parse_ref(&req.meeting_id)?;
    let meeting_id = state
        .meetings
        .add_activity(&stamm, meeting, req.activity_id)
        .await
        .map_err(http_error("add activity"))?;
    Ok(Json(MeetingIdResponse { meeting_id }))
}

/// Cancel a meeting, or take back a cancellation.
///
/// A computed meeting is stored as cancelled; a stored one has its flag flipped.
#[utoipa::path(
    post,
    path = "/api/meetings/{id}/cancel",
    params(("id" = String, Path, description = "Meeting UUID or computed meeting id")),
    responses(
        (status = 200, description = "New cancellation state", body = CancelResponse),
        (status = 400, description = "Malformed meeting id"),
        (status = 404, description = "Meeting or group not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn cancel_meeting_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let meeting = parse_ref(&raw_id)?;
    let outcome = state
        .meetings
        .toggle_cancelled(&stamm, meeting)
        .await
        .map_err(http_error("cancel meeting"))?;
    info!(meeting_id = %outcome.meeting_id, cancelled = outcome.is_cancelled, "Toggled meeting");
    Ok(Json(CancelResponse {
        meeting_id: outcome.meeting_id,
        is_cancelled: outcome.is_cancelled,
    }))
}

/// Detach all activities from a meeting.
#[utoipa::path(
    delete,
    path = "/api/meetings/{id}/activities",
    params(("id" = String, Path, description = "Meeting UUID or computed meeting id")),
    responses(
        (status = 200, description = "Number of detached activities", body = ClearActivitiesResponse),
        (status = 400, description = "Malformed meeting id"),
        (status = 404, description = "Meeting not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn clear_activities_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let meeting = parse_ref(&raw_id)?;
    let removed = state
        .meetings
        .clear_activities(&stamm, meeting)
        .await
        .map_err(http_error("clear activities"))?;
    Ok(Json(ClearActivitiesResponse { removed }))
}
