//! services/api/src/web/members.rs
//!
//! Handlers for the member roster.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use camptime_core::domain::{Member, MemberDraft};
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
pub struct MemberRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// The group the member belongs to, if any.
    #[serde(default)]
    pub group_id: Option<Uuid>,
}

impl MemberRequest {
    fn into_draft(self) -> Result<MemberDraft, String> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err("First and last name are required".to_string());
        }
        Ok(MemberDraft {
            first_name,
            last_name,
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            group_id: self.group_id,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub attendance: i32,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone: m.phone,
            group_id: m.group_id,
            group_name: m.group_name,
            attendance: m.attendance,
        }
    }
}

/// List all members of the caller's stamm.
#[utoipa::path(
    get,
    path = "/api/members",
    responses(
        (status = 200, description = "Members with their group", body = [MemberResponse])
    ),
    security(("bearer_token" = []))
)]
pub async fn list_members_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let members = state
        .db
        .list_members(&stamm)
        .await
        .map_err(http_error("fetch members"))?;
    Ok(Json(
        members.into_iter().map(MemberResponse::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/members",
    request_body = MemberRequest,
    responses(
        (status = 201, description = "Member created", body = MemberResponse),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn create_member_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Json(req): Json<MemberRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let member = state
        .db
        .create_member(&stamm, &draft)
        .await
        .map_err(http_error("create member"))?;
    info!(member_id = %member.id, %stamm, "Created member");
    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// Update a member; the group membership is replaced by the one sent.
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    params(("id" = Uuid, Path, description = "Member id")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberResponse),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Member or group not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn update_member_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(member_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req
        .into_draft()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let member = state
        .db
        .update_member(&stamm, member_id, &draft)
        .await
        .map_err(http_error("update member"))?;
    Ok(Json(MemberResponse::from(member)))
}

#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    params(("id" = Uuid, Path, description = "Member id")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found")
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_member_handler(
    State(state): State<Arc<AppState>>,
    Extension(Stamm(stamm)): Extension<Stamm>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .delete_member(&stamm, member_id)
        .await
        .map_err(http_error("delete member"))?;
    Ok(StatusCode::NO_CONTENT)
}
