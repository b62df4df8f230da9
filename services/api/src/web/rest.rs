//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::{activities, auth, groups, meetings, members};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::tokencheck_handler,
        auth::logout_handler,
        groups::list_groups_handler,
        groups::get_group_handler,
        groups::create_group_handler,
        groups::update_group_handler,
        members::list_members_handler,
        members::create_member_handler,
        members::update_member_handler,
        members::delete_member_handler,
        activities::list_activities_handler,
        activities::get_activity_handler,
        activities::create_activity_handler,
        activities::update_activity_handler,
        activities::delete_activity_handler,
        meetings::upcoming_meetings_handler,
        meetings::create_meeting_handler,
        meetings::add_activity_handler,
        meetings::cancel_meeting_handler,
        meetings::clear_activities_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::TokenRequest,
            auth::UserResponse,
            auth::LoginResponse,
            auth::MessageResponse,
            groups::LeaderPayload,
            groups::MeetingTimeInput,
            groups::MeetingTimeResponse,
            groups::GroupRequest,
            groups::GroupResponse,
            members::MemberRequest,
            members::MemberResponse,
            activities::ActivityRequest,
            activities::ActivityResponse,
            meetings::MeetingActivityResponse,
            meetings::MeetingResponse,
            meetings::CreateMeetingRequest,
            meetings::CreatedMeetingResponse,
            meetings::AddActivityRequest,
            meetings::MeetingIdResponse,
            meetings::CancelResponse,
            meetings::ClearActivitiesResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "CampTime API", description = "Groups, members, activities and meetings of a scouting stamm.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_token` scheme referenced by the protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_meeting_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/meetings",
            "/api/meetings/activity",
            "/api/meetings/{id}/cancel",
            "/api/meetings/{id}/activities",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_token"));
    }
}
