//! crates/camptime_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP representation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Accounts
//=========================================================================================

/// Represents a registered user. `stamm` stays empty until an administrator assigns one.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub stamm: Option<String>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// The caller identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub stamm: Option<String>,
}

/// An issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Groups
//=========================================================================================

/// When a group regularly meets.
///
/// `weekday` counts from Sunday (0) to Saturday (6). A missing weekday means the
/// group has no regular schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recurrence {
    pub weekday: Option<u8>,
    pub frequency: Option<i32>,
    pub time: Option<NaiveTime>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Recurrence {
    /// Number of weeks between two meetings. Absent or non-positive values mean weekly.
    pub fn effective_frequency(&self) -> u32 {
        match self.frequency {
            Some(f) if f > 0 => f as u32,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub member_count: i64,
    pub leaders: Vec<Leader>,
}

/// The writable part of a group, used for create and update.
#[derive(Debug, Clone)]
pub struct GroupDraft {
    pub name: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub leaders: Vec<Leader>,
}

/// The slice of a group the meeting engine needs.
#[derive(Debug, Clone)]
pub struct GroupSchedule {
    pub group_id: Uuid,
    pub name: String,
    pub recurrence: Recurrence,
}

impl GroupSchedule {
    /// Title given to meetings that were never named explicitly.
    pub fn default_title(&self) -> String {
        format!("{} Gruppenstunde", self.name)
    }
}

//=========================================================================================
// Members
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub attendance: i32,
}

#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub group_id: Option<Uuid>,
}

//=========================================================================================
// Activities
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minutes.
    pub duration: i32,
    pub category: String,
    pub materials: Vec<String>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ActivityDraft {
    pub name: String,
    pub description: Option<String>,
    pub duration: i32,
    pub category: String,
    pub materials: Vec<String>,
    pub min_participants: Option<i32>,
    pub max_participants: Option<i32>,
}

//=========================================================================================
// Meetings
//=========================================================================================

/// The short form of an activity attached to a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeetingActivity {
    pub id: Uuid,
    pub name: String,
    pub duration: i32,
}

/// A meeting row as the store hands it out, before the activity payload is decoded.
#[derive(Debug, Clone)]
pub struct StoredMeeting {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub is_cancelled: bool,
    /// Aggregated activities, expected to be a JSON array of `{id, name, duration}`.
    pub activities: Option<serde_json::Value>,
}

/// Values for a meeting row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub is_cancelled: bool,
}

/// Input for creating a meeting directly. Missing fields fall back to the group's defaults.
#[derive(Debug, Clone)]
pub struct MeetingDraft {
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: Option<String>,
}

/// Points at a meeting occurrence, which is either computed from a recurrence or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetingRef {
    Persisted(Uuid),
    Virtual { group_id: Uuid, date: NaiveDate },
}

const VIRTUAL_PREFIX: &str = "calc_";

impl fmt::Display for MeetingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingRef::Persisted(id) => write!(f, "{id}"),
            MeetingRef::Virtual { group_id, date } => {
                write!(f, "{VIRTUAL_PREFIX}{group_id}_{}", date.format("%Y-%m-%d"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid meeting reference")]
pub struct InvalidMeetingRef(pub String);

impl FromStr for MeetingRef {
    type Err = InvalidMeetingRef;

    /// Accepts a meeting UUID or `calc_<groupId>_<date>`, where the date may carry a
    /// `T...` time suffix that is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMeetingRef(s.to_string());

        let Some(rest) = s.strip_prefix(VIRTUAL_PREFIX) else {
            return Uuid::parse_str(s)
                .map(MeetingRef::Persisted)
                .map_err(|_| invalid());
        };

        let (group_part, date_part) = rest.split_once('_').ok_or_else(invalid)?;
        let group_id = Uuid::parse_str(group_part).map_err(|_| invalid())?;
        let day = date_part.split('T').next().unwrap_or(date_part);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid())?;
        Ok(MeetingRef::Virtual { group_id, date })
    }
}

/// One entry of the upcoming-meetings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingOccurrence {
    pub id: MeetingRef,
    pub group_id: Uuid,
    pub group_name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub activities: Vec<MeetingActivity>,
    pub is_cancelled: bool,
    /// True when computed from the recurrence and never stored.
    pub is_calculated: bool,
}

/// Result of toggling a meeting's cancelled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOutcome {
    pub meeting_id: Uuid,
    pub is_cancelled: bool,
}
