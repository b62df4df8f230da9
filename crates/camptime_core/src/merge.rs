//! crates/camptime_core/src/merge.rs
//!
//! Blends stored meetings with the meetings computed from each group's recurrence
//! into one chronological list.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{GroupSchedule, MeetingActivity, MeetingOccurrence, MeetingRef, StoredMeeting};
use crate::schedule::{occurrences, HORIZON};

/// Decodes the aggregated activity payload of a stored meeting.
///
/// Never fails: a missing payload is an empty list, entries without an id (left-join
/// leftovers) are skipped, and anything else that does not decode is logged and
/// replaced by an empty list.
pub fn decode_activities(meeting_id: Uuid, payload: Option<&Value>) -> Vec<MeetingActivity> {
    match payload {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(_)) | Err(_) => {
                warn!(%meeting_id, "Discarding unparsable activity payload");
                Vec::new()
            }
            Ok(value) => decode_activities(meeting_id, Some(&value)),
        },
        Some(Value::Array(entries)) => {
            let mut activities = Vec::with_capacity(entries.len());
            for entry in entries {
                if entry.get("id").map_or(true, Value::is_null) {
                    continue;
                }
                match MeetingActivity::deserialize(entry) {
                    Ok(activity) => activities.push(activity),
                    Err(e) => {
                        warn!(%meeting_id, error = %e, "Discarding malformed activity payload");
                        return Vec::new();
                    }
                }
            }
            activities
        }
        Some(other) => {
            warn!(%meeting_id, payload = %other, "Activity payload is not a list");
            Vec::new()
        }
    }
}

impl StoredMeeting {
    fn into_occurrence(self) -> MeetingOccurrence {
        let activities = decode_activities(self.id, self.activities.as_ref());
        MeetingOccurrence {
            id: MeetingRef::Persisted(self.id),
            group_id: self.group_id,
            group_name: self.group_name,
            date: self.date,
            time: self.time,
            title: self.title,
            activities,
            is_cancelled: self.is_cancelled,
            is_calculated: false,
        }
    }
}

fn calculated(group: &GroupSchedule, date: NaiveDate) -> MeetingOccurrence {
    MeetingOccurrence {
        id: MeetingRef::Virtual {
            group_id: group.group_id,
            date,
        },
        group_id: group.group_id,
        group_name: group.name.clone(),
        date,
        time: group.recurrence.time,
        title: group.default_title(),
        activities: Vec::new(),
        is_cancelled: false,
        is_calculated: true,
    }
}

/// Builds the upcoming-meetings list.
///
/// Every stored meeting is kept, cancelled or not, and shadows the computed meeting
/// of the same group and date. Each group contributes up to [`HORIZON`] computed
/// dates; the combined list is sorted by date and time and cut to [`HORIZON`] entries.
pub fn merge_upcoming(
    groups: &[GroupSchedule],
    persisted: Vec<StoredMeeting>,
    reference: NaiveDate,
) -> Vec<MeetingOccurrence> {
    let mut taken: HashSet<(Uuid, NaiveDate)> = HashSet::with_capacity(persisted.len());
    let mut merged: Vec<MeetingOccurrence> = Vec::with_capacity(persisted.len() + HORIZON);

    for meeting in persisted {
        if !taken.insert((meeting.group_id, meeting.date)) {
            debug!(
                meeting_id = %meeting.id,
                group_id = %meeting.group_id,
                date = %meeting.date,
                "Skipping second stored meeting for the same group and date"
            );
            continue;
        }
        merged.push(meeting.into_occurrence());
    }

    for group in groups {
        merged.extend(
            occurrences(&group.recurrence, reference, HORIZON)
                .filter(|date| !taken.contains(&(group.group_id, *date)))
                .map(|date| calculated(group, date)),
        );
    }

    merged.sort_by_key(|meeting| (meeting.date, meeting.time));
    merged.truncate(HORIZON);
    merged
}
