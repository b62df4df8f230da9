//! crates/camptime_core/src/meetings.rs
//!
//! The meeting service: reads the upcoming-meetings list and runs the mutations
//! that turn computed meetings into stored ones.
//!
//! Every mutation runs inside one store transaction. If any step fails the
//! transaction is rolled back and the error is returned unchanged.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{CancelOutcome, MeetingDraft, MeetingOccurrence, MeetingRef, NewMeeting};
use crate::merge::merge_upcoming;
use crate::ports::{MeetingStore, MeetingTransaction, PortError, PortResult};

#[derive(Clone)]
pub struct MeetingService {
    store: Arc<dyn MeetingStore>,
}

impl MeetingService {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self { store }
    }

    /// The next meetings of all groups in the stamm, computed and stored alike.
    pub async fn upcoming(
        &self,
        stamm: &str,
        today: NaiveDate,
    ) -> PortResult<Vec<MeetingOccurrence>> {
        let groups = self.store.list_group_schedules(stamm).await?;
        let persisted = self.store.list_meetings_since(stamm, today).await?;
        debug!(
            groups = groups.len(),
            persisted = persisted.len(),
            "Merging upcoming meetings"
        );
        Ok(merge_upcoming(&groups, persisted, today))
    }

    /// Stores a meeting that was not produced by a recurrence, or that should
    /// deviate from it from the start.
    pub async fn create_meeting(&self, stamm: &str, draft: &MeetingDraft) -> PortResult<Uuid> {
        let mut tx = self.store.begin().await?;
        let result = create_in(tx.as_mut(), stamm, draft).await;
        finish(tx, result).await
    }

    /// Appends an activity to a meeting, storing the meeting first if it was only
    /// computed so far. Returns the id of the stored meeting.
    ///
    /// Adding the same activity twice attaches it twice.
    pub async fn add_activity(
        &self,
        stamm: &str,
        meeting: MeetingRef,
        activity_id: Uuid,
    ) -> PortResult<Uuid> {
        let mut tx = self.store.begin().await?;
        let result = add_activity_in(tx.as_mut(), stamm, meeting, activity_id).await;
        finish(tx, result).await
    }

    /// Cancels a computed meeting by storing it as cancelled, or flips the
    /// cancelled flag of a stored one.
    pub async fn toggle_cancelled(
        &self,
        stamm: &str,
        meeting: MeetingRef,
    ) -> PortResult<CancelOutcome> {
        let mut tx = self.store.begin().await?;
        let result = toggle_cancelled_in(tx.as_mut(), stamm, meeting).await;
        finish(tx, result).await
    }

    /// Detaches every activity from a meeting. Returns how many were removed; a
    /// meeting without activities is not an error.
    pub async fn clear_activities(&self, stamm: &str, meeting: MeetingRef) -> PortResult<u64> {
        let mut tx = self.store.begin().await?;
        let result = clear_activities_in(tx.as_mut(), stamm, meeting).await;
        finish(tx, result).await
    }
}

async fn finish<T>(tx: Box<dyn MeetingTransaction>, result: PortResult<T>) -> PortResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, original = %err, "Rollback failed");
            }
            Err(err)
        }
    }
}

enum Resolved {
    Existing(Uuid),
    Created(Uuid),
}

impl Resolved {
    fn id(&self) -> Uuid {
        match self {
            Resolved::Existing(id) | Resolved::Created(id) => *id,
        }
    }
}

/// Finds the stored meeting for a group and date, inserting it if there is none.
///
/// A concurrent request may insert the same row between our lookup and our insert;
/// the insert then reports the conflict and the row written by the other request
/// is used instead.
async fn materialize(
    tx: &mut dyn MeetingTransaction,
    stamm: &str,
    group_id: Uuid,
    date: NaiveDate,
    is_cancelled: bool,
) -> PortResult<Resolved> {
    if let Some(id) = tx.find_meeting_id(stamm, group_id, date).await? {
        return Ok(Resolved::Existing(id));
    }

    let group = tx
        .find_group_schedule(stamm, group_id)
        .await?
        .ok_or_else(|| PortError::NotFound(format!("Group {group_id} not found")))?;

    let meeting = NewMeeting {
        group_id,
        date,
        time: group.recurrence.time,
        title: group.default_title(),
        is_cancelled,
    };
    if let Some(id) = tx.insert_meeting(stamm, &meeting).await? {
        info!(meeting_id = %id, %group_id, %date, "Materialized meeting");
        return Ok(Resolved::Created(id));
    }

    tx.find_meeting_id(stamm, group_id, date)
        .await?
        .map(Resolved::Existing)
        .ok_or_else(|| {
            PortError::Transaction(format!(
                "Meeting for group {group_id} on {date} conflicted but could not be read back"
            ))
        })
}

async fn create_in(
    tx: &mut dyn MeetingTransaction,
    stamm: &str,
    draft: &MeetingDraft,
) -> PortResult<Uuid> {
    let group = tx
        .find_group_schedule(stamm, draft.group_id)
        .await?
        .ok_or_else(|| PortError::NotFound(format!("Group {} not found", draft.group_id)))?;

    let meeting = NewMeeting {
        group_id: draft.group_id,
        date: draft.date,
        time: draft.time.or(group.recurrence.time),
        title: draft
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| group.default_title()),
        is_cancelled: false,
    };

    tx.insert_meeting(stamm, &meeting).await?.ok_or_else(|| {
        PortError::Conflict(format!(
            "Group {} already has a meeting on {}",
            draft.group_id, draft.date
        ))
    })
}

async fn add_activity_in(
    tx: &mut dyn MeetingTransaction,
    stamm: &str,
    meeting: MeetingRef,
    activity_id: Uuid,
) -> PortResult<Uuid> {
    if !tx.activity_exists(stamm, activity_id).await? {
        return Err(PortError::NotFound(format!("Activity {activity_id} not found")));
    }

    let meeting_id = match meeting {
        MeetingRef::Persisted(id) => id,
        MeetingRef::Virtual { group_id, date } => {
            materialize(&mut *tx, stamm, group_id, date, false).await?.id()
        }
    };

    if !tx.lock_meeting(stamm, meeting_id).await? {
        return Err(PortError::NotFound(format!("Meeting {meeting_id} not found")));
    }
    let position = tx.append_activity(meeting_id, activity_id).await?;
    debug!(%meeting_id, %activity_id, position, "Attached activity");
    Ok(meeting_id)
}

async fn toggle_cancelled_in(
    tx: &mut dyn MeetingTransaction,
    stamm: &str,
    meeting: MeetingRef,
) -> PortResult<CancelOutcome> {
    match meeting {
        MeetingRef::Persisted(meeting_id) => {
            let is_cancelled = tx
                .toggle_cancelled(stamm, meeting_id)
                .await?
                .ok_or_else(|| PortError::NotFound(format!("Meeting {meeting_id} not found")))?;
            Ok(CancelOutcome {
                meeting_id,
                is_cancelled,
            })
        }
        MeetingRef::Virtual { group_id, date } => {
            match materialize(&mut *tx, stamm, group_id, date, true).await? {
                Resolved::Created(meeting_id) => Ok(CancelOutcome {
                    meeting_id,
                    is_cancelled: true,
                }),
                // Stored meanwhile: the caller saw an uncancelled meeting and asked to cancel it.
                Resolved::Existing(meeting_id) => {
                    if !tx.set_cancelled(stamm, meeting_id, true).await? {
                        return Err(PortError::NotFound(format!(
                            "Meeting {meeting_id} not found"
                        )));
                    }
                    Ok(CancelOutcome {
                        meeting_id,
                        is_cancelled: true,
                    })
                }
            }
        }
    }
}

async fn clear_activities_in(
    tx: &mut dyn MeetingTransaction,
    stamm: &str,
    meeting: MeetingRef,
) -> PortResult<u64> {
    let meeting_id = match meeting {
        MeetingRef::Persisted(id) => {
            if !tx.lock_meeting(stamm, id).await? {
                return Err(PortError::NotFound(format!("Meeting {id} not found")));
            }
            id
        }
        MeetingRef::Virtual { group_id, date } => {
            match tx.find_meeting_id(stamm, group_id, date).await? {
                Some(id) => id,
                // A computed meeting has no activities.
                None => return Ok(0),
            }
        }
    };
    tx.clear_activities(meeting_id).await
}
