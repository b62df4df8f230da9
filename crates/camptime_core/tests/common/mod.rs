//! An in-memory `MeetingStore` for exercising the meeting service.
//!
//! A transaction works on a private copy of the state and publishes it on commit,
//! so rolled back writes never become visible.

use async_trait::async_trait;
use camptime_core::domain::{GroupSchedule, MeetingActivity, NewMeeting, Recurrence, StoredMeeting};
use camptime_core::ports::{MeetingStore, MeetingTransaction, PortError, PortResult};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MeetingRow {
    pub id: Uuid,
    pub stamm: String,
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct LinkRow {
    pub meeting_id: Uuid,
    pub activity_id: Uuid,
    pub order_index: i32,
}

#[derive(Debug, Clone, Default)]
pub struct State {
    pub groups: Vec<(String, GroupSchedule)>,
    pub activities: Vec<(String, MeetingActivity)>,
    pub meetings: Vec<MeetingRow>,
    pub links: Vec<LinkRow>,
}

/// Failure and race injection for the next transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// `append_activity` fails.
    pub fail_append: bool,
    /// Before `insert_meeting` writes, another writer commits the same group and date.
    pub race_insert: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Mutex<Faults>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, stamm: &str, name: &str, weekday: Option<u8>, time: &str) -> Uuid {
        let group_id = Uuid::new_v4();
        let schedule = GroupSchedule {
            group_id,
            name: name.to_string(),
            recurrence: Recurrence {
                weekday,
                frequency: Some(1),
                time: NaiveTime::parse_from_str(time, "%H:%M").ok(),
                ..Recurrence::default()
            },
        };
        self.state
            .lock()
            .unwrap()
            .groups
            .push((stamm.to_string(), schedule));
        group_id
    }

    pub fn add_activity(&self, stamm: &str, name: &str, duration: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().activities.push((
            stamm.to_string(),
            MeetingActivity {
                id,
                name: name.to_string(),
                duration,
            },
        ));
        id
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }

    pub fn meetings_for(&self, group_id: Uuid, date: NaiveDate) -> Vec<MeetingRow> {
        self.snapshot()
            .meetings
            .into_iter()
            .filter(|m| m.group_id == group_id && m.date == date)
            .collect()
    }

    pub fn links_of(&self, meeting_id: Uuid) -> Vec<LinkRow> {
        let mut links: Vec<_> = self
            .snapshot()
            .links
            .into_iter()
            .filter(|l| l.meeting_id == meeting_id)
            .collect();
        links.sort_by_key(|l| l.order_index);
        links
    }
}

#[async_trait]
impl MeetingStore for InMemoryStore {
    async fn list_group_schedules(&self, stamm: &str) -> PortResult<Vec<GroupSchedule>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .groups
            .iter()
            .filter(|(s, _)| s == stamm)
            .map(|(_, g)| g.clone())
            .collect())
    }

    async fn list_meetings_since(
        &self,
        stamm: &str,
        from: NaiveDate,
    ) -> PortResult<Vec<StoredMeeting>> {
        let state = self.state.lock().unwrap();
        let meetings = state
            .meetings
            .iter()
            .filter(|m| m.stamm == stamm && m.date >= from)
            .map(|m| {
                let group_name = state
                    .groups
                    .iter()
                    .find(|(_, g)| g.group_id == m.group_id)
                    .map(|(_, g)| g.name.clone())
                    .unwrap_or_default();
                let mut links: Vec<_> = state.links.iter().filter(|l| l.meeting_id == m.id).collect();
                links.sort_by_key(|l| l.order_index);
                let activities: Vec<_> = links
                    .iter()
                    .filter_map(|l| state.activities.iter().find(|(_, a)| a.id == l.activity_id))
                    .map(|(_, a)| json!({"id": a.id, "name": a.name, "duration": a.duration}))
                    .collect();
                StoredMeeting {
                    id: m.id,
                    group_id: m.group_id,
                    group_name,
                    date: m.date,
                    time: m.time,
                    title: m.title.clone(),
                    is_cancelled: m.is_cancelled,
                    activities: Some(json!(activities)),
                }
            })
            .collect();
        Ok(meetings)
    }

    async fn begin(&self) -> PortResult<Box<dyn MeetingTransaction>> {
        let working = self.state.lock().unwrap().clone();
        let faults = *self.faults.lock().unwrap();
        Ok(Box::new(InMemoryTransaction {
            shared: self.state.clone(),
            working,
            faults,
        }))
    }
}

pub struct InMemoryTransaction {
    shared: Arc<Mutex<State>>,
    working: State,
    faults: Faults,
}

#[async_trait]
impl MeetingTransaction for InMemoryTransaction {
    async fn find_group_schedule(
        &mut self,
        stamm: &str,
        group_id: Uuid,
    ) -> PortResult<Option<GroupSchedule>> {
        Ok(self
            .working
            .groups
            .iter()
            .find(|(s, g)| s == stamm && g.group_id == group_id)
            .map(|(_, g)| g.clone()))
    }

    async fn find_meeting_id(
        &mut self,
        stamm: &str,
        group_id: Uuid,
        date: NaiveDate,
    ) -> PortResult<Option<Uuid>> {
        Ok(self
            .working
            .meetings
            .iter()
            .find(|m| m.stamm == stamm && m.group_id == group_id && m.date == date)
            .map(|m| m.id))
    }

    async fn lock_meeting(&mut self, stamm: &str, meeting_id: Uuid) -> PortResult<bool> {
        Ok(self
            .working
            .meetings
            .iter()
            .any(|m| m.stamm == stamm && m.id == meeting_id))
    }

    async fn insert_meeting(
        &mut self,
        stamm: &str,
        meeting: &NewMeeting,
    ) -> PortResult<Option<Uuid>> {
        if self.faults.race_insert {
            self.faults.race_insert = false;
            let rival = MeetingRow {
                id: Uuid::new_v4(),
                stamm: stamm.to_string(),
                group_id: meeting.group_id,
                date: meeting.date,
                time: meeting.time,
                title: meeting.title.clone(),
                is_cancelled: false,
            };
            self.shared.lock().unwrap().meetings.push(rival.clone());
            // The rival's commit is visible to our following statements.
            self.working.meetings.push(rival);
        }

        let exists = self
            .working
            .meetings
            .iter()
            .any(|m| m.group_id == meeting.group_id && m.date == meeting.date);
        if exists {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        self.working.meetings.push(MeetingRow {
            id,
            stamm: stamm.to_string(),
            group_id: meeting.group_id,
            date: meeting.date,
            time: meeting.time,
            title: meeting.title.clone(),
            is_cancelled: meeting.is_cancelled,
        });
        Ok(Some(id))
    }

    async fn activity_exists(&mut self, stamm: &str, activity_id: Uuid) -> PortResult<bool> {
        Ok(self
            .working
            .activities
            .iter()
            .any(|(s, a)| s == stamm && a.id == activity_id))
    }

    async fn append_activity(&mut self, meeting_id: Uuid, activity_id: Uuid) -> PortResult<i32> {
        if self.faults.fail_append {
            return Err(PortError::Transaction("append_activity failed".to_string()));
        }
        let position = self
            .working
            .links
            .iter()
            .filter(|l| l.meeting_id == meeting_id)
            .map(|l| l.order_index + 1)
            .max()
            .unwrap_or(0);
        self.working.links.push(LinkRow {
            meeting_id,
            activity_id,
            order_index: position,
        });
        Ok(position)
    }

    async fn toggle_cancelled(
        &mut self,
        stamm: &str,
        meeting_id: Uuid,
    ) -> PortResult<Option<bool>> {
        Ok(self
            .working
            .meetings
            .iter_mut()
            .find(|m| m.stamm == stamm && m.id == meeting_id)
            .map(|m| {
                m.is_cancelled = !m.is_cancelled;
                m.is_cancelled
            }))
    }

    async fn set_cancelled(
        &mut self,
        stamm: &str,
        meeting_id: Uuid,
        cancelled: bool,
    ) -> PortResult<bool> {
        match self
            .working
            .meetings
            .iter_mut()
            .find(|m| m.stamm == stamm && m.id == meeting_id)
        {
            Some(m) => {
                m.is_cancelled = cancelled;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_activities(&mut self, meeting_id: Uuid) -> PortResult<u64> {
        let before = self.working.links.len();
        self.working.links.retain(|l| l.meeting_id != meeting_id);
        Ok((before - self.working.links.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        let this = *self;
        *this.shared.lock().unwrap() = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> PortResult<()> {
        Ok(())
    }
}
