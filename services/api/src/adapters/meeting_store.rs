//! services/api/src/adapters/meeting_store.rs
//!
//! The `MeetingStore` and `MeetingTransaction` ports on top of PostgreSQL.
//! Concurrent materialization of the same occurrence is settled by the
//! UNIQUE(group_id, meeting_date) constraint together with `ON CONFLICT DO NOTHING`.

use super::db::{db_err, tx_err, DbAdapter, RecurrenceColumns};
use async_trait::async_trait;
use camptime_core::domain::{GroupSchedule, NewMeeting, StoredMeeting};
use camptime_core::ports::{MeetingStore, MeetingTransaction, PortResult};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

#[derive(FromRow)]
struct ScheduleRecord {
    id: Uuid,
    name: String,
    #[sqlx(flatten)]
    recurrence: RecurrenceColumns,
}
impl ScheduleRecord {
    fn to_domain(self) -> GroupSchedule {
        GroupSchedule {
            group_id: self.id,
            name: self.name,
            recurrence: self.recurrence.to_domain(),
        }
    }
}

#[derive(FromRow)]
struct MeetingRecord {
    id: Uuid,
    group_id: Uuid,
    group_name: String,
    meeting_date: NaiveDate,
    meeting_time: Option<NaiveTime>,
    title: String,
    is_cancelled: bool,
    activities: Option<serde_json::Value>,
}
impl MeetingRecord {
    fn to_domain(self) -> StoredMeeting {
        StoredMeeting {
            id: self.id,
            group_id: self.group_id,
            group_name: self.group_name,
            date: self.meeting_date,
            time: self.meeting_time,
            title: self.title,
            is_cancelled: self.is_cancelled,
            activities: self.activities,
        }
    }
}

const SCHEDULE_SELECT: &str = "SELECT id, name, meeting_weekday, meeting_frequency, \
     meeting_time, start_date, end_date FROM scout_groups";

#[async_trait]
impl MeetingStore for DbAdapter {
    async fn list_group_schedules(&self, stamm: &str) -> PortResult<Vec<GroupSchedule>> {
        let sql = format!("{SCHEDULE_SELECT} WHERE stamm = $1 ORDER BY name");
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(stamm)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(records.into_iter().map(ScheduleRecord::to_domain).collect())
    }

    async fn list_meetings_since(
        &self,
        stamm: &str,
        from: NaiveDate,
    ) -> PortResult<Vec<StoredMeeting>> {
        let records = sqlx::query_as::<_, MeetingRecord>(
            r#"
            SELECT m.id, m.group_id, g.name AS group_name, m.meeting_date, m.meeting_time,
                   m.title, m.is_cancelled,
                   COALESCE(
                       (SELECT json_agg(json_build_object(
                                   'id', a.id, 'name', a.name, 'duration', a.duration)
                               ORDER BY ma.order_index)
                        FROM meeting_activities ma
                        JOIN activities a ON a.id = ma.activity_id
                        WHERE ma.meeting_id = m.id),
                       '[]'::json
                   ) AS activities
            FROM meetings m
            JOIN scout_groups g ON g.id = m.group_id
            WHERE m.stamm = $1 AND m.meeting_date >= $2
            ORDER BY m.meeting_date, m.meeting_time NULLS FIRST, m.created_at
            "#,
        )
        .bind(stamm)
        .bind(from)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(records.into_iter().map(MeetingRecord::to_domain).collect())
    }

    async fn begin(&self) -> PortResult<Box<dyn MeetingTransaction>> {
        let tx = self.pool.begin().await.map_err(tx_err)?;
        Ok(Box::new(PgMeetingTransaction { tx }))
    }
}

/// A `MeetingTransaction` backed by an open Postgres transaction. Dropping it
/// without `commit` rolls back.
pub struct PgMeetingTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MeetingTransaction for PgMeetingTransaction {
    async fn find_group_schedule(
        &mut self,
        stamm: &str,
        group_id: Uuid,
    ) -> PortResult<Option<GroupSchedule>> {
        let sql = format!("{SCHEDULE_SELECT} WHERE id = $1 AND stamm = $2");
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(group_id)
            .bind(stamm)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(tx_err)?;
        Ok(record.map(ScheduleRecord::to_domain))
    }

    async fn find_meeting_id(
        &mut self,
        stamm: &str,
        group_id: Uuid,
        date: NaiveDate,
    ) -> PortResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM meetings WHERE group_id = $1 AND meeting_date = $2 AND stamm = $3",
        )
        .bind(group_id)
        .bind(date)
        .bind(stamm)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(tx_err)
    }

    async fn lock_meeting(&mut self, stamm: &str, meeting_id: Uuid) -> PortResult<bool> {
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM meetings WHERE id = $1 AND stamm = $2 FOR UPDATE",
        )
        .bind(meeting_id)
        .bind(stamm)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(tx_err)?;
        Ok(locked.is_some())
    }

    async fn insert_meeting(
        &mut self,
        stamm: &str,
        meeting: &NewMeeting,
    ) -> PortResult<Option<Uuid>> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO meetings (id, group_id, meeting_date, meeting_time, title, is_cancelled, stamm) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (group_id, meeting_date) DO NOTHING \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(meeting.group_id)
        .bind(meeting.date)
        .bind(meeting.time)
        .bind(&meeting.title)
        .bind(meeting.is_cancelled)
        .bind(stamm)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(tx_err)?;
        if inserted.is_none() {
            debug!(group_id = %meeting.group_id, date = %meeting.date, "Meeting row already exists");
        }
        Ok(inserted)
    }

    async fn activity_exists(&mut self, stamm: &str, activity_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE id = $1 AND stamm = $2)",
        )
        .bind(activity_id)
        .bind(stamm)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(tx_err)
    }

    async fn append_activity(&mut self, meeting_id: Uuid, activity_id: Uuid) -> PortResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO meeting_activities (id, meeting_id, activity_id, order_index) \
             SELECT $1, $2, $3, COALESCE(MAX(order_index) + 1, 0) \
             FROM meeting_activities WHERE meeting_id = $2 \
             RETURNING order_index",
        )
        .bind(Uuid::new_v4())
        .bind(meeting_id)
        .bind(activity_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(tx_err)
    }

    async fn toggle_cancelled(
        &mut self,
        stamm: &str,
        meeting_id: Uuid,
    ) -> PortResult<Option<bool>> {
        sqlx::query_scalar::<_, bool>(
            "UPDATE meetings SET is_cancelled = NOT is_cancelled, updated_at = now() \
             WHERE id = $1 AND stamm = $2 RETURNING is_cancelled",
        )
        .bind(meeting_id)
        .bind(stamm)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(tx_err)
    }

    async fn set_cancelled(
        &mut self,
        stamm: &str,
        meeting_id: Uuid,
        cancelled: bool,
    ) -> PortResult<bool> {
        let updated = sqlx::query(
            "UPDATE meetings SET is_cancelled = $1, updated_at = now() \
             WHERE id = $2 AND stamm = $3",
        )
        .bind(cancelled)
        .bind(meeting_id)
        .bind(stamm)
        .execute(&mut *self.tx)
        .await
        .map_err(tx_err)?;
        Ok(updated.rows_affected() > 0)
    }

    async fn clear_activities(&mut self, meeting_id: Uuid) -> PortResult<u64> {
        let deleted = sqlx::query("DELETE FROM meeting_activities WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&mut *self.tx)
            .await
            .map_err(tx_err)?;
        Ok(deleted.rows_affected())
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        self.tx.commit().await.map_err(tx_err)
    }

    async fn rollback(self: Box<Self>) -> PortResult<()> {
        self.tx.rollback().await.map_err(tx_err)
    }
}
