//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`. The meeting tables are served by the
//! same adapter in `meeting_store.rs`.

use async_trait::async_trait;
use camptime_core::domain::{
    Activity, ActivityDraft, AuthToken, Group, GroupDraft, Identity, Leader, Member, MemberDraft,
    Recurrence, User, UserCredentials,
};
use camptime_core::ports::{DatabaseService, PortError, PortResult};
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{error, warn};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` and `MeetingStore` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pub(crate) pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Helpers
//=========================================================================================

pub(crate) fn db_err(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

pub(crate) fn tx_err(e: sqlx::Error) -> PortError {
    PortError::Transaction(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Commits on success and rolls back on failure. A failed rollback is logged and
/// the original error is returned.
async fn settle<T>(tx: Transaction<'static, Postgres>, result: PortResult<T>) -> PortResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(tx_err)?;
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

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    stamm: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            stamm: self.stamm,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}

#[derive(FromRow)]
struct IdentityRecord {
    id: Uuid,
    stamm: Option<String>,
}

/// Recurrence columns shared by the group and schedule queries.
#[derive(FromRow)]
pub(crate) struct RecurrenceColumns {
    meeting_weekday: Option<i16>,
    meeting_frequency: Option<i32>,
    meeting_time: Option<NaiveTime>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}
impl RecurrenceColumns {
    pub(crate) fn to_domain(self) -> Recurrence {
        Recurrence {
            weekday: self.meeting_weekday.and_then(|w| u8::try_from(w).ok()),
            frequency: self.meeting_frequency,
            time: self.meeting_time,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(FromRow)]
struct GroupRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    #[sqlx(flatten)]
    recurrence: RecurrenceColumns,
    member_count: i64,
}
impl GroupRecord {
    fn to_domain(self, leaders: Vec<Leader>) -> Group {
        Group {
            id: self.id,
            name: self.name,
            description: self.description,
            recurrence: self.recurrence.to_domain(),
            member_count: self.member_count,
            leaders,
        }
    }
}

#[derive(FromRow)]
struct LeaderRecord {
    group_id: Uuid,
    first_name: String,
    last_name: String,
}

#[derive(FromRow)]
struct MemberRecord {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    attendance: i32,
    group_id: Option<Uuid>,
    group_name: Option<String>,
}
impl MemberRecord {
    fn to_domain(self) -> Member {
        Member {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            group_id: self.group_id,
            group_name: self.group_name,
            attendance: self.attendance,
        }
    }
}

#[derive(FromRow)]
struct ActivityRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    duration: i32,
    category: String,
    materials: Value,
    min_participants: Option<i32>,
    max_participants: Option<i32>,
}
impl ActivityRecord {
    fn to_domain(self) -> Activity {
        let materials = materials_from(self.id, self.materials);
        Activity {
            id: self.id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            category: self.category,
            materials,
            min_participants: self.min_participants,
            max_participants: self.max_participants,
        }
    }
}

/// Reads the stored materials list, keeping only the string entries.
fn materials_from(activity_id: Uuid, value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                other => {
                    warn!(%activity_id, entry = %other, "Ignoring non-text material");
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!(%activity_id, materials = %other, "Materials are not a list");
            Vec::new()
        }
    }
}

//=========================================================================================
// Queries
//=========================================================================================

const USER_COLUMNS: &str = "id, first_name, last_name, email, stamm";

const GROUP_SELECT: &str = "SELECT g.id, g.name, g.description, g.meeting_weekday, \
     g.meeting_frequency, g.meeting_time, g.start_date, g.end_date, \
     (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id) AS member_count \
     FROM scout_groups g";

const MEMBER_SELECT: &str = "SELECT m.id, m.first_name, m.last_name, m.email, m.phone, \
     m.attendance, gm.group_id, g.name AS group_name \
     FROM members m \
     LEFT JOIN group_members gm ON gm.member_id = m.id \
     LEFT JOIN scout_groups g ON g.id = gm.group_id";

const ACTIVITY_COLUMNS: &str = "id, name, description, duration, category, materials, \
     min_participants, max_participants";

impl DbAdapter {
    async fn leaders_for(&self, group_ids: &[Uuid]) -> PortResult<HashMap<Uuid, Vec<Leader>>> {
        let records = sqlx::query_as::<_, LeaderRecord>(
            "SELECT group_id, first_name, last_name FROM group_leaders \
             WHERE group_id = ANY($1) ORDER BY group_id, position",
        )
        .bind(group_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut leaders: HashMap<Uuid, Vec<Leader>> = HashMap::new();
        for r in records {
            leaders.entry(r.group_id).or_default().push(Leader {
                first_name: r.first_name,
                last_name: r.last_name,
            });
        }
        Ok(leaders)
    }

    async fn get_member(&self, stamm: &str, member_id: Uuid) -> PortResult<Member> {
        let sql = format!("{MEMBER_SELECT} WHERE m.id = $1 AND m.stamm = $2");
        sqlx::query_as::<_, MemberRecord>(&sql)
            .bind(member_id)
            .bind(stamm)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(MemberRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Member {} not found", member_id)))
    }
}

async fn insert_leaders(
    tx: &mut Transaction<'static, Postgres>,
    group_id: Uuid,
    leaders: &[Leader],
) -> PortResult<()> {
    for (position, leader) in leaders.iter().enumerate() {
        sqlx::query(
            "INSERT INTO group_leaders (id, group_id, first_name, last_name, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(&leader.first_name)
        .bind(&leader.last_name)
        .bind(position as i32)
        .execute(&mut **tx)
        .await
        .map_err(tx_err)?;
    }
    Ok(())
}

async fn ensure_group_in_stamm(
    tx: &mut Transaction<'static, Postgres>,
    stamm: &str,
    group_id: Uuid,
) -> PortResult<()> {
    let found = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM scout_groups WHERE id = $1 AND stamm = $2",
    )
    .bind(group_id)
    .bind(stamm)
    .fetch_optional(&mut **tx)
    .await
    .map_err(tx_err)?;
    found
        .map(|_| ())
        .ok_or_else(|| PortError::NotFound(format!("Group {} not found", group_id)))
}

async fn set_membership(
    tx: &mut Transaction<'static, Postgres>,
    member_id: Uuid,
    group_id: Option<Uuid>,
) -> PortResult<()> {
    sqlx::query("DELETE FROM group_members WHERE member_id = $1")
        .bind(member_id)
        .execute(&mut **tx)
        .await
        .map_err(tx_err)?;
    if let Some(group_id) = group_id {
        sqlx::query("INSERT INTO group_members (member_id, group_id) VALUES ($1, $2)")
            .bind(member_id)
            .bind(group_id)
            .execute(&mut **tx)
            .await
            .map_err(tx_err)?;
    }
    Ok(())
}

fn group_name_conflict(e: sqlx::Error, name: &str) -> PortError {
    if is_unique_violation(&e) {
        PortError::Conflict(format!("A group named '{}' already exists", name))
    } else {
        tx_err(e)
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, first_name, last_name, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(hashed_password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict("Email already registered".to_string())
                } else {
                    db_err(e)
                }
            })?;
        Ok(record.to_domain())
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, CredentialsRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        Ok(UserCredentials {
            user: record.user.to_domain(),
            hashed_password: record.password_hash,
        })
    }

    async fn replace_tokens(&self, token: &AuthToken) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let result: PortResult<()> = async {
            sqlx::query("DELETE FROM tokens WHERE user_id = $1")
                .bind(token.user_id)
                .execute(&mut *tx)
                .await
                .map_err(tx_err)?;
            sqlx::query("INSERT INTO tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
                .bind(&token.token)
                .bind(token.user_id)
                .bind(token.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(tx_err)?;
            Ok(())
        }
        .await;
        settle(tx, result).await
    }

    async fn identity_for_token(&self, token: &str) -> PortResult<Identity> {
        let record = sqlx::query_as::<_, IdentityRecord>(
            "SELECT u.id, u.stamm FROM tokens t JOIN users u ON u.id = t.user_id \
             WHERE t.token = $1 AND t.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(PortError::Unauthorized)?;
        Ok(Identity {
            user_id: record.id,
            stamm: record.stamm,
        })
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn delete_token(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_groups(&self, stamm: &str) -> PortResult<Vec<Group>> {
        let sql = format!("{GROUP_SELECT} WHERE g.stamm = $1 ORDER BY g.name");
        let records = sqlx::query_as::<_, GroupRecord>(&sql)
            .bind(stamm)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut leaders = self.leaders_for(&ids).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                let group_leaders = leaders.remove(&r.id).unwrap_or_default();
                r.to_domain(group_leaders)
            })
            .collect())
    }

    async fn get_group(&self, stamm: &str, group_id: Uuid) -> PortResult<Group> {
        let sql = format!("{GROUP_SELECT} WHERE g.id = $1 AND g.stamm = $2");
        let record = sqlx::query_as::<_, GroupRecord>(&sql)
            .bind(group_id)
            .bind(stamm)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| PortError::NotFound(format!("Group {} not found", group_id)))?;
        let mut leaders = self.leaders_for(&[group_id]).await?;
        Ok(record.to_domain(leaders.remove(&group_id).unwrap_or_default()))
    }

    async fn create_group(&self, stamm: &str, draft: &GroupDraft) -> PortResult<Group> {
        let group_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let result: PortResult<()> = async {
            let r = &draft.recurrence;
            sqlx::query(
                "INSERT INTO scout_groups (id, name, description, meeting_weekday, \
                 meeting_frequency, meeting_time, start_date, end_date, stamm) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(group_id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(r.weekday.map(i16::from))
            .bind(r.frequency)
            .bind(r.time)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(stamm)
            .execute(&mut *tx)
            .await
            .map_err(|e| group_name_conflict(e, &draft.name))?;
            insert_leaders(&mut tx, group_id, &draft.leaders).await
        }
        .await;
        settle(tx, result).await?;
        self.get_group(stamm, group_id).await
    }

    async fn update_group(
        &self,
        stamm: &str,
        group_id: Uuid,
        draft: &GroupDraft,
    ) -> PortResult<Group> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let result: PortResult<()> = async {
            let r = &draft.recurrence;
            let updated = sqlx::query(
                "UPDATE scout_groups SET name = $1, description = $2, meeting_weekday = $3, \
                 meeting_frequency = $4, meeting_time = $5, start_date = $6, end_date = $7, \
                 updated_at = now() \
                 WHERE id = $8 AND stamm = $9",
            )
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(r.weekday.map(i16::from))
            .bind(r.frequency)
            .bind(r.time)
            .bind(r.start_date)
            .bind(r.end_date)
            .bind(group_id)
            .bind(stamm)
            .execute(&mut *tx)
            .await
            .map_err(|e| group_name_conflict(e, &draft.name))?;
            if updated.rows_affected() == 0 {
                return Err(PortError::NotFound(format!("Group {} not found", group_id)));
            }

            sqlx::query("DELETE FROM group_leaders WHERE group_id = $1")
                .bind(group_id)
                .execute(&mut *tx)
                .await
                .map_err(tx_err)?;
            insert_leaders(&mut tx, group_id, &draft.leaders).await
        }
        .await;
        settle(tx, result).await?;
        self.get_group(stamm, group_id).await
    }

    async fn list_members(&self, stamm: &str) -> PortResult<Vec<Member>> {
        let sql = format!("{MEMBER_SELECT} WHERE m.stamm = $1 ORDER BY m.last_name, m.first_name");
        let records = sqlx::query_as::<_, MemberRecord>(&sql)
            .bind(stamm)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(records.into_iter().map(MemberRecord::to_domain).collect())
    }

    async fn create_member(&self, stamm: &str, draft: &MemberDraft) -> PortResult<Member> {
        let member_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let result: PortResult<()> = async {
            if let Some(group_id) = draft.group_id {
                ensure_group_in_stamm(&mut tx, stamm, group_id).await?;
            }
            sqlx::query(
                "INSERT INTO members (id, first_name, last_name, email, phone, stamm) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(member_id)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(stamm)
            .execute(&mut *tx)
            .await
            .map_err(tx_err)?;
            set_membership(&mut tx, member_id, draft.group_id).await
        }
        .await;
        settle(tx, result).await?;
        self.get_member(stamm, member_id).await
    }

    async fn update_member(
        &self,
        stamm: &str,
        member_id: Uuid,
        draft: &MemberDraft,
    ) -> PortResult<Member> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let result: PortResult<()> = async {
            let updated = sqlx::query(
                "UPDATE members SET first_name = $1, last_name = $2, email = $3, phone = $4, \
                 updated_at = now() \
                 WHERE id = $5 AND stamm = $6",
            )
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(member_id)
            .bind(stamm)
            .execute(&mut *tx)
            .await
            .map_err(tx_err)?;
            if updated.rows_affected() == 0 {
                return Err(PortError::NotFound(format!("Member {} not found", member_id)));
            }
            if let Some(group_id) = draft.group_id {
                ensure_group_in_stamm(&mut tx, stamm, group_id).await?;
            }
            set_membership(&mut tx, member_id, draft.group_id).await
        }
        .await;
        settle(tx, result).await?;
        self.get_member(stamm, member_id).await
    }

    async fn delete_member(&self, stamm: &str, member_id: Uuid) -> PortResult<()> {
        let deleted = sqlx::query("DELETE FROM members WHERE id = $1 AND stamm = $2")
            .bind(member_id)
            .bind(stamm)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Member {} not found", member_id)));
        }
        Ok(())
    }

    async fn list_activities(&self, stamm: &str) -> PortResult<Vec<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE stamm = $1 ORDER BY name");
        let records = sqlx::query_as::<_, ActivityRecord>(&sql)
            .bind(stamm)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(records.into_iter().map(ActivityRecord::to_domain).collect())
    }

    async fn get_activity(&self, stamm: &str, activity_id: Uuid) -> PortResult<Activity> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1 AND stamm = $2");
        sqlx::query_as::<_, ActivityRecord>(&sql)
            .bind(activity_id)
            .bind(stamm)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(ActivityRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Activity {} not found", activity_id)))
    }

    async fn create_activity(&self, stamm: &str, draft: &ActivityDraft) -> PortResult<Activity> {
        let sql = format!(
            "INSERT INTO activities (id, name, description, duration, category, materials, \
             min_participants, max_participants, stamm) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ACTIVITY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ActivityRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.duration)
            .bind(&draft.category)
            .bind(sqlx::types::Json(&draft.materials))
            .bind(draft.min_participants)
            .bind(draft.max_participants)
            .bind(stamm)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(record.to_domain())
    }

    async fn update_activity(
        &self,
        stamm: &str,
        activity_id: Uuid,
        draft: &ActivityDraft,
    ) -> PortResult<Activity> {
        let sql = format!(
            "UPDATE activities SET name = $1, description = $2, duration = $3, category = $4, \
             materials = $5, min_participants = $6, max_participants = $7, updated_at = now() \
             WHERE id = $8 AND stamm = $9 RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, ActivityRecord>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.duration)
            .bind(&draft.category)
            .bind(sqlx::types::Json(&draft.materials))
            .bind(draft.min_participants)
            .bind(draft.max_participants)
            .bind(activity_id)
            .bind(stamm)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(ActivityRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Activity {} not found", activity_id)))
    }

    async fn delete_activity(&self, stamm: &str, activity_id: Uuid) -> PortResult<()> {
        let deleted = sqlx::query("DELETE FROM activities WHERE id = $1 AND stamm = $2")
            .bind(activity_id)
            .bind(stamm)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Activity {} not found", activity_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weekday_column_outside_u8_is_dropped() {
        let columns = RecurrenceColumns {
            meeting_weekday: Some(-1),
            meeting_frequency: Some(2),
            meeting_time: None,
            start_date: None,
            end_date: None,
        };
        let recurrence = columns.to_domain();
        assert_eq!(recurrence.weekday, None);
        assert_eq!(recurrence.frequency, Some(2));
    }

    #[test]
    fn materials_keep_only_text_entries() {
        let id = Uuid::new_v4();
        assert_eq!(
            materials_from(id, json!(["Seil", 3, "Karte", null])),
            vec!["Seil".to_string(), "Karte".to_string()]
        );
        assert!(materials_from(id, Value::Null).is_empty());
        assert!(materials_from(id, json!({"Seil": true})).is_empty());
    }
}
