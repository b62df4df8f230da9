//! crates/camptime_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete relational store.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityDraft, AuthToken, Group, GroupDraft, GroupSchedule, Identity, Member,
    MemberDraft, NewMeeting, StoredMeeting, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The item does not exist or belongs to another stamm.
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A write inside a transaction failed; everything in that transaction was rolled back.
    #[error("Transaction failed: {0}")]
    Transaction(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Accounts and the roster entities. Every roster method is scoped by `stamm`;
/// ids outside that scope behave exactly like ids that do not exist.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Accounts ---
    async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    /// Drops every token of the user and stores `token` as the only valid one.
    async fn replace_tokens(&self, token: &AuthToken) -> PortResult<()>;

    async fn identity_for_token(&self, token: &str) -> PortResult<Identity>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn delete_token(&self, token: &str) -> PortResult<()>;

    // --- Groups ---
    async fn list_groups(&self, stamm: &str) -> PortResult<Vec<Group>>;

    async fn get_group(&self, stamm: &str, group_id: Uuid) -> PortResult<Group>;

    async fn create_group(&self, stamm: &str, draft: &GroupDraft) -> PortResult<Group>;

    async fn update_group(&self, stamm: &str, group_id: Uuid, draft: &GroupDraft)
        -> PortResult<Group>;

    // --- Members ---
    async fn list_members(&self, stamm: &str) -> PortResult<Vec<Member>>;

    async fn create_member(&self, stamm: &str, draft: &MemberDraft) -> PortResult<Member>;

    async fn update_member(
        &self,
        stamm: &str,
        member_id: Uuid,
        draft: &MemberDraft,
    ) -> PortResult<Member>;

    async fn delete_member(&self, stamm: &str, member_id: Uuid) -> PortResult<()>;

    // --- Activities ---
    async fn list_activities(&self, stamm: &str) -> PortResult<Vec<Activity>>;

    async fn get_activity(&self, stamm: &str, activity_id: Uuid) -> PortResult<Activity>;

    async fn create_activity(&self, stamm: &str, draft: &ActivityDraft) -> PortResult<Activity>;

    async fn update_activity(
        &self,
        stamm: &str,
        activity_id: Uuid,
        draft: &ActivityDraft,
    ) -> PortResult<Activity>;

    async fn delete_activity(&self, stamm: &str, activity_id: Uuid) -> PortResult<()>;
}

/// Read access to meetings plus the entry point for transactional writes.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn list_group_schedules(&self, stamm: &str) -> PortResult<Vec<GroupSchedule>>;

    /// Stored meetings of the stamm dated on or after `from`, including cancelled ones.
    async fn list_meetings_since(&self, stamm: &str, from: NaiveDate)
        -> PortResult<Vec<StoredMeeting>>;

    async fn begin(&self) -> PortResult<Box<dyn MeetingTransaction>>;
}

/// A unit of work against the meeting tables. Nothing becomes visible to other
/// callers until `commit`; `rollback` discards every write made through it.
#[async_trait]
pub trait MeetingTransaction: Send {
    async fn find_group_schedule(
        &mut self,
        stamm: &str,
        group_id: Uuid,
    ) -> PortResult<Option<GroupSchedule>>;

    async fn find_meeting_id(
        &mut self,
        stamm: &str,
        group_id: Uuid,
        date: NaiveDate,
    ) -> PortResult<Option<Uuid>>;

    /// Locks the meeting row for the rest of the transaction. Returns `false` if the
    /// row does not exist in this stamm.
    async fn lock_meeting(&mut self, stamm: &str, meeting_id: Uuid) -> PortResult<bool>;

    /// Inserts a meeting row. Returns `None` if a row for the same group and date
    /// already exists, e.g. because a concurrent request created it first.
    async fn insert_meeting(&mut self, stamm: &str, meeting: &NewMeeting)
        -> PortResult<Option<Uuid>>;

    async fn activity_exists(&mut self, stamm: &str, activity_id: Uuid) -> PortResult<bool>;

    /// Attaches the activity after the last one and returns its position.
    async fn append_activity(&mut self, meeting_id: Uuid, activity_id: Uuid) -> PortResult<i32>;

    /// Flips the cancelled flag. Returns the new value, or `None` if no row matched.
    async fn toggle_cancelled(&mut self, stamm: &str, meeting_id: Uuid)
        -> PortResult<Option<bool>>;

    /// Returns `false` if no row matched.
    async fn set_cancelled(
        &mut self,
        stamm: &str,
        meeting_id: Uuid,
        cancelled: bool,
    ) -> PortResult<bool>;

    /// Detaches all activities and returns how many were removed.
    async fn clear_activities(&mut self, meeting_id: Uuid) -> PortResult<u64>;

    async fn commit(self: Box<Self>) -> PortResult<()>;

    async fn rollback(self: Box<Self>) -> PortResult<()>;
}
