pub mod db;
pub mod meeting_store;

pub use db::DbAdapter;
pub use meeting_store::PgMeetingTransaction;
