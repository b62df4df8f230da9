pub mod domain;
pub mod meetings;
pub mod merge;
pub mod ports;
pub mod schedule;

pub use domain::{
    Activity, ActivityDraft, AuthToken, CancelOutcome, Group, GroupDraft, GroupSchedule,
    Identity, Leader, MeetingActivity, MeetingDraft, MeetingOccurrence, MeetingRef, Member,
    MemberDraft, NewMeeting, Recurrence, StoredMeeting, User, UserCredentials,
};
pub use meetings::MeetingService;
pub use merge::{decode_activities, merge_upcoming};
pub use ports::{DatabaseService, MeetingStore, MeetingTransaction, PortError, PortResult};
pub use schedule::{occurrences, Occurrences, HORIZON};
