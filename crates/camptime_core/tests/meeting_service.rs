mod common;

use camptime_core::domain::{MeetingDraft, MeetingRef};
use camptime_core::ports::PortError;
use camptime_core::{MeetingService, HORIZON};
use chrono::{NaiveDate, NaiveTime};
use common::{Faults, InMemoryStore};
use std::sync::Arc;
use uuid::Uuid;

const STAMM: &str = "Stamm Greif";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// 2026-10-19 is a Monday, 2026-10-20 the following Tuesday.
fn monday() -> NaiveDate {
    date(2026, 10, 19)
}

fn tuesday() -> NaiveDate {
    date(2026, 10, 20)
}

fn setup() -> (InMemoryStore, MeetingService, Uuid) {
    let store = InMemoryStore::new();
    let group_id = store.add_group(STAMM, "Wölflinge", Some(2), "17:30");
    let service = MeetingService::new(Arc::new(store.clone()));
    (store, service, group_id)
}

#[tokio::test]
async fn upcoming_lists_calculated_meetings() {
    let (_store, service, group_id) = setup();

    let upcoming = service.upcoming(STAMM, monday()).await.unwrap();

    assert_eq!(upcoming.len(), HORIZON);
    assert_eq!(upcoming[0].date, tuesday());
    assert_eq!(upcoming[0].time, NaiveTime::from_hms_opt(17, 30, 0));
    assert_eq!(upcoming[0].group_id, group_id);
    assert!(upcoming.iter().all(|m| m.is_calculated));
}

#[tokio::test]
async fn upcoming_is_scoped_to_the_stamm() {
    let (store, service, _) = setup();
    store.add_group("Stamm Falke", "Pfadis", Some(3), "18:00");

    let upcoming = service.upcoming(STAMM, monday()).await.unwrap();
    assert!(upcoming.iter().all(|m| m.group_name == "Wölflinge"));
}

#[tokio::test]
async fn cancelling_a_calculated_meeting_stores_it_cancelled() {
    let (store, service, group_id) = setup();
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };

    let outcome = service.toggle_cancelled(STAMM, virtual_ref).await.unwrap();
    assert!(outcome.is_cancelled);

    let rows = store.meetings_for(group_id, tuesday());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, outcome.meeting_id);
    assert!(rows[0].is_cancelled);
    assert_eq!(rows[0].title, "Wölflinge Gruppenstunde");

    let upcoming = service.upcoming(STAMM, monday()).await.unwrap();
    let on_tuesday: Vec<_> = upcoming.iter().filter(|m| m.date == tuesday()).collect();
    assert_eq!(on_tuesday.len(), 1);
    assert_eq!(on_tuesday[0].id, MeetingRef::Persisted(outcome.meeting_id));
    assert!(on_tuesday[0].is_cancelled);
    assert!(!on_tuesday[0].is_calculated);
}

#[tokio::test]
async fn cancelling_a_stored_meeting_toggles() {
    let (_store, service, group_id) = setup();
    let first = service
        .toggle_cancelled(STAMM, MeetingRef::Virtual { group_id, date: tuesday() })
        .await
        .unwrap();
    let stored = MeetingRef::Persisted(first.meeting_id);

    let second = service.toggle_cancelled(STAMM, stored).await.unwrap();
    assert!(!second.is_cancelled);
    let third = service.toggle_cancelled(STAMM, stored).await.unwrap();
    assert!(third.is_cancelled);
    assert_eq!(third.meeting_id, first.meeting_id);
}

#[tokio::test]
async fn cancelling_an_unknown_meeting_is_not_found() {
    let (_store, service, _) = setup();
    let err = service
        .toggle_cancelled(STAMM, MeetingRef::Persisted(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn cancelling_a_stale_virtual_ref_cancels_the_stored_row() {
    let (store, service, group_id) = setup();
    let activity = store.add_activity(STAMM, "Knoten", 30);
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };
    let meeting_id = service.add_activity(STAMM, virtual_ref, activity).await.unwrap();

    let outcome = service.toggle_cancelled(STAMM, virtual_ref).await.unwrap();
    assert_eq!(outcome.meeting_id, meeting_id);
    assert!(outcome.is_cancelled);
    assert_eq!(store.meetings_for(group_id, tuesday()).len(), 1);
}

#[tokio::test]
async fn adding_an_activity_materializes_once() {
    let (store, service, group_id) = setup();
    let knots = store.add_activity(STAMM, "Knoten", 30);
    let fire = store.add_activity(STAMM, "Lagerfeuer", 45);
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };

    let first = service.add_activity(STAMM, virtual_ref, knots).await.unwrap();
    let second = service.add_activity(STAMM, virtual_ref, fire).await.unwrap();

    assert_eq!(first, second);
    let rows = store.meetings_for(group_id, tuesday());
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_cancelled);
    assert_eq!(rows[0].time, NaiveTime::from_hms_opt(17, 30, 0));

    let upcoming = service.upcoming(STAMM, monday()).await.unwrap();
    let meeting = upcoming.iter().find(|m| m.date == tuesday()).unwrap();
    let names: Vec<_> = meeting.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Knoten", "Lagerfeuer"]);
}

#[tokio::test]
async fn activities_append_after_the_last_position() {
    let (store, service, group_id) = setup();
    let activities: Vec<_> = ["Knoten", "Karte", "Kompass"]
        .iter()
        .map(|name| store.add_activity(STAMM, name, 20))
        .collect();
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };

    let meeting_id = service
        .add_activity(STAMM, virtual_ref, activities[0])
        .await
        .unwrap();
    let stored = MeetingRef::Persisted(meeting_id);
    service.add_activity(STAMM, stored, activities[1]).await.unwrap();
    service.add_activity(STAMM, stored, activities[2]).await.unwrap();

    let positions: Vec<_> = store
        .links_of(meeting_id)
        .iter()
        .map(|l| (l.activity_id, l.order_index))
        .collect();
    assert_eq!(
        positions,
        vec![(activities[0], 0), (activities[1], 1), (activities[2], 2)]
    );
}

#[tokio::test]
async fn the_same_activity_can_be_attached_twice() {
    let (store, service, group_id) = setup();
    let knots = store.add_activity(STAMM, "Knoten", 30);
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };

    let meeting_id = service.add_activity(STAMM, virtual_ref, knots).await.unwrap();
    service
        .add_activity(STAMM, MeetingRef::Persisted(meeting_id), knots)
        .await
        .unwrap();

    let orders: Vec<_> = store.links_of(meeting_id).iter().map(|l| l.order_index).collect();
    assert_eq!(orders, vec![0, 1]);
}

#[tokio::test]
async fn concurrent_materialization_reuses_the_rival_row() {
    let (store, service, group_id) = setup();
    let knots = store.add_activity(STAMM, "Knoten", 30);
    store.set_faults(Faults {
        race_insert: true,
        ..Faults::default()
    });

    let meeting_id = service
        .add_activity(STAMM, MeetingRef::Virtual { group_id, date: tuesday() }, knots)
        .await
        .unwrap();

    let rows = store.meetings_for(group_id, tuesday());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, meeting_id);
    assert_eq!(store.links_of(meeting_id).len(), 1);
}

#[tokio::test]
async fn failed_attach_leaves_no_meeting_behind() {
    let (store, service, group_id) = setup();
    let knots = store.add_activity(STAMM, "Knoten", 30);
    store.set_faults(Faults {
        fail_append: true,
        ..Faults::default()
    });

    let err = service
        .add_activity(STAMM, MeetingRef::Virtual { group_id, date: tuesday() }, knots)
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::Transaction(_)));
    assert!(store.meetings_for(group_id, tuesday()).is_empty());
    assert!(store.snapshot().links.is_empty());
}

#[tokio::test]
async fn activities_of_another_stamm_are_not_found() {
    let (store, service, group_id) = setup();
    let foreign = store.add_activity("Stamm Falke", "Knoten", 30);

    let err = service
        .add_activity(STAMM, MeetingRef::Virtual { group_id, date: tuesday() }, foreign)
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::NotFound(_)));
    assert!(store.meetings_for(group_id, tuesday()).is_empty());
}

#[tokio::test]
async fn groups_of_another_stamm_are_not_found() {
    let (store, service, _) = setup();
    let foreign_group = store.add_group("Stamm Falke", "Pfadis", Some(2), "18:00");

    let err = service
        .toggle_cancelled(
            "Stamm Greif",
            MeetingRef::Virtual {
                group_id: foreign_group,
                date: tuesday(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::NotFound(_)));
    assert!(store.meetings_for(foreign_group, tuesday()).is_empty());
}

#[tokio::test]
async fn clearing_activities_detaches_all() {
    let (store, service, group_id) = setup();
    let knots = store.add_activity(STAMM, "Knoten", 30);
    let fire = store.add_activity(STAMM, "Lagerfeuer", 45);
    let virtual_ref = MeetingRef::Virtual {
        group_id,
        date: tuesday(),
    };
    let meeting_id = service.add_activity(STAMM, virtual_ref, knots).await.unwrap();
    service.add_activity(STAMM, virtual_ref, fire).await.unwrap();

    let removed = service
        .clear_activities(STAMM, MeetingRef::Persisted(meeting_id))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(store.links_of(meeting_id).is_empty());

    let again = service
        .clear_activities(STAMM, MeetingRef::Persisted(meeting_id))
        .await
        .unwrap();
    assert_eq!(again, 0);

    // The meeting itself stays stored.
    assert_eq!(store.meetings_for(group_id, tuesday()).len(), 1);
}

#[tokio::test]
async fn clearing_a_calculated_meeting_is_a_no_op() {
    let (store, service, group_id) = setup();
    let removed = service
        .clear_activities(STAMM, MeetingRef::Virtual { group_id, date: tuesday() })
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert!(store.snapshot().meetings.is_empty());
}

#[tokio::test]
async fn clearing_an_unknown_meeting_is_not_found() {
    let (_store, service, _) = setup();
    let err = service
        .clear_activities(STAMM, MeetingRef::Persisted(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn creating_a_meeting_uses_group_defaults() {
    let (store, service, group_id) = setup();
    let friday = date(2026, 10, 23);

    let meeting_id = service
        .create_meeting(
            STAMM,
            &MeetingDraft {
                group_id,
                date: friday,
                time: None,
                title: None,
            },
        )
        .await
        .unwrap();

    let rows = store.meetings_for(group_id, friday);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, meeting_id);
    assert_eq!(rows[0].title, "Wölflinge Gruppenstunde");
    assert_eq!(rows[0].time, NaiveTime::from_hms_opt(17, 30, 0));

    let upcoming = service.upcoming(STAMM, monday()).await.unwrap();
    assert!(upcoming
        .iter()
        .any(|m| m.id == MeetingRef::Persisted(meeting_id) && m.date == friday));
}

#[tokio::test]
async fn creating_a_second_meeting_on_the_same_day_conflicts() {
    let (_store, service, group_id) = setup();
    let draft = MeetingDraft {
        group_id,
        date: tuesday(),
        time: NaiveTime::from_hms_opt(10, 0, 0),
        title: Some("Ausflug".to_string()),
    };

    service.create_meeting(STAMM, &draft).await.unwrap();
    let err = service.create_meeting(STAMM, &draft).await.unwrap_err();
    assert!(matches!(err, PortError::Conflict(_)));
}
