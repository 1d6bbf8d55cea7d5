mod common;

use common::{ELM_STREET, OAK_STREET, World, sunday};
use kanau::processor::Processor;
use potluck_core::controllers::events::{FinishEvent, GetEventStats, SkipEvent};
use potluck_core::error::CoordinationError;
use potluck_core::gateway::{Operation, PersistenceGateway};
use potluck_sdk::objects::{EventRef, EventStatus, Notification};
use time::Duration;
use time::macros::datetime;
use uuid::Uuid;

#[tokio::test]
async fn weekly_finish_schedules_next_occurrence_with_next_host() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h1)).await;

    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.h1,
        })
        .await
        .unwrap();

    assert_ne!(next.id, event.id);
    assert_eq!(next.date, sunday() + Duration::days(7));
    assert_eq!(next.host_id, world.h2);
    assert!(next.guest_ids.is_empty());
    assert_eq!(next.guest_join_code.len(), 6);
    assert_eq!(next.status, EventStatus::Scheduled);
    assert_eq!(next.recurrence_id, event.recurrence_id);
    assert_eq!(next.recurrence, "Weekly");
    // Blank location picks up the new host's address.
    assert_eq!(next.location, ELM_STREET);

    let events = world.gateway.events().await;
    assert_eq!(events.len(), 2);
    let old = world.gateway.fetch_event(event.id).await.unwrap().unwrap();
    assert_eq!(old.status, EventStatus::Completed);
    assert_eq!(old.host_id, world.h1);
    assert_eq!(
        world.gateway.fetch_event(next.id).await.unwrap(),
        Some(next.clone())
    );

    assert_eq!(
        world.next_notification().await,
        Notification::EventCreated(next)
    );
    assert_eq!(
        world.next_notification().await,
        Notification::EventDeleted(EventRef {
            event_id: event.id,
            group_id: world.group_id,
        })
    );
    world.assert_quiet().await;
}

#[tokio::test]
async fn rotation_wraps_after_last_member() {
    let world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h3)).await;

    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.admin,
        })
        .await
        .unwrap();
    assert_eq!(next.host_id, world.h1);
    assert_eq!(next.location, OAK_STREET);
}

#[tokio::test]
async fn departed_host_rotates_to_first_member() {
    let world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.stranger)).await;

    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.admin,
        })
        .await
        .unwrap();
    assert_eq!(next.host_id, world.h1);
}

#[tokio::test]
async fn finish_offsets_follow_recurrence_label() {
    let world = World::new().await;
    let cases = [
        ("Daily", sunday() + Duration::days(1)),
        ("Weekly", sunday() + Duration::days(7)),
        ("Bi-Weekly", sunday() + Duration::days(14)),
        ("Monthly", datetime!(2025-07-01 18:00 UTC)),
        ("Quarterly", sunday()),
    ];

    for (label, expected) in cases {
        let event = world.seed_event(world.event(label, world.h1)).await;
        let next = world
            .lifecycle()
            .process(FinishEvent {
                event_id: event.id,
                requester_id: world.admin,
            })
            .await
            .unwrap();
        assert_eq!(next.date, expected, "recurrence {label}");
    }
}

#[tokio::test]
async fn custom_location_survives_rotation() {
    let world = World::new().await;

    let mut custom = world.event("Weekly", world.h1);
    custom.location = "Community hall".into();
    let custom = world.seed_event(custom).await;
    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: custom.id,
            requester_id: world.h1,
        })
        .await
        .unwrap();
    assert_eq!(next.location, "Community hall");

    let mut at_home = world.event("Weekly", world.h1);
    at_home.location = OAK_STREET.into();
    let at_home = world.seed_event(at_home).await;
    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: at_home.id,
            requester_id: world.h1,
        })
        .await
        .unwrap();
    assert_eq!(next.location, ELM_STREET);
}

#[tokio::test]
async fn new_host_without_household_keeps_location() {
    let world = World::new().await;
    let mut event = world.event("Weekly", world.h2);
    event.location = ELM_STREET.into();
    let event = world.seed_event(event).await;

    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.h2,
        })
        .await
        .unwrap();
    assert_eq!(next.host_id, world.h3);
    assert_eq!(next.location, ELM_STREET);
}

#[tokio::test]
async fn failed_completion_leaves_new_occurrence_in_place() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h1)).await;
    world.gateway.fail_on(Operation::UpdateEvent).await;

    let err = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.h1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Persistence(_)));

    let events = world.gateway.events().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.status == EventStatus::Scheduled));

    match world.next_notification().await {
        Notification::EventCreated(created) => assert_ne!(created.id, event.id),
        other => panic!("expected event_created, got {other:?}"),
    }
    world.assert_quiet().await;
}

#[tokio::test]
async fn failed_creation_writes_nothing() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h1)).await;
    world.gateway.fail_on(Operation::CreateEvent).await;

    let err = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.h1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Persistence(_)));
    assert_eq!(world.gateway.events().await, vec![event]);
    world.assert_quiet().await;
}

#[tokio::test]
async fn skip_moves_date_in_place() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Bi-Weekly", world.h1)).await;

    let skipped = world
        .lifecycle()
        .process(SkipEvent {
            event_id: event.id,
            requester_id: world.h1,
        })
        .await
        .unwrap();

    let mut expected = event.clone();
    expected.date = sunday() + Duration::days(14);
    assert_eq!(skipped, expected);
    assert_eq!(world.gateway.events().await, vec![expected.clone()]);
    assert_eq!(
        world.next_notification().await,
        Notification::EventUpdated(expected)
    );
    world.assert_quiet().await;
}

#[tokio::test]
async fn skip_ignores_non_weekly_cadence() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Monthly", world.h1)).await;
    // A write would fail; none is attempted.
    world.gateway.fail_on(Operation::UpdateEvent).await;

    let skipped = world
        .lifecycle()
        .process(SkipEvent {
            event_id: event.id,
            requester_id: world.admin,
        })
        .await
        .unwrap();
    assert_eq!(skipped, event);
    assert_eq!(world.gateway.events().await, vec![event.clone()]);
    assert_eq!(
        world.next_notification().await,
        Notification::EventUpdated(event)
    );
}

#[tokio::test]
async fn skip_requires_role() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h1)).await;

    let err = world
        .lifecycle()
        .process(SkipEvent {
            event_id: event.id,
            requester_id: world.h2,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Unauthorized));
    world.assert_quiet().await;
}

#[tokio::test]
async fn stats_count_completed_occurrences_per_host() {
    let world = World::new().await;
    let current = world.seed_event(world.event("Weekly", world.h3)).await;
    let series = current.recurrence_id;
    let ghost = Uuid::from_u128(0xdead);

    for host in [world.h1, world.h2, world.h1, ghost] {
        let mut past = world.event("Weekly", host);
        past.recurrence_id = series;
        past.status = EventStatus::Completed;
        world.seed_event(past).await;
    }
    // Other series and scheduled occurrences are not counted.
    let mut other = world.event("Weekly", world.h2);
    other.status = EventStatus::Completed;
    world.seed_event(other).await;

    let stats = world
        .lifecycle()
        .process(GetEventStats {
            event_id: current.id,
        })
        .await
        .unwrap();

    assert_eq!(stats.total_occurrences, 4);
    assert_eq!(stats.host_counts.len(), 3);
    assert_eq!(stats.host_counts[0].member_id, world.h1);
    assert_eq!(stats.host_counts[0].member_name, "Ada");
    assert_eq!(stats.host_counts[0].count, 2);
    assert!(stats.host_counts[1..].iter().all(|s| s.count == 1));
    let unknown = stats
        .host_counts
        .iter()
        .find(|s| s.member_id == ghost)
        .unwrap();
    assert_eq!(unknown.member_name, "Unknown");
}

#[tokio::test]
async fn stats_of_one_off_event_are_empty() {
    let world = World::new().await;
    let event = world.seed_event(world.event("", world.h1)).await;
    let stats = world
        .lifecycle()
        .process(GetEventStats { event_id: event.id })
        .await
        .unwrap();
    assert_eq!(stats.total_occurrences, 0);
    assert!(stats.host_counts.is_empty());
}

#[tokio::test]
async fn completed_occurrence_cannot_be_finished_again() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("Weekly", world.h1)).await;
    let finish = FinishEvent {
        event_id: event.id,
        requester_id: world.h1,
    };

    world.lifecycle().process(finish).await.unwrap();
    world.next_notification().await;
    world.next_notification().await;

    let err = world.lifecycle().process(finish).await.unwrap_err();
    assert!(matches!(err, CoordinationError::Validation(_)));

    let events = world.gateway.events().await;
    assert_eq!(events.len(), 2);
    assert_eq!(
        events
            .iter()
            .filter(|e| e.status == EventStatus::Scheduled)
            .count(),
        1
    );
    world.assert_quiet().await;
}
