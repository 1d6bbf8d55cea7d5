mod common;

use common::World;
use kanau::processor::Processor;
use potluck_core::controllers::events::{FinishEvent, GetEventByCode, JoinEventByCode};
use potluck_core::error::CoordinationError;
use potluck_core::gateway::PersistenceGateway;
use potluck_sdk::objects::Event;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

const CODE: &str = "JOIN42";

/// A weekly event three days from now with `code` as its join code.
async fn upcoming(world: &World, host: Uuid) -> Event {
    let mut event = world.event("Weekly", host);
    event.date = OffsetDateTime::now_utc() + Duration::days(3);
    event.guest_ids = Vec::new();
    event.guest_join_code = CODE.into();
    world.seed_event(event).await
}

fn join(code: &str, member_id: Uuid) -> JoinEventByCode {
    JoinEventByCode {
        join_code: code.into(),
        member_id,
    }
}

#[tokio::test]
async fn joining_adds_guest_once() {
    let mut world = World::new().await;
    let event = upcoming(&world, world.h1).await;

    let joined = world
        .lifecycle()
        .process(join(CODE, world.stranger))
        .await
        .unwrap();
    assert_eq!(joined.id, event.id);
    assert_eq!(joined.guest_ids, vec![world.stranger]);

    let again = world
        .lifecycle()
        .process(join(CODE, world.stranger))
        .await
        .unwrap();
    assert_eq!(again.guest_ids, vec![world.stranger]);

    let stored = world.gateway.fetch_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.guest_ids, vec![world.stranger]);
    world.assert_quiet().await;
}

#[tokio::test]
async fn lookup_names_host_by_household() {
    let world = World::new().await;
    upcoming(&world, world.h1).await;

    let invite = world
        .lifecycle()
        .process(GetEventByCode {
            join_code: CODE.into(),
        })
        .await
        .unwrap();
    assert_eq!(invite.event.guest_join_code, CODE);
    assert_eq!(invite.host_name.as_deref(), Some("Oak house"));
}

#[tokio::test]
async fn lookup_falls_back_to_member_name() {
    let world = World::new().await;
    upcoming(&world, world.h3).await;

    let invite = world
        .lifecycle()
        .process(GetEventByCode {
            join_code: CODE.into(),
        })
        .await
        .unwrap();
    assert_eq!(invite.host_name.as_deref(), Some("Hana"));
}

#[tokio::test]
async fn past_event_refuses_guests() {
    let world = World::new().await;
    let mut event = world.event("", world.h1);
    event.date = OffsetDateTime::now_utc() - Duration::days(2);
    event.guest_join_code = CODE.into();
    world.seed_event(event).await;

    let err = world
        .lifecycle()
        .process(join(CODE, world.h2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::EventFinished));

    let err = world
        .lifecycle()
        .process(GetEventByCode {
            join_code: CODE.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::EventFinished));
}

#[tokio::test]
async fn event_from_earlier_today_still_accepts_guests() {
    let world = World::new().await;
    let mut event = world.event("", world.h1);
    event.date = OffsetDateTime::now_utc() - Duration::hours(3);
    event.guest_join_code = CODE.into();
    world.seed_event(event).await;

    world
        .lifecycle()
        .process(join(CODE, world.h2))
        .await
        .unwrap();
}

#[tokio::test]
async fn next_occurrence_does_not_admit_old_code() {
    let world = World::new().await;
    let event = upcoming(&world, world.h1).await;
    world
        .lifecycle()
        .process(join(CODE, world.stranger))
        .await
        .unwrap();

    let next = world
        .lifecycle()
        .process(FinishEvent {
            event_id: event.id,
            requester_id: world.h1,
        })
        .await
        .unwrap();
    assert!(next.guest_ids.is_empty());
    assert_ne!(next.guest_join_code, CODE);

    // The old code now points at a completed occurrence.
    let err = world
        .lifecycle()
        .process(join(CODE, world.h2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::EventFinished));

    let joined = world
        .lifecycle()
        .process(join(&next.guest_join_code, world.h2))
        .await
        .unwrap();
    assert_eq!(joined.id, next.id);
    assert_eq!(joined.guest_ids, vec![world.h2]);
}

#[tokio::test]
async fn unknown_or_blank_code_is_rejected() {
    let world = World::new().await;
    upcoming(&world, world.h1).await;

    let err = world
        .lifecycle()
        .process(join("NOPE00", world.h2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::NotFound("event")));

    let err = world
        .lifecycle()
        .process(join("", world.h2))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Validation(_)));
}
