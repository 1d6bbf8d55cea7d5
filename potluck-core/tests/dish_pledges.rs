mod common;

use common::World;
use kanau::processor::Processor;
use potluck_core::controllers::dishes::{AddDish, DeleteDish, ListDishes, PledgeDish, UnpledgeDish};
use potluck_core::error::CoordinationError;
use potluck_core::gateway::PersistenceGateway;
use potluck_sdk::objects::{DishRef, NewDish, Notification};
use uuid::Uuid;

fn new_dish(event_id: Uuid, name: &str) -> NewDish {
    NewDish {
        event_id,
        name: name.into(),
        description: String::new(),
        dietary_tags: vec![],
        bringer_id: None,
        is_host_dish: false,
        is_requested: true,
        is_suggested: false,
    }
}

#[tokio::test]
async fn pledge_lifecycle_is_broadcast() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("", world.h1)).await;
    let dishes = world.dishes();

    let dish = dishes
        .process(AddDish {
            dish: new_dish(event.id, "Salad"),
        })
        .await
        .unwrap();
    assert_eq!(
        world.next_notification().await,
        Notification::DishAdded(dish.clone())
    );

    let pledged = dishes
        .process(PledgeDish {
            dish_id: dish.id,
            member_id: world.h2,
        })
        .await
        .unwrap();
    assert_eq!(pledged.bringer_id, Some(world.h2));
    match world.next_notification().await {
        Notification::DishPledged(p) => {
            assert_eq!(p.bringer_name, "Bo");
            assert_eq!(p.dish_name, "Salad");
            assert_eq!(p.event_id, event.id);
        }
        other => panic!("expected dish_pledged, got {other:?}"),
    }

    let released = dishes
        .process(UnpledgeDish { dish_id: dish.id })
        .await
        .unwrap();
    assert_eq!(released.bringer_id, None);
    assert!(matches!(
        world.next_notification().await,
        Notification::DishUnpledged(_)
    ));

    dishes
        .process(DeleteDish { dish_id: dish.id })
        .await
        .unwrap();
    assert_eq!(world.gateway.fetch_dish(dish.id).await.unwrap(), None);
    assert_eq!(
        world.next_notification().await,
        Notification::DishDeleted(DishRef {
            dish_id: dish.id,
            event_id: event.id,
        })
    );
}

#[tokio::test]
async fn unknown_bringer_is_someone() {
    let mut world = World::new().await;
    let event = world.seed_event(world.event("", world.h1)).await;
    let dish = world.seed_dish(event.id, None).await;

    world
        .dishes()
        .process(PledgeDish {
            dish_id: dish.id,
            member_id: Uuid::new_v4(),
        })
        .await
        .unwrap();
    match world.next_notification().await {
        Notification::DishPledged(p) => assert_eq!(p.bringer_name, "Someone"),
        other => panic!("expected dish_pledged, got {other:?}"),
    }
}

#[tokio::test]
async fn listing_includes_bringer_names() {
    let world = World::new().await;
    let event = world.seed_event(world.event("", world.h1)).await;
    let pledged = world.seed_dish(event.id, Some(world.h3)).await;
    let open = world.seed_dish(event.id, None).await;

    let views = world
        .dishes()
        .process(ListDishes { event_id: event.id })
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    let by_id = |id: Uuid| views.iter().find(|v| v.dish.id == id).unwrap();
    assert_eq!(by_id(pledged.id).bringer_name.as_deref(), Some("Hana"));
    assert_eq!(by_id(open.id).bringer_name, None);
}

#[tokio::test]
async fn missing_dish_and_event_are_rejected() {
    let mut world = World::new().await;
    let err = world
        .dishes()
        .process(PledgeDish {
            dish_id: Uuid::new_v4(),
            member_id: world.h1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::NotFound("dish")));

    let err = world
        .dishes()
        .process(AddDish {
            dish: new_dish(Uuid::new_v4(), "Bread"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::NotFound("event")));

    let event = world.seed_event(world.event("", world.h1)).await;
    let err = world
        .dishes()
        .process(AddDish {
            dish: new_dish(event.id, "  "),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Validation(_)));
    world.assert_quiet().await;
}
