#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use potluck_core::controllers::{DishPledges, EventLifecycle, SwapApproval};
use potluck_core::gateway::MemoryGateway;
use potluck_core::hub::{ClientHandle, Hub, HubConfig};
use potluck_sdk::objects::{Dish, Event, EventStatus, Group, Household, Member, Notification};
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

pub const OAK_STREET: &str = "1 Oak Street";
pub const ELM_STREET: &str = "2 Elm Street";

/// Group of three members, sorted `h1 < h2 < h3`, plus an admin outside the
/// rotation. `h1` lives on Oak Street, `h2` on Elm Street, `h3` has no
/// household.
pub struct World {
    pub gateway: Arc<MemoryGateway>,
    pub hub: Hub,
    pub group_id: Uuid,
    pub admin: Uuid,
    pub h1: Uuid,
    pub h2: Uuid,
    pub h3: Uuid,
    pub stranger: Uuid,
    feed: mpsc::Receiver<Bytes>,
    _client: ClientHandle,
    _shutdown: watch::Sender<bool>,
}

impl World {
    pub async fn new() -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let (hub, actor) = Hub::new(HubConfig::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(actor.run(shutdown_rx));

        let (feed_tx, feed) = mpsc::channel(64);
        let client = hub.register(feed_tx);

        let group_id = Uuid::from_u128(0x100);
        let admin = Uuid::from_u128(0xad);
        let h1 = Uuid::from_u128(0x11);
        let h2 = Uuid::from_u128(0x22);
        let h3 = Uuid::from_u128(0x33);
        let stranger = Uuid::from_u128(0x99);
        let oak = Uuid::from_u128(0x1000);
        let elm = Uuid::from_u128(0x2000);

        gateway
            .insert_group(Group {
                id: group_id,
                name: "Thursday Supper Club".into(),
                admin_id: admin,
                join_code: "SUPPER".into(),
            })
            .await;
        gateway
            .insert_household(Household {
                id: oak,
                name: "Oak house".into(),
                address: OAK_STREET.into(),
                member_ids: vec![h1],
            })
            .await;
        gateway
            .insert_household(Household {
                id: elm,
                name: "Elm house".into(),
                address: ELM_STREET.into(),
                member_ids: vec![h2],
            })
            .await;

        // Inserted out of order; the gateway sorts by id.
        for (id, name, household_id, groups) in [
            (h3, "Hana", None, vec![group_id]),
            (h1, "Ada", Some(oak), vec![group_id]),
            (h2, "Bo", Some(elm), vec![group_id]),
            (admin, "Admin", None, vec![]),
            (stranger, "Stranger", None, vec![]),
        ] {
            gateway
                .insert_member(Member {
                    id,
                    name: name.into(),
                    household_id,
                    group_ids: groups,
                })
                .await;
        }

        Self {
            gateway,
            hub,
            group_id,
            admin,
            h1,
            h2,
            h3,
            stranger,
            feed,
            _client: client,
            _shutdown: shutdown_tx,
        }
    }

    pub fn lifecycle(&self) -> EventLifecycle {
        EventLifecycle::new(self.gateway.clone(), self.hub.clone())
    }

    pub fn swaps(&self) -> SwapApproval {
        SwapApproval::new(self.gateway.clone(), self.hub.clone())
    }

    pub fn dishes(&self) -> DishPledges {
        DishPledges::new(self.gateway.clone(), self.hub.clone())
    }

    pub fn event(&self, recurrence: &str, host_id: Uuid) -> Event {
        Event {
            id: Uuid::new_v4(),
            group_id: self.group_id,
            name: "Supper".into(),
            date: sunday(),
            event_type: "Dinner".into(),
            host_id,
            location: String::new(),
            description: String::new(),
            recurrence: recurrence.into(),
            recurrence_id: (!recurrence.is_empty()).then(Uuid::new_v4),
            guest_ids: vec![self.stranger],
            guest_join_code: "OLD111".into(),
            status: EventStatus::Scheduled,
        }
    }

    pub async fn seed_event(&self, event: Event) -> Event {
        self.gateway.insert_event(event.clone()).await;
        event
    }

    pub async fn seed_dish(&self, event_id: Uuid, bringer_id: Option<Uuid>) -> Dish {
        let dish = Dish {
            id: Uuid::new_v4(),
            event_id,
            name: "Lentil soup".into(),
            description: String::new(),
            dietary_tags: vec!["vegan".into()],
            bringer_id,
            is_host_dish: false,
            is_requested: false,
            is_suggested: false,
        };
        self.gateway.insert_dish(dish.clone()).await;
        dish
    }

    /// Next notification delivered to the recording client.
    pub async fn next_notification(&mut self) -> Notification {
        let payload = tokio::time::timeout(Duration::from_secs(1), self.feed.recv())
            .await
            .expect("no notification within a second")
            .expect("recording client closed");
        serde_json::from_slice(&payload).expect("notification is valid json")
    }

    /// Assert nothing else was broadcast.
    pub async fn assert_quiet(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(50), self.feed.recv()).await;
        assert!(next.is_err(), "unexpected notification: {next:?}");
    }
}

pub fn sunday() -> OffsetDateTime {
    datetime!(2025-06-01 18:00 UTC)
}
