//! In-process gateway backed by hash maps.
//!
//! Used by the server's `--memory` mode and by the test suites. Writes can be
//! made to fail on demand with [`MemoryGateway::fail_on`] to exercise the
//! partial-completion paths of the controllers.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use potluck_sdk::objects::{Dish, Event, EventStatus, Group, Household, Member, SwapRequest};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DishPatch, EventPatch, GatewayError, PersistenceGateway, SwapPatch};

/// Write operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    AddGuest,
    CreateSwapRequest,
    UpdateSwapRequest,
    CreateDish,
    UpdateDish,
    DeleteDish,
}

#[derive(Default)]
struct Store {
    events: HashMap<Uuid, Event>,
    groups: HashMap<Uuid, Group>,
    members: HashMap<Uuid, Member>,
    households: HashMap<Uuid, Household>,
    swaps: HashMap<Uuid, SwapRequest>,
    dishes: HashMap<Uuid, Dish>,
    failing: HashSet<Operation>,
}

impl Store {
    fn check(&self, op: Operation) -> Result<(), GatewayError> {
        if self.failing.contains(&op) {
            return Err(GatewayError::Unavailable(format!("{op:?} rejected")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryGateway {
    store: RwLock<Store>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Seeding ------------------------------------------------------------

    pub async fn insert_group(&self, group: Group) {
        self.store.write().await.groups.insert(group.id, group);
    }

    pub async fn insert_member(&self, member: Member) {
        self.store.write().await.members.insert(member.id, member);
    }

    pub async fn insert_household(&self, household: Household) {
        self.store
            .write()
            .await
            .households
            .insert(household.id, household);
    }

    pub async fn insert_event(&self, event: Event) {
        self.store.write().await.events.insert(event.id, event);
    }

    pub async fn insert_dish(&self, dish: Dish) {
        self.store.write().await.dishes.insert(dish.id, dish);
    }

    pub async fn insert_swap_request(&self, swap: SwapRequest) {
        self.store.write().await.swaps.insert(swap.id, swap);
    }

    // -- Inspection ---------------------------------------------------------

    /// Every stored event, in no particular order.
    pub async fn events(&self) -> Vec<Event> {
        self.store.read().await.events.values().cloned().collect()
    }

    /// Make every later call of `op` fail with [`GatewayError::Unavailable`].
    pub async fn fail_on(&self, op: Operation) {
        self.store.write().await.failing.insert(op);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>, GatewayError> {
        Ok(self.store.read().await.events.get(&id).cloned())
    }

    async fn create_event(&self, event: &Event) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::CreateEvent)?;
        store.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(
        &self,
        id: Uuid,
        patch: &EventPatch,
    ) -> Result<Option<Event>, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::UpdateEvent)?;
        Ok(store.events.get_mut(&id).map(|event| {
            patch.apply_to(event);
            event.clone()
        }))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::DeleteEvent)?;
        Ok(store.events.remove(&id).is_some())
    }

    async fn fetch_completed_events_by_series(
        &self,
        recurrence_id: Uuid,
    ) -> Result<Vec<Event>, GatewayError> {
        Ok(self
            .store
            .read()
            .await
            .events
            .values()
            .filter(|e| e.recurrence_id == Some(recurrence_id))
            .filter(|e| e.status == EventStatus::Completed)
            .cloned()
            .collect())
    }

    async fn fetch_event_by_join_code(&self, code: &str) -> Result<Option<Event>, GatewayError> {
        Ok(self
            .store
            .read()
            .await
            .events
            .values()
            .filter(|e| e.guest_join_code == code)
            .max_by_key(|e| e.date)
            .cloned())
    }

    async fn add_guest(
        &self,
        event_id: Uuid,
        guest_id: Uuid,
    ) -> Result<Option<Event>, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::AddGuest)?;
        Ok(store.events.get_mut(&event_id).map(|event| {
            if !event.guest_ids.contains(&guest_id) {
                event.guest_ids.push(guest_id);
            }
            event.clone()
        }))
    }

    async fn fetch_group(&self, id: Uuid) -> Result<Option<Group>, GatewayError> {
        Ok(self.store.read().await.groups.get(&id).cloned())
    }

    async fn fetch_member(&self, id: Uuid) -> Result<Option<Member>, GatewayError> {
        Ok(self.store.read().await.members.get(&id).cloned())
    }

    async fn fetch_members_by_group(&self, group_id: Uuid) -> Result<Vec<Member>, GatewayError> {
        let mut members: Vec<Member> = self
            .store
            .read()
            .await
            .members
            .values()
            .filter(|m| m.group_ids.contains(&group_id))
            .cloned()
            .collect();
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    async fn fetch_household(&self, id: Uuid) -> Result<Option<Household>, GatewayError> {
        Ok(self.store.read().await.households.get(&id).cloned())
    }

    async fn create_swap_request(&self, swap: &SwapRequest) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::CreateSwapRequest)?;
        store.swaps.insert(swap.id, swap.clone());
        Ok(())
    }

    async fn fetch_swap_request(&self, id: Uuid) -> Result<Option<SwapRequest>, GatewayError> {
        Ok(self.store.read().await.swaps.get(&id).cloned())
    }

    async fn update_swap_request(
        &self,
        id: Uuid,
        patch: &SwapPatch,
    ) -> Result<Option<SwapRequest>, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::UpdateSwapRequest)?;
        Ok(store.swaps.get_mut(&id).map(|swap| {
            patch.apply_to(swap);
            swap.clone()
        }))
    }

    async fn list_swap_requests_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<SwapRequest>, GatewayError> {
        let mut swaps: Vec<SwapRequest> = self
            .store
            .read()
            .await
            .swaps
            .values()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        swaps.sort_by_key(|s| s.created_at);
        Ok(swaps)
    }

    async fn create_dish(&self, dish: &Dish) -> Result<(), GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::CreateDish)?;
        store.dishes.insert(dish.id, dish.clone());
        Ok(())
    }

    async fn fetch_dish(&self, id: Uuid) -> Result<Option<Dish>, GatewayError> {
        Ok(self.store.read().await.dishes.get(&id).cloned())
    }

    async fn update_dish(&self, id: Uuid, patch: &DishPatch) -> Result<Option<Dish>, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::UpdateDish)?;
        Ok(store.dishes.get_mut(&id).map(|dish| {
            patch.apply_to(dish);
            dish.clone()
        }))
    }

    async fn delete_dish(&self, id: Uuid) -> Result<bool, GatewayError> {
        let mut store = self.store.write().await;
        store.check(Operation::DeleteDish)?;
        Ok(store.dishes.remove(&id).is_some())
    }

    async fn list_dishes_by_event(&self, event_id: Uuid) -> Result<Vec<Dish>, GatewayError> {
        let mut dishes: Vec<Dish> = self
            .store
            .read()
            .await
            .dishes
            .values()
            .filter(|d| d.event_id == event_id)
            .cloned()
            .collect();
        dishes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dishes)
    }
}
