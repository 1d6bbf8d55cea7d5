//! Dish Pledge controller.

use std::collections::HashMap;
use std::sync::Arc;

use kanau::processor::Processor;
use potluck_sdk::objects::{
    Dish, DishPledged, DishRef, DishUnpledged, DishView, NewDish, Notification,
};
use tracing::info;
use uuid::Uuid;

use super::member_name;
use crate::error::CoordinationError;
use crate::gateway::{DishPatch, PersistenceGateway};
use crate::hub::Hub;

const UNKNOWN_BRINGER_NAME: &str = "Someone";

pub struct DishPledges {
    gateway: Arc<dyn PersistenceGateway>,
    hub: Hub,
}

impl DishPledges {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, hub: Hub) -> Self {
        Self { gateway, hub }
    }

    async fn fetch_dish(&self, dish_id: Uuid) -> Result<Dish, CoordinationError> {
        self.gateway
            .fetch_dish(dish_id)
            .await?
            .ok_or(CoordinationError::NotFound("dish"))
    }

    async fn set_bringer(
        &self,
        dish_id: Uuid,
        bringer_id: Option<Uuid>,
    ) -> Result<Dish, CoordinationError> {
        self.gateway
            .update_dish(dish_id, &DishPatch { bringer_id })
            .await?
            .ok_or(CoordinationError::NotFound("dish"))
    }
}

#[derive(Debug, Clone)]
pub struct AddDish {
    pub dish: NewDish,
}

impl Processor<AddDish> for DishPledges {
    type Output = Dish;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "AddDish")]
    async fn process(&self, cmd: AddDish) -> Result<Dish, CoordinationError> {
        let NewDish {
            event_id,
            name,
            description,
            dietary_tags,
            bringer_id,
            is_host_dish,
            is_requested,
            is_suggested,
        } = cmd.dish;
        if name.trim().is_empty() {
            return Err(CoordinationError::validation("dish name is required"));
        }
        if self.gateway.fetch_event(event_id).await?.is_none() {
            return Err(CoordinationError::NotFound("event"));
        }

        let dish = Dish {
            id: Uuid::new_v4(),
            event_id,
            name,
            description,
            dietary_tags,
            bringer_id,
            is_host_dish,
            is_requested,
            is_suggested,
        };
        self.gateway.create_dish(&dish).await?;
        info!(dish_id = %dish.id, event_id = %dish.event_id, "Dish added");
        self.hub.notify(&Notification::DishAdded(dish.clone()))?;
        Ok(dish)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListDishes {
    pub event_id: Uuid,
}

impl Processor<ListDishes> for DishPledges {
    type Output = Vec<DishView>;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "ListDishes")]
    async fn process(&self, query: ListDishes) -> Result<Vec<DishView>, CoordinationError> {
        let dishes = self.gateway.list_dishes_by_event(query.event_id).await?;

        let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(dishes.len());
        for dish in dishes {
            let bringer_name = match dish.bringer_id {
                Some(id) => match names.get(&id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = member_name(self.gateway.as_ref(), id).await?;
                        names.insert(id, name.clone());
                        name
                    }
                },
                None => None,
            };
            views.push(DishView { dish, bringer_name });
        }
        Ok(views)
    }
}

/// Make `member_id` the bringer of a dish, replacing any previous pledge.
#[derive(Debug, Clone, Copy)]
pub struct PledgeDish {
    pub dish_id: Uuid,
    pub member_id: Uuid,
}

impl Processor<PledgeDish> for DishPledges {
    type Output = Dish;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "PledgeDish", fields(dish_id = %cmd.dish_id))]
    async fn process(&self, cmd: PledgeDish) -> Result<Dish, CoordinationError> {
        let dish = self.set_bringer(cmd.dish_id, Some(cmd.member_id)).await?;
        let bringer_name = member_name(self.gateway.as_ref(), cmd.member_id)
            .await?
            .unwrap_or_else(|| UNKNOWN_BRINGER_NAME.to_string());

        self.hub.notify(&Notification::DishPledged(DishPledged {
            dish_id: dish.id,
            event_id: dish.event_id,
            bringer_id: cmd.member_id,
            bringer_name,
            dish_name: dish.name.clone(),
        }))?;
        Ok(dish)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnpledgeDish {
    pub dish_id: Uuid,
}

impl Processor<UnpledgeDish> for DishPledges {
    type Output = Dish;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "UnpledgeDish", fields(dish_id = %cmd.dish_id))]
    async fn process(&self, cmd: UnpledgeDish) -> Result<Dish, CoordinationError> {
        let dish = self.set_bringer(cmd.dish_id, None).await?;

        self.hub.notify(&Notification::DishUnpledged(DishUnpledged {
            dish_id: dish.id,
            event_id: dish.event_id,
            dish_name: dish.name.clone(),
        }))?;
        Ok(dish)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteDish {
    pub dish_id: Uuid,
}

impl Processor<DeleteDish> for DishPledges {
    type Output = ();
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "DeleteDish", fields(dish_id = %cmd.dish_id))]
    async fn process(&self, cmd: DeleteDish) -> Result<(), CoordinationError> {
        let dish = self.fetch_dish(cmd.dish_id).await?;
        if !self.gateway.delete_dish(dish.id).await? {
            return Err(CoordinationError::NotFound("dish"));
        }
        info!(dish_id = %dish.id, "Dish deleted");
        self.hub.notify(&Notification::DishDeleted(DishRef {
            dish_id: dish.id,
            event_id: dish.event_id,
        }))?;
        Ok(())
    }
}
