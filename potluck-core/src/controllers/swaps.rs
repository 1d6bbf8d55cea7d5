//! Swap Approval controller.
//!
//! A swap request hands either the hosting of an event or the pledge of a
//! dish to another member. Approving it applies exactly one downstream
//! change, chosen by the request type.

use std::sync::Arc;

use kanau::processor::Processor;
use potluck_sdk::objects::{
    Dish, DishPledged, HostSwapEventUpdates, NewSwapRequest, Notification, SwapRequest,
    SwapRequestView, SwapStatus, SwapStatusUpdate, SwapType,
};
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{household_address, member_name};
use crate::error::CoordinationError;
use crate::gateway::{DishPatch, EventPatch, PersistenceGateway, SwapPatch};
use crate::hub::Hub;
use crate::utils::rotation::carry_over_location;

const UNKNOWN_BRINGER_NAME: &str = "Someone";

pub struct SwapApproval {
    gateway: Arc<dyn PersistenceGateway>,
    hub: Hub,
}

/// Downstream change of an approved swap, resolved before anything is
/// written.
enum Handover {
    Host { event_id: Uuid, patch: EventPatch },
    Dish { dish: Dish, bringer_id: Uuid },
}

impl SwapApproval {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, hub: Hub) -> Self {
        Self { gateway, hub }
    }

    async fn plan_host_handover(
        &self,
        swap: &SwapRequest,
        target: Option<Uuid>,
        updates: Option<&HostSwapEventUpdates>,
    ) -> Result<Handover, CoordinationError> {
        let event = self
            .gateway
            .fetch_event(swap.event_id)
            .await?
            .ok_or(CoordinationError::NotFound("event"))?;

        // An approval without a target clears the host.
        let new_host = target.unwrap_or_else(|| {
            warn!(swap_id = %swap.id, "Host swap approved without a target member");
            Uuid::nil()
        });

        let old_address = household_address(self.gateway.as_ref(), event.host_id).await?;
        let new_address = household_address(self.gateway.as_ref(), new_host).await?;
        let mut location = carry_over_location(&event.location, &old_address, &new_address);

        let supplied = updates.and_then(|u| u.location.as_deref()).unwrap_or("");
        if !supplied.is_empty() && supplied != old_address {
            location = Some(supplied.to_string());
        }

        Ok(Handover::Host {
            event_id: event.id,
            patch: EventPatch {
                host_id: Some(new_host),
                date: updates.and_then(|u| u.date),
                location,
                ..Default::default()
            },
        })
    }

    async fn plan_dish_handover(
        &self,
        swap: &SwapRequest,
        target: Option<Uuid>,
    ) -> Result<Handover, CoordinationError> {
        let dish_id = swap
            .dish_id
            .ok_or_else(|| CoordinationError::validation("dish swap has no dish_id"))?;
        let dish = self
            .gateway
            .fetch_dish(dish_id)
            .await?
            .ok_or(CoordinationError::NotFound("dish"))?;
        let bringer_id = next_bringer(&dish, swap.requesting_member_id, target);
        Ok(Handover::Dish { dish, bringer_id })
    }

    async fn apply_handover(&self, handover: Handover) -> Result<(), CoordinationError> {
        match handover {
            Handover::Host { event_id, patch } => {
                let event = self
                    .gateway
                    .update_event(event_id, &patch)
                    .await?
                    .ok_or(CoordinationError::NotFound("event"))?;
                info!(event_id = %event.id, host_id = %event.host_id, "Host handed over");
                self.hub.notify(&Notification::EventUpdated(event))?;
            }
            Handover::Dish { dish, bringer_id } => {
                self.gateway
                    .update_dish(
                        dish.id,
                        &DishPatch {
                            bringer_id: Some(bringer_id),
                        },
                    )
                    .await?
                    .ok_or(CoordinationError::NotFound("dish"))?;
                let bringer_name = member_name(self.gateway.as_ref(), bringer_id)
                    .await?
                    .unwrap_or_else(|| UNKNOWN_BRINGER_NAME.to_string());
                info!(dish_id = %dish.id, bringer_id = %bringer_id, "Dish handed over");
                self.hub.notify(&Notification::DishPledged(DishPledged {
                    dish_id: dish.id,
                    event_id: dish.event_id,
                    bringer_id,
                    bringer_name,
                    dish_name: dish.name,
                }))?;
            }
        }
        Ok(())
    }
}

/// New bringer of a dish after a dish swap is approved.
///
/// The request carries no direction. When the requester currently brings the
/// dish it is an offer and the target takes it over, or the requester keeps
/// it if there is no target. Otherwise it is a claim and the requester takes
/// the dish.
pub fn next_bringer(dish: &Dish, requester: Uuid, target: Option<Uuid>) -> Uuid {
    if dish.bringer_id == Some(requester) {
        target.unwrap_or(requester)
    } else {
        requester
    }
}

#[derive(Debug, Clone)]
pub struct CreateSwapRequest {
    pub request: NewSwapRequest,
}

impl Processor<CreateSwapRequest> for SwapApproval {
    type Output = SwapRequest;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "CreateSwapRequest")]
    async fn process(&self, cmd: CreateSwapRequest) -> Result<SwapRequest, CoordinationError> {
        let NewSwapRequest {
            event_id,
            dish_id,
            swap_type,
            requesting_member_id,
            target_member_id,
            status: _,
        } = cmd.request;

        if swap_type == SwapType::Dish && dish_id.is_none() {
            return Err(CoordinationError::validation("dish swap requires a dish_id"));
        }
        if self.gateway.fetch_event(event_id).await?.is_none() {
            return Err(CoordinationError::NotFound("event"));
        }

        let swap = SwapRequest {
            id: Uuid::new_v4(),
            event_id,
            dish_id,
            swap_type,
            requesting_member_id,
            target_member_id,
            status: SwapStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        self.gateway.create_swap_request(&swap).await?;
        info!(swap_id = %swap.id, swap_type = swap.swap_type.as_str(), "Swap request created");
        self.hub.notify(&Notification::SwapCreated(swap.clone()))?;
        Ok(swap)
    }
}

/// Resolve a pending swap request. Approval applies the handover; the
/// response is the request as stored afterwards.
#[derive(Debug, Clone)]
pub struct UpdateSwapRequest {
    pub swap_id: Uuid,
    pub update: SwapStatusUpdate,
}

impl Processor<UpdateSwapRequest> for SwapApproval {
    type Output = SwapRequest;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "UpdateSwapRequest", fields(swap_id = %cmd.swap_id))]
    async fn process(&self, cmd: UpdateSwapRequest) -> Result<SwapRequest, CoordinationError> {
        let UpdateSwapRequest { swap_id, update } = cmd;
        let swap = self
            .gateway
            .fetch_swap_request(swap_id)
            .await?
            .ok_or(CoordinationError::NotFound("swap request"))?;

        if swap.status != SwapStatus::Pending {
            return Err(CoordinationError::validation(format!(
                "swap request is already {}",
                swap.status.as_str()
            )));
        }
        if update.status == SwapStatus::Pending {
            return Err(CoordinationError::validation(
                "status must be approved or rejected",
            ));
        }

        let target = update.target_member_id.or(swap.target_member_id);
        let handover = if update.status == SwapStatus::Approved {
            Some(match swap.swap_type {
                SwapType::Host => {
                    self.plan_host_handover(&swap, target, update.event_updates.as_ref())
                        .await?
                }
                SwapType::Dish => self.plan_dish_handover(&swap, target).await?,
            })
        } else {
            None
        };

        let swap = self
            .gateway
            .update_swap_request(
                swap_id,
                &SwapPatch {
                    status: update.status,
                    target_member_id: update.target_member_id,
                },
            )
            .await?
            .ok_or(CoordinationError::NotFound("swap request"))?;

        let applied = match handover {
            Some(handover) => self.apply_handover(handover).await,
            None => Ok(()),
        };
        if let Err(e) = applied {
            error!(error = %e, "Swap resolved but its handover failed");
            self.hub.notify(&Notification::SwapUpdated(swap))?;
            return Err(e);
        }

        self.hub.notify(&Notification::SwapUpdated(swap.clone()))?;
        Ok(swap)
    }
}

/// Swap requests of an event with member names filled in.
#[derive(Debug, Clone, Copy)]
pub struct GetSwapRequests {
    pub event_id: Uuid,
}

impl Processor<GetSwapRequests> for SwapApproval {
    type Output = Vec<SwapRequestView>;
    type Error = CoordinationError;
    #[tracing::instrument(skip_all, err, name = "GetSwapRequests")]
    async fn process(
        &self,
        query: GetSwapRequests,
    ) -> Result<Vec<SwapRequestView>, CoordinationError> {
        let requests = self
            .gateway
            .list_swap_requests_by_event(query.event_id)
            .await?;

        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let requesting_member_name =
                member_name(self.gateway.as_ref(), request.requesting_member_id).await?;
            let target_member_name = match request.target_member_id {
                Some(id) => member_name(self.gateway.as_ref(), id).await?,
                None => None,
            };
            views.push(SwapRequestView {
                request,
                requesting_member_name,
                target_member_name,
            });
        }
        Ok(views)
    }
}
