use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::ClientError;
use crate::objects::{
    Dish, DishView, Event, EventInvite, EventStats, EventUpdate, JoinEvent, NewDish, NewEvent,
    NewSwapRequest, PledgeDish, SwapRequest, SwapRequestView, SwapStatusUpdate,
};

/// Typed HTTP client for the coordination API.
///
/// Caller identity is passed explicitly (`admin_id`, `user_id`); the server
/// does not authenticate it.
#[derive(Debug, Clone)]
pub struct CoordinationClient {
    http: Client,
    base_url: Url,
}

impl CoordinationClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    // -- Events -------------------------------------------------------------

    /// `POST /events`
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, ClientError> {
        let url = self.base_url.join("/events")?;
        let resp = self.http.post(url).json(event).send().await?;
        parse_response(resp).await
    }

    /// `PATCH /events/{id}`
    pub async fn update_event(
        &self,
        event_id: Uuid,
        update: &EventUpdate,
    ) -> Result<Event, ClientError> {
        let url = self.base_url.join(&format!("/events/{event_id}"))?;
        let resp = self.http.patch(url).json(update).send().await?;
        parse_response(resp).await
    }

    /// `DELETE /events/{id}?user_id=`
    pub async fn delete_event(&self, event_id: Uuid, user_id: Uuid) -> Result<(), ClientError> {
        let mut url = self.base_url.join(&format!("/events/{event_id}"))?;
        url.query_pairs_mut()
            .append_pair("user_id", &user_id.to_string());
        let resp = self.http.delete(url).send().await?;
        expect_success(resp).await
    }

    /// `POST /events/{id}/finish?admin_id=` – returns the next occurrence.
    pub async fn finish_event(&self, event_id: Uuid, admin_id: Uuid) -> Result<Event, ClientError> {
        let mut url = self.base_url.join(&format!("/events/{event_id}/finish"))?;
        url.query_pairs_mut()
            .append_pair("admin_id", &admin_id.to_string());
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/{id}/skip?admin_id=` – returns the moved event.
    pub async fn skip_event(&self, event_id: Uuid, admin_id: Uuid) -> Result<Event, ClientError> {
        let mut url = self.base_url.join(&format!("/events/{event_id}/skip"))?;
        url.query_pairs_mut()
            .append_pair("admin_id", &admin_id.to_string());
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/stats/{id}`
    pub async fn event_stats(&self, event_id: Uuid) -> Result<EventStats, ClientError> {
        let url = self.base_url.join(&format!("/events/stats/{event_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/code/{code}`
    pub async fn event_by_code(&self, code: &str) -> Result<EventInvite, ClientError> {
        let url = self.base_url.join(&format!("/events/code/{code}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/join-by-code` – adds `member_id` to the guest list.
    pub async fn join_event(&self, member_id: Uuid, join_code: &str) -> Result<Event, ClientError> {
        let url = self.base_url.join("/events/join-by-code")?;
        let body = JoinEvent {
            member_id,
            join_code: join_code.to_string(),
        };
        let resp = self.http.post(url).json(&body).send().await?;
        parse_response(resp).await
    }

    // -- Swaps --------------------------------------------------------------

    /// `POST /swaps`
    pub async fn create_swap(&self, swap: &NewSwapRequest) -> Result<SwapRequest, ClientError> {
        let url = self.base_url.join("/swaps")?;
        let resp = self.http.post(url).json(swap).send().await?;
        parse_response(resp).await
    }

    /// `PATCH /swaps/{id}`
    pub async fn update_swap(
        &self,
        swap_id: Uuid,
        update: &SwapStatusUpdate,
    ) -> Result<SwapRequest, ClientError> {
        let url = self.base_url.join(&format!("/swaps/{swap_id}"))?;
        let resp = self.http.patch(url).json(update).send().await?;
        parse_response(resp).await
    }

    /// `GET /swaps?event_id=`
    pub async fn list_swaps(&self, event_id: Uuid) -> Result<Vec<SwapRequestView>, ClientError> {
        let mut url = self.base_url.join("/swaps")?;
        url.query_pairs_mut()
            .append_pair("event_id", &event_id.to_string());
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    // -- Dishes -------------------------------------------------------------

    /// `POST /dishes`
    pub async fn add_dish(&self, dish: &NewDish) -> Result<Dish, ClientError> {
        let url = self.base_url.join("/dishes")?;
        let resp = self.http.post(url).json(dish).send().await?;
        parse_response(resp).await
    }

    /// `GET /dishes?event_id=`
    pub async fn list_dishes(&self, event_id: Uuid) -> Result<Vec<DishView>, ClientError> {
        let mut url = self.base_url.join("/dishes")?;
        url.query_pairs_mut()
            .append_pair("event_id", &event_id.to_string());
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /dishes/{id}/pledge`
    pub async fn pledge_dish(&self, dish_id: Uuid, member_id: Uuid) -> Result<Dish, ClientError> {
        let url = self.base_url.join(&format!("/dishes/{dish_id}/pledge"))?;
        let resp = self
            .http
            .post(url)
            .json(&PledgeDish { member_id })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /dishes/{id}/unpledge`
    pub async fn unpledge_dish(&self, dish_id: Uuid) -> Result<Dish, ClientError> {
        let url = self.base_url.join(&format!("/dishes/{dish_id}/unpledge"))?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `DELETE /dishes/{id}`
    pub async fn delete_dish(&self, dish_id: Uuid) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!("/dishes/{dish_id}"))?;
        let resp = self.http.delete(url).send().await?;
        expect_success(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

async fn expect_success(resp: reqwest::Response) -> Result<(), ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(())
}
