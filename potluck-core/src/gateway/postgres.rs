//! PostgreSQL gateway.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database. The schema lives in `migrations/`.

use async_trait::async_trait;
use potluck_sdk::objects::{Dish, Event, Group, Household, Member, SwapRequest};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{DishPatch, EventPatch, GatewayError, PersistenceGateway, SwapPatch};

pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    date: OffsetDateTime,
    event_type: String,
    host_id: Uuid,
    location: String,
    description: String,
    recurrence: String,
    recurrence_id: Option<Uuid>,
    guest_ids: Vec<Uuid>,
    guest_join_code: String,
    status: String,
}

impl TryFrom<EventRow> for Event {
    type Error = GatewayError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            date: row.date,
            event_type: row.event_type,
            host_id: row.host_id,
            location: row.location,
            description: row.description,
            recurrence: row.recurrence,
            recurrence_id: row.recurrence_id,
            guest_ids: row.guest_ids,
            guest_join_code: row.guest_join_code,
            status: row.status.parse()?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SwapRow {
    id: Uuid,
    event_id: Uuid,
    dish_id: Option<Uuid>,
    swap_type: String,
    requesting_member_id: Uuid,
    target_member_id: Option<Uuid>,
    status: String,
    created_at: OffsetDateTime,
}

impl TryFrom<SwapRow> for SwapRequest {
    type Error = GatewayError;

    fn try_from(row: SwapRow) -> Result<Self, Self::Error> {
        Ok(SwapRequest {
            id: row.id,
            event_id: row.event_id,
            dish_id: row.dish_id,
            swap_type: row.swap_type.parse()?,
            requesting_member_id: row.requesting_member_id,
            target_member_id: row.target_member_id,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    description: String,
    dietary_tags: Vec<String>,
    bringer_id: Option<Uuid>,
    is_host_dish: bool,
    is_requested: bool,
    is_suggested: bool,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Dish {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            description: row.description,
            dietary_tags: row.dietary_tags,
            bringer_id: row.bringer_id,
            is_host_dish: row.is_host_dish,
            is_requested: row.is_requested,
            is_suggested: row.is_suggested,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    name: String,
    household_id: Option<Uuid>,
    group_ids: Vec<Uuid>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            name: row.name,
            household_id: row.household_id,
            group_ids: row.group_ids,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HouseholdRow {
    id: Uuid,
    name: String,
    address: String,
    member_ids: Vec<Uuid>,
}

impl From<HouseholdRow> for Household {
    fn from(row: HouseholdRow) -> Self {
        Household {
            id: row.id,
            name: row.name,
            address: row.address,
            member_ids: row.member_ids,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    admin_id: Uuid,
    join_code: String,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            name: row.name,
            admin_id: row.admin_id,
            join_code: row.join_code,
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PersistenceGateway for PgGateway {
    #[tracing::instrument(skip_all, err, name = "SQL:FetchEvent")]
    async fn fetch_event(&self, id: Uuid) -> Result<Option<Event>, GatewayError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, group_id, name, date, event_type, host_id, location, description,
                   recurrence, recurrence_id, guest_ids, guest_join_code, status
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:CreateEvent")]
    async fn create_event(&self, event: &Event) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, group_id, name, date, event_type, host_id, location,
                                description, recurrence, recurrence_id, guest_ids,
                                guest_join_code, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(event.id)
        .bind(event.group_id)
        .bind(&event.name)
        .bind(event.date)
        .bind(&event.event_type)
        .bind(event.host_id)
        .bind(&event.location)
        .bind(&event.description)
        .bind(&event.recurrence)
        .bind(event.recurrence_id)
        .bind(&event.guest_ids)
        .bind(&event.guest_join_code)
        .bind(event.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:UpdateEvent")]
    async fn update_event(
        &self,
        id: Uuid,
        patch: &EventPatch,
    ) -> Result<Option<Event>, GatewayError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET host_id = COALESCE($2, host_id),
                date = COALESCE($3, date),
                location = COALESCE($4, location),
                description = COALESCE($5, description),
                status = COALESCE($6, status)
            WHERE id = $1
            RETURNING id, group_id, name, date, event_type, host_id, location, description,
                      recurrence, recurrence_id, guest_ids, guest_join_code, status
            "#,
        )
        .bind(id)
        .bind(patch.host_id)
        .bind(patch.date)
        .bind(patch.location.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:DeleteEvent")]
    async fn delete_event(&self, id: Uuid) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchCompletedEventsBySeries")]
    async fn fetch_completed_events_by_series(
        &self,
        recurrence_id: Uuid,
    ) -> Result<Vec<Event>, GatewayError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, group_id, name, date, event_type, host_id, location, description,
                   recurrence, recurrence_id, guest_ids, guest_join_code, status
            FROM events
            WHERE recurrence_id = $1 AND status = 'completed'
            "#,
        )
        .bind(recurrence_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Event::try_from).collect()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchEventByJoinCode")]
    async fn fetch_event_by_join_code(&self, code: &str) -> Result<Option<Event>, GatewayError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, group_id, name, date, event_type, host_id, location, description,
                   recurrence, recurrence_id, guest_ids, guest_join_code, status
            FROM events
            WHERE guest_join_code = $1
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:AddGuest")]
    async fn add_guest(
        &self,
        event_id: Uuid,
        guest_id: Uuid,
    ) -> Result<Option<Event>, GatewayError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET guest_ids = CASE
                    WHEN $2 = ANY(guest_ids) THEN guest_ids
                    ELSE array_append(guest_ids, $2)
                END
            WHERE id = $1
            RETURNING id, group_id, name, date, event_type, host_id, location, description,
                      recurrence, recurrence_id, guest_ids, guest_join_code, status
            "#,
        )
        .bind(event_id)
        .bind(guest_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchGroup")]
    async fn fetch_group(&self, id: Uuid) -> Result<Option<Group>, GatewayError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, name, admin_id, join_code FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Group::from))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchMember")]
    async fn fetch_member(&self, id: Uuid) -> Result<Option<Member>, GatewayError> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT id, name, household_id, group_ids FROM members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Member::from))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchMembersByGroup")]
    async fn fetch_members_by_group(&self, group_id: Uuid) -> Result<Vec<Member>, GatewayError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, name, household_id, group_ids
            FROM members
            WHERE $1 = ANY(group_ids)
            ORDER BY id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchHousehold")]
    async fn fetch_household(&self, id: Uuid) -> Result<Option<Household>, GatewayError> {
        let row = sqlx::query_as::<_, HouseholdRow>(
            "SELECT id, name, address, member_ids FROM households WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Household::from))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:CreateSwapRequest")]
    async fn create_swap_request(&self, swap: &SwapRequest) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO swap_requests (id, event_id, dish_id, swap_type, requesting_member_id,
                                       target_member_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(swap.id)
        .bind(swap.event_id)
        .bind(swap.dish_id)
        .bind(swap.swap_type.as_str())
        .bind(swap.requesting_member_id)
        .bind(swap.target_member_id)
        .bind(swap.status.as_str())
        .bind(swap.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchSwapRequest")]
    async fn fetch_swap_request(&self, id: Uuid) -> Result<Option<SwapRequest>, GatewayError> {
        let row = sqlx::query_as::<_, SwapRow>(
            r#"
            SELECT id, event_id, dish_id, swap_type, requesting_member_id, target_member_id,
                   status, created_at
            FROM swap_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SwapRequest::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:UpdateSwapRequest")]
    async fn update_swap_request(
        &self,
        id: Uuid,
        patch: &SwapPatch,
    ) -> Result<Option<SwapRequest>, GatewayError> {
        let row = sqlx::query_as::<_, SwapRow>(
            r#"
            UPDATE swap_requests
            SET status = $2,
                target_member_id = COALESCE($3, target_member_id)
            WHERE id = $1
            RETURNING id, event_id, dish_id, swap_type, requesting_member_id, target_member_id,
                      status, created_at
            "#,
        )
        .bind(id)
        .bind(patch.status.as_str())
        .bind(patch.target_member_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SwapRequest::try_from).transpose()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ListSwapRequestsByEvent")]
    async fn list_swap_requests_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<SwapRequest>, GatewayError> {
        let rows = sqlx::query_as::<_, SwapRow>(
            r#"
            SELECT id, event_id, dish_id, swap_type, requesting_member_id, target_member_id,
                   status, created_at
            FROM swap_requests
            WHERE event_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SwapRequest::try_from).collect()
    }

    #[tracing::instrument(skip_all, err, name = "SQL:CreateDish")]
    async fn create_dish(&self, dish: &Dish) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO dishes (id, event_id, name, description, dietary_tags, bringer_id,
                                is_host_dish, is_requested, is_suggested)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(dish.id)
        .bind(dish.event_id)
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(&dish.dietary_tags)
        .bind(dish.bringer_id)
        .bind(dish.is_host_dish)
        .bind(dish.is_requested)
        .bind(dish.is_suggested)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FetchDish")]
    async fn fetch_dish(&self, id: Uuid) -> Result<Option<Dish>, GatewayError> {
        let row = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, event_id, name, description, dietary_tags, bringer_id,
                   is_host_dish, is_requested, is_suggested
            FROM dishes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Dish::from))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:UpdateDish")]
    async fn update_dish(&self, id: Uuid, patch: &DishPatch) -> Result<Option<Dish>, GatewayError> {
        let row = sqlx::query_as::<_, DishRow>(
            r#"
            UPDATE dishes
            SET bringer_id = $2
            WHERE id = $1
            RETURNING id, event_id, name, description, dietary_tags, bringer_id,
                      is_host_dish, is_requested, is_suggested
            "#,
        )
        .bind(id)
        .bind(patch.bringer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Dish::from))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:DeleteDish")]
    async fn delete_dish(&self, id: Uuid) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ListDishesByEvent")]
    async fn list_dishes_by_event(&self, event_id: Uuid) -> Result<Vec<Dish>, GatewayError> {
        let rows = sqlx::query_as::<_, DishRow>(
            r#"
            SELECT id, event_id, name, description, dietary_tags, bringer_id,
                   is_host_dish, is_requested, is_suggested
            FROM dishes
            WHERE event_id = $1
            ORDER BY name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Dish::from).collect())
    }
}
