use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use std::sync::Arc;
use ward_calendar_api_structs::*;
use ward_calendar_domain::{OrphanedEventsPolicy, ID};

#[derive(Clone)]
pub struct UnitClient {
    base: Arc<BaseClient>,
}

pub struct CreateUnitInput {
    pub name: String,
    pub timezone: Option<String>,
    pub orphaned_events: Option<OrphanedEventsPolicy>,
}

pub struct UpdateUnitInput {
    pub unit_id: ID,
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub orphaned_events: Option<OrphanedEventsPolicy>,
}

pub struct RefreshUnitInput {
    pub unit_id: ID,
    /// Operator on whose behalf the refresh is requested
    pub actor: String,
    pub reason: Option<String>,
}

pub struct GetOutboxInput {
    pub unit_id: ID,
    pub after: Option<i64>,
    pub limit: Option<usize>,
}

impl GetOutboxInput {
    pub(crate) fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(after) = self.after {
            params.push(format!("after={}", after));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        params.join("&")
    }
}

impl UnitClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateUnitInput) -> APIResponse<create_unit::APIResponse> {
        let body = create_unit::RequestBody {
            name: input.name,
            timezone: input.timezone,
            orphaned_events: input.orphaned_events,
        };
        self.base
            .post(body, "units".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, unit_id: ID) -> APIResponse<get_unit::APIResponse> {
        self.base
            .get(format!("units/{}", unit_id), StatusCode::OK)
            .await
    }

    pub async fn update(&self, input: UpdateUnitInput) -> APIResponse<update_unit::APIResponse> {
        let body = update_unit::RequestBody {
            name: input.name,
            timezone: input.timezone,
            orphaned_events: input.orphaned_events,
        };
        self.base
            .put(body, format!("units/{}", input.unit_id), StatusCode::OK)
            .await
    }

    pub async fn add_feed(
        &self,
        unit_id: ID,
        url: String,
    ) -> APIResponse<add_feed_source::APIResponse> {
        let body = add_feed_source::RequestBody { url };
        self.base
            .post(body, format!("units/{}/feeds", unit_id), StatusCode::CREATED)
            .await
    }

    pub async fn remove_feed(
        &self,
        unit_id: ID,
        feed_source_id: ID,
    ) -> APIResponse<remove_feed_source::APIResponse> {
        self.base
            .delete(
                format!("units/{}/feeds/{}", unit_id, feed_source_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn refresh(&self, input: RefreshUnitInput) -> APIResponse<refresh_unit::APIResponse> {
        let body = refresh_unit::RequestBody {
            reason: input.reason,
        };
        self.base
            .post_as(
                Some(&input.actor),
                body,
                format!("units/{}/refresh", input.unit_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn outbox(&self, input: GetOutboxInput) -> APIResponse<get_outbox::APIResponse> {
        self.base
            .get(
                format!("units/{}/outbox?{}", input.unit_id, input.to_query_string()),
                StatusCode::OK,
            )
            .await
    }

    pub async fn dispatch(&self, unit_id: ID) -> APIResponse<dispatch_outbox::APIResponse> {
        self.base
            .post(
                (),
                format!("units/{}/outbox/dispatch", unit_id),
                StatusCode::OK,
            )
            .await
    }
}
