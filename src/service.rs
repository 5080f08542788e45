use std::sync::Arc;
use tracing::{Span, debug, error, info, warn};
use uuid::Uuid;

use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{
    CreateSubscriptionPayload, NewSubscription, Subscription, SubscriptionSummary, SummaryPayload,
    UpdateSubscriptionPayload,
};
use crate::month_year::MonthYear;
use crate::store::SubscriptionStore;
use crate::utils::{normalize_pagination, parse_uuid, validate_price, validate_service_name};

/// Validates requests, turns wire strings into typed values and drives the store.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    span: Span,
}

fn parse_date_field(value: &str, field_name: &str) -> SubscriptionResult<MonthYear> {
    MonthYear::parse(value)
        .map_err(|_| SubscriptionError::validation(format!("invalid {field_name}: {value:?}")))
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>, span: Span) -> Self {
        info!(parent: &span, component = "subscription_service", "Creating subscription service");
        Self { store, span }
    }

    fn validate_create(&self, payload: CreateSubscriptionPayload) -> SubscriptionResult<NewSubscription> {
        validate_service_name(&payload.service_name)?;
        validate_price(payload.price)?;
        let user_id = parse_uuid(&payload.user_id, "user_id")?;
        let start_date = parse_date_field(&payload.start_date, "start_date")?;
        let end_date = payload
            .end_date
            .as_deref()
            .map(|raw| parse_date_field(raw, "end_date"))
            .transpose()?;

        if end_date.is_some_and(|end| end < start_date) {
            return Err(SubscriptionError::validation(
                "end_date must not be before start_date",
            ));
        }

        Ok(NewSubscription {
            service_name: payload.service_name,
            price: payload.price,
            user_id,
            start_date,
            end_date,
        })
    }

    pub async fn create(&self, payload: CreateSubscriptionPayload) -> SubscriptionResult<Subscription> {
        info!(
            parent: &self.span,
            method = "create",
            service_name = %payload.service_name,
            user_id = %payload.user_id,
            price = payload.price,
            start_date = %payload.start_date,
            "Creating subscription"
        );

        let new = self.validate_create(payload).inspect_err(|e| {
            warn!(parent: &self.span, method = "create", error = %e, "Rejected create request");
        })?;

        let subscription = self.store.create(new).await.inspect_err(|e| {
            error!(parent: &self.span, method = "create", error = %e, "Failed to create subscription");
        })?;

        info!(
            parent: &self.span,
            method = "create",
            id = %subscription.id,
            has_end_date = subscription.end_date.is_some(),
            "Subscription created"
        );
        Ok(subscription)
    }

    pub async fn get(&self, id: &str) -> SubscriptionResult<Subscription> {
        debug!(parent: &self.span, method = "get", id, "Getting subscription");
        let id = self.parse_id(id, "get")?;

        self.store.get_by_id(id).await.inspect_err(|e| {
            if e.is_not_found() {
                warn!(parent: &self.span, method = "get", %id, "Subscription not found");
            } else {
                error!(parent: &self.span, method = "get", %id, error = %e, "Failed to get subscription");
            }
        })
    }

    /// Applies a partial update. Field values are checked where the statement is
    /// built; an id with no row is not an error.
    pub async fn update(&self, id: &str, payload: UpdateSubscriptionPayload) -> SubscriptionResult<()> {
        info!(
            parent: &self.span,
            method = "update",
            id,
            has_service_name = payload.service_name.is_some(),
            has_price = payload.price.is_some(),
            has_end_date = !payload.end_date.is_unchanged(),
            "Updating subscription"
        );
        let id = self.parse_id(id, "update")?;

        let touched = self.store.update(id, &payload).await.inspect_err(|e| {
            error!(parent: &self.span, method = "update", %id, error = %e, "Failed to update subscription");
        })?;

        if touched == 0 {
            warn!(parent: &self.span, method = "update", %id, "Update matched no subscription");
        } else {
            info!(parent: &self.span, method = "update", %id, "Subscription updated");
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> SubscriptionResult<()> {
        info!(parent: &self.span, method = "delete", id, "Deleting subscription");
        let id = self.parse_id(id, "delete")?;

        let removed = self.store.delete(id).await.inspect_err(|e| {
            error!(parent: &self.span, method = "delete", %id, error = %e, "Failed to delete subscription");
        })?;

        if removed == 0 {
            warn!(parent: &self.span, method = "delete", %id, "Delete matched no subscription");
        } else {
            info!(parent: &self.span, method = "delete", %id, "Subscription deleted");
        }
        Ok(())
    }

    pub async fn list(&self, page: i64, limit: i64) -> SubscriptionResult<Vec<Subscription>> {
        let pagination = normalize_pagination(page, limit);
        debug!(
            parent: &self.span,
            method = "list",
            requested_page = page,
            requested_limit = limit,
            page = pagination.page,
            limit = pagination.limit,
            offset = pagination.offset,
            "Listing subscriptions"
        );

        let subscriptions = self
            .store
            .list(pagination.limit, pagination.offset)
            .await
            .inspect_err(|e| {
                error!(parent: &self.span, method = "list", error = %e, "Failed to list subscriptions");
            })?;

        info!(
            parent: &self.span,
            method = "list",
            count = subscriptions.len(),
            page = pagination.page,
            "Subscriptions listed"
        );
        Ok(subscriptions)
    }

    pub async fn summary(&self, request: SummaryPayload) -> SubscriptionResult<SubscriptionSummary> {
        info!(
            parent: &self.span,
            method = "summary",
            start_date = %request.start_date,
            end_date = %request.end_date,
            has_user_id = request.user_id.is_some(),
            has_service_name = request.service_name.is_some(),
            "Calculating subscription summary"
        );

        let total_cost = self.store.get_summary(&request).await.inspect_err(|e| {
            error!(parent: &self.span, method = "summary", error = %e, "Failed to calculate summary");
        })?;

        info!(parent: &self.span, method = "summary", total_cost, "Summary calculated");
        Ok(SubscriptionSummary { total_cost })
    }

    fn parse_id(&self, id: &str, method: &'static str) -> SubscriptionResult<Uuid> {
        parse_uuid(id, "subscription id").inspect_err(|e| {
            warn!(parent: &self.span, method, id, error = %e, "Invalid subscription id");
        })
    }
}
