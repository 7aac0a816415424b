use common::types::Health;
use utoipa::OpenApi;

use crate::errors::ErrorBody;
use crate::routes::subscriptions::{SubscriptionRequest, SubscriptionResponse, SummaryResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::get,
        crate::routes::subscriptions::update,
        crate::routes::subscriptions::delete,
        crate::routes::subscriptions::summary,
    ),
    components(
        schemas(
            Health,
            ErrorBody,
            SubscriptionRequest,
            SubscriptionResponse,
            SummaryResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "subscriptions", description = "Subscription records and cost aggregation")
    )
)]
pub struct ApiDoc;
