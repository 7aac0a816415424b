use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use service::pagination::Pagination;
use service::subscription::{
    format_month, ListFilter, Month, Subscription, SubscriptionInput, SummaryFilter,
};

use crate::errors::{ApiError, ErrorBody};
use crate::routes::ServerState;

/// Create/update request body; absent fields are reported by validation
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    /// Monthly price in whole currency units
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    /// "MM-YYYY"
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// "MM-YYYY"; omit or leave empty for an open-ended subscription
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: format_month(Some(s.start_date)),
            end_date: s.end_date.map(|m| format_month(Some(m))),
            created_at: rfc3339(s.created_at),
            updated_at: rfc3339(s.updated_at),
        }
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Exact owner filter
    pub user_id: Option<String>,
    /// Exact service name filter
    pub service_name: Option<String>,
    /// Page size; values outside 1..=100 fall back to 20
    pub limit: Option<String>,
    /// Rows to skip; negative values become 0
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    /// First month, "MM-YYYY"
    pub start: Option<String>,
    /// Last month (inclusive), "MM-YYYY"
    pub end: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub total: i64,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_user_id(v: Option<String>) -> Result<Option<Uuid>, ApiError> {
    non_blank(v)
        .map(|s| Uuid::parse_str(&s).map_err(|_| ApiError::bad_request("invalid user_id")))
        .transpose()
}

// 非数字的 limit/offset 直接忽略
fn parse_page(limit: Option<String>, offset: Option<String>) -> Pagination {
    let mut page = Pagination::default();
    if let Some(n) = non_blank(limit).and_then(|v| v.parse::<i64>().ok()) {
        page.limit = n;
    }
    if let Some(n) = non_blank(offset).and_then(|v| v.parse::<i64>().ok()) {
        page.offset = n;
    }
    page
}

fn body(payload: Result<Json<SubscriptionRequest>, JsonRejection>) -> Result<SubscriptionInput, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("invalid json"))?;
    Ok(SubscriptionInput {
        service_name: req.service_name,
        price: req.price,
        user_id: req.user_id,
        start_date: req.start_date,
        end_date: req.end_date,
    })
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::bad_request("invalid id"))
}

/// 创建订阅
#[utoipa::path(
    post, path = "/subscriptions", tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, body = SubscriptionResponse),
        (status = 400, body = ErrorBody),
        (status = 409, body = ErrorBody)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let input = body(payload)?;
    let created = state.subscriptions.create(input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// 列出订阅（按创建时间倒序）
#[utoipa::path(
    get, path = "/subscriptions", tag = "subscriptions",
    params(ListParams),
    responses(
        (status = 200, body = [SubscriptionResponse]),
        (status = 400, body = ErrorBody)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let filter = ListFilter {
        user_id: parse_user_id(params.user_id)?,
        service_name: non_blank(params.service_name),
        page: parse_page(params.limit, params.offset),
    };
    let rows = state.subscriptions.list(filter).await?;
    Ok(Json(rows.into_iter().map(SubscriptionResponse::from).collect()))
}

/// 获取指定订阅
#[utoipa::path(
    get, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, body = SubscriptionResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = path_id(path)?;
    let found = state.subscriptions.get(id).await?;
    Ok(Json(found.into()))
}

/// 全量更新指定订阅
#[utoipa::path(
    put, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, body = SubscriptionResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = path_id(path)?;
    let input = body(payload)?;
    let updated = state.subscriptions.update(id, input).await?;
    Ok(Json(updated.into()))
}

/// 删除指定订阅
#[utoipa::path(
    delete, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = path_id(path)?;
    state.subscriptions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 统计区间内的订阅总费用（按月累加，起止月份均包含）
#[utoipa::path(
    get, path = "/subscriptions/summary", tag = "subscriptions",
    params(SummaryParams),
    responses(
        (status = 200, body = SummaryResponse),
        (status = 400, body = ErrorBody)
    )
)]
pub async fn summary(
    State(state): State<ServerState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let (start, end) = match (non_blank(params.start), non_blank(params.end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ApiError::bad_request("start and end are required")),
    };
    let filter = SummaryFilter {
        user_id: parse_user_id(params.user_id)?,
        service_name: non_blank(params.service_name),
        start: Some(Month::parse(&start)?),
        end: Some(Month::parse(&end)?),
    };
    let total = state.subscriptions.summary(filter).await?;
    Ok(Json(SummaryResponse { total }))
}
