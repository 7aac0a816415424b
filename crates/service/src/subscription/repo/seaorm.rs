use async_trait::async_trait;
use chrono::Utc;
use models::subscription::{self, ActiveModel, Column, Entity};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Statement, Value,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::subscription::domain::{ListFilter, Subscription, SubscriptionFields, SummaryQuery};
use crate::subscription::month::Month;
use crate::subscription::repository::SubscriptionRepository;

// 按月展开区间后与订阅做连接，在库内求和
const SUMMARY_SQL: &str = r#"
WITH months AS (
    SELECT generate_series($1::date, $2::date, interval '1 month')::date AS m
)
SELECT COALESCE(SUM(s.price), 0)::bigint AS total
FROM months
JOIN subscriptions s
  ON s.start_date <= months.m
 AND (s.end_date IS NULL OR s.end_date >= months.m)
WHERE ($3::uuid IS NULL OR s.user_id = $3)
  AND ($4::text IS NULL OR s.service_name = $4)
"#;

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl From<subscription::Model> for Subscription {
    fn from(m: subscription::Model) -> Self {
        Subscription {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: Month::from_date(m.start_date),
            end_date: m.end_date.map(Month::from_date),
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Classify a `DbErr` at the repository boundary.
fn map_db_err(op: &str, e: DbErr) -> ServiceError {
    match e {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => ServiceError::not_found("subscription"),
        other => match other.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ServiceError::Duplicate(detail),
            _ => ServiceError::Internal(format!("repo {op}: {other}")),
        },
    }
}

fn write_model(id: Uuid, fields: &SubscriptionFields) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        service_name: Set(fields.service_name.clone()),
        price: Set(fields.price),
        user_id: Set(fields.user_id),
        start_date: Set(fields.start_date.date()),
        end_date: Set(fields.end_date.map(|m| m.date())),
        created_at: NotSet,
        updated_at: NotSet,
    }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError> {
        // created_at / updated_at 由数据库默认值填充
        let created = write_model(id, fields)
            .insert(&self.db)
            .await
            .map_err(|e| map_db_err("create", e))?;
        Ok(created.into())
    }

    async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| map_db_err("get", e))?
            .map(Subscription::from)
            .ok_or_else(|| ServiceError::not_found("subscription"))
    }

    async fn update(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError> {
        let mut am = write_model(id, fields);
        am.updated_at = Set(Utc::now().into());
        // 无匹配行时 SeaORM 返回 RecordNotUpdated
        let updated = am.update(&self.db).await.map_err(|e| map_db_err("update", e))?;
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let res = Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err("delete", e))?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("subscription"));
        }
        Ok(())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Subscription>, ServiceError> {
        let (limit, offset) = filter.page.normalize();
        let mut query = Entity::find();
        if let Some(uid) = filter.user_id {
            query = query.filter(Column::UserId.eq(uid));
        }
        if let Some(name) = &filter.service_name {
            query = query.filter(Column::ServiceName.eq(name.clone()));
        }
        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(|e| map_db_err("list", e))?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn summary(&self, query: &SummaryQuery) -> Result<i64, ServiceError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SUMMARY_SQL,
            [
                Value::from(query.range.start().date()),
                Value::from(query.range.end().date()),
                Value::from(query.user_id),
                Value::from(query.service_name.clone()),
            ],
        );
        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(|e| map_db_err("summary", e))?;
        match row {
            Some(row) => row
                .try_get::<i64>("", "total")
                .map_err(|e| map_db_err("summary", e)),
            None => Ok(0),
        }
    }
}
