use crate::db::connect;
use crate::subscription;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::db_available;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn month(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).expect("valid month")
}

/// Test subscription insert / read / update / delete at the entity level
#[tokio::test]
async fn test_subscription_crud() -> Result<()> {
    if !db_available() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    let created = subscription::ActiveModel {
        id: Set(id),
        service_name: Set("Yandex Plus".into()),
        price: Set(400),
        user_id: Set(Uuid::new_v4()),
        start_date: Set(month(2025, 7)),
        end_date: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    assert_eq!(created.id, id);
    assert_eq!(created.end_date, None);

    let found = subscription::Entity::find_by_id(id).one(&db).await?;
    assert_eq!(found.as_ref().map(|m| m.price), Some(400));

    let mut am: subscription::ActiveModel = created.into();
    am.end_date = Set(Some(month(2025, 12)));
    let updated = am.update(&db).await?;
    assert_eq!(updated.end_date, Some(month(2025, 12)));

    let res = subscription::Entity::delete_by_id(id).exec(&db).await?;
    assert_eq!(res.rows_affected, 1);
    assert!(subscription::Entity::find_by_id(id).one(&db).await?.is_none());
    Ok(())
}

/// The table-level check rejects a non-positive price even if the service layer is bypassed
#[tokio::test]
async fn test_price_check_constraint() -> Result<()> {
    if !db_available() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let now = Utc::now();
    let res = subscription::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_name: Set("Netflix".into()),
        price: Set(0),
        user_id: Set(Uuid::new_v4()),
        start_date: Set(month(2025, 1)),
        end_date: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await;
    assert!(res.is_err());
    Ok(())
}
