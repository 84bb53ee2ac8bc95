use crate::entities::discount_code_entity as dc;
use crate::error::AppResult;
use crate::models::{DiscountCode, NewDiscountCode};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[async_trait]
pub trait DiscountStore: Send + Sync {
    /// Exact, case-sensitive lookup; redeemability is left to the caller
    async fn find_by_code(&self, code: &str) -> AppResult<Option<DiscountCode>>;

    async fn insert(&self, code: NewDiscountCode) -> AppResult<DiscountCode>;
}

#[derive(Clone)]
pub struct DbDiscountStore {
    pool: DatabaseConnection,
}

impl DbDiscountStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscountStore for DbDiscountStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<DiscountCode>> {
        let found = dc::Entity::find()
            .filter(dc::Column::Code.eq(code))
            .one(&self.pool)
            .await?;
        Ok(found.map(DiscountCode::from))
    }

    async fn insert(&self, code: NewDiscountCode) -> AppResult<DiscountCode> {
        let inserted = dc::ActiveModel {
            code: Set(code.code),
            percent_off: Set(i16::from(code.percent_off)),
            active: Set(true),
            expires_at: Set(code.expires_at),
            stripe_coupon_id: Set(code.stripe_coupon_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(DiscountCode::from(inserted))
    }
}
