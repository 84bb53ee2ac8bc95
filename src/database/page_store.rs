use crate::entities::page_entity as pages;
use crate::error::AppResult;
use crate::models::{DraftPage, PageData};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Draft persistence keyed by checkout session id
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Insert or replace the draft for `session_id`; `created_at` survives replacement
    async fn upsert(&self, session_id: &str, page: &PageData) -> AppResult<()>;

    async fn find_by_session_id(&self, session_id: &str) -> AppResult<Option<DraftPage>>;
}

#[derive(Clone)]
pub struct DbPageStore {
    pool: DatabaseConnection,
}

impl DbPageStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageStore for DbPageStore {
    async fn upsert(&self, session_id: &str, page: &PageData) -> AppResult<()> {
        let now = Utc::now();
        let row = pages::ActiveModel {
            session_id: Set(session_id.to_string()),
            couple_names: Set(page.couple_names.clone()),
            message: Set(page.message.clone()),
            start_date: Set(page.start_date.clone()),
            theme: Set(page.theme.unwrap_or_default()),
            images: Set(serde_json::to_value(&page.images)?),
            video_url: Set(page.video_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // 同一 session 重复保存时覆盖内容，保留 created_at
        pages::Entity::insert(row)
            .on_conflict(
                OnConflict::column(pages::Column::SessionId)
                    .update_columns([
                        pages::Column::CoupleNames,
                        pages::Column::Message,
                        pages::Column::StartDate,
                        pages::Column::Theme,
                        pages::Column::Images,
                        pages::Column::VideoUrl,
                        pages::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_session_id(&self, session_id: &str) -> AppResult<Option<DraftPage>> {
        let page = pages::Entity::find()
            .filter(pages::Column::SessionId.eq(session_id))
            .one(&self.pool)
            .await?;
        Ok(page.map(DraftPage::from))
    }
}
