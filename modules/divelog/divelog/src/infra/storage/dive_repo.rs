use async_trait::async_trait;
use divelog_sdk::DiveLog;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entity::dive_log::{self, Entity as DiveEntity};
use super::mapper::dive_active_model;
use crate::domain::repo::DiveRepository;

pub struct SeaOrmDiveRepository {
    db: DatabaseConnection,
}

impl SeaOrmDiveRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DiveRepository for SeaOrmDiveRepository {
    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<DiveLog>> {
        let rows = DiveEntity::find()
            .filter(dive_log::Column::UserId.eq(owner))
            .order_by_desc(dive_log::Column::DivedAt)
            .order_by_desc(dive_log::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<DiveLog>> {
        let row = DiveEntity::find_by_id(id)
            .filter(dive_log::Column::UserId.eq(owner))
            .one(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, dive: &DiveLog) -> anyhow::Result<()> {
        DiveEntity::insert(dive_active_model(dive))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn replace(&self, dive: &DiveLog) -> anyhow::Result<bool> {
        let res = DiveEntity::update_many()
            .set(dive_active_model(dive))
            .filter(dive_log::Column::Id.eq(dive.id))
            .filter(dive_log::Column::UserId.eq(dive.user_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = DiveEntity::delete_many()
            .filter(dive_log::Column::Id.eq(id))
            .filter(dive_log::Column::UserId.eq(owner))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
