use async_trait::async_trait;
use divelog_sdk::DivePlan;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entity::dive_plan::{self, Entity as PlanEntity};
use super::mapper::plan_active_model;
use crate::domain::repo::PlanRepository;

pub struct SeaOrmPlanRepository {
    db: DatabaseConnection,
}

impl SeaOrmPlanRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanRepository for SeaOrmPlanRepository {
    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<DivePlan>> {
        let rows = PlanEntity::find()
            .filter(dive_plan::Column::UserId.eq(owner))
            .order_by_asc(dive_plan::Column::PlannedAt)
            .order_by_asc(dive_plan::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<DivePlan>> {
        let row = PlanEntity::find_by_id(id)
            .filter(dive_plan::Column::UserId.eq(owner))
            .one(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, plan: &DivePlan) -> anyhow::Result<()> {
        PlanEntity::insert(plan_active_model(plan))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn replace(&self, plan: &DivePlan) -> anyhow::Result<bool> {
        let res = PlanEntity::update_many()
            .set(plan_active_model(plan))
            .filter(dive_plan::Column::Id.eq(plan.id))
            .filter(dive_plan::Column::UserId.eq(plan.user_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = PlanEntity::delete_many()
            .filter(dive_plan::Column::Id.eq(id))
            .filter(dive_plan::Column::UserId.eq(owner))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
