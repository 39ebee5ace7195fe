use std::collections::HashMap;

use async_trait::async_trait;
use divelog_sdk::{GearItem, GearKit};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use super::entity::{gear_item, gear_kit, gear_kit_item};
use super::mapper::{self, gear_item_active_model};
use crate::domain::repo::GearRepository;

pub struct SeaOrmGearRepository {
    db: DatabaseConnection,
}

impl SeaOrmGearRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Item ids per kit, in kit order.
    async fn kit_members(&self, kit_ids: Vec<Uuid>) -> anyhow::Result<HashMap<Uuid, Vec<Uuid>>> {
        let rows = gear_kit_item::Entity::find()
            .filter(gear_kit_item::Column::KitId.is_in(kit_ids))
            .order_by_asc(gear_kit_item::Column::KitId)
            .order_by_asc(gear_kit_item::Column::Position)
            .all(&self.db)
            .await?;

        let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            members.entry(row.kit_id).or_default().push(row.item_id);
        }
        Ok(members)
    }
}

async fn insert_members<C: ConnectionTrait>(
    conn: &C,
    kit_id: Uuid,
    item_ids: &[Uuid],
) -> anyhow::Result<()> {
    if item_ids.is_empty() {
        return Ok(());
    }
    let rows = item_ids
        .iter()
        .enumerate()
        .map(|(pos, item_id)| -> anyhow::Result<gear_kit_item::ActiveModel> {
            Ok(gear_kit_item::ActiveModel {
                kit_id: Set(kit_id),
                item_id: Set(*item_id),
                position: Set(i32::try_from(pos)?),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    gear_kit_item::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl GearRepository for SeaOrmGearRepository {
    async fn list_items(&self, owner: Uuid) -> anyhow::Result<Vec<GearItem>> {
        gear_item::Entity::find()
            .filter(gear_item::Column::UserId.eq(owner))
            .order_by_asc(gear_item::Column::Name)
            .order_by_asc(gear_item::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(GearItem::try_from)
            .collect()
    }

    async fn get_item(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<GearItem>> {
        gear_item::Entity::find_by_id(id)
            .filter(gear_item::Column::UserId.eq(owner))
            .one(&self.db)
            .await?
            .map(GearItem::try_from)
            .transpose()
    }

    async fn create_item(&self, item: &GearItem) -> anyhow::Result<()> {
        gear_item::Entity::insert(gear_item_active_model(item))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn replace_item(&self, item: &GearItem) -> anyhow::Result<bool> {
        let res = gear_item::Entity::update_many()
            .set(gear_item_active_model(item))
            .filter(gear_item::Column::Id.eq(item.id))
            .filter(gear_item::Column::UserId.eq(item.user_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_item(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.db.begin().await?;
        let res = gear_item::Entity::delete_many()
            .filter(gear_item::Column::Id.eq(id))
            .filter(gear_item::Column::UserId.eq(owner))
            .exec(&txn)
            .await?;
        if res.rows_affected > 0 {
            gear_kit_item::Entity::delete_many()
                .filter(gear_kit_item::Column::ItemId.eq(id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    async fn owned_item_ids(&self, owner: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
        let owned: Vec<Uuid> = gear_item::Entity::find()
            .select_only()
            .column(gear_item::Column::Id)
            .filter(gear_item::Column::UserId.eq(owner))
            .filter(gear_item::Column::Id.is_in(ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(owned)
    }

    async fn list_kits(&self, owner: Uuid) -> anyhow::Result<Vec<GearKit>> {
        let kits = gear_kit::Entity::find()
            .filter(gear_kit::Column::UserId.eq(owner))
            .order_by_asc(gear_kit::Column::Name)
            .order_by_asc(gear_kit::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let mut members = self
            .kit_members(kits.iter().map(|k| k.id).collect())
            .await?;

        Ok(kits
            .into_iter()
            .map(|kit| {
                let items = members.remove(&kit.id).unwrap_or_default();
                mapper::gear_kit(kit, items)
            })
            .collect())
    }

    async fn get_kit(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<GearKit>> {
        let Some(kit) = gear_kit::Entity::find_by_id(id)
            .filter(gear_kit::Column::UserId.eq(owner))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let items = self
            .kit_members(vec![id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(mapper::gear_kit(kit, items)))
    }

    async fn create_kit(&self, kit: &GearKit) -> anyhow::Result<()> {
        let txn = self.db.begin().await?;
        gear_kit::Entity::insert(gear_kit::ActiveModel {
            id: Set(kit.id),
            user_id: Set(kit.user_id),
            name: Set(kit.name.clone()),
            created_at: Set(kit.created_at),
            updated_at: Set(kit.updated_at),
        })
        .exec(&txn)
        .await?;
        insert_members(&txn, kit.id, &kit.item_ids).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn replace_kit(&self, kit: &GearKit) -> anyhow::Result<bool> {
        let txn = self.db.begin().await?;
        let res = gear_kit::Entity::update_many()
            .col_expr(gear_kit::Column::Name, Expr::value(kit.name.clone()))
            .col_expr(gear_kit::Column::UpdatedAt, Expr::value(kit.updated_at))
            .filter(gear_kit::Column::Id.eq(kit.id))
            .filter(gear_kit::Column::UserId.eq(kit.user_id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        gear_kit_item::Entity::delete_many()
            .filter(gear_kit_item::Column::KitId.eq(kit.id))
            .exec(&txn)
            .await?;
        insert_members(&txn, kit.id, &kit.item_ids).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn delete_kit(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.db.begin().await?;
        let owned = gear_kit::Entity::find_by_id(id)
            .filter(gear_kit::Column::UserId.eq(owner))
            .one(&txn)
            .await?
            .is_some();
        if !owned {
            txn.rollback().await?;
            return Ok(false);
        }

        gear_kit_item::Entity::delete_many()
            .filter(gear_kit_item::Column::KitId.eq(id))
            .exec(&txn)
            .await?;
        gear_kit::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }
}
