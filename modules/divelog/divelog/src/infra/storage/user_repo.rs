use async_trait::async_trait;
use divelog_sdk::UserProfile;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::{
    certification, dive_log, dive_plan, gear_item, gear_kit, gear_kit_item, unit_preferences,
    user,
};
use crate::auth::SessionVersionLookup;
use crate::domain::repo::{UserCredentials, UserRepository};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>> {
        let found = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found.map(Into::into))
    }

    async fn create(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> anyhow::Result<UserCredentials> {
        let model = user::ActiveModel {
            id: Set(profile.id),
            email: Set(profile.email.clone()),
            display_name: Set(profile.display_name.clone()),
            password_hash: Set(password_hash.to_owned()),
            session_version: Set(0),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.created_at),
        }
        .insert(&self.db)
        .await?;
        Ok(model.into())
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
    ) -> anyhow::Result<Option<UserProfile>> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::DisplayName, Expr::value(display_name))
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(OffsetDateTime::now_utc()),
            )
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        let found = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(Into::into))
    }

    async fn change_password(
        &self,
        id: Uuid,
        expected_version: i64,
        password_hash: &str,
    ) -> anyhow::Result<Option<i64>> {
        let txn = self.db.begin().await?;

        let res = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                user::Column::SessionVersion,
                Expr::col(user::Column::SessionVersion).add(1),
            )
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(OffsetDateTime::now_utc()),
            )
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::SessionVersion.eq(expected_version))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let version = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .map(|m| m.session_version);
        txn.commit().await?;
        Ok(version)
    }

    async fn delete_with_owned_data(
        &self,
        id: Uuid,
        expected_version: i64,
    ) -> anyhow::Result<bool> {
        let txn = self.db.begin().await?;

        // Version check and row lock in one statement.
        let claimed = user::Entity::update_many()
            .col_expr(
                user::Column::SessionVersion,
                Expr::col(user::Column::SessionVersion).add(1),
            )
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::SessionVersion.eq(expected_version))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        let kit_ids: Vec<Uuid> = gear_kit::Entity::find()
            .select_only()
            .column(gear_kit::Column::Id)
            .filter(gear_kit::Column::UserId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        if !kit_ids.is_empty() {
            gear_kit_item::Entity::delete_many()
                .filter(gear_kit_item::Column::KitId.is_in(kit_ids))
                .exec(&txn)
                .await?;
        }
        gear_kit::Entity::delete_many()
            .filter(gear_kit::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        gear_item::Entity::delete_many()
            .filter(gear_item::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        certification::Entity::delete_many()
            .filter(certification::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        dive_plan::Entity::delete_many()
            .filter(dive_plan::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        dive_log::Entity::delete_many()
            .filter(dive_log::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        unit_preferences::Entity::delete_by_id(id).exec(&txn).await?;
        let res = user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl SessionVersionLookup for SeaOrmUserRepository {
    async fn current_session_version(&self, user_id: Uuid) -> anyhow::Result<Option<i64>> {
        let version: Option<i64> = user::Entity::find_by_id(user_id)
            .select_only()
            .column(user::Column::SessionVersion)
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(version)
    }
}
