use async_trait::async_trait;
use divelog_sdk::UnitPreferencesPatch;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, sea_query::OnConflict};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::unit_preferences::{self, Entity as PreferencesEntity};
use super::mapper::preferences_patch;
use crate::domain::repo::PreferencesRepository;

pub struct SeaOrmPreferencesRepository {
    db: DatabaseConnection,
}

impl SeaOrmPreferencesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferencesRepository for SeaOrmPreferencesRepository {
    async fn find(&self, owner: Uuid) -> anyhow::Result<Option<UnitPreferencesPatch>> {
        let row = PreferencesEntity::find_by_id(owner).one(&self.db).await?;
        Ok(row.as_ref().map(preferences_patch))
    }

    async fn upsert(&self, owner: Uuid, patch: UnitPreferencesPatch) -> anyhow::Result<()> {
        let mut update_columns = vec![unit_preferences::Column::UpdatedAt];
        let mut axis = |value: Option<&'static str>, column| {
            if value.is_some() {
                update_columns.push(column);
            }
            ActiveValue::Set(value.map(str::to_owned))
        };

        let model = unit_preferences::ActiveModel {
            user_id: ActiveValue::Set(owner),
            depth: axis(
                patch.depth.map(|u| u.as_str()),
                unit_preferences::Column::Depth,
            ),
            temperature: axis(
                patch.temperature.map(|u| u.as_str()),
                unit_preferences::Column::Temperature,
            ),
            pressure: axis(
                patch.pressure.map(|u| u.as_str()),
                unit_preferences::Column::Pressure,
            ),
            weight: axis(
                patch.weight.map(|u| u.as_str()),
                unit_preferences::Column::Weight,
            ),
            updated_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };

        PreferencesEntity::insert(model)
            .on_conflict(
                OnConflict::column(unit_preferences::Column::UserId)
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
