use anyhow::Context;
use async_trait::async_trait;
use divelog_sdk::{Certification, CertificationDefinition};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use super::entity::{certification, certification_definition};
use super::mapper::{self, certification_active_model};
use crate::domain::repo::CertificationRepository;

pub struct SeaOrmCertificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmCertificationRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CertificationRepository for SeaOrmCertificationRepository {
    async fn list_definitions(&self) -> anyhow::Result<Vec<CertificationDefinition>> {
        certification_definition::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(CertificationDefinition::try_from)
            .collect()
    }

    async fn find_definition(&self, id: Uuid) -> anyhow::Result<Option<CertificationDefinition>> {
        certification_definition::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(CertificationDefinition::try_from)
            .transpose()
    }

    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<Certification>> {
        let rows = certification::Entity::find()
            .filter(certification::Column::UserId.eq(owner))
            .find_also_related(certification_definition::Entity)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|(cert, definition)| -> anyhow::Result<Certification> {
                let definition = definition
                    .with_context(|| format!("certification {} has no definition", cert.id))?;
                Ok(mapper::certification(
                    cert,
                    CertificationDefinition::try_from(definition)?,
                ))
            })
            .collect()
    }

    async fn exists_for_definition(
        &self,
        owner: Uuid,
        definition_id: Uuid,
    ) -> anyhow::Result<bool> {
        let count = certification::Entity::find()
            .filter(certification::Column::UserId.eq(owner))
            .filter(certification::Column::DefinitionId.eq(definition_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, certification: &Certification) -> anyhow::Result<()> {
        certification::Entity::insert(certification_active_model(certification))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = certification::Entity::delete_many()
            .filter(certification::Column::Id.eq(id))
            .filter(certification::Column::UserId.eq(owner))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
