use std::sync::Arc;

use divelog_sdk::models::sort_definitions;
use divelog_sdk::{Certification, CertificationDefinition, NewCertification, SecurityContext};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ServiceConfig, owner, to_utc};
use crate::domain::error::DomainError;
use crate::domain::fields::{CertificationFields, Violations, clean_optional};
use crate::domain::repo::CertificationRepository;

pub struct CertificationsService {
    repo: Arc<dyn CertificationRepository>,
    config: ServiceConfig,
}

impl CertificationsService {
    pub fn new(repo: Arc<dyn CertificationRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Core first, then specialty, then professional; by level rank, then name.
    #[instrument(skip_all)]
    pub async fn list_definitions(&self) -> Result<Vec<CertificationDefinition>, DomainError> {
        let mut definitions = self.repo.list_definitions().await?;
        sort_definitions(&mut definitions);
        Ok(definitions)
    }

    /// Held certifications in definition display order.
    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn list_certifications(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<Certification>, DomainError> {
        let mut held = self.repo.list(owner(ctx)).await?;
        held.sort_by(|a, b| a.definition.display_order(&b.definition));
        Ok(held)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), definition_id = %new.definition_id))]
    pub async fn add_certification(
        &self,
        ctx: &SecurityContext,
        new: NewCertification,
    ) -> Result<Certification, DomainError> {
        let card_number = clean_optional(new.card_number);
        let instructor = clean_optional(new.instructor);
        let mut v = Violations::new();
        v.optional_text(
            CertificationFields::CARD_NUMBER,
            card_number.as_deref(),
            self.config.max_text_length,
        );
        v.optional_text(
            CertificationFields::INSTRUCTOR,
            instructor.as_deref(),
            self.config.max_text_length,
        );
        v.finish()?;

        let definition = self
            .repo
            .find_definition(new.definition_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Certification definition"))?;

        let user_id = owner(ctx);
        if self
            .repo
            .exists_for_definition(user_id, definition.id)
            .await?
        {
            return Err(DomainError::conflict(format!(
                "Certification '{}' is already recorded",
                definition.name
            )));
        }

        let certification = Certification {
            id: Uuid::new_v4(),
            user_id,
            definition,
            certified_on: new.certified_on.map(to_utc),
            card_number,
            instructor,
            created_at: OffsetDateTime::now_utc(),
        };
        self.repo.create(&certification).await?;

        info!(certification_id = %certification.id, "Recorded certification");
        Ok(certification)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), certification_id = %id))]
    pub async fn remove_certification(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
    ) -> Result<(), DomainError> {
        if self.repo.delete(owner(ctx), id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Certification"))
        }
    }
}
