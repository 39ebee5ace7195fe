use std::sync::Arc;

use divelog_sdk::{DiveLog, DiveLogDraft, SecurityContext};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{ServiceConfig, not_found, owner, to_utc};
use crate::domain::error::DomainError;
use crate::domain::fields::{DiveFields, Violations, clean_optional};
use crate::domain::repo::DiveRepository;

const RESOURCE: &str = "Dive log";

pub struct DivesService {
    repo: Arc<dyn DiveRepository>,
    config: ServiceConfig,
}

impl DivesService {
    pub fn new(repo: Arc<dyn DiveRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn list_dives(&self, ctx: &SecurityContext) -> Result<Vec<DiveLog>, DomainError> {
        let dives = self.repo.list(owner(ctx)).await?;
        debug!("Listed {} dives", dives.len());
        Ok(dives)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), dive_id = %id))]
    pub async fn get_dive(&self, ctx: &SecurityContext, id: Uuid) -> Result<DiveLog, DomainError> {
        not_found(self.repo.get(owner(ctx), id).await?, RESOURCE)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn create_dive(
        &self,
        ctx: &SecurityContext,
        draft: DiveLogDraft,
    ) -> Result<DiveLog, DomainError> {
        let draft = self.validate(draft)?;
        let now = OffsetDateTime::now_utc();
        let dive = build(Uuid::new_v4(), owner(ctx), draft, now, now);
        self.repo.create(&dive).await?;

        info!(dive_id = %dive.id, "Logged dive");
        Ok(dive)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), dive_id = %id))]
    pub async fn replace_dive(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        draft: DiveLogDraft,
    ) -> Result<DiveLog, DomainError> {
        let draft = self.validate(draft)?;
        let existing = not_found(self.repo.get(owner(ctx), id).await?, RESOURCE)?;
        let dive = build(
            id,
            existing.user_id,
            draft,
            existing.created_at,
            OffsetDateTime::now_utc(),
        );
        if !self.repo.replace(&dive).await? {
            return Err(DomainError::not_found(RESOURCE));
        }
        Ok(dive)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), dive_id = %id))]
    pub async fn delete_dive(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(owner(ctx), id).await? {
            info!("Deleted dive");
            Ok(())
        } else {
            Err(DomainError::not_found(RESOURCE))
        }
    }

    fn validate(&self, mut draft: DiveLogDraft) -> Result<DiveLogDraft, DomainError> {
        draft.location = clean_optional(draft.location);
        draft.notes = clean_optional(draft.notes);
        draft.site_name = draft.site_name.trim().to_owned();
        draft.dived_at = to_utc(draft.dived_at);

        let mut v = Violations::new();
        v.require_text(DiveFields::SITE_NAME, &draft.site_name, self.config.max_text_length);
        v.optional_text(
            DiveFields::LOCATION,
            draft.location.as_deref(),
            self.config.max_text_length,
        );
        v.optional_text(
            DiveFields::NOTES,
            draft.notes.as_deref(),
            self.config.max_notes_length,
        );
        if let Some(n) = draft.dive_number {
            v.positive(DiveFields::DIVE_NUMBER, n);
        }
        v.positive(DiveFields::BOTTOM_TIME, draft.bottom_time_min);
        v.positive(DiveFields::MAX_DEPTH, draft.max_depth_cm);
        v.non_negative(DiveFields::VISIBILITY, draft.visibility_cm);
        v.non_negative(DiveFields::START_PRESSURE, draft.start_pressure_bar_x10);
        v.non_negative(DiveFields::END_PRESSURE, draft.end_pressure_bar_x10);
        v.non_negative(DiveFields::WEIGHT, draft.weight_g);
        if let (Some(start), Some(end)) = (draft.start_pressure_bar_x10, draft.end_pressure_bar_x10)
            && end > start
        {
            v.push(DiveFields::END_PRESSURE, "must not exceed start pressure");
        }
        v.finish()?;
        Ok(draft)
    }
}

fn build(
    id: Uuid,
    user_id: Uuid,
    draft: DiveLogDraft,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
) -> DiveLog {
    DiveLog {
        id,
        user_id,
        dive_number: draft.dive_number,
        site_name: draft.site_name,
        location: draft.location,
        dived_at: draft.dived_at,
        bottom_time_min: draft.bottom_time_min,
        max_depth_cm: draft.max_depth_cm,
        water_temp_cx10: draft.water_temp_cx10,
        visibility_cm: draft.visibility_cm,
        start_pressure_bar_x10: draft.start_pressure_bar_x10,
        end_pressure_bar_x10: draft.end_pressure_bar_x10,
        weight_g: draft.weight_g,
        notes: draft.notes,
        created_at,
        updated_at,
    }
}
