use std::sync::Arc;

use divelog_sdk::{DivePlan, DivePlanDraft, SecurityContext};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ServiceConfig, not_found, owner, to_utc};
use crate::domain::error::DomainError;
use crate::domain::fields::{PlanFields, Violations, clean_optional};
use crate::domain::repo::PlanRepository;

const RESOURCE: &str = "Dive plan";

pub struct PlansService {
    repo: Arc<dyn PlanRepository>,
    config: ServiceConfig,
}

impl PlansService {
    pub fn new(repo: Arc<dyn PlanRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn list_plans(&self, ctx: &SecurityContext) -> Result<Vec<DivePlan>, DomainError> {
        Ok(self.repo.list(owner(ctx)).await?)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), plan_id = %id))]
    pub async fn get_plan(&self, ctx: &SecurityContext, id: Uuid) -> Result<DivePlan, DomainError> {
        not_found(self.repo.get(owner(ctx), id).await?, RESOURCE)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn create_plan(
        &self,
        ctx: &SecurityContext,
        draft: DivePlanDraft,
    ) -> Result<DivePlan, DomainError> {
        let draft = self.validate(draft)?;
        let now = OffsetDateTime::now_utc();
        let plan = build(Uuid::new_v4(), owner(ctx), draft, now, now);
        self.repo.create(&plan).await?;

        info!(plan_id = %plan.id, "Created dive plan");
        Ok(plan)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), plan_id = %id))]
    pub async fn replace_plan(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        draft: DivePlanDraft,
    ) -> Result<DivePlan, DomainError> {
        let draft = self.validate(draft)?;
        let existing = not_found(self.repo.get(owner(ctx), id).await?, RESOURCE)?;
        let plan = build(
            id,
            existing.user_id,
            draft,
            existing.created_at,
            OffsetDateTime::now_utc(),
        );
        if !self.repo.replace(&plan).await? {
            return Err(DomainError::not_found(RESOURCE));
        }
        Ok(plan)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), plan_id = %id))]
    pub async fn delete_plan(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(owner(ctx), id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(RESOURCE))
        }
    }

    fn validate(&self, mut draft: DivePlanDraft) -> Result<DivePlanDraft, DomainError> {
        draft.site_name = draft.site_name.trim().to_owned();
        draft.gas_mix = clean_optional(draft.gas_mix);
        draft.notes = clean_optional(draft.notes);
        draft.safety_briefing = clean_optional(draft.safety_briefing);
        draft.planned_at = to_utc(draft.planned_at);

        let text = self.config.max_text_length;
        let notes = self.config.max_notes_length;
        let mut v = Violations::new();
        v.require_text(PlanFields::SITE_NAME, &draft.site_name, text);
        v.optional_text(PlanFields::GAS_MIX, draft.gas_mix.as_deref(), text);
        v.optional_text(PlanFields::NOTES, draft.notes.as_deref(), notes);
        v.optional_text(
            PlanFields::SAFETY_BRIEFING,
            draft.safety_briefing.as_deref(),
            notes,
        );
        v.positive(PlanFields::PLANNED_MAX_DEPTH, draft.planned_max_depth_cm);
        if let Some(minutes) = draft.planned_bottom_time_min {
            v.positive(PlanFields::PLANNED_BOTTOM_TIME, minutes);
        }
        v.finish()?;
        Ok(draft)
    }
}

fn build(
    id: Uuid,
    user_id: Uuid,
    draft: DivePlanDraft,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
) -> DivePlan {
    DivePlan {
        id,
        user_id,
        site_name: draft.site_name,
        planned_at: draft.planned_at,
        planned_max_depth_cm: draft.planned_max_depth_cm,
        planned_bottom_time_min: draft.planned_bottom_time_min,
        gas_mix: draft.gas_mix,
        notes: draft.notes,
        safety_briefing: draft.safety_briefing,
        created_at,
        updated_at,
    }
}
