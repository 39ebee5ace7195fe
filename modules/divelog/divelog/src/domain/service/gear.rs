use std::collections::HashSet;
use std::sync::Arc;

use divelog_sdk::{GearItem, GearItemDraft, GearKit, GearKitDraft, SecurityContext};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ServiceConfig, not_found, owner, to_utc};
use crate::domain::error::DomainError;
use crate::domain::fields::{GearFields, Violations, clean_optional};
use crate::domain::repo::GearRepository;

const ITEM: &str = "Gear item";
const KIT: &str = "Gear kit";

pub struct GearService {
    repo: Arc<dyn GearRepository>,
    config: ServiceConfig,
}

impl GearService {
    pub fn new(repo: Arc<dyn GearRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn list_items(&self, ctx: &SecurityContext) -> Result<Vec<GearItem>, DomainError> {
        Ok(self.repo.list_items(owner(ctx)).await?)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), item_id = %id))]
    pub async fn get_item(&self, ctx: &SecurityContext, id: Uuid) -> Result<GearItem, DomainError> {
        not_found(self.repo.get_item(owner(ctx), id).await?, ITEM)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn create_item(
        &self,
        ctx: &SecurityContext,
        draft: GearItemDraft,
    ) -> Result<GearItem, DomainError> {
        let draft = self.validate_item(draft)?;
        let now = OffsetDateTime::now_utc();
        let item = build_item(Uuid::new_v4(), owner(ctx), draft, now, now);
        self.repo.create_item(&item).await?;

        info!(item_id = %item.id, kind = item.kind.as_str(), "Added gear item");
        Ok(item)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), item_id = %id))]
    pub async fn replace_item(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        draft: GearItemDraft,
    ) -> Result<GearItem, DomainError> {
        let draft = self.validate_item(draft)?;
        let existing = not_found(self.repo.get_item(owner(ctx), id).await?, ITEM)?;
        let item = build_item(
            id,
            existing.user_id,
            draft,
            existing.created_at,
            OffsetDateTime::now_utc(),
        );
        if !self.repo.replace_item(&item).await? {
            return Err(DomainError::not_found(ITEM));
        }
        Ok(item)
    }

    /// Delete an item; kits that contained it lose it.
    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), item_id = %id))]
    pub async fn delete_item(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete_item(owner(ctx), id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(ITEM))
        }
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn list_kits(&self, ctx: &SecurityContext) -> Result<Vec<GearKit>, DomainError> {
        Ok(self.repo.list_kits(owner(ctx)).await?)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), kit_id = %id))]
    pub async fn get_kit(&self, ctx: &SecurityContext, id: Uuid) -> Result<GearKit, DomainError> {
        not_found(self.repo.get_kit(owner(ctx), id).await?, KIT)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id()))]
    pub async fn create_kit(
        &self,
        ctx: &SecurityContext,
        draft: GearKitDraft,
    ) -> Result<GearKit, DomainError> {
        let draft = self.validate_kit(ctx, draft).await?;
        let now = OffsetDateTime::now_utc();
        let kit = GearKit {
            id: Uuid::new_v4(),
            user_id: owner(ctx),
            name: draft.name,
            item_ids: draft.item_ids,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_kit(&kit).await?;

        info!(kit_id = %kit.id, items = kit.item_ids.len(), "Created gear kit");
        Ok(kit)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), kit_id = %id))]
    pub async fn replace_kit(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        draft: GearKitDraft,
    ) -> Result<GearKit, DomainError> {
        let existing = not_found(self.repo.get_kit(owner(ctx), id).await?, KIT)?;
        let draft = self.validate_kit(ctx, draft).await?;
        let kit = GearKit {
            id,
            user_id: existing.user_id,
            name: draft.name,
            item_ids: draft.item_ids,
            created_at: existing.created_at,
            updated_at: OffsetDateTime::now_utc(),
        };
        if !self.repo.replace_kit(&kit).await? {
            return Err(DomainError::not_found(KIT));
        }
        Ok(kit)
    }

    #[instrument(skip_all, fields(user_id = %ctx.subject_id(), kit_id = %id))]
    pub async fn delete_kit(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete_kit(owner(ctx), id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(KIT))
        }
    }

    fn validate_item(&self, mut draft: GearItemDraft) -> Result<GearItemDraft, DomainError> {
        draft.name = draft.name.trim().to_owned();
        draft.brand = clean_optional(draft.brand);
        draft.model = clean_optional(draft.model);
        draft.serial_number = clean_optional(draft.serial_number);
        draft.notes = clean_optional(draft.notes);
        draft.purchased_on = draft.purchased_on.map(to_utc);
        draft.last_serviced_on = draft.last_serviced_on.map(to_utc);

        let text = self.config.max_text_length;
        let mut v = Violations::new();
        v.require_text(GearFields::NAME, &draft.name, text);
        v.optional_text(GearFields::BRAND, draft.brand.as_deref(), text);
        v.optional_text(GearFields::MODEL, draft.model.as_deref(), text);
        v.optional_text(GearFields::SERIAL_NUMBER, draft.serial_number.as_deref(), text);
        v.optional_text(
            GearFields::NOTES,
            draft.notes.as_deref(),
            self.config.max_notes_length,
        );
        v.finish()?;
        Ok(draft)
    }

    /// Trim the name, collapse duplicate ids keeping first occurrence, and
    /// require every id to name an item the caller owns.
    async fn validate_kit(
        &self,
        ctx: &SecurityContext,
        mut draft: GearKitDraft,
    ) -> Result<GearKitDraft, DomainError> {
        draft.name = draft.name.trim().to_owned();
        let mut seen = HashSet::new();
        draft.item_ids.retain(|id| seen.insert(*id));

        let mut v = Violations::new();
        v.require_text(GearFields::NAME, &draft.name, self.config.max_text_length);
        v.finish()?;

        if !draft.item_ids.is_empty() {
            let owned: HashSet<Uuid> = self
                .repo
                .owned_item_ids(owner(ctx), &draft.item_ids)
                .await?
                .into_iter()
                .collect();
            let mut v = Violations::new();
            for id in draft.item_ids.iter().filter(|id| !owned.contains(id)) {
                v.push(GearFields::ITEM_IDS, format!("unknown gear item {id}"));
            }
            v.finish()?;
        }
        Ok(draft)
    }
}

fn build_item(
    id: Uuid,
    user_id: Uuid,
    draft: GearItemDraft,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
) -> GearItem {
    GearItem {
        id,
        user_id,
        name: draft.name,
        kind: draft.kind,
        brand: draft.brand,
        model: draft.model,
        serial_number: draft.serial_number,
        purchased_on: draft.purchased_on,
        last_serviced_on: draft.last_serviced_on,
        notes: draft.notes,
        created_at,
        updated_at,
    }
}
