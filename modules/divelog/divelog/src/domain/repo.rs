//! Storage ports. Every owned-record query is scoped by `owner`.

use async_trait::async_trait;
use divelog_sdk::{
    Certification, CertificationDefinition, DiveLog, DivePlan, GearItem, GearKit,
    UnitPreferencesPatch, UserProfile,
};
use uuid::Uuid;

/// Credentials row used by login and account checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub profile: UserProfile,
    pub password_hash: String,
    pub session_version: i64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>>;

    /// Lookup by normalized (lowercased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserCredentials>>;

    async fn create(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> anyhow::Result<UserCredentials>;

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
    ) -> anyhow::Result<Option<UserProfile>>;

    /// Store a new hash and bump the session version, only while the stored
    /// version is still `expected_version`. Returns the new version, or
    /// `None` if the user is gone or the version has moved on.
    async fn change_password(
        &self,
        id: Uuid,
        expected_version: i64,
        password_hash: &str,
    ) -> anyhow::Result<Option<i64>>;

    /// Remove the user and everything they own in one transaction, only while
    /// the stored session version is still `expected_version`.
    async fn delete_with_owned_data(&self, id: Uuid, expected_version: i64)
    -> anyhow::Result<bool>;
}

#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Stored axes; `None` when the user never saved preferences.
    async fn find(&self, owner: Uuid) -> anyhow::Result<Option<UnitPreferencesPatch>>;

    /// Write only the axes present in `patch`, creating the row if needed.
    async fn upsert(&self, owner: Uuid, patch: UnitPreferencesPatch) -> anyhow::Result<()>;
}

#[async_trait]
pub trait DiveRepository: Send + Sync {
    /// Newest dive first.
    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<DiveLog>>;
    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<DiveLog>>;
    async fn create(&self, dive: &DiveLog) -> anyhow::Result<()>;
    /// `false` when no row owned by `dive.user_id` has that id.
    async fn replace(&self, dive: &DiveLog) -> anyhow::Result<bool>;
    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Soonest plan first.
    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<DivePlan>>;
    async fn get(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<DivePlan>>;
    async fn create(&self, plan: &DivePlan) -> anyhow::Result<()>;
    async fn replace(&self, plan: &DivePlan) -> anyhow::Result<bool>;
    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait CertificationRepository: Send + Sync {
    async fn list_definitions(&self) -> anyhow::Result<Vec<CertificationDefinition>>;
    async fn find_definition(&self, id: Uuid) -> anyhow::Result<Option<CertificationDefinition>>;
    async fn list(&self, owner: Uuid) -> anyhow::Result<Vec<Certification>>;
    async fn exists_for_definition(&self, owner: Uuid, definition_id: Uuid)
    -> anyhow::Result<bool>;
    async fn create(&self, certification: &Certification) -> anyhow::Result<()>;
    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait GearRepository: Send + Sync {
    /// Items ordered by name.
    async fn list_items(&self, owner: Uuid) -> anyhow::Result<Vec<GearItem>>;
    async fn get_item(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<GearItem>>;
    async fn create_item(&self, item: &GearItem) -> anyhow::Result<()>;
    async fn replace_item(&self, item: &GearItem) -> anyhow::Result<bool>;
    /// Also drops the item from every kit.
    async fn delete_item(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
    /// The subset of `ids` owned by `owner`.
    async fn owned_item_ids(&self, owner: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>>;

    /// Kits ordered by name.
    async fn list_kits(&self, owner: Uuid) -> anyhow::Result<Vec<GearKit>>;
    async fn get_kit(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<GearKit>>;
    async fn create_kit(&self, kit: &GearKit) -> anyhow::Result<()>;
    async fn replace_kit(&self, kit: &GearKit) -> anyhow::Result<bool>;
    async fn delete_kit(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}
