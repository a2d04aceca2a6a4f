use crate::model::{ObjectType, Tag, TagKind, TaggableObject};
use crate::store::error::StoreResult;

/// Entry point to a tag persistence backend.
///
/// Every unit of work goes through a [`TagTransaction`]; nothing is visible
/// to other callers until [`TagTransaction::commit`] succeeds.
#[async_trait::async_trait]
pub trait TagStore: Send + Sync {
    type Tx: TagTransaction;

    async fn begin(&self) -> StoreResult<Self::Tx>;
}

/// Tag operations scoped to one transaction.
///
/// Dropping a transaction without committing discards its changes.
#[async_trait::async_trait]
pub trait TagTransaction: Send {
    /// Get or create each custom tag in `tag_names` and associate it with the object
    async fn create_custom_tagged_objects(
        &mut self,
        object_type: ObjectType,
        object_id: i64,
        tag_names: &[String],
    ) -> StoreResult<()>;

    /// Look up a tag by name and kind, creating it if absent
    async fn get_or_create_tag_by_name(&mut self, name: &str, kind: TagKind) -> StoreResult<Tag>;

    /// Associate `tag` with every object; existing associations are kept as is
    async fn create_tag_relationships(
        &mut self,
        objects: &[TaggableObject],
        tag: &Tag,
        bulk_create: bool,
    ) -> StoreResult<()>;

    async fn set_tag_description(&mut self, tag: &Tag, description: &str) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}
