use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use itertools::Itertools;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::{
    ObjectType, Tag, TagKind, TaggableObject, TaggedObject, MAX_TAG_NAME_LENGTH,
};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{TagStore, TagTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tags: Vec<Tag>,
    tagged_objects: BTreeSet<TaggedObject>,
    next_tag_id: i32,
}

impl MemoryState {
    fn find_tag(&self, name: &str, kind: TagKind) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name && t.kind == kind)
    }

    fn get_or_create_tag(&mut self, name: &str, kind: TagKind) -> StoreResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Create {
                entity: "tag",
                message: "tag name cannot be empty".to_string(),
            });
        }
        if name.chars().count() > MAX_TAG_NAME_LENGTH {
            return Err(StoreError::Create {
                entity: "tag",
                message: format!("tag name longer than {} characters", MAX_TAG_NAME_LENGTH),
            });
        }

        if let Some(tag) = self.find_tag(name, kind) {
            return Ok(tag.clone());
        }

        self.next_tag_id += 1;
        let now = Utc::now();
        let tag = Tag {
            id: self.next_tag_id,
            name: name.to_string(),
            kind,
            description: None,
            created_on: now,
            changed_on: now,
        };
        self.tags.push(tag.clone());
        Ok(tag)
    }

    fn tag_mut(&mut self, id: i32) -> StoreResult<&mut Tag> {
        self.tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TagNotFound(id))
    }

    fn associate(&mut self, tag_id: i32, object: TaggableObject) -> bool {
        self.tagged_objects.insert(TaggedObject {
            tag_id,
            object_type: object.object_type,
            object_id: object.object_id,
        })
    }
}

/// In-process tag store.
///
/// A transaction holds the store lock until it is committed or dropped, so
/// transactions are fully serialised.
#[derive(Debug, Clone, Default)]
pub struct MemoryTagStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tag_by_name(&self, name: &str, kind: TagKind) -> Option<Tag> {
        self.state.lock().await.find_tag(name, kind).cloned()
    }

    pub async fn tags(&self) -> Vec<Tag> {
        self.state.lock().await.tags.clone()
    }

    pub async fn tagged_objects(&self) -> Vec<TaggedObject> {
        self.state.lock().await.tagged_objects.iter().copied().collect()
    }

    /// Names of the tags attached to `object`, sorted
    pub async fn tag_names_for(&self, object: TaggableObject) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .tagged_objects
            .iter()
            .filter(|t| t.object() == object)
            .filter_map(|t| state.tags.iter().find(|tag| tag.id == t.tag_id))
            .map(|tag| tag.name.clone())
            .sorted()
            .collect()
    }
}

#[async_trait::async_trait]
impl TagStore for MemoryTagStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        let guard = self.state.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(MemoryTransaction { guard, staged })
    }
}

/// Changes staged against a snapshot of the store
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait::async_trait]
impl TagTransaction for MemoryTransaction {
    async fn create_custom_tagged_objects(
        &mut self,
        object_type: ObjectType,
        object_id: i64,
        tag_names: &[String],
    ) -> StoreResult<()> {
        let object = TaggableObject::new(object_type, object_id);
        let names: Vec<&str> = tag_names.iter().map(|n| n.trim()).unique().collect();
        for name in names {
            let tag = self.staged.get_or_create_tag(name, TagKind::Custom)?;
            if !self.staged.associate(tag.id, object) {
                log::debug!("Tag '{}' already attached to {}", tag.name, object);
            }
        }
        Ok(())
    }

    async fn get_or_create_tag_by_name(&mut self, name: &str, kind: TagKind) -> StoreResult<Tag> {
        self.staged.get_or_create_tag(name, kind)
    }

    async fn create_tag_relationships(
        &mut self,
        objects: &[TaggableObject],
        tag: &Tag,
        bulk_create: bool,
    ) -> StoreResult<()> {
        let tag_id = self.staged.tag_mut(tag.id)?.id;

        if bulk_create {
            let new_rows: Vec<TaggedObject> = objects
                .iter()
                .map(|o| TaggedObject {
                    tag_id,
                    object_type: o.object_type,
                    object_id: o.object_id,
                })
                .filter(|row| !self.staged.tagged_objects.contains(row))
                .collect();
            self.staged.tagged_objects.extend(new_rows);
        } else {
            for object in objects {
                self.staged.associate(tag_id, *object);
            }
        }
        Ok(())
    }

    async fn set_tag_description(&mut self, tag: &Tag, description: &str) -> StoreResult<()> {
        let stored = self.staged.tag_mut(tag.id)?;
        stored.description = Some(description.to_string());
        stored.changed_on = Utc::now();
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let MemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_existing_tag() {
        let store = MemoryTagStore::new();
        let mut tx = store.begin().await.unwrap();
        let first = tx.get_or_create_tag_by_name("q1", TagKind::Custom).await.unwrap();
        let second = tx.get_or_create_tag_by_name(" q1 ", TagKind::Custom).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.tags().await.len(), 1);
    }

    #[tokio::test]
    async fn test_same_name_different_kind_is_a_different_tag() {
        let store = MemoryTagStore::new();
        let mut tx = store.begin().await.unwrap();
        let custom = tx.get_or_create_tag_by_name("owner:1", TagKind::Custom).await.unwrap();
        let owner = tx.get_or_create_tag_by_name("owner:1", TagKind::Owner).await.unwrap();
        tx.commit().await.unwrap();

        assert_ne!(custom.id, owner.id);
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let store = MemoryTagStore::new();
        let mut tx = store.begin().await.unwrap();
        let result = tx.get_or_create_tag_by_name("   ", TagKind::Custom).await;
        assert!(matches!(result, Err(StoreError::Create { entity: "tag", .. })));
    }

    #[tokio::test]
    async fn test_overlong_name_is_rejected() {
        let store = MemoryTagStore::new();
        let mut tx = store.begin().await.unwrap();
        let result = tx
            .get_or_create_tag_by_name(&"x".repeat(MAX_TAG_NAME_LENGTH + 1), TagKind::Custom)
            .await;
        assert!(matches!(result, Err(StoreError::Create { entity: "tag", .. })));
        assert!(tx
            .get_or_create_tag_by_name(&"x".repeat(MAX_TAG_NAME_LENGTH), TagKind::Custom)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let store = MemoryTagStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.create_custom_tagged_objects(ObjectType::Chart, 1, &["a".to_string()])
                .await
                .unwrap();
        }
        let tx = store.begin().await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.tags().await.is_empty());
        assert!(store.tagged_objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_and_individual_relationships_end_in_same_state() {
        let objects = vec![
            TaggableObject::new(ObjectType::Chart, 1),
            TaggableObject::new(ObjectType::Dashboard, 2),
            TaggableObject::new(ObjectType::Chart, 1),
        ];

        let mut results = Vec::new();
        for bulk in [true, false] {
            let store = MemoryTagStore::new();
            let mut tx = store.begin().await.unwrap();
            let tag = tx.get_or_create_tag_by_name("q1", TagKind::Custom).await.unwrap();
            tx.create_tag_relationships(&objects, &tag, bulk).await.unwrap();
            tx.commit().await.unwrap();
            results.push(store.tagged_objects().await);
        }

        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].len(), 2);
    }

    #[tokio::test]
    async fn test_relationships_for_unknown_tag_fail() {
        let store = MemoryTagStore::new();
        let mut tx = store.begin().await.unwrap();
        let now = Utc::now();
        let ghost = Tag {
            id: 42,
            name: "ghost".to_string(),
            kind: TagKind::Custom,
            description: None,
            created_on: now,
            changed_on: now,
        };
        let result = tx
            .create_tag_relationships(&[TaggableObject::new(ObjectType::Chart, 1)], &ghost, true)
            .await;
        assert!(matches!(result, Err(StoreError::TagNotFound(42))));
    }
}
