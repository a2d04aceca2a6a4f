use itertools::Itertools;

use crate::logic::error::TagCommandError;
use crate::logic::validate::{InvalidField, ValidationErrors};
use crate::model::{
    to_object_type, BulkTagRequest, ObjectReference, ObjectType, ObjectTypeToken, TagKind,
    TagRequest, TaggableObject,
};
use crate::store::{StoreError, StoreResult, TagStore, TagTransaction};

/// Commit `tx` if `outcome` succeeded, otherwise roll it back and return the failure
async fn finish<T: TagTransaction>(tx: T, outcome: StoreResult<()>) -> StoreResult<()> {
    match outcome {
        Ok(()) => tx.commit().await,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                log::warn!("Rollback after failed tag change also failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

fn resolve_or_fail(token: &ObjectTypeToken) -> Result<ObjectType, TagCommandError> {
    to_object_type(token).ok_or_else(|| {
        TagCommandError::create_failed_with_message(format!("invalid object type {}", token))
    })
}

fn store_failure(err: StoreError) -> TagCommandError {
    log::error!("Tag creation failed: {}", err);
    TagCommandError::create_failed(err)
}

/// Attach one or more custom tags to a single object
#[derive(Debug)]
pub struct CreateCustomTagCommand<'a, S: TagStore> {
    store: &'a S,
    object: ObjectReference,
    tags: Vec<String>,
}

impl<'a, S: TagStore> CreateCustomTagCommand<'a, S> {
    pub fn new(
        store: &'a S,
        object_type: impl Into<ObjectTypeToken>,
        object_id: i64,
        tags: Vec<String>,
    ) -> Self {
        Self {
            store,
            object: ObjectReference::new(object_type, object_id),
            tags,
        }
    }

    pub fn from_request(store: &'a S, request: TagRequest) -> Self {
        Self {
            store,
            object: request.object,
            tags: request.tags,
        }
    }

    pub fn validate(&self) -> Result<(), TagCommandError> {
        let mut errors = ValidationErrors::new();
        errors.check_object(&self.object, None);
        for (index, name) in self.tags.iter().enumerate() {
            errors.check_tag_name(InvalidField::Tags, name, Some(index));
        }

        if !errors.is_empty() {
            log::debug!(
                "Rejected tagging of {}:{} with {} failure(s)",
                self.object.object_type,
                self.object.object_id,
                errors.len()
            );
        }
        errors.into_result()
    }

    pub async fn run(&self) -> Result<(), TagCommandError> {
        self.validate()?;

        let object_type = resolve_or_fail(&self.object.object_type)?;
        self.execute(object_type).await.map_err(store_failure)?;

        log::info!(
            "Tagged {}:{} with [{}]",
            object_type,
            self.object.object_id,
            self.tags.iter().map(|t| t.trim()).join(", ")
        );
        Ok(())
    }

    async fn execute(&self, object_type: ObjectType) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        let outcome = tx
            .create_custom_tagged_objects(object_type, self.object.object_id, &self.tags)
            .await;
        finish(tx, outcome).await
    }
}

/// Attach one custom tag to many objects, optionally updating its description.
///
/// Relationship creation and the description update share one transaction:
/// either both are stored or neither is.
#[derive(Debug)]
pub struct CreateCustomTagWithRelationshipsCommand<'a, S: TagStore> {
    store: &'a S,
    request: BulkTagRequest,
}

impl<'a, S: TagStore> CreateCustomTagWithRelationshipsCommand<'a, S> {
    pub fn new(store: &'a S, request: BulkTagRequest) -> Self {
        Self { store, request }
    }

    pub fn validate(&self) -> Result<(), TagCommandError> {
        let mut errors = ValidationErrors::new();
        errors.check_tag_name(InvalidField::Name, &self.request.name, None);
        for (index, object) in self.request.objects_to_tag.iter().enumerate() {
            errors.check_object(object, Some(index));
        }

        if !errors.is_empty() {
            log::debug!(
                "Rejected tag '{}' with {} failure(s)",
                self.request.name,
                errors.len()
            );
        }
        errors.into_result()
    }

    pub async fn run(&self) -> Result<(), TagCommandError> {
        self.validate()?;

        let objects = self.resolve_objects()?;
        self.execute(&objects).await.map_err(store_failure)?;

        log::info!(
            "Applied tag '{}' to {} object(s)",
            self.request.name.trim(),
            objects.len()
        );
        Ok(())
    }

    fn resolve_objects(&self) -> Result<Vec<TaggableObject>, TagCommandError> {
        self.request
            .objects_to_tag
            .iter()
            .map(|o| resolve_or_fail(&o.object_type).map(|t| TaggableObject::new(t, o.object_id)))
            .collect()
    }

    fn description(&self) -> Option<&str> {
        self.request.description.as_deref().filter(|d| !d.is_empty())
    }

    async fn execute(&self, objects: &[TaggableObject]) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        let outcome = self.apply(&mut tx, objects).await;
        finish(tx, outcome).await
    }

    async fn apply(&self, tx: &mut S::Tx, objects: &[TaggableObject]) -> StoreResult<()> {
        let tag = tx
            .get_or_create_tag_by_name(self.request.name.trim(), TagKind::Custom)
            .await?;

        if !objects.is_empty() {
            tx.create_tag_relationships(objects, &tag, self.request.bulk_create)
                .await?;
        }

        if let Some(description) = self.description() {
            tx.set_tag_description(&tag, description).await?;
        }
        Ok(())
    }
}

/// Apply several tags in one go.
///
/// Every entry is validated before anything is written, and all entries share
/// one transaction, so a failing entry leaves no trace of the others.
#[derive(Debug)]
pub struct BulkCreateCustomTagsCommand<'a, S: TagStore> {
    store: &'a S,
    entries: Vec<CreateCustomTagWithRelationshipsCommand<'a, S>>,
}

impl<'a, S: TagStore> BulkCreateCustomTagsCommand<'a, S> {
    pub fn new(store: &'a S, requests: Vec<BulkTagRequest>) -> Self {
        let entries = requests
            .into_iter()
            .map(|request| CreateCustomTagWithRelationshipsCommand::new(store, request))
            .collect();
        Self { store, entries }
    }

    pub fn validate(&self) -> Result<(), TagCommandError> {
        let mut errors = ValidationErrors::new();
        for (entry, command) in self.entries.iter().enumerate() {
            if let Err(TagCommandError::Invalid(failures)) = command.validate() {
                errors.extend_for_entry(entry, failures);
            }
        }
        errors.into_result()
    }

    pub async fn run(&self) -> Result<(), TagCommandError> {
        self.validate()?;

        let resolved = self
            .entries
            .iter()
            .map(|command| command.resolve_objects())
            .collect::<Result<Vec<_>, _>>()?;

        self.execute(&resolved).await.map_err(store_failure)?;

        log::info!(
            "Applied tags [{}]",
            self.entries.iter().map(|c| c.request.name.trim()).join(", ")
        );
        Ok(())
    }

    async fn execute(&self, resolved: &[Vec<TaggableObject>]) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        let mut outcome = Ok(());
        for (command, objects) in self.entries.iter().zip(resolved) {
            outcome = command.apply(&mut tx, objects).await;
            if outcome.is_err() {
                break;
            }
        }
        finish(tx, outcome).await
    }
}
