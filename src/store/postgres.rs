use itertools::Itertools;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Postgres, Row, Transaction,
};

use crate::model::{ObjectType, Tag, TagKind, TaggableObject};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{TagStore, TagTransaction};

const TAG_COLUMNS: &str = "id, name, type, description, created_on, changed_on";

#[derive(Debug, Clone)]
pub struct PostgresTagStore {
    pool: PgPool,
}

impl PostgresTagStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run the embedded database migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn tag_by_name(&self, name: &str, kind: TagKind) -> StoreResult<Option<Tag>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tag WHERE name = $1 AND type = $2",
            TAG_COLUMNS
        ))
        .bind(name)
        .bind(kind.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(tag_from_row).transpose()
    }

    /// Objects currently associated with `tag`
    pub async fn objects_for_tag(&self, tag: &Tag) -> StoreResult<Vec<TaggableObject>> {
        let rows = sqlx::query(
            "SELECT object_type, object_id FROM tagged_object WHERE tag_id = $1 ORDER BY object_type, object_id",
        )
        .bind(tag.id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<TaggableObject> {
                let object_type: String = row.try_get("object_type")?;
                let object_type = object_type.parse::<ObjectType>().map_err(StoreError::Decode)?;
                Ok(TaggableObject::new(object_type, row.try_get("object_id")?))
            })
            .collect()
    }
}

fn tag_from_row(row: &PgRow) -> StoreResult<Tag> {
    let kind: String = row.try_get("type")?;

    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: kind.parse().map_err(StoreError::Decode)?,
        description: row.try_get("description")?,
        created_on: row.try_get("created_on")?,
        changed_on: row.try_get("changed_on")?,
    })
}

#[async_trait::async_trait]
impl TagStore for PostgresTagStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> StoreResult<PostgresTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }
}

/// A database transaction; rolled back by sqlx if dropped uncommitted
#[derive(Debug)]
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    async fn associate(&mut self, tag_id: i32, object: &TaggableObject) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tagged_object (tag_id, object_type, object_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (tag_id, object_type, object_id) DO NOTHING
            "#,
        )
        .bind(tag_id)
        .bind(object.object_type.name())
        .bind(object.object_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl TagTransaction for PostgresTransaction {
    async fn create_custom_tagged_objects(
        &mut self,
        object_type: ObjectType,
        object_id: i64,
        tag_names: &[String],
    ) -> StoreResult<()> {
        let object = TaggableObject::new(object_type, object_id);
        let names: Vec<&str> = tag_names.iter().map(|n| n.trim()).unique().collect();
        for name in names {
            let tag = self.get_or_create_tag_by_name(name, TagKind::Custom).await?;
            self.associate(tag.id, &object).await?;
        }
        Ok(())
    }

    async fn get_or_create_tag_by_name(&mut self, name: &str, kind: TagKind) -> StoreResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Create {
                entity: "tag",
                message: "tag name cannot be empty".to_string(),
            });
        }

        // The no-op update makes concurrent callers wait on the same row
        // instead of inserting a duplicate.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tag (name, type)
            VALUES ($1, $2)
            ON CONFLICT (name, type) DO UPDATE SET name = EXCLUDED.name
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(name)
        .bind(kind.to_string())
        .fetch_one(&mut *self.tx)
        .await?;

        tag_from_row(&row)
    }

    async fn create_tag_relationships(
        &mut self,
        objects: &[TaggableObject],
        tag: &Tag,
        bulk_create: bool,
    ) -> StoreResult<()> {
        if !bulk_create {
            for object in objects {
                self.associate(tag.id, object).await?;
            }
            return Ok(());
        }

        let (object_types, object_ids): (Vec<String>, Vec<i64>) = objects
            .iter()
            .unique()
            .map(|o| (o.object_type.name().to_string(), o.object_id))
            .unzip();

        sqlx::query(
            r#"
            INSERT INTO tagged_object (tag_id, object_type, object_id)
            SELECT $1, t.object_type, t.object_id
            FROM UNNEST($2::text[], $3::bigint[]) AS t(object_type, object_id)
            ON CONFLICT (tag_id, object_type, object_id) DO NOTHING
            "#,
        )
        .bind(tag.id)
        .bind(object_types)
        .bind(object_ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn set_tag_description(&mut self, tag: &Tag, description: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE tag SET description = $1, changed_on = NOW() WHERE id = $2")
            .bind(description)
            .bind(tag.id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TagNotFound(tag.id));
        }
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
