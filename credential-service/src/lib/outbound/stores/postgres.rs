use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::StoreError;
use crate::account::models::Document;
use crate::account::models::Filter;
use crate::account::ports::CredentialStore;

const ID_FIELD: &str = "_id";

/// Document store backed by a PostgreSQL JSONB table.
///
/// Every collection shares the `documents` table. Filters are evaluated with
/// JSONB containment and updates are JSONB merges. Unique indexes named
/// `documents_<collection>_<field>_key` are reported as conflicts on `<field>`.
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a partial unique index per field, scoped to `collection`.
    ///
    /// Idempotent. Names are spliced into DDL, so `collection` and every field
    /// must consist of ASCII letters, digits and underscores.
    ///
    /// # Errors
    /// * `InvalidRecord` - A name contains other characters
    /// * `Backend` - Index creation failed, e.g. duplicates already stored
    pub async fn ensure_unique_fields(
        &self,
        collection: &str,
        fields: &[&str],
    ) -> Result<(), StoreError> {
        for name in std::iter::once(collection).chain(fields.iter().copied()) {
            if !is_identifier(name) {
                return Err(StoreError::InvalidRecord(format!(
                    "`{}` cannot be used in an index name",
                    name
                )));
            }
        }

        for field in fields {
            let statement = format!(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS "documents_{collection}_{field}_key"
                    ON documents ((body ->> '{field}'))
                    WHERE collection = '{collection}'
                "#
            );

            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

            tracing::debug!(collection, field = %field, "Unique index ensured");
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresDocumentStore {
    async fn create(&self, collection: &str, mut record: Document) -> Result<String, StoreError> {
        let id = match record.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(StoreError::InvalidRecord(format!(
                    "`{}` must be a string, got {}",
                    ID_FIELD, other
                )))
            }
            None => {
                let id = Uuid::new_v4().to_string();
                record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::Conflict(conflicting_field(db_err.constraint()));
                }
            }
            StoreError::Backend(e.to_string())
        })?;

        Ok(id)
    }

    async fn read(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY inserted_at
            "#,
        )
        .bind(collection)
        .bind(Json(filter.fields()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|Json(body)| body).collect())
    }

    async fn read_one(&self, collection: &str, filter: &Filter) -> Result<Document, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Document>>(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY inserted_at
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(Json(filter.fields()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|Json(body)| body)
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64, StoreError> {
        if changes.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidRecord(format!(
                "`{}` cannot be updated",
                ID_FIELD
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $3
            WHERE collection = $1 AND body @> $2
            "#,
        )
        .bind(collection)
        .bind(Json(filter.fields()))
        .bind(Json(&changes))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::Conflict(conflicting_field(db_err.constraint()));
                }
            }
            StoreError::Backend(e.to_string())
        })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND body @> $2
            "#,
        )
        .bind(collection)
        .bind(Json(filter.fields()))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Field name encoded in a unique index name.
fn conflicting_field(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("documents_pkey") => ID_FIELD.to_string(),
        Some(name) => name
            .strip_suffix("_key")
            .and_then(|rest| rest.rsplit('_').next())
            .unwrap_or(name)
            .to_string(),
    }
}
