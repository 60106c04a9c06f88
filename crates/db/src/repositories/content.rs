use chrono::{DateTime, Utc};
use sqlx::Row;

use super::{ContentDocument, ContentStore, RepositoryError};
use crate::DbPool;

pub struct SqlContentStore {
    pool: DbPool,
}

impl SqlContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<ContentDocument, RepositoryError> {
    let collection: String =
        row.try_get("collection").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let body_json: String =
        row.try_get("body_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let position: i64 =
        row.try_get("position").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("updated_at `{updated_at_str}`: {e}")))?;

    Ok(ContentDocument { collection, id, body_json, position, updated_at })
}

#[async_trait::async_trait]
impl ContentStore for SqlContentStore {
    async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<ContentDocument>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT collection, id, body_json, position, updated_at
             FROM content_document
             WHERE collection = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_document).collect::<Result<Vec<_>, _>>()
    }

    async fn put_document(&self, document: ContentDocument) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO content_document (collection, id, body_json, position, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET
                 body_json = excluded.body_json,
                 position = excluded.position,
                 updated_at = excluded.updated_at",
        )
        .bind(&document.collection)
        .bind(&document.id)
        .bind(&document.body_json)
        .bind(document.position)
        .bind(document.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM content_document WHERE collection = ?")
            .bind(collection)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::SqlContentStore;
    use crate::repositories::{ContentDocument, ContentStore};
    use crate::{connect_with_settings, migrations};

    async fn store() -> SqlContentStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlContentStore::new(pool)
    }

    #[tokio::test]
    async fn documents_are_listed_by_position_within_collection() {
        let store = store().await;
        store
            .put_document(ContentDocument::new("estimator_items", "seo", &json!({"price": 800}), 2))
            .await
            .expect("save seo");
        store
            .put_document(ContentDocument::new(
                "estimator_items",
                "landing",
                &json!({"price": 1000}),
                1,
            ))
            .await
            .expect("save landing");
        store
            .put_document(ContentDocument::new("testimonials", "t-1", &json!({}), 0))
            .await
            .expect("save testimonial");

        let ids = store
            .list_documents("estimator_items")
            .await
            .expect("list")
            .into_iter()
            .map(|document| document.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["landing", "seo"]);
    }

    #[tokio::test]
    async fn put_replaces_existing_document() {
        let store = store().await;
        store
            .put_document(ContentDocument::new("estimator_items", "seo", &json!({"price": 800}), 0))
            .await
            .expect("first save");
        store
            .put_document(ContentDocument::new("estimator_items", "seo", &json!({"price": 950}), 0))
            .await
            .expect("second save");

        let documents = store.list_documents("estimator_items").await.expect("list");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].body_json, r#"{"price":950}"#);
    }

    #[tokio::test]
    async fn delete_collection_reports_removed_rows() {
        let store = store().await;
        for (position, id) in ["a", "b"].into_iter().enumerate() {
            store
                .put_document(ContentDocument::new("estimator_items", id, &json!({}), position as i64))
                .await
                .expect("save");
        }

        assert_eq!(store.delete_collection("estimator_items").await.expect("delete"), 2);
        assert!(store.list_documents("estimator_items").await.expect("list").is_empty());
    }
}
