use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::labs::LabStore;
use crate::models::lab::Lab;

/// Reads labs straight from Postgres. NULL text columns come back as empty strings.
#[derive(Clone)]
pub struct PgLabStore {
    pool: PgPool,
    select_sql: String,
}

impl PgLabStore {
    /// `table` must already be a validated plain identifier (see `Config::from_env`).
    pub fn new(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            select_sql: build_select(table),
        }
    }
}

fn build_select(table: &str) -> String {
    format!(
        r#"SELECT id::bigint AS id,
               COALESCE("Department", '') AS "Department",
               COALESCE("Professor Name", '') AS "Professor Name",
               COALESCE("Contact", '') AS "Contact",
               COALESCE("Lab Name", '') AS "Lab Name",
               COALESCE("Major", '') AS "Major",
               COALESCE("How to apply", '') AS "How to apply",
               COALESCE("Description", '') AS "Description"
        FROM "{table}""#
    )
}

#[async_trait]
impl LabStore for PgLabStore {
    async fn fetch_all(&self) -> Result<Vec<Lab>, AppError> {
        let sql = format!("{} ORDER BY id", self.select_sql);
        let labs = sqlx::query_as::<_, Lab>(&sql)
            .fetch_all(&self.pool)
            .await?;
        debug!("Fetched {} labs from Postgres", labs.len());
        Ok(labs)
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Lab>, AppError> {
        let sql = format!("{} WHERE id = $1", self.select_sql);
        let lab = sqlx::query_as::<_, Lab>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lab)
    }
}
