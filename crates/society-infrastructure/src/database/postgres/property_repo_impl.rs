// ============================================================================
// Society Infrastructure - PostgreSQL Property Repository
// File: crates/society-infrastructure/src/database/postgres/property_repo_impl.rs
// ============================================================================
//! The Property aggregate (structures, contact, invites) is one JSONB document.
//! `version` lives in its own column so updates can be conditional on it.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use society_core::domain::Property;
use society_core::error::DomainError;
use society_core::repositories::PropertyRepository;

pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PropertyRow {
    pub version: i64,
    pub document: serde_json::Value,
}

impl TryFrom<PropertyRow> for Property {
    type Error = DomainError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let mut property: Property = serde_json::from_value(row.document)
            .map_err(|e| DomainError::DatabaseError(format!("corrupt property document: {}", e)))?;
        property.version = row.version;
        Ok(property)
    }
}

fn to_document(property: &Property) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(property).map_err(|e| DomainError::InternalError(e.to_string()))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Property>, DomainError> {
        let row: Option<PropertyRow> =
            sqlx::query_as("SELECT version, document FROM properties WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding property", e))?;

        row.map(Property::try_from).transpose()
    }

    async fn find_by_admin(&self, admin_id: &Uuid) -> Result<Option<Property>, DomainError> {
        let row: Option<PropertyRow> =
            sqlx::query_as("SELECT version, document FROM properties WHERE admin_id = $1")
                .bind(admin_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding property by admin", e))?;

        row.map(Property::try_from).transpose()
    }

    async fn create(&self, property: &Property) -> Result<Property, DomainError> {
        info!("Creating property {} for admin {}", property.id, property.admin_id);

        let row: PropertyRow = sqlx::query_as(
            r#"
            INSERT INTO properties (id, admin_id, version, document, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING version, document
            "#,
        )
        .bind(property.id)
        .bind(property.admin_id)
        .bind(property.version)
        .bind(to_document(property)?)
        .bind(property.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating property", e))?;

        Property::try_from(row)
    }

    async fn update(&self, property: &Property) -> Result<Property, DomainError> {
        let mut next = property.clone();
        next.version = property.version + 1;

        let row: Option<PropertyRow> = sqlx::query_as(
            r#"
            UPDATE properties
            SET document = $3, version = $4, modified_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING version, document
            "#,
        )
        .bind(property.id)
        .bind(property.version)
        .bind(to_document(&next)?)
        .bind(next.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating property", e))?;

        match row {
            Some(row) => Property::try_from(row),
            None => {
                // Either the row is gone or someone else bumped the version
                let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM properties WHERE id = $1")
                    .bind(property.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| db_error("checking property version", e))?;
                match exists {
                    Some((current,)) => {
                        warn!(
                            "Stale write to property {}: expected version {}, found {}",
                            property.id, property.version, current
                        );
                        Err(DomainError::ConcurrentModification)
                    }
                    None => Err(DomainError::PropertyNotFound),
                }
            }
        }
    }
}
