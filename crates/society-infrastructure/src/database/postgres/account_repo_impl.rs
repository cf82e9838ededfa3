// ============================================================================
// Society Infrastructure - PostgreSQL Account Repository
// File: crates/society-infrastructure/src/database/postgres/account_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use society_core::domain::{Account, Role};
use society_core::error::DomainError;
use society_core::repositories::AccountRepository;

const ACCOUNT_COLUMNS: &str = r#"
    id, name, email, phone, role, password_hash, property_id,
    assigned_unit, is_active, created_at, modified_at, last_login
"#;

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub property_id: Option<Uuid>,
    pub assigned_unit: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .ok_or_else(|| DomainError::DatabaseError(format!("unknown role '{}'", row.role)))?;
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role,
            password_hash: row.password_hash,
            property_id: row.property_id,
            assigned_unit: row.assigned_unit,
            is_active: row.is_active,
            created_at: row.created_at,
            modified_at: row.modified_at,
            last_login: row.last_login,
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding account by id", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE LOWER(email) = LOWER($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding account by email", e))?;

        row.map(Account::try_from).transpose()
    }

    async fn list_by_property(&self, property_id: &Uuid, role: Option<Role>) -> Result<Vec<Account>, DomainError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM accounts
            WHERE property_id = $1 AND ($2::VARCHAR IS NULL OR role = $2)
            ORDER BY created_at
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(property_id)
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing accounts", e))?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn create(&self, account: &Account) -> Result<Account, DomainError> {
        info!("Creating {} account {}", account.role.as_str(), account.id);

        let row: AccountRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO accounts (
                id, name, email, phone, role, password_hash, property_id,
                assigned_unit, is_active, created_at, modified_at, last_login
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(account.property_id)
        .bind(&account.assigned_unit)
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.modified_at)
        .bind(account.last_login)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            let duplicate = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                DomainError::AccountExists(account.email.clone())
            } else {
                db_error("creating account", e)
            }
        })?;

        Account::try_from(row)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r#"
            UPDATE accounts SET
                name = $2, phone = $3, password_hash = $4, property_id = $5,
                assigned_unit = $6, is_active = $7, modified_at = NOW(), last_login = $8
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .bind(account.property_id)
        .bind(&account.assigned_unit)
        .bind(account.is_active)
        .bind(account.last_login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating account", e))?;

        row.map(Account::try_from)
            .transpose()?
            .ok_or(DomainError::AccountNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting account", e))?;
        Ok(())
    }
}
