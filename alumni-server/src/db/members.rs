//! Member Repository

use async_trait::async_trait;
use shared::models::{Member, MemberCreate};

use super::{Database, DbError};

const MEMBER_COLUMNS: &str = "id, name_bengali, name_english, ssc_batch, address_present, address_permanent, phone, email, occupation, marital_status, membership_category, image, created_at";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique email index rejected the row
    #[error("Duplicate email: {0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Connection(#[from] DbError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Member persistence
///
/// `insert` is the authority on email uniqueness; `find_by_email` is only a
/// fast path for the common, non-racing case.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;

    async fn insert(&self, data: MemberCreate) -> Result<Member, StoreError>;
}

/// SQLite-backed member store
#[derive(Clone)]
pub struct SqliteMemberStore {
    db: Database,
}

impl SqliteMemberStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberStore for SqliteMemberStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let pool = self.db.ensure_connected().await?;
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE email = ?");
        let row = sqlx::query_as::<_, Member>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, data: MemberCreate) -> Result<Member, StoreError> {
        let pool = self.db.ensure_connected().await?;
        let now = shared::util::now_millis();
        let sql = format!(
            "INSERT INTO members (name_bengali, name_english, ssc_batch, address_present, address_permanent, phone, email, occupation, marital_status, membership_category, image, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) RETURNING {MEMBER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, Member>(&sql)
            .bind(&data.name_bengali)
            .bind(&data.name_english)
            .bind(&data.ssc_batch)
            .bind(&data.address_present)
            .bind(&data.address_permanent)
            .bind(&data.phone)
            .bind(&data.email)
            .bind(&data.occupation)
            .bind(data.marital_status.map(|s| s.as_str()))
            .bind(data.membership_category.map(|c| c.as_str()))
            .bind(&data.image)
            .bind(now)
            .fetch_one(pool)
            .await;

        match result {
            Ok(member) => Ok(member),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateKey(data.email))
            }
            Err(e) => Err(e.into()),
        }
    }
}
