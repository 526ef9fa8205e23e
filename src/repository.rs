use crate::models::{Drink, DrinkPayload};
use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;

/// RepositoryError
///
/// Persistence failures. Handlers never expose these directly; each maps them to the
/// coarse class its operation calls for.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("a drink titled {0:?} already exists")]
    DuplicateTitle(String),
}

/// Repository Trait
///
/// The persistence contract for drinks. Handlers only see this trait, so the Postgres
/// implementation can be swapped for the in-memory one in tests.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` usable across Axum's tasks.
/// No concurrency control is applied: concurrent writes to the same id are last-write-wins.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError>;
    async fn get_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError>;
    async fn insert_drink(&self, payload: DrinkPayload) -> Result<Drink, RepositoryError>;
    // Replaces title and recipe wholesale. `None` if the id does not exist.
    async fn update_drink(&self, id: i64, payload: DrinkPayload) -> Result<Option<Drink>, RepositoryError>;
    // Returns the removed row. `None` if the id does not exist.
    async fn delete_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the `drinks` table.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ensure_schema
    ///
    /// LOCAL-ONLY convenience: creates the `drinks` table on a fresh development database.
    /// Production schemas are managed outside this service.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS drinks (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(80) NOT NULL UNIQUE,
                recipe JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError> {
        let drinks = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(drinks)
    }

    async fn get_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError> {
        let drink = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(drink)
    }

    async fn insert_drink(&self, payload: DrinkPayload) -> Result<Drink, RepositoryError> {
        let drink = sqlx::query_as::<_, Drink>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&payload.title)
        .bind(Json(&payload.recipe))
        .fetch_one(&self.pool)
        .await?;
        Ok(drink)
    }

    async fn update_drink(&self, id: i64, payload: DrinkPayload) -> Result<Option<Drink>, RepositoryError> {
        let drink = sqlx::query_as::<_, Drink>(
            "UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1 RETURNING id, title, recipe",
        )
        .bind(id)
        .bind(&payload.title)
        .bind(Json(&payload.recipe))
        .fetch_optional(&self.pool)
        .await?;
        Ok(drink)
    }

    async fn delete_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError> {
        let drink = sqlx::query_as::<_, Drink>("DELETE FROM drinks WHERE id = $1 RETURNING id, title, recipe")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(drink)
    }
}

/// InMemoryRepository
///
/// Map-backed `Repository` for tests. Assigns ids from a counter and rejects duplicate
/// titles the same way the table's UNIQUE constraint does.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<InMemoryTable>,
}

#[derive(Default)]
struct InMemoryTable {
    next_id: i64,
    rows: BTreeMap<i64, Drink>,
}

impl InMemoryTable {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_drinks(&self) -> Result<Vec<Drink>, RepositoryError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn insert_drink(&self, payload: DrinkPayload) -> Result<Drink, RepositoryError> {
        let mut table = self.inner.write().await;
        if table.title_taken(&payload.title, None) {
            return Err(RepositoryError::DuplicateTitle(payload.title));
        }

        table.next_id += 1;
        let drink = Drink {
            id: table.next_id,
            title: payload.title,
            recipe: Json(payload.recipe),
        };
        table.rows.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn update_drink(&self, id: i64, payload: DrinkPayload) -> Result<Option<Drink>, RepositoryError> {
        let mut table = self.inner.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.title_taken(&payload.title, Some(id)) {
            return Err(RepositoryError::DuplicateTitle(payload.title));
        }

        let drink = Drink {
            id,
            title: payload.title,
            recipe: Json(payload.recipe),
        };
        table.rows.insert(id, drink.clone());
        Ok(Some(drink))
    }

    async fn delete_drink(&self, id: i64) -> Result<Option<Drink>, RepositoryError> {
        Ok(self.inner.write().await.rows.remove(&id))
    }
}
