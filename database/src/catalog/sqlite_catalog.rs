use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use types::{Card, CardId, Difficulty};

use super::{CardCatalog, CardFilter};
use crate::DatabaseError;

const CARD_COLUMNS: &str = "SELECT id, title, year, month, day, category, difficulty FROM cards";

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert_card(&self, card: &Card) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT OR REPLACE INTO cards (id, title, year, month, day, category, difficulty) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(card.id.as_str())
        .bind(&card.title)
        .bind(card.year)
        .bind(card.month.map(i64::from))
        .bind(card.day.map(i64::from))
        .bind(&card.category)
        .bind(card.difficulty.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &CardFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(difficulty) = filter.difficulty {
        builder.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if !filter.categories.is_empty() {
        builder.push(" AND category IN (");
        let mut separated = builder.separated(", ");
        for category in &filter.categories {
            separated.push_bind(category.clone());
        }
        separated.push_unseparated(")");
    }
}

fn date_part(id: &str, field: &str, value: Option<i64>) -> Result<Option<u8>, DatabaseError> {
    value
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| DatabaseError::Query(format!("card {id}: {field} {v} out of range")))
        })
        .transpose()
}

fn card_from_row(row: &SqliteRow) -> Result<Card, DatabaseError> {
    let query_err = |e: sqlx::Error| DatabaseError::Query(e.to_string());
    let id: String = row.try_get("id").map_err(query_err)?;
    let month: Option<i64> = row.try_get("month").map_err(query_err)?;
    let day: Option<i64> = row.try_get("day").map_err(query_err)?;
    let difficulty: String = row.try_get("difficulty").map_err(query_err)?;
    let month = date_part(&id, "month", month)?;
    let day = date_part(&id, "day", day)?;
    Ok(Card {
        id: CardId::new(id),
        title: row.try_get("title").map_err(query_err)?,
        year: row.try_get("year").map_err(query_err)?,
        month,
        day,
        category: row.try_get("category").map_err(query_err)?,
        difficulty: difficulty
            .parse::<Difficulty>()
            .map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl CardCatalog for SqliteCatalog {
    async fn sample(&self, filter: &CardFilter, count: usize) -> Result<Vec<Card>, DatabaseError> {
        let mut builder = QueryBuilder::<Sqlite>::new(CARD_COLUMNS);
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY RANDOM() LIMIT ")
            .push_bind(count as i64);
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        rows.iter().map(card_from_row).collect()
    }

    async fn get(&self, id: &CardId) -> Result<Option<Card>, DatabaseError> {
        let row = sqlx::query(&format!("{CARD_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        row.as_ref().map(card_from_row).transpose()
    }

    async fn count(&self, filter: &CardFilter) -> Result<usize, DatabaseError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM cards");
        push_filter(&mut builder, filter);
        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(total as usize)
    }
}
