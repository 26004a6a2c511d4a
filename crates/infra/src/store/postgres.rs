//! Postgres-backed marketplace store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | duplicate email, pending deal or favorite |
//! | Database (foreign key violation) | `23503` | `NotFound` | referenced car/store deleted or never existed |
//! | Database (other) | Any other | `Backend` | check constraints, syntax, permissions |
//! | Other | N/A | `Backend` | pool closed, network, decode failures |
//!
//! ## Atomicity
//!
//! Each trait method runs as one statement or one transaction. Uniqueness
//! is enforced by the schema in `migrations/0001_init.sql`; the code never
//! reads to decide whether an insert may proceed.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use dealership_catalog::{Car, CarFilter, CarSpec, Favorite, Store};
use dealership_core::{BuyerId, CarId, DealId, FavoriteId, QuestionId, SellerId, StoreId};
use dealership_parties::{Buyer, Preferences, Seller};
use dealership_sales::{Deal, DealStatus, Question};

use super::{
    AccountStore, CarStore, CarSummary, DealListing, DealStore, FavoriteStore, QuestionStore,
    StoreDirectory, StoreError,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const BUYER_COLUMNS: &str = "id, email, password_hash, full_name, contact_info, \
     preferred_brand, preferred_model, min_year, max_year, min_power, max_power, \
     preferred_transmission, preferred_condition, max_price, created_at";

const SELLER_COLUMNS: &str = "id, email, password_hash, full_name, contact_info, created_at";

const CAR_COLUMNS: &str = "id, seller_id, store_id, brand, model, year, power, transmission, \
     condition, mileage, price, features, status, created_at";

const DEAL_LISTING_SELECT: &str = r#"
    SELECT
        d.id, d.buyer_id, d.car_id, d.price, d.status, d.deal_date,
        c.brand, c.model, c.year,
        s.full_name AS seller_name,
        b.full_name AS buyer_name,
        b.contact_info AS buyer_contact
    FROM deals d
    JOIN cars c ON c.id = d.car_id
    JOIN sellers s ON s.id = c.seller_id
    JOIN buyers b ON b.id = d.buyer_id
"#;

/// Postgres-backed store. Cheap to clone; all clones share one pool.
#[derive(Debug, Clone)]
pub struct PostgresMarketplace {
    pool: Arc<PgPool>,
}

impl PostgresMarketplace {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables and indexes. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn claim_email_and_insert(
        &self,
        email: &str,
        kind: &str,
        insert: sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("INSERT INTO principal_emails (email, kind) VALUES ($1, $2)")
            .bind(email)
            .bind(kind)
            .execute(&mut *tx)
            .await
            .map_err(|e| match map_sqlx_error("claim_email", e) {
                StoreError::Conflict(_) => {
                    StoreError::Conflict("email already registered".to_string())
                }
                other => other,
            })?;

        insert
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_principal", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }
}

#[async_trait]
impl AccountStore for PostgresMarketplace {
    #[instrument(skip(self, buyer), fields(buyer_id = %buyer.id), err)]
    async fn insert_buyer(&self, buyer: &Buyer) -> Result<(), StoreError> {
        let p = &buyer.preferences;
        let insert = sqlx::query(
            r#"
            INSERT INTO buyers (
                id, email, password_hash, full_name, contact_info,
                preferred_brand, preferred_model, min_year, max_year, min_power, max_power,
                preferred_transmission, preferred_condition, max_price, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(*buyer.id.as_uuid())
        .bind(&buyer.email)
        .bind(&buyer.password_hash)
        .bind(&buyer.full_name)
        .bind(&buyer.contact_info)
        .bind(&p.preferred_brand)
        .bind(&p.preferred_model)
        .bind(p.min_year)
        .bind(p.max_year)
        .bind(p.min_power)
        .bind(p.max_power)
        .bind(p.preferred_transmission.map(|t| t.as_str()))
        .bind(p.preferred_condition.map(|c| c.as_str()))
        .bind(p.max_price)
        .bind(buyer.created_at);

        self.claim_email_and_insert(&buyer.email, "buyer", insert).await
    }

    #[instrument(skip(self, seller), fields(seller_id = %seller.id), err)]
    async fn insert_seller(&self, seller: &Seller) -> Result<(), StoreError> {
        let insert = sqlx::query(
            r#"
            INSERT INTO sellers (id, email, password_hash, full_name, contact_info, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*seller.id.as_uuid())
        .bind(&seller.email)
        .bind(&seller.password_hash)
        .bind(&seller.full_name)
        .bind(&seller.contact_info)
        .bind(seller.created_at);

        self.claim_email_and_insert(&seller.email, "seller", insert).await
    }

    async fn buyer_by_email(&self, email: &str) -> Result<Option<Buyer>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("buyer_by_email", e))?;
        row.as_ref().map(buyer_from_row).transpose()
    }

    async fn seller_by_email(&self, email: &str) -> Result<Option<Seller>, StoreError> {
        let row = sqlx::query(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seller_by_email", e))?;
        row.as_ref().map(seller_from_row).transpose()
    }

    async fn buyer(&self, id: BuyerId) -> Result<Option<Buyer>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("buyer", e))?;
        row.as_ref().map(buyer_from_row).transpose()
    }

    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError> {
        let row = sqlx::query(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seller", e))?;
        row.as_ref().map(seller_from_row).transpose()
    }

    async fn list_buyers(&self) -> Result<Vec<Buyer>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {BUYER_COLUMNS} FROM buyers ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_buyers", e))?;
        rows.iter().map(buyer_from_row).collect()
    }
}

#[async_trait]
impl StoreDirectory for PostgresMarketplace {
    async fn insert_store(&self, store: &Store) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO stores (id, name, address, created_at) VALUES ($1, $2, $3, $4)")
            .bind(*store.id.as_uuid())
            .bind(&store.name)
            .bind(&store.address)
            .bind(store.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_store", e))?;
        Ok(())
    }

    async fn store(&self, id: StoreId) -> Result<Option<Store>, StoreError> {
        let row = sqlx::query("SELECT id, name, address, created_at FROM stores WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("store", e))?;
        row.as_ref().map(store_from_row).transpose()
    }

    async fn stores_with_car_counts(&self) -> Result<Vec<(Store, i64)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.address, s.created_at, COUNT(c.id) AS cars_count
            FROM stores s
            LEFT JOIN cars c ON c.store_id = s.id
            GROUP BY s.id
            ORDER BY s.id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("stores_with_car_counts", e))?;

        rows.iter()
            .map(|row| {
                let cars_count: i64 = get(row, "cars_count")?;
                Ok((store_from_row(row)?, cars_count))
            })
            .collect()
    }
}

#[async_trait]
impl CarStore for PostgresMarketplace {
    #[instrument(skip(self, car), fields(car_id = %car.id, seller_id = %car.seller_id), err)]
    async fn insert_car(&self, car: &Car) -> Result<(), StoreError> {
        let s = &car.spec;
        sqlx::query(
            r#"
            INSERT INTO cars (
                id, seller_id, store_id, brand, model, year, power, transmission,
                condition, mileage, price, features, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*car.id.as_uuid())
        .bind(*car.seller_id.as_uuid())
        .bind(car.store_id.map(|id| *id.as_uuid()))
        .bind(&s.brand)
        .bind(&s.model)
        .bind(s.year)
        .bind(s.power)
        .bind(s.transmission.as_str())
        .bind(s.condition.as_str())
        .bind(s.mileage)
        .bind(s.price)
        .bind(Json(&s.features))
        .bind(car.status.as_str())
        .bind(car.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_car", e))?;
        Ok(())
    }

    async fn car(&self, id: CarId) -> Result<Option<Car>, StoreError> {
        let row = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("car", e))?;
        row.as_ref().map(car_from_row).transpose()
    }

    #[instrument(skip(self, filter), fields(car_count = tracing::field::Empty), err)]
    async fn search_cars(&self, filter: &CarFilter) -> Result<Vec<Car>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CAR_COLUMNS} FROM cars WHERE TRUE"));

        if let Some(brand) = &filter.brand {
            qb.push(" AND brand ILIKE ").push_bind(like_pattern(brand));
        }
        if let Some(model) = &filter.model {
            qb.push(" AND model ILIKE ").push_bind(like_pattern(model));
        }
        if let Some(v) = filter.min_year {
            qb.push(" AND year >= ").push_bind(v);
        }
        if let Some(v) = filter.max_year {
            qb.push(" AND year <= ").push_bind(v);
        }
        if let Some(v) = filter.min_price {
            qb.push(" AND price >= ").push_bind(v);
        }
        if let Some(v) = filter.max_price {
            qb.push(" AND price <= ").push_bind(v);
        }
        if let Some(v) = filter.condition {
            qb.push(" AND condition = ").push_bind(v.as_str());
        }
        if let Some(v) = filter.transmission {
            qb.push(" AND transmission = ").push_bind(v.as_str());
        }
        if let Some(v) = filter.max_mileage {
            qb.push(" AND mileage <= ").push_bind(v);
        }
        let (offset, limit) = filter.page_bounds();
        qb.push(" ORDER BY id OFFSET ")
            .push_bind(offset)
            .push(" LIMIT ")
            .push_bind(limit);

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_cars", e))?;

        Span::current().record("car_count", rows.len());
        rows.iter().map(car_from_row).collect()
    }

    async fn cars_by_seller(&self, seller_id: SellerId) -> Result<Vec<Car>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE seller_id = $1 ORDER BY id"
        ))
        .bind(*seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("cars_by_seller", e))?;
        rows.iter().map(car_from_row).collect()
    }

    async fn count_cars_by_seller(&self, seller_id: SellerId) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars WHERE seller_id = $1")
            .bind(*seller_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_cars_by_seller", e))
    }

    async fn car_prices(&self) -> Result<Vec<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT price FROM cars")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("car_prices", e))
    }

    async fn most_expensive_car(&self) -> Result<Option<Car>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {CAR_COLUMNS} FROM cars ORDER BY price DESC, created_at, id LIMIT 1"
        ))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("most_expensive_car", e))?;
        row.as_ref().map(car_from_row).transpose()
    }

    #[instrument(skip(self, car), fields(car_id = %car.id), err)]
    async fn update_car(&self, car: &Car) -> Result<(), StoreError> {
        let s = &car.spec;
        let result = sqlx::query(
            r#"
            UPDATE cars SET
                store_id = $2, brand = $3, model = $4, year = $5, power = $6,
                transmission = $7, condition = $8, mileage = $9, price = $10,
                features = $11, status = $12
            WHERE id = $1
            "#,
        )
        .bind(*car.id.as_uuid())
        .bind(car.store_id.map(|id| *id.as_uuid()))
        .bind(&s.brand)
        .bind(&s.model)
        .bind(s.year)
        .bind(s.power)
        .bind(s.transmission.as_str())
        .bind(s.condition.as_str())
        .bind(s.mileage)
        .bind(s.price)
        .bind(Json(&s.features))
        .bind(car.status.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_car", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("car".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(car_id = %id), err)]
    async fn delete_car(&self, id: CarId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // The row lock makes concurrent deal inserts (FK key-share lock) wait.
        let row = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1 FOR UPDATE"))
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_car", e))?
            .ok_or_else(|| StoreError::NotFound("car".to_string()))?;
        let car = car_from_row(&row)?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM deals WHERE car_id = $1 AND status IN ('pending', 'approved')",
        )
        .bind(*id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("count_active_deals", e))?;

        car.ensure_deletable(active as usize)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_car", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }
}

#[async_trait]
impl DealStore for PostgresMarketplace {
    #[instrument(skip(self, deal), fields(deal_id = %deal.id, car_id = %deal.car_id), err)]
    async fn insert_deal(&self, deal: &Deal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO deals (id, buyer_id, car_id, price, status, deal_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*deal.id.as_uuid())
        .bind(*deal.buyer_id.as_uuid())
        .bind(*deal.car_id.as_uuid())
        .bind(deal.price)
        .bind(deal.status.as_str())
        .bind(deal.deal_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_deal", e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("a pending deal for this car already exists".to_string())
            }
            other => other,
        })?;
        Ok(())
    }

    async fn deal(&self, id: DealId) -> Result<Option<Deal>, StoreError> {
        let row = sqlx::query(
            "SELECT id, buyer_id, car_id, price, status, deal_date FROM deals WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deal", e))?;
        row.as_ref().map(deal_from_row).transpose()
    }

    async fn deals_for_buyer(&self, buyer_id: BuyerId) -> Result<Vec<DealListing>, StoreError> {
        let rows = sqlx::query(&format!(
            "{DEAL_LISTING_SELECT} WHERE d.buyer_id = $1 ORDER BY d.deal_date, d.id"
        ))
        .bind(*buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deals_for_buyer", e))?;
        rows.iter().map(deal_listing_from_row).collect()
    }

    async fn deals_for_seller(&self, seller_id: SellerId) -> Result<Vec<DealListing>, StoreError> {
        let rows = sqlx::query(&format!(
            "{DEAL_LISTING_SELECT} WHERE c.seller_id = $1 ORDER BY d.deal_date, d.id"
        ))
        .bind(*seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deals_for_seller", e))?;
        rows.iter().map(deal_listing_from_row).collect()
    }

    #[instrument(skip(self), fields(deal_id = %id, from = %expected, to = %next), err)]
    async fn update_deal_status(
        &self,
        id: DealId,
        expected: DealStatus,
        next: DealStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE deals SET status = $3 WHERE id = $1 AND status = $2")
            .bind(*id.as_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_deal_status", e))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }
        match self.deal(id).await? {
            None => Err(StoreError::NotFound("deal".to_string())),
            Some(current) => Err(StoreError::Conflict(format!(
                "deal status changed concurrently (now '{}')",
                current.status
            ))),
        }
    }
}

#[async_trait]
impl QuestionStore for PostgresMarketplace {
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, car_id, buyer_id, question, answer, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*question.id.as_uuid())
        .bind(*question.car_id.as_uuid())
        .bind(*question.buyer_id.as_uuid())
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_question", e))?;
        Ok(())
    }

    async fn question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        let row = sqlx::query(
            "SELECT id, car_id, buyer_id, question, answer, created_at FROM questions WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("question", e))?;
        row.as_ref().map(question_from_row).transpose()
    }

    async fn questions_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, car_id, buyer_id, question, answer, created_at
            FROM questions
            WHERE buyer_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(*buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("questions_by_buyer", e))?;
        rows.iter().map(question_from_row).collect()
    }

    async fn questions_for_seller(&self, seller_id: SellerId) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.car_id, q.buyer_id, q.question, q.answer, q.created_at
            FROM questions q
            JOIN cars c ON c.id = q.car_id
            WHERE c.seller_id = $1
            ORDER BY q.created_at, q.id
            "#,
        )
        .bind(*seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("questions_for_seller", e))?;
        rows.iter().map(question_from_row).collect()
    }

    async fn set_answer(&self, id: QuestionId, answer: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE questions SET answer = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(answer)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_answer", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("question".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for PostgresMarketplace {
    async fn insert_favorite(&self, favorite: &Favorite) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO favorites (id, buyer_id, car_id, added_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(*favorite.id.as_uuid())
        .bind(*favorite.buyer_id.as_uuid())
        .bind(*favorite.car_id.as_uuid())
        .bind(favorite.added_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_favorite", e) {
            StoreError::Conflict(_) => StoreError::Conflict("car is already a favorite".to_string()),
            other => other,
        })?;
        Ok(())
    }

    async fn remove_favorite(&self, buyer_id: BuyerId, car_id: CarId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM favorites WHERE buyer_id = $1 AND car_id = $2")
            .bind(*buyer_id.as_uuid())
            .bind(*car_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_favorite", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("favorite".to_string()));
        }
        Ok(())
    }

    async fn favorites_of(&self, buyer_id: BuyerId) -> Result<Vec<(Favorite, Car)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                f.id AS favorite_id, f.buyer_id, f.added_at,
                c.id, c.seller_id, c.store_id, c.brand, c.model, c.year, c.power,
                c.transmission, c.condition, c.mileage, c.price, c.features, c.status,
                c.created_at
            FROM favorites f
            JOIN cars c ON c.id = f.car_id
            WHERE f.buyer_id = $1
            ORDER BY f.added_at DESC, f.id DESC
            "#,
        )
        .bind(*buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("favorites_of", e))?;

        rows.iter()
            .map(|row| {
                let car = car_from_row(row)?;
                let favorite = Favorite {
                    id: FavoriteId::from_uuid(get(row, "favorite_id")?),
                    buyer_id: BuyerId::from_uuid(get(row, "buyer_id")?),
                    car_id: car.id,
                    added_at: get(row, "added_at")?,
                };
                Ok((favorite, car))
            })
            .collect()
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("failed to decode column '{column}': {e}")))
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = get(row, column)?;
    raw.parse()
        .map_err(|e| StoreError::Backend(format!("corrupt value in column '{column}': {e}")))
}

fn parse_optional_column<T>(row: &PgRow, column: &str) -> Result<Option<T>, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    let raw: Option<String> = get(row, column)?;
    raw.map(|s| {
        s.parse()
            .map_err(|e| StoreError::Backend(format!("corrupt value in column '{column}': {e}")))
    })
    .transpose()
}

fn buyer_from_row(row: &PgRow) -> Result<Buyer, StoreError> {
    Ok(Buyer {
        id: BuyerId::from_uuid(get(row, "id")?),
        email: get(row, "email")?,
        password_hash: get(row, "password_hash")?,
        full_name: get(row, "full_name")?,
        contact_info: get(row, "contact_info")?,
        preferences: Preferences {
            preferred_brand: get(row, "preferred_brand")?,
            preferred_model: get(row, "preferred_model")?,
            min_year: get(row, "min_year")?,
            max_year: get(row, "max_year")?,
            min_power: get(row, "min_power")?,
            max_power: get(row, "max_power")?,
            preferred_transmission: parse_optional_column(row, "preferred_transmission")?,
            preferred_condition: parse_optional_column(row, "preferred_condition")?,
            max_price: get(row, "max_price")?,
        },
        created_at: get(row, "created_at")?,
    })
}

fn seller_from_row(row: &PgRow) -> Result<Seller, StoreError> {
    Ok(Seller {
        id: SellerId::from_uuid(get(row, "id")?),
        email: get(row, "email")?,
        password_hash: get(row, "password_hash")?,
        full_name: get(row, "full_name")?,
        contact_info: get(row, "contact_info")?,
        created_at: get(row, "created_at")?,
    })
}

fn store_from_row(row: &PgRow) -> Result<Store, StoreError> {
    Ok(Store {
        id: StoreId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        address: get(row, "address")?,
        created_at: get(row, "created_at")?,
    })
}

fn car_from_row(row: &PgRow) -> Result<Car, StoreError> {
    let store_id: Option<Uuid> = get(row, "store_id")?;
    let features: Json<Vec<String>> = get(row, "features")?;
    Ok(Car {
        id: CarId::from_uuid(get(row, "id")?),
        seller_id: SellerId::from_uuid(get(row, "seller_id")?),
        store_id: store_id.map(StoreId::from_uuid),
        spec: CarSpec {
            brand: get(row, "brand")?,
            model: get(row, "model")?,
            year: get(row, "year")?,
            power: get(row, "power")?,
            transmission: parse_column(row, "transmission")?,
            condition: parse_column(row, "condition")?,
            mileage: get(row, "mileage")?,
            price: get(row, "price")?,
            features: features.0,
        },
        status: parse_column(row, "status")?,
        created_at: get(row, "created_at")?,
    })
}

fn deal_from_row(row: &PgRow) -> Result<Deal, StoreError> {
    Ok(Deal {
        id: DealId::from_uuid(get(row, "id")?),
        buyer_id: BuyerId::from_uuid(get(row, "buyer_id")?),
        car_id: CarId::from_uuid(get(row, "car_id")?),
        price: get(row, "price")?,
        status: parse_column(row, "status")?,
        deal_date: get(row, "deal_date")?,
    })
}

fn deal_listing_from_row(row: &PgRow) -> Result<DealListing, StoreError> {
    let deal = deal_from_row(row)?;
    Ok(DealListing {
        car: CarSummary {
            id: deal.car_id,
            brand: get(row, "brand")?,
            model: get(row, "model")?,
            year: get(row, "year")?,
        },
        deal,
        seller_name: get(row, "seller_name")?,
        buyer_name: get(row, "buyer_name")?,
        buyer_contact: get(row, "buyer_contact")?,
    })
}

fn question_from_row(row: &PgRow) -> Result<Question, StoreError> {
    Ok(Question {
        id: QuestionId::from_uuid(get(row, "id")?),
        car_id: CarId::from_uuid(get(row, "car_id")?),
        buyer_id: BuyerId::from_uuid(get(row, "buyer_id")?),
        question: get(row, "question")?,
        answer: get(row, "answer")?,
        created_at: get(row, "created_at")?,
    })
}

/// `%text%` with LIKE wildcards in the input escaped.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Foreign-key constraint names follow `<table>_<column>_fkey`; report the
/// referenced entity (`cars_store_id_fkey` -> `store`).
fn missing_reference(constraint: Option<&str>) -> String {
    constraint
        .and_then(|c| c.strip_suffix("_id_fkey"))
        .and_then(|c| c.rsplit('_').next())
        .unwrap_or("referenced row")
        .to_string()
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(missing_reference(db_err.constraint())),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("toy"), "%toy%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn foreign_key_names_map_to_entities() {
        assert_eq!(missing_reference(Some("cars_store_id_fkey")), "store");
        assert_eq!(missing_reference(Some("deals_car_id_fkey")), "car");
        assert_eq!(missing_reference(None), "referenced row");
    }

    #[test]
    fn schema_backs_every_uniqueness_rule() {
        assert!(SCHEMA.contains("email TEXT PRIMARY KEY"));
        assert!(SCHEMA.contains("WHERE status = 'pending'"));
        assert!(SCHEMA.contains("UNIQUE (buyer_id, car_id)"));
    }
}
