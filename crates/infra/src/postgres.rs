//! Postgres-backed stores.
//!
//! Uniqueness and referential integrity are enforced by the schema and
//! surfaced through `map_sqlx_error` (`23505` -> `Duplicate`, `23503` ->
//! `ForeignKey`). The last-admin guard runs in a transaction that locks the
//! admin rows with `FOR UPDATE`, so two concurrent removals cannot both
//! pass the count.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;

use async_trait::async_trait;

use vendora_auth::{Role, User, UserUpdate};
use vendora_core::{ContactId, OfferId, ProductId, SupplierId, UserId};
use vendora_offers::{
    NewOffer, Offer, OfferFilter, OfferSort, OfferSortField, OfferUpdate, SortOrder,
};
use vendora_products::{NewProduct, Product, ProductUpdate};
use vendora_suppliers::{Contact, ContactUpdate, NewContact, NewSupplier, Supplier, SupplierUpdate};

use crate::error::{LastAdminOp, StoreError, StoreResult};
use crate::store::{
    ContactStore, NewUserRecord, OfferStore, ProductStore, SupplierStore, UserStore,
};

const SCHEMA: &str = include_str!("schema.sql");

/// Postgres implementation of every store trait, sharing one pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` with a small pool.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await
            .map_err(|e| StoreError::backend(format!("connect failed: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => {
            let detail = db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(detail),
                Some("23503") => StoreError::ForeignKey(detail),
                _ => StoreError::backend(format!("database error in {operation}: {detail}")),
            }
        }
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn column<T>(row: &PgRow, name: &str) -> StoreResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::backend(format!("column {name}: {e}")))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = column(row, "role")?;
    let role: Role = role
        .parse()
        .map_err(|e| StoreError::backend(format!("column role: {e}")))?;
    Ok(User {
        id: UserId::new(column(row, "id")?),
        username: column(row, "username")?,
        email: column(row, "email")?,
        password_hash: column(row, "password_hash")?,
        role,
        is_active: column(row, "is_active")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn supplier_from_row(row: &PgRow) -> StoreResult<Supplier> {
    Ok(Supplier {
        id: SupplierId::new(column(row, "id")?),
        name: column(row, "name")?,
        contact_person: column(row, "contact_person")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
        address: column(row, "address")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    Ok(Product {
        id: ProductId::new(column(row, "id")?),
        name: column(row, "name")?,
        description: column(row, "description")?,
        category: column(row, "category")?,
        unit_of_measure: column(row, "unit_of_measure")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn contact_from_row(row: &PgRow) -> StoreResult<Contact> {
    Ok(Contact {
        id: ContactId::new(column(row, "id")?),
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
        job_title: column(row, "job_title")?,
        supplier_id: SupplierId::new(column(row, "supplier_id")?),
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn offer_from_row(row: &PgRow) -> StoreResult<Offer> {
    Ok(Offer {
        id: OfferId::new(column(row, "id")?),
        price_cents: column(row, "price_cents")?,
        valid_from: column::<NaiveDate>(row, "valid_from")?,
        valid_to: column::<NaiveDate>(row, "valid_to")?,
        quantity: column(row, "quantity")?,
        notes: column(row, "notes")?,
        supplier_id: SupplierId::new(column(row, "supplier_id")?),
        product_id: ProductId::new(column(row, "product_id")?),
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

// ORDER BY columns are whitelisted here, never taken from the request.
fn offer_order_clause(sort: OfferSort) -> String {
    let col = match sort.field {
        OfferSortField::CreatedAt => "created_at",
        OfferSortField::PriceCents => "price_cents",
        OfferSortField::ValidFrom => "valid_from",
        OfferSortField::ValidTo => "valid_to",
        OfferSortField::Quantity => "quantity",
    };
    let dir = match sort.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!("ORDER BY {col} {dir}, id {dir}")
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_find_by_id", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_find_by_username", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_list", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, record), fields(username = %record.username), err)]
    async fn create(&self, record: NewUserRecord) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_create", e))?;
        user_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, changes: UserUpdate) -> StoreResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("user_update", e))?;

        let current = sqlx::query("SELECT role, is_active FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("user_update", e))?
            .ok_or(StoreError::NotFound)?;
        let role: String = column(&current, "role")?;

        if role == Role::Admin.as_str() && changes.deactivates() {
            let peers = sqlx::query(
                "SELECT id FROM users WHERE role = 'admin' AND is_active AND id <> $1 FOR UPDATE",
            )
            .bind(id.as_i64())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("user_update", e))?;
            if peers.is_empty() {
                return Err(StoreError::LastAdmin(LastAdminOp::Deactivate));
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE users SET
                username   = COALESCE($2, username),
                email      = COALESCE($3, email),
                role       = COALESCE($4, role),
                is_active  = COALESCE($5, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.username.as_deref().map(str::trim))
        .bind(changes.email.as_deref().map(str::trim))
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("user_update", e))?;
        let user = user_from_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("user_update", e))?;
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("user_delete", e))?;

        let target = sqlx::query("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("user_delete", e))?
            .ok_or(StoreError::NotFound)?;
        let role: String = column(&target, "role")?;

        if role == Role::Admin.as_str() {
            let peers =
                sqlx::query("SELECT id FROM users WHERE role = 'admin' AND id <> $1 FOR UPDATE")
                    .bind(id.as_i64())
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("user_delete", e))?;
            if peers.is_empty() {
                return Err(StoreError::LastAdmin(LastAdminOp::Delete));
            }
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("user_delete", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("user_delete", e))?;
        Ok(())
    }
}

#[async_trait]
impl SupplierStore for PgStore {
    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn find_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("supplier_find_by_id", e))?;
        row.as_ref().map(supplier_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Supplier>> {
        let rows = sqlx::query("SELECT * FROM suppliers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("supplier_list", e))?;
        rows.iter().map(supplier_from_row).collect()
    }

    #[instrument(skip(self, payload), fields(name = %payload.name), err)]
    async fn create(&self, payload: NewSupplier) -> StoreResult<Supplier> {
        let row = sqlx::query(
            r#"
            INSERT INTO suppliers (name, contact_person, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.contact_person)
        .bind(payload.email.trim())
        .bind(&payload.phone)
        .bind(&payload.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("supplier_create", e))?;
        supplier_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(supplier_id = %id), err)]
    async fn update(&self, id: SupplierId, changes: SupplierUpdate) -> StoreResult<Supplier> {
        let row = sqlx::query(
            r#"
            UPDATE suppliers SET
                name           = COALESCE($2, name),
                contact_person = COALESCE($3, contact_person),
                email          = COALESCE($4, email),
                phone          = COALESCE($5, phone),
                address        = COALESCE($6, address),
                updated_at     = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.name.as_deref().map(str::trim))
        .bind(&changes.contact_person)
        .bind(changes.email.as_deref().map(str::trim))
        .bind(&changes.phone)
        .bind(&changes.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("supplier_update", e))?
        .ok_or(StoreError::NotFound)?;
        supplier_from_row(&row)
    }

    #[instrument(skip(self), fields(supplier_id = %id), err)]
    async fn delete(&self, id: SupplierId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("supplier_delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_find_by_id", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_list", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, payload), fields(name = %payload.name), err)]
    async fn create(&self, payload: NewProduct) -> StoreResult<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, description, category, unit_of_measure)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(&payload.unit_of_measure)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("product_create", e))?;
        product_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, changes: ProductUpdate) -> StoreResult<Product> {
        let row = sqlx::query(
            r#"
            UPDATE products SET
                name            = COALESCE($2, name),
                description     = COALESCE($3, description),
                category        = COALESCE($4, category),
                unit_of_measure = COALESCE($5, unit_of_measure),
                updated_at      = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.name.as_deref().map(str::trim))
        .bind(&changes.description)
        .bind(&changes.category)
        .bind(&changes.unit_of_measure)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("product_update", e))?
        .ok_or(StoreError::NotFound)?;
        product_from_row(&row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for PgStore {
    #[instrument(skip(self), fields(contact_id = %id), err)]
    async fn find_by_id(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let row = sqlx::query("SELECT * FROM contacts WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("contact_find_by_id", e))?;
        row.as_ref().map(contact_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, supplier_id: Option<SupplierId>) -> StoreResult<Vec<Contact>> {
        let rows = sqlx::query(
            "SELECT * FROM contacts WHERE $1::bigint IS NULL OR supplier_id = $1 ORDER BY id",
        )
        .bind(supplier_id.map(|s| s.as_i64()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_list", e))?;
        rows.iter().map(contact_from_row).collect()
    }

    #[instrument(skip(self, payload), fields(supplier_id = %payload.supplier_id), err)]
    async fn create(&self, payload: NewContact) -> StoreResult<Contact> {
        let row = sqlx::query(
            r#"
            INSERT INTO contacts (first_name, last_name, email, phone, job_title, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(payload.email.trim())
        .bind(&payload.phone)
        .bind(&payload.job_title)
        .bind(payload.supplier_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_create", e))?;
        contact_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(contact_id = %id), err)]
    async fn update(&self, id: ContactId, changes: ContactUpdate) -> StoreResult<Contact> {
        let row = sqlx::query(
            r#"
            UPDATE contacts SET
                first_name  = COALESCE($2, first_name),
                last_name   = COALESCE($3, last_name),
                email       = COALESCE($4, email),
                phone       = COALESCE($5, phone),
                job_title   = COALESCE($6, job_title),
                supplier_id = COALESCE($7, supplier_id),
                updated_at  = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.first_name.as_deref().map(str::trim))
        .bind(changes.last_name.as_deref().map(str::trim))
        .bind(changes.email.as_deref().map(str::trim))
        .bind(&changes.phone)
        .bind(&changes.job_title)
        .bind(changes.supplier_id.map(|s| s.as_i64()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_update", e))?
        .ok_or(StoreError::NotFound)?;
        contact_from_row(&row)
    }

    #[instrument(skip(self), fields(contact_id = %id), err)]
    async fn delete(&self, id: ContactId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("contact_delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OfferStore for PgStore {
    #[instrument(skip(self), fields(offer_id = %id), err)]
    async fn find_by_id(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        let row = sqlx::query("SELECT * FROM offers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("offer_find_by_id", e))?;
        row.as_ref().map(offer_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(
        &self,
        filter: OfferFilter,
        sort: OfferSort,
        today: NaiveDate,
    ) -> StoreResult<Vec<Offer>> {
        let query = format!(
            r#"
            SELECT * FROM offers
            WHERE ($1::bigint IS NULL OR supplier_id = $1)
              AND ($2::bigint IS NULL OR product_id = $2)
              AND ($3::boolean IS NULL
                   OR (valid_from <= $4 AND valid_to >= $4) = $3)
            {}
            "#,
            offer_order_clause(sort)
        );
        let rows = sqlx::query(&query)
            .bind(filter.supplier_id.map(|s| s.as_i64()))
            .bind(filter.product_id.map(|p| p.as_i64()))
            .bind(filter.active)
            .bind(today)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("offer_list", e))?;
        rows.iter().map(offer_from_row).collect()
    }

    #[instrument(
        skip(self, payload),
        fields(supplier_id = %payload.supplier_id, product_id = %payload.product_id),
        err
    )]
    async fn create(&self, payload: NewOffer) -> StoreResult<Offer> {
        let row = sqlx::query(
            r#"
            INSERT INTO offers
                (price_cents, valid_from, valid_to, quantity, notes, supplier_id, product_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.price_cents)
        .bind(payload.valid_from)
        .bind(payload.valid_to)
        .bind(payload.quantity)
        .bind(&payload.notes)
        .bind(payload.supplier_id.as_i64())
        .bind(payload.product_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer_create", e))?;
        offer_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(offer_id = %id), err)]
    async fn update(&self, id: OfferId, changes: OfferUpdate) -> StoreResult<Offer> {
        let row = sqlx::query(
            r#"
            UPDATE offers SET
                price_cents = COALESCE($2, price_cents),
                valid_from  = COALESCE($3, valid_from),
                valid_to    = COALESCE($4, valid_to),
                quantity    = COALESCE($5, quantity),
                notes       = COALESCE($6, notes),
                supplier_id = COALESCE($7, supplier_id),
                product_id  = COALESCE($8, product_id),
                updated_at  = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.price_cents)
        .bind(changes.valid_from)
        .bind(changes.valid_to)
        .bind(changes.quantity)
        .bind(&changes.notes)
        .bind(changes.supplier_id.map(|s| s.as_i64()))
        .bind(changes.product_id.map(|p| p.as_i64()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("offer_update", e))?
        .ok_or(StoreError::NotFound)?;
        offer_from_row(&row)
    }

    #[instrument(skip(self), fields(offer_id = %id), err)]
    async fn delete(&self, id: OfferId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("offer_delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
