//! Inventory Ledger
//! Mission: Persist catalog items and enforce stock invariants with SQLite
//!
//! All stock mutations run as read-check-write sequences inside an
//! IMMEDIATE transaction while holding the connection lock, so concurrent
//! purchases against the same item serialize and can never overdraw stock.

use crate::inventory::models::{SearchFilter, Sweet, SweetCreate, SweetUpdate};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{
    params, params_from_iter, types::Value, Connection, OpenFlags, OptionalExtension, Row,
    TransactionBehavior,
};
use std::sync::Arc;
use tracing::{debug, info};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS sweets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sweets_name ON sweets(name);
CREATE INDEX IF NOT EXISTS idx_sweets_category ON sweets(category);
"#;

/// Ledger errors surfaced to callers as typed conditions.
#[derive(Debug)]
pub enum SweetStoreError {
    /// An item with the same (name, category) pair already exists.
    Conflict,
    /// Referenced item id is absent.
    NotFound,
    /// Non-positive stock adjustment.
    InvalidQuantity,
    /// Purchase exceeds available stock.
    InsufficientStock,
    Database(rusqlite::Error),
}

impl std::fmt::Display for SweetStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweetStoreError::Conflict => {
                write!(f, "Sweet with same name & category already exists")
            }
            SweetStoreError::NotFound => write!(f, "Sweet not found"),
            SweetStoreError::InvalidQuantity => write!(f, "Quantity must be positive"),
            SweetStoreError::InsufficientStock => write!(f, "Not enough stock"),
            SweetStoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for SweetStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweetStoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SweetStoreError {
    fn from(e: rusqlite::Error) -> Self {
        SweetStoreError::Database(e)
    }
}

/// Inventory storage with SQLite backend
pub struct SweetStore {
    conn: Arc<Mutex<Connection>>,
}

impl SweetStore {
    /// Open (or create) the inventory database and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize sweets schema")?;

        info!("🍬 Inventory store initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a new item. The (name, category) pair must be unique at
    /// creation time. Price is stored as given.
    pub fn add(&self, create: &SweetCreate) -> Result<Sweet, SweetStoreError> {
        let conn = self.conn.lock();

        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sweets WHERE name = ?1 AND category = ?2",
            params![create.name, create.category],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(SweetStoreError::Conflict);
        }

        conn.execute(
            "INSERT INTO sweets (name, category, price, quantity) VALUES (?1, ?2, ?3, ?4)",
            params![create.name, create.category, create.price, create.quantity],
        )?;
        let id = conn.last_insert_rowid();

        info!("✅ Added sweet: {} / {} ({})", create.name, create.category, id);

        Ok(Sweet {
            id,
            name: create.name.clone(),
            category: create.category.clone(),
            price: create.price,
            quantity: create.quantity,
        })
    }

    /// Page through items in insertion order.
    pub fn list(&self, offset: i64, limit: i64) -> Result<Vec<Sweet>, SweetStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, category, price, quantity FROM sweets
             ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;
        let sweets = stmt
            .query_map(params![limit, offset], row_to_sweet)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sweets)
    }

    /// Filtered search. All provided filters compose conjunctively; with no
    /// filters the full set is returned.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<Sweet>, SweetStoreError> {
        let mut sql = String::from("SELECT id, name, category, price, quantity FROM sweets");
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &filter.name {
            // SQLite LIKE is case-insensitive for ASCII.
            clauses.push("name LIKE ?");
            values.push(Value::Text(format!("%{}%", name)));
        }
        if let Some(category) = &filter.category {
            clauses.push("category LIKE ?");
            values.push(Value::Text(format!("%{}%", category)));
        }
        if let Some(min_price) = filter.min_price {
            clauses.push("price >= ?");
            values.push(Value::Real(min_price));
        }
        if let Some(max_price) = filter.max_price {
            clauses.push("price <= ?");
            values.push(Value::Real(max_price));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let sweets = stmt
            .query_map(params_from_iter(values), row_to_sweet)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Search matched {} sweets", sweets.len());
        Ok(sweets)
    }

    /// Apply a partial update. Present fields overwrite the stored
    /// attributes; omitted fields are left unchanged. Renames are not
    /// re-checked against the (name, category) uniqueness rule.
    pub fn update(&self, id: i64, fields: &SweetUpdate) -> Result<Sweet, SweetStoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut sweet = tx
            .query_row(
                "SELECT id, name, category, price, quantity FROM sweets WHERE id = ?1",
                params![id],
                row_to_sweet,
            )
            .optional()?
            .ok_or(SweetStoreError::NotFound)?;

        if let Some(name) = &fields.name {
            sweet.name = name.clone();
        }
        if let Some(category) = &fields.category {
            sweet.category = category.clone();
        }
        if let Some(price) = fields.price {
            sweet.price = price;
        }
        if let Some(quantity) = fields.quantity {
            sweet.quantity = quantity;
        }

        tx.execute(
            "UPDATE sweets SET name = ?1, category = ?2, price = ?3, quantity = ?4 WHERE id = ?5",
            params![sweet.name, sweet.category, sweet.price, sweet.quantity, id],
        )?;
        tx.commit()?;

        Ok(sweet)
    }

    /// Remove an item permanently.
    pub fn delete(&self, id: i64) -> Result<(), SweetStoreError> {
        let conn = self.conn.lock();
        let changes = conn.execute("DELETE FROM sweets WHERE id = ?1", params![id])?;
        if changes == 0 {
            return Err(SweetStoreError::NotFound);
        }
        info!("🗑️  Deleted sweet: {}", id);
        Ok(())
    }

    /// Atomically decrement stock for a purchase, returning the updated
    /// item. The sufficiency check and the write happen in one
    /// transaction, so stock can never go negative.
    pub fn purchase(&self, id: i64, quantity: i64) -> Result<Sweet, SweetStoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Existence is checked before the quantity, so an absent id always
        // reports NotFound regardless of how bad the request is.
        let stock: i64 = tx
            .query_row(
                "SELECT quantity FROM sweets WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(SweetStoreError::NotFound)?;

        if quantity <= 0 {
            return Err(SweetStoreError::InvalidQuantity);
        }
        if stock < quantity {
            return Err(SweetStoreError::InsufficientStock);
        }

        tx.execute(
            "UPDATE sweets SET quantity = quantity - ?1 WHERE id = ?2",
            params![quantity, id],
        )?;

        let sweet = tx.query_row(
            "SELECT id, name, category, price, quantity FROM sweets WHERE id = ?1",
            params![id],
            row_to_sweet,
        )?;
        tx.commit()?;

        debug!("Purchased {} of sweet {}, {} left", quantity, id, sweet.quantity);
        Ok(sweet)
    }

    /// Atomically increment stock, returning the updated item.
    pub fn restock(&self, id: i64, quantity: i64) -> Result<Sweet, SweetStoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM sweets WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(SweetStoreError::NotFound);
        }
        if quantity <= 0 {
            return Err(SweetStoreError::InvalidQuantity);
        }

        tx.execute(
            "UPDATE sweets SET quantity = quantity + ?1 WHERE id = ?2",
            params![quantity, id],
        )?;

        let sweet = tx.query_row(
            "SELECT id, name, category, price, quantity FROM sweets WHERE id = ?1",
            params![id],
            row_to_sweet,
        )?;
        tx.commit()?;

        info!("📦 Restocked sweet {}: +{} -> {}", id, quantity, sweet.quantity);
        Ok(sweet)
    }
}

fn row_to_sweet(row: &Row) -> rusqlite::Result<Sweet> {
    Ok(Sweet {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
    })
}
