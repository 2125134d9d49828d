//! # shopkeep-db: Database Layer for Shopkeep
//!
//! All SQLite access lives here: the connection pool, embedded migrations
//! and one repository per aggregate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apps/api handlers                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database (pool.rs) ──► CustomerRepository / ProductRepository /        │
//! │                         StaffRepository / AttendanceRepository /        │
//! │                         InvoiceRepository                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys, embedded migrations)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Notes
//! - The `Database` handle is passed into each operation (explicit dependency
//!   injection) - there is no process-wide connection singleton, which keeps
//!   everything testable against `DbConfig::in_memory()`.
//! - Entity updates are single, targeted field operations (set / increment)
//!   rather than whole-document read-modify-write, so concurrent writers on
//!   disjoint fields don't lose updates. There is no multi-row atomicity
//!   beyond individual transactions.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::attendance::AttendanceRepository;
pub use repository::customer::{CustomerRepository, CustomerUpdate};
pub use repository::invoice::{
    generate_invoice_number, InvoiceFilter, InvoiceRepository, InvoiceUpdate,
};
pub use repository::product::{ProductRepository, ProductUpdate};
pub use repository::staff::StaffRepository;
