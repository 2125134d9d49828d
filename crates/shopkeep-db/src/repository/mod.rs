//! # Repositories
//!
//! One repository per aggregate. Each wraps the shared `SqlitePool` and
//! exposes typed async operations; handlers never write SQL.

pub mod attendance;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod staff;
