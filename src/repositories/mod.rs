//! Repositorios
//!
//! Balance Store: contrato y sus implementaciones (PostgreSQL y memoria).

pub mod balance_store;
pub mod memory_balance_store;
pub mod pg_balance_store;

pub use balance_store::{BalanceStore, StoreError, StoreResult, WriteOutcome};
pub use memory_balance_store::MemoryBalanceStore;
pub use pg_balance_store::PgBalanceStore;
