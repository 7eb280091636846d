//! Storage Module
//!
//! Object-storage client abstraction and the inventory-file backend.

mod inventory;
mod service;

pub use inventory::{BucketRecord, Inventory, InventoryClient, InventoryFactory};
pub use service::{
    BucketService, ClientFactory, ENCRYPTION_NOT_FOUND, LEGACY_DEFAULT_REGION, NO_SUCH_BUCKET,
    PERMANENT_REDIRECT,
};
