#![forbid(unsafe_code)]

pub mod collections;
pub mod config;
pub mod records;
pub mod repository;
pub mod seed;
pub mod sqlite;

pub use repository::{CollectionKey, CollectionStore, StorageError, Storage};
