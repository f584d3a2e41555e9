//! Voice-note library for Lumivox - storage, catalog, and configuration

mod catalog;
mod config;
mod random;
mod storage;

pub use catalog::{
    AudioCatalog, CatalogError, Category, ScanReport, AUDIO_EXTENSION, CATEGORY_CAPACITY,
};
pub use config::{Config, ConfigError, DEFAULT_OUTPUT_RATE, DEFAULT_SOURCE_RATE};
pub use random::RandomSource;
pub use storage::{DirEntry, DirStorage, MemoryStorage, Storage, StorageError, StorageFile};
