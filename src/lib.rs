//! Breeding records for a small kennel: dogs, matings, genetic tests and vet
//! records kept in a local SQLite file, plus the terminal UI on top of them.
pub mod date_mask;
pub mod db;
pub mod images;
pub mod logging;
pub mod models;
pub mod paths;
pub mod ui;

/// Storage entry points used by `main.rs` to bring the store up.
pub use db::{ensure_schema, StorageHandle, StoreError};

pub use date_mask::{is_full_valid, mask_date, MaskedDate};
pub use images::ImageStore;
pub use models::{Dog, GeneticTest, Mating, Sex, VetRecord, VetType};
pub use paths::AppPaths;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
