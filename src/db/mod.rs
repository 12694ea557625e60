//! Persistence module split across logical submodules: the connection owner,
//! the schema, and one module of CRUD helpers per table.

mod convert;
mod dogs;
mod error;
mod handle;
mod matings;
mod schema;
mod vet_records;

pub use dogs::{count_dependents, create_dog, delete_dog, fetch_dog, fetch_dogs, update_dog};
pub use error::{Result, StoreError};
pub use genetic_tests::{
    create_genetic_test, delete_genetic_test, fetch_genetic_test, fetch_genetic_tests,
    update_genetic_test,
};
pub use handle::StorageHandle;
pub use matings::{
    create_mating, delete_mating, fetch_mating, fetch_matings, fetch_matings_for_dog,
    update_mating,
};
pub use schema::ensure_schema;
pub use vet_records::{
    create_vet_record, delete_vet_record, fetch_vet_record, fetch_vet_records, update_vet_record,
};
