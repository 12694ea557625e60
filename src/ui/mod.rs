//! Ratatui front-end for the kennel records: a dog list, a per-dog page with
//! genetics, vet and mating tabs, and a kennel-wide matings list.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
