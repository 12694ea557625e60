//! Binary entry point: resolve the data directory, bring up logging and the
//! store, then drive the Ratatui event loop until the user exits.
use probreedics::{ensure_schema, logging, run_app, App, AppPaths, ImageStore, StorageHandle};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let paths = AppPaths::resolve()?;
    logging::init(&paths)?;
    info!(data_dir = %paths.data_dir.display(), "starting probreedics");

    let store = StorageHandle::at(&paths);
    ensure_schema(&*store.acquire()?)?;
    let images = ImageStore::new(&paths.image_dir);

    let mut app = App::new(store, images)?;
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    info!("shutting down");
    result
}
