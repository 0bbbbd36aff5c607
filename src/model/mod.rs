//! Locating, caching, and loading the colorization model.

mod loader;

pub use loader::{load_session, ModelCache, MODEL_FILENAME};
