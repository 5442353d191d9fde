mod loader;
mod types;
mod validate;

pub use loader::{load_map_library, ContentError};
pub use types::{MapConfig, MapLibrary, PersonConfig};
pub use validate::validate_library;
