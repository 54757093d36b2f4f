pub mod record;
pub mod registry;

pub use record::{CharacterRecord, Script};
pub use registry::Catalog;
