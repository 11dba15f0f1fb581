//! Bus line data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::LineCatalog;
pub use types::{Coordinate, Line, LineParts, Result, Stop, TransitError};
