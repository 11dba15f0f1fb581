//! # helpbus-transit
//!
//! Bus line data and the pure geometry behind the trip planner.
//!
//! ## Features
//!
//! - **Geodesy**: Haversine distances on a 6,371 km sphere
//! - **Matching**: Rank lines by how close their stops come to a destination
//! - **Summaries**: Route length, travel time, nearest stop, and upcoming stops
//! - **Catalog**: In-memory line store with an R-tree stop index
//!
//! Everything here is synchronous and free of I/O.
//!
//! ## Example
//!
//! ```
//! use helpbus_transit::prelude::*;
//!
//! let line = Line::new(LineParts {
//!     id: LineIdentifier::new("330"),
//!     number: LineNumber::new("330"),
//!     name: "TICEN - Costeira".into(),
//!     origin: "TICEN".into(),
//!     destination: "Costeira".into(),
//!     stops: vec![
//!         Stop::new("TICEN", Coordinate::new(-27.5954, -48.5480), 1),
//!         Stop::new("Praça XV", Coordinate::new(-27.5969, -48.5495), 2),
//!         Stop::new("Costeira", Coordinate::new(-27.6100, -48.5650), 3),
//!     ],
//! })
//! .unwrap();
//!
//! let catalog = StaticLineCatalog::from_lines(vec![line]);
//!
//! // Lines passing within 900 m of Praça XV
//! let near = catalog.lines_near(Coordinate::new(-27.5969, -48.5495), DEFAULT_SEARCH_RADIUS_M);
//! assert_eq!(near.len(), 1);
//!
//! let summary = summarize(near[0].line, None);
//! assert_eq!(summary.next_stops.len(), 2);
//! ```

pub mod identifiers;
pub mod matching;
pub mod models;
pub mod provider;
pub mod spatial;
pub mod summary;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::matching::{find_lines_near, LineStop, MatchResult, DEFAULT_SEARCH_RADIUS_M};
    pub use crate::models::{traits::*, types::*};
    pub use crate::provider::static_provider::StaticLineCatalog;
    pub use crate::spatial::queries::{haversine_distance, route_length};
    pub use crate::summary::{summarize, RouteSummary, WalkEstimate};
}

pub use prelude::*;
