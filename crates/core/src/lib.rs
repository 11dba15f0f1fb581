//! Trip-planning services around the line catalog: place search, user
//! position, recents and favorites, and the map-page view of a line.

pub mod autocomplete;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geocode;
pub mod location;
pub mod planner;
pub mod request;
pub mod route_view;
pub mod storage;

// Re-export the line model from the transit crate
pub use helpbus_transit as transit;

pub use config::Config;
pub use error::{Error, Result};
pub use planner::{DestinationSearch, Suggestions, TripPlanner};
pub use request::RouteRequest;
pub use route_view::{RouteView, plan_route};
