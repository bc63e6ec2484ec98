//! Waypoint Core Library
//!
//! Best-fix location tracking over a host platform's location service.
//! Platform bindings implement [`location::LocationHost`]; applications
//! drive a [`location::LocationCoordinator`] and receive fixes through
//! callback traits.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod location;

pub use location::{LocationCoordinator, LocationFix, LocationRequest, Provider};
