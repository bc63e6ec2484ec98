//! Location module for Waypoint.
//!
//! Subscribes to fixes from the host platform's positioning providers and
//! keeps the best one:
//! - Satellite, network and passive providers behind one listener
//! - Per-provider availability and status tracking
//! - A recency/accuracy heuristic for choosing between fixes
//! - Connection state reported through caller-supplied callbacks
//!
//! # Example Usage
//!
//! ```
//! use chrono::{Duration, Utc};
//! use waypoint_core::location::{is_better_location, LocationFix, Provider};
//!
//! let now = Utc::now();
//! let current = LocationFix::new(37.7749, -122.4194, 25.0, now - Duration::seconds(20))
//!     .with_provider(Provider::Network);
//! let candidate = LocationFix::new(37.7751, -122.4190, 6.0, now)
//!     .with_provider(Provider::Gps);
//!
//! // Newer and more accurate: replaces the current fix
//! assert!(is_better_location(Some(&candidate), Some(&current)));
//!
//! // A fix from two minutes ago never wins
//! let stale = LocationFix::new(37.7749, -122.4194, 1.0, now - Duration::minutes(2));
//! assert!(!is_better_location(Some(&stale), Some(&candidate)));
//! ```

pub mod callbacks;
pub mod coordinator;
mod duration_millis;
pub mod error;
pub mod host;
pub mod quality;
pub mod request;
pub mod types;

pub use callbacks::{ConnectionCallbacks, ConnectionFailedListener, LocationChangeListener};
pub use coordinator::{CoordinatorOptions, LiveFilter, LocationCoordinator};
pub use error::{CoordinatorError, CoordinatorResult, HostError};
pub use host::{LocationHost, LocationListener};
pub use quality::{is_better_location, QualityPolicy};
pub use request::LocationRequest;
pub use types::{LocationFix, Provider, ProviderStatus};
