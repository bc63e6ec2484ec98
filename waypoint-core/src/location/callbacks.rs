//! Caller-facing capability traits.
//!
//! The application implements these to receive fixes and connection state
//! from a [`LocationCoordinator`](super::LocationCoordinator). Single-method
//! traits are implemented for matching closures.

use super::types::LocationFix;

/// Receives fixes forwarded by the coordinator.
pub trait LocationChangeListener: Send + Sync {
    /// Called for every forwarded fix.
    fn on_location_change(&self, fix: &LocationFix);
}

impl<F> LocationChangeListener for F
where
    F: Fn(&LocationFix) + Send + Sync,
{
    fn on_location_change(&self, fix: &LocationFix) {
        self(fix);
    }
}

/// Receives connection state transitions.
pub trait ConnectionCallbacks: Send + Sync {
    /// At least one positioning provider is enabled.
    fn on_connected(&self);

    /// Both the satellite and the network provider have been disabled.
    fn on_disconnected(&self);
}

/// Receives the outcome of a failed [`connect`](super::LocationCoordinator::connect).
pub trait ConnectionFailedListener: Send + Sync {
    /// No positioning provider is enabled.
    fn on_connection_failed(&self);
}

impl<F> ConnectionFailedListener for F
where
    F: Fn() + Send + Sync,
{
    fn on_connection_failed(&self) {
        self();
    }
}
