//! Boundary to the host platform's location service.
//!
//! Platform bindings implement [`LocationHost`]; the coordinator hands the
//! host a [`LocationListener`] and the host calls it back from whatever
//! thread or loop it delivers events on.

use std::sync::Arc;
use std::time::Duration;

use super::error::HostError;
use super::types::{LocationFix, Provider, ProviderStatus};

/// Callbacks delivered by the host location service.
///
/// Implementations must tolerate being called from any thread.
pub trait LocationListener: Send + Sync {
    /// A new fix arrived.
    fn on_location_changed(&self, fix: LocationFix);

    /// A provider reported a status change.
    fn on_status_changed(&self, provider: &Provider, status: ProviderStatus);

    /// A provider was enabled by the user or system.
    fn on_provider_enabled(&self, provider: &Provider);

    /// A provider was disabled by the user or system.
    fn on_provider_disabled(&self, provider: &Provider);
}

/// The platform location service.
///
/// Listeners are identified by pointer: [`remove_updates`](Self::remove_updates)
/// must drop every subscription made with an `Arc` pointing at the same
/// listener.
pub trait LocationHost: Send + Sync {
    /// Returns whether the provider is currently enabled.
    fn is_provider_enabled(&self, provider: &Provider) -> bool;

    /// Subscribes `listener` to updates from `provider`.
    ///
    /// Subscriptions accumulate until [`remove_updates`](Self::remove_updates)
    /// is called. The coordinator removes its listener before every new
    /// request, so it never holds two subscriptions for one provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the subscription, for example
    /// because a permission is missing or the provider does not exist.
    fn request_updates(
        &self,
        provider: &Provider,
        min_interval: Duration,
        min_distance_m: f64,
        listener: Arc<dyn LocationListener>,
    ) -> Result<(), HostError>;

    /// Removes every subscription held by `listener`.
    fn remove_updates(&self, listener: &Arc<dyn LocationListener>);

    /// Returns the host's cached fix for `provider`, if any.
    fn last_known_location(&self, provider: &Provider) -> Option<LocationFix>;
}
