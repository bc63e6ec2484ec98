//! Location update request settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::Provider;

/// Settings for a location update subscription.
///
/// A plain value holder: nothing is validated and nothing is derived except
/// the provider set returned by [`providers`](Self::providers). Zero values
/// mean "deliver every update".
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use waypoint_core::location::{LocationRequest, Provider};
///
/// let request = LocationRequest::new()
///     .with_poll_interval(Duration::from_secs(5))
///     .with_min_distance(10.0)
///     .with_number_of_updates(3);
///
/// assert_eq!(request.poll_interval(), Duration::from_secs(5));
/// assert_eq!(request.provider(), &Provider::Gps);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    /// Minimum time between updates
    #[serde(rename = "poll_interval_ms", with = "super::duration_millis")]
    poll_interval: Duration,

    /// Minimum distance between updates in meters
    min_distance_m: f64,

    /// Number of fixes to deliver before stopping (0 = unlimited)
    number_of_updates: u32,

    /// Preferred provider
    provider: Provider,
}

impl LocationRequest {
    /// Creates a request with default settings: every update from the
    /// satellite provider, with network fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the minimum time between updates.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sets the minimum time between updates.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Builder form of [`set_poll_interval`](Self::set_poll_interval).
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the minimum distance between updates in meters.
    #[must_use]
    pub const fn min_distance(&self) -> f64 {
        self.min_distance_m
    }

    /// Sets the minimum distance between updates in meters.
    pub fn set_min_distance(&mut self, meters: f64) {
        self.min_distance_m = meters;
    }

    /// Builder form of [`set_min_distance`](Self::set_min_distance).
    #[must_use]
    pub fn with_min_distance(mut self, meters: f64) -> Self {
        self.min_distance_m = meters;
        self
    }

    /// Returns how many fixes are delivered before updates stop (0 = unlimited).
    #[must_use]
    pub const fn number_of_updates(&self) -> u32 {
        self.number_of_updates
    }

    /// Sets how many fixes are delivered before updates stop.
    pub fn set_number_of_updates(&mut self, count: u32) {
        self.number_of_updates = count;
    }

    /// Builder form of [`set_number_of_updates`](Self::set_number_of_updates).
    #[must_use]
    pub fn with_number_of_updates(mut self, count: u32) -> Self {
        self.number_of_updates = count;
        self
    }

    /// Returns the preferred provider.
    #[must_use]
    pub const fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Sets the preferred provider.
    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    /// Builder form of [`set_provider`](Self::set_provider).
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Returns the host providers this request subscribes to.
    ///
    /// The preferred provider comes first, followed by its fallbacks. The
    /// passive provider is always included so fixes requested by other
    /// applications are picked up for free.
    ///
    /// | Preferred     | Subscribed                  |
    /// |---------------|-----------------------------|
    /// | `Gps`         | gps, network, passive       |
    /// | `Network`     | network, passive            |
    /// | `Passive`     | passive                     |
    /// | `Other(name)` | name, passive               |
    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        match &self.provider {
            Provider::Gps => vec![Provider::Gps, Provider::Network, Provider::Passive],
            Provider::Network => vec![Provider::Network, Provider::Passive],
            Provider::Passive => vec![Provider::Passive],
            other @ Provider::Other(_) => vec![other.clone(), Provider::Passive],
        }
    }

    /// Creates a `LocationRequest` from JSON string. Missing fields take
    /// their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Converts this `LocationRequest` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
