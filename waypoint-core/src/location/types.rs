//! Location data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named source of position fixes.
///
/// The canonical names match the identifiers host location services use,
/// so a provider converts losslessly to and from its string form.
///
/// | Variant   | Name        | Source                               |
/// |-----------|-------------|--------------------------------------|
/// | `Gps`     | `"gps"`     | Satellite positioning                |
/// | `Network` | `"network"` | Cell tower and Wi-Fi positioning     |
/// | `Passive` | `"passive"` | Fixes requested by other apps        |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    /// Satellite-based provider (default)
    #[default]
    Gps,
    /// Network-based provider
    Network,
    /// Passive provider, piggybacks on fixes requested elsewhere
    Passive,
    /// Any other host-specific provider name
    Other(String),
}

impl Provider {
    /// Returns the host identifier for this provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use waypoint_core::location::Provider;
    ///
    /// assert_eq!(Provider::Gps.as_str(), "gps");
    /// assert_eq!(Provider::Other("fused".to_string()).as_str(), "fused");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
            Self::Passive => "passive",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Provider {
    fn from(name: &str) -> Self {
        match name {
            "gps" => Self::Gps,
            "network" => Self::Network,
            "passive" => Self::Passive,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Provider {
    fn from(name: String) -> Self {
        match name.as_str() {
            "gps" | "network" | "passive" => Self::from(name.as_str()),
            _ => Self::Other(name),
        }
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Availability status reported by a provider.
///
/// Host services report status as an integer code; unknown codes are kept
/// verbatim so nothing is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderStatus {
    /// Provider is out of service and not expected to return soon
    OutOfService,
    /// Provider is temporarily unavailable
    TemporarilyUnavailable,
    /// Provider is available
    Available,
    /// Code not known to this library
    Unknown(i32),
}

impl ProviderStatus {
    /// Maps a host status code to a status.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::OutOfService,
            1 => Self::TemporarilyUnavailable,
            2 => Self::Available,
            other => Self::Unknown(other),
        }
    }

    /// Returns the host status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::OutOfService => 0,
            Self::TemporarilyUnavailable => 1,
            Self::Available => 2,
            Self::Unknown(code) => code,
        }
    }
}

/// One position fix reported by the host location service.
///
/// Fixes are never mutated after they are received; they are only compared
/// and superseded.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use waypoint_core::location::{LocationFix, Provider};
///
/// let fix = LocationFix::new(37.7749, -122.4194, 12.5, Utc::now())
///     .with_provider(Provider::Gps);
/// assert_eq!(fix.provider, Some(Provider::Gps));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Estimated error radius in meters (lower is better)
    pub accuracy: f64,

    /// When the fix was taken (UTC)
    pub timestamp: DateTime<Utc>,

    /// Provider that produced the fix, if the host reported one
    #[serde(default)]
    pub provider: Option<Provider>,

    /// Altitude in meters above the WGS 84 ellipsoid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,

    /// Ground speed in meters/second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    /// Bearing in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
}

impl LocationFix {
    /// Creates a fix without provider or motion data.
    #[must_use]
    pub const fn new(
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
            provider: None,
            altitude: None,
            speed: None,
            bearing: None,
        }
    }

    /// Sets the provider that produced this fix.
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets altitude, speed and bearing as reported by the host.
    #[must_use]
    pub fn with_motion(
        mut self,
        altitude: Option<f64>,
        speed: Option<f64>,
        bearing: Option<f64>,
    ) -> Self {
        self.altitude = altitude;
        self.speed = speed;
        self.bearing = bearing;
        self
    }

    /// Returns true if both fixes carry the same provider.
    ///
    /// Two fixes without a provider count as coming from the same one.
    #[must_use]
    pub fn same_provider(&self, other: &Self) -> bool {
        self.provider == other.provider
    }

    /// Creates a `LocationFix` from JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or missing required fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Converts this `LocationFix` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_fix() -> LocationFix {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        LocationFix::new(37.7749, -122.4194, 15.0, at)
    }

    #[test]
    fn provider_names_match_host_identifiers() {
        assert_eq!(Provider::Gps.as_str(), "gps");
        assert_eq!(Provider::Network.as_str(), "network");
        assert_eq!(Provider::Passive.as_str(), "passive");
    }

    #[test]
    fn provider_parses_known_and_unknown_names() {
        assert_eq!(Provider::from("gps"), Provider::Gps);
        assert_eq!(Provider::from("network".to_string()), Provider::Network);
        assert_eq!(Provider::from("passive"), Provider::Passive);
        assert_eq!(
            Provider::from("fused"),
            Provider::Other("fused".to_string())
        );
    }

    #[test]
    fn provider_default_is_gps() {
        assert_eq!(Provider::default(), Provider::Gps);
    }

    #[test]
    fn provider_serializes_as_plain_string() {
        let json = serde_json::to_string(&Provider::Network).unwrap();
        assert_eq!(json, "\"network\"");

        let parsed: Provider = serde_json::from_str("\"fused\"").unwrap();
        assert_eq!(parsed, Provider::Other("fused".to_string()));
    }

    #[test]
    fn provider_display_uses_host_name() {
        assert_eq!(format!("{}", Provider::Passive), "passive");
    }

    #[test]
    fn provider_status_maps_host_codes() {
        assert_eq!(ProviderStatus::from_code(0), ProviderStatus::OutOfService);
        assert_eq!(
            ProviderStatus::from_code(1),
            ProviderStatus::TemporarilyUnavailable
        );
        assert_eq!(ProviderStatus::from_code(2), ProviderStatus::Available);
        assert_eq!(ProviderStatus::from_code(7), ProviderStatus::Unknown(7));
        assert_eq!(ProviderStatus::Unknown(7).code(), 7);
        assert_eq!(ProviderStatus::Available.code(), 2);
    }

    #[test]
    fn fix_without_providers_counts_as_same_provider() {
        let a = sample_fix();
        let b = sample_fix();
        assert!(a.same_provider(&b));
    }

    #[test]
    fn fix_with_one_missing_provider_is_different() {
        let a = sample_fix().with_provider(Provider::Gps);
        let b = sample_fix();
        assert!(!a.same_provider(&b));
        assert!(!b.same_provider(&a));
    }

    #[test]
    fn fix_json_omits_absent_motion_fields() {
        let json = sample_fix().to_json().unwrap();
        assert!(json.contains("accuracy"));
        assert!(!json.contains("altitude"));
        assert!(!json.contains("speed"));
        assert!(!json.contains("bearing"));
    }

    #[test]
    fn fix_json_keeps_provider_and_motion() {
        let fix = sample_fix()
            .with_provider(Provider::Network)
            .with_motion(Some(12.0), Some(1.5), None);
        let json = fix.to_json().unwrap();
        let parsed = LocationFix::from_json(&json).unwrap();

        assert_eq!(parsed, fix);
        assert!(json.contains("\"network\""));
    }

    #[test]
    fn fix_from_json_rejects_missing_timestamp() {
        let result =
            LocationFix::from_json(r#"{"latitude":1.0,"longitude":2.0,"accuracy":3.0}"#);
        assert!(result.is_err());
    }
}
