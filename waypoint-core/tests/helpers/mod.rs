//! Reusable test helpers for coordinator integration tests.
//!
//! `FakeHost` stands in for the platform location service: tests toggle
//! provider state, seed cached fixes and push events to whatever listeners
//! are subscribed, exactly as a platform binding would.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use waypoint_core::location::{
    ConnectionCallbacks, ConnectionFailedListener, HostError, LocationChangeListener, LocationFix,
    LocationHost, LocationListener, Provider, ProviderStatus,
};

/// One subscription made through [`LocationHost::request_updates`].
#[derive(Clone)]
pub struct Subscription {
    pub provider: Provider,
    pub min_interval: Duration,
    pub min_distance_m: f64,
    pub listener: Arc<dyn LocationListener>,
}

/// In-memory location service.
#[derive(Default)]
pub struct FakeHost {
    enabled: Mutex<HashMap<Provider, bool>>,
    cached: Mutex<HashMap<Provider, LocationFix>>,
    refused: Mutex<Vec<Provider>>,
    subscriptions: Mutex<Vec<Subscription>>,
    removals: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host with the given satellite and network provider state.
    pub fn with_providers(gps: bool, network: bool) -> Self {
        let host = Self::new();
        host.set_enabled(Provider::Gps, gps);
        host.set_enabled(Provider::Network, network);
        host
    }

    pub fn set_enabled(&self, provider: Provider, enabled: bool) {
        self.enabled.lock().unwrap().insert(provider, enabled);
    }

    pub fn set_cached(&self, provider: Provider, fix: LocationFix) {
        self.cached.lock().unwrap().insert(provider, fix);
    }

    /// Makes every later subscription to `provider` fail with permission denied.
    pub fn refuse(&self, provider: Provider) {
        self.refused.lock().unwrap().push(provider);
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn subscribed_providers(&self) -> Vec<Provider> {
        self.subscriptions()
            .into_iter()
            .map(|s| s.provider)
            .collect()
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    fn listeners_for(&self, provider: &Provider) -> Vec<Arc<dyn LocationListener>> {
        self.subscriptions()
            .into_iter()
            .filter(|s| &s.provider == provider)
            .map(|s| s.listener)
            .collect()
    }

    /// Delivers a fix to every listener subscribed to the fix's provider.
    pub fn deliver(&self, fix: &LocationFix) {
        let provider = fix.provider.clone().unwrap_or_default();
        for listener in self.listeners_for(&provider) {
            listener.on_location_changed(fix.clone());
        }
    }

    /// Delivers a status change to every subscribed listener.
    pub fn report_status(&self, provider: &Provider, status: ProviderStatus) {
        for listener in self.all_listeners() {
            listener.on_status_changed(provider, status);
        }
    }

    /// Enables or disables a provider and notifies every subscribed listener.
    pub fn toggle(&self, provider: &Provider, enabled: bool) {
        self.set_enabled(provider.clone(), enabled);
        for listener in self.all_listeners() {
            if enabled {
                listener.on_provider_enabled(provider);
            } else {
                listener.on_provider_disabled(provider);
            }
        }
    }

    /// Distinct subscribed listeners.
    fn all_listeners(&self) -> Vec<Arc<dyn LocationListener>> {
        let mut listeners: Vec<Arc<dyn LocationListener>> = Vec::new();
        for sub in self.subscriptions() {
            if !listeners.iter().any(|l| Arc::ptr_eq(l, &sub.listener)) {
                listeners.push(sub.listener);
            }
        }
        listeners
    }
}

impl LocationHost for FakeHost {
    fn is_provider_enabled(&self, provider: &Provider) -> bool {
        self.enabled
            .lock()
            .unwrap()
            .get(provider)
            .copied()
            .unwrap_or(false)
    }

    fn request_updates(
        &self,
        provider: &Provider,
        min_interval: Duration,
        min_distance_m: f64,
        listener: Arc<dyn LocationListener>,
    ) -> Result<(), HostError> {
        if self.refused.lock().unwrap().contains(provider) {
            return Err(HostError::PermissionDenied(provider.to_string()));
        }
        self.subscriptions.lock().unwrap().push(Subscription {
            provider: provider.clone(),
            min_interval,
            min_distance_m,
            listener,
        });
        Ok(())
    }

    fn remove_updates(&self, listener: &Arc<dyn LocationListener>) {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|s| !Arc::ptr_eq(&s.listener, listener));
    }

    fn last_known_location(&self, provider: &Provider) -> Option<LocationFix> {
        self.cached.lock().unwrap().get(provider).cloned()
    }
}

/// Records every callback the coordinator makes.
#[derive(Default)]
pub struct RecordingCallbacks {
    fixes: Mutex<Vec<LocationFix>>,
    connected: AtomicUsize,
    disconnected: AtomicUsize,
    failed: AtomicUsize,
}

impl RecordingCallbacks {
    pub fn fixes(&self) -> Vec<LocationFix> {
        self.fixes.lock().unwrap().clone()
    }

    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnected(&self) -> usize {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl LocationChangeListener for RecordingCallbacks {
    fn on_location_change(&self, fix: &LocationFix) {
        self.fixes.lock().unwrap().push(fix.clone());
    }
}

impl ConnectionCallbacks for RecordingCallbacks {
    fn on_connected(&self) {
        self.connected.fetch_add(1, Ordering::SeqCst);
    }

    fn on_disconnected(&self) {
        self.disconnected.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConnectionFailedListener for RecordingCallbacks {
    fn on_connection_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fixed reference instant so tests do not depend on the wall clock.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 8, 0, 0).unwrap()
}

/// Creates a fix `offset_secs` after [`base_time`].
pub fn fix_at(provider: Provider, offset_secs: i64, accuracy: f64) -> LocationFix {
    LocationFix::new(
        40.7128,
        -74.0060,
        accuracy,
        base_time() + TimeDelta::seconds(offset_secs),
    )
    .with_provider(provider)
}
