//! Location coordinator.
//!
//! Wraps a [`LocationHost`] and keeps the best fix seen so far. A single
//! internal listener is registered with the host for every subscribed
//! provider; it records provider availability and status, and forwards fixes
//! to the caller's [`LocationChangeListener`].
//!
//! # Threading
//!
//! The coordinator owns no threads. Host callbacks may arrive on any thread,
//! so all mutable state lives in one [`CoordinatorState`] behind a mutex that
//! the coordinator and its listener share. Caller callbacks are always invoked
//! after that lock is released.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waypoint_core::location::{LocationCoordinator, LocationRequest};
//!
//! let coordinator = LocationCoordinator::new(
//!     Arc::new(platform_host),
//!     Arc::new(|fix: &LocationFix| println!("{}, {}", fix.latitude, fix.longitude)),
//!     Arc::new(app_connection_callbacks),
//!     Arc::new(|| println!("location services are off")),
//! );
//!
//! if coordinator.connect()? {
//!     coordinator.request_location(&LocationRequest::new())?;
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::callbacks::{ConnectionCallbacks, ConnectionFailedListener, LocationChangeListener};
use super::error::{CoordinatorError, CoordinatorResult};
use super::host::{LocationHost, LocationListener};
use super::quality::QualityPolicy;
use super::request::LocationRequest;
use super::types::{LocationFix, Provider, ProviderStatus};

/// How live fixes from the host are filtered before they reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveFilter {
    /// Forward every fix and make it the current best.
    #[default]
    ForwardAll,
    /// Forward only fixes the quality policy accepts over the current best.
    BestOnly,
}

/// Tunables for a [`LocationCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorOptions {
    /// Thresholds used to compare fixes
    pub quality: QualityPolicy,

    /// Filtering applied to live fixes
    pub live_filter: LiveFilter,
}

/// Mutable coordinator state shared with the host listener.
#[derive(Debug, Default)]
struct CoordinatorState {
    /// Reference fix for the next comparison
    current_best: Option<LocationFix>,

    /// Most recent fix received from the host, forwarded or not
    latest: Option<LocationFix>,

    gps_available: bool,
    network_available: bool,

    gps_status: Option<ProviderStatus>,
    network_status: Option<ProviderStatus>,

    /// Fixes to forward for the active request (0 = unlimited)
    update_limit: u32,

    /// Fixes forwarded for the active request
    delivered: u32,

    /// Bumped by every `request_location` and `stop_updates`
    generation: u64,

    /// Set by `disconnect`; the listener ignores everything afterwards
    detached: bool,
}

impl CoordinatorState {
    const fn is_connected(&self) -> bool {
        self.gps_available || self.network_available
    }

    const fn limit_reached(&self) -> bool {
        self.update_limit != 0 && self.delivered >= self.update_limit
    }

    /// Updates the availability flag for `provider`. Returns false if the
    /// provider is not tracked.
    fn set_available(&mut self, provider: &Provider, available: bool) -> bool {
        match provider {
            Provider::Gps => self.gps_available = available,
            Provider::Network => self.network_available = available,
            _ => return false,
        }
        true
    }
}

/// The listener registered with the host.
struct CoordinatorListener<H: LocationHost + 'static> {
    me: Weak<Self>,
    host: Weak<H>,
    state: Mutex<CoordinatorState>,
    on_location: Arc<dyn LocationChangeListener>,
    connection: Arc<dyn ConnectionCallbacks>,
    options: CoordinatorOptions,
}

impl<H: LocationHost + 'static> CoordinatorListener<H> {
    fn as_dyn(&self) -> Option<Arc<dyn LocationListener>> {
        self.me
            .upgrade()
            .map(|me| me as Arc<dyn LocationListener>)
    }

    /// Locks the state for a host event, or returns `None` if the event must
    /// be dropped.
    fn state_for_event(&self, event: &str) -> Option<MutexGuard<'_, CoordinatorState>> {
        match self.state.lock() {
            Ok(state) if state.detached => {
                warn!("Ignoring {event} received after disconnect");
                None
            }
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Dropping {event}: coordinator state poisoned: {e}");
                None
            }
        }
    }

    /// Stops updates once the request identified by `generation` has
    /// delivered all its fixes. Does nothing if a newer request replaced it.
    fn finish_request(&self, generation: u64) {
        let (Some(host), Some(listener)) = (self.host.upgrade(), self.as_dyn()) else {
            return;
        };
        match self.state.lock() {
            Ok(state) if state.generation == generation => {}
            Ok(_) => {
                debug!("Update limit reached for a replaced request, keeping updates");
                return;
            }
            Err(e) => {
                warn!("Not removing updates: coordinator state poisoned: {e}");
                return;
            }
        }
        info!("Update limit reached, removing location updates");
        host.remove_updates(&listener);
    }
}

impl<H: LocationHost + 'static> LocationListener for CoordinatorListener<H> {
    fn on_location_changed(&self, fix: LocationFix) {
        let finished = {
            let Some(mut state) = self.state_for_event("location update") else {
                return;
            };
            if state.limit_reached() {
                debug!("Ignoring fix from {:?}: update limit reached", fix.provider);
                return;
            }

            let accepted = match self.options.live_filter {
                LiveFilter::ForwardAll => true,
                LiveFilter::BestOnly => self
                    .options
                    .quality
                    .is_better(Some(&fix), state.current_best.as_ref()),
            };
            state.latest = Some(fix.clone());
            if !accepted {
                debug!(
                    "Discarding fix from {:?} (accuracy {}m): current best is better",
                    fix.provider, fix.accuracy
                );
                return;
            }

            state.current_best = Some(fix.clone());
            state.delivered = state.delivered.saturating_add(1);
            state.limit_reached().then_some(state.generation)
        };

        // Unsubscribe before forwarding so the callback may issue a new request.
        if let Some(generation) = finished {
            self.finish_request(generation);
        }

        debug!(
            "Forwarding fix from {:?} (accuracy {}m)",
            fix.provider, fix.accuracy
        );
        self.on_location.on_location_change(&fix);
    }

    fn on_status_changed(&self, provider: &Provider, status: ProviderStatus) {
        let Some(mut state) = self.state_for_event("status change") else {
            return;
        };
        debug!("Provider {provider} status changed to {status:?}");
        match provider {
            Provider::Gps => state.gps_status = Some(status),
            Provider::Network => state.network_status = Some(status),
            _ => {}
        }
    }

    fn on_provider_enabled(&self, provider: &Provider) {
        let Some(mut state) = self.state_for_event("provider enabled") else {
            return;
        };
        if state.set_available(provider, true) {
            debug!("Provider {provider} enabled");
        }
    }

    fn on_provider_disabled(&self, provider: &Provider) {
        let disconnected = {
            let Some(mut state) = self.state_for_event("provider disabled") else {
                return;
            };
            if state.set_available(provider, false) {
                debug!("Provider {provider} disabled");
            }
            !state.is_connected()
        };

        if disconnected {
            info!("All positioning providers disabled");
            self.connection.on_disconnected();
        }
    }
}

/// Coordinates location updates from a host location service.
///
/// Operations that talk to the host fail with
/// [`CoordinatorError::Disconnected`] once [`disconnect`](Self::disconnect)
/// has been called; a new coordinator must be built to reconnect. Dropping a
/// coordinator that is still connected removes its host subscriptions.
pub struct LocationCoordinator<H: LocationHost + 'static> {
    host: Mutex<Option<Arc<H>>>,
    listener: Arc<CoordinatorListener<H>>,
    on_failure: Arc<dyn ConnectionFailedListener>,
}

impl<H: LocationHost + 'static> LocationCoordinator<H> {
    /// Creates a coordinator with default [`CoordinatorOptions`].
    ///
    /// # Arguments
    ///
    /// * `host` - The platform location service
    /// * `on_location` - Receives forwarded fixes
    /// * `connection` - Receives connected/disconnected transitions
    /// * `on_failure` - Receives connection failures
    #[must_use]
    pub fn new(
        host: Arc<H>,
        on_location: Arc<dyn LocationChangeListener>,
        connection: Arc<dyn ConnectionCallbacks>,
        on_failure: Arc<dyn ConnectionFailedListener>,
    ) -> Self {
        Self::with_options(
            host,
            on_location,
            connection,
            on_failure,
            CoordinatorOptions::default(),
        )
    }

    /// Creates a coordinator with custom options.
    #[must_use]
    pub fn with_options(
        host: Arc<H>,
        on_location: Arc<dyn LocationChangeListener>,
        connection: Arc<dyn ConnectionCallbacks>,
        on_failure: Arc<dyn ConnectionFailedListener>,
        options: CoordinatorOptions,
    ) -> Self {
        let listener = Arc::new_cyclic(|me| CoordinatorListener {
            me: me.clone(),
            host: Arc::downgrade(&host),
            state: Mutex::new(CoordinatorState::default()),
            on_location,
            connection,
            options,
        });

        Self {
            host: Mutex::new(Some(host)),
            listener,
            on_failure,
        }
    }

    /// Returns the options this coordinator was built with.
    #[must_use]
    pub fn options(&self) -> &CoordinatorOptions {
        &self.listener.options
    }

    fn host(&self) -> CoordinatorResult<Arc<H>> {
        self.host
            .lock()
            .map_err(|e| CoordinatorError::StatePoisoned(e.to_string()))?
            .clone()
            .ok_or(CoordinatorError::Disconnected)
    }

    fn state(&self) -> CoordinatorResult<MutexGuard<'_, CoordinatorState>> {
        self.listener
            .state
            .lock()
            .map_err(|e| CoordinatorError::StatePoisoned(e.to_string()))
    }

    /// Reads the state, recovering it if a callback panicked while holding
    /// the lock. Plain reads cannot break any invariant.
    fn read_state<T>(&self, read: impl FnOnce(&CoordinatorState) -> T) -> T {
        let state = self
            .listener
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        read(&state)
    }

    fn listener_dyn(&self) -> Arc<dyn LocationListener> {
        self.listener.clone()
    }

    /// Checks whether any positioning provider is enabled.
    ///
    /// Queries the satellite and network providers once. Signals
    /// `on_connected` if at least one is enabled, `on_connection_failed`
    /// otherwise. There is no retry.
    ///
    /// Returns whether the coordinator is connected.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Disconnected`] after `disconnect`.
    pub fn connect(&self) -> CoordinatorResult<bool> {
        let host = self.host()?;
        let gps = host.is_provider_enabled(&Provider::Gps);
        let network = host.is_provider_enabled(&Provider::Network);

        let connected = {
            let mut state = self.state()?;
            state.gps_available = gps;
            state.network_available = network;
            state.is_connected()
        };

        if connected {
            info!("Location services connected (gps: {gps}, network: {network})");
            self.listener.connection.on_connected();
        } else {
            warn!("Location services unavailable: no provider enabled");
            self.on_failure.on_connection_failed();
        }
        Ok(connected)
    }

    /// Subscribes to location updates.
    ///
    /// Every provider in [`LocationRequest::providers`] is subscribed with the
    /// request's poll interval and minimum distance, all routed to the same
    /// internal listener. If the request limits the number of updates, updates
    /// stop automatically once that many fixes have been forwarded.
    ///
    /// A new request replaces the previous one: existing subscriptions are
    /// removed first, so each provider is subscribed at most once. This also
    /// holds when called from inside a location callback.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Disconnected`] after `disconnect`, or
    /// [`CoordinatorError::Host`] if the host refuses a subscription. In the
    /// latter case no subscription is left behind.
    pub fn request_location(&self, request: &LocationRequest) -> CoordinatorResult<()> {
        let host = self.host()?;
        let listener = self.listener_dyn();
        host.remove_updates(&listener);
        {
            let mut state = self.state()?;
            state.update_limit = request.number_of_updates();
            state.delivered = 0;
            state.generation = state.generation.wrapping_add(1);
        }

        for provider in request.providers() {
            if let Err(e) = host.request_updates(
                &provider,
                request.poll_interval(),
                request.min_distance(),
                Arc::clone(&listener),
            ) {
                warn!("Host refused updates from {provider}: {e}");
                host.remove_updates(&listener);
                return Err(e.into());
            }
        }

        info!(
            "Requested location updates from {:?} (interval {:?}, distance {}m, updates {})",
            request.providers(),
            request.poll_interval(),
            request.min_distance(),
            request.number_of_updates()
        );
        Ok(())
    }

    /// Removes the internal listener from every provider. The coordinator
    /// stays usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Disconnected`] after `disconnect`.
    pub fn stop_updates(&self) -> CoordinatorResult<()> {
        let host = self.host()?;
        host.remove_updates(&self.listener_dyn());
        {
            let mut state = self.state()?;
            state.generation = state.generation.wrapping_add(1);
        }
        info!("Stopped location updates");
        Ok(())
    }

    /// Unsubscribes and releases the host handle.
    ///
    /// Events the host still delivers afterwards are ignored. Callbacks run
    /// after the state lock is released, so when the host delivers on another
    /// thread, a final `on_location_change` or `on_disconnected` already in
    /// flight may reach the caller after this returns. Coordinator state is
    /// never changed after detach.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Disconnected`] if already disconnected.
    pub fn disconnect(&self) -> CoordinatorResult<()> {
        let host = self
            .host
            .lock()
            .map_err(|e| CoordinatorError::StatePoisoned(e.to_string()))?
            .take()
            .ok_or(CoordinatorError::Disconnected)?;

        self.listener
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .detached = true;

        host.remove_updates(&self.listener_dyn());
        info!("Location coordinator disconnected");
        Ok(())
    }

    /// Returns the best of the host's cached fixes.
    ///
    /// Reads the cached (not live) fix of the network and satellite providers,
    /// keeps the better one as the current best and returns the current best.
    /// If the host has no cached fix at all, the current best is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Disconnected`] after `disconnect`.
    pub fn last_known_location(&self) -> CoordinatorResult<Option<LocationFix>> {
        let host = self.host()?;
        let network = host.last_known_location(&Provider::Network);
        let gps = host.last_known_location(&Provider::Gps);

        let chosen = self
            .listener
            .options
            .quality
            .pick(network.as_ref(), gps.as_ref())
            .cloned();

        let mut state = self.state()?;
        if let Some(fix) = chosen {
            debug!("Last known fix from {:?}", fix.provider);
            state.current_best = Some(fix);
        }
        Ok(state.current_best.clone())
    }

    /// Returns true if the satellite or the network provider is available.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.read_state(CoordinatorState::is_connected)
    }

    /// Same as [`is_connected`](Self::is_connected).
    #[must_use]
    pub fn is_provider_enabled(&self) -> bool {
        self.is_connected()
    }

    /// Returns the current best fix without querying the host.
    #[must_use]
    pub fn current_best(&self) -> Option<LocationFix> {
        self.read_state(|state| state.current_best.clone())
    }

    /// Returns the most recent fix delivered by the host, forwarded or not.
    #[must_use]
    pub fn latest(&self) -> Option<LocationFix> {
        self.read_state(|state| state.latest.clone())
    }

    /// Returns the last status reported by the satellite or network provider.
    ///
    /// Other providers are not tracked and always return `None`.
    #[must_use]
    pub fn provider_status(&self, provider: &Provider) -> Option<ProviderStatus> {
        self.read_state(|state| match provider {
            Provider::Gps => state.gps_status,
            Provider::Network => state.network_status,
            _ => None,
        })
    }
}

impl<H: LocationHost + 'static> Drop for LocationCoordinator<H> {
    fn drop(&mut self) {
        let host = self
            .host
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(host) = host {
            host.remove_updates(&self.listener_dyn());
        }
    }
}
