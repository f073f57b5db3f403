//! Where each source address was first observed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};

use sdnfw_core::{AddressTracker, MacAddr, SwitchLocation};
use tracing::info;

/// Maps each source MAC to the first switch port it was seen on.
///
/// Later sightings on other ports are not recorded.
#[derive(Debug, Default)]
pub struct FirstSeenRegistry {
    entries: HashMap<MacAddr, SwitchLocation>,
}

impl FirstSeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mac` at `location` unless it was already seen. Returns whether
    /// this was the first sighting.
    pub fn observe(&mut self, mac: MacAddr, location: SwitchLocation) -> bool {
        match self.entries.entry(mac) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                info!(%mac, %location, "address first seen");
                slot.insert(location);
                true
            }
        }
    }

    pub fn get(&self, mac: &MacAddr) -> Option<&SwitchLocation> {
        self.entries.get(mac)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AddressTracker for FirstSeenRegistry {
    fn record_first_seen(&mut self, mac: MacAddr, location: &SwitchLocation) {
        self.observe(mac, *location);
    }
}

/// A registry handle shared by every switch policy of one controller.
#[derive(Debug, Clone, Default)]
pub struct SharedFirstSeen(Arc<Mutex<FirstSeenRegistry>>);

impl SharedFirstSeen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the registry.
    pub fn with<R>(&self, f: impl FnOnce(&FirstSeenRegistry) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl AddressTracker for SharedFirstSeen {
    fn record_first_seen(&mut self, mac: MacAddr, location: &SwitchLocation) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(mac, *location);
    }
}
