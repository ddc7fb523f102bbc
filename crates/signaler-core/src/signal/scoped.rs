//! ScopedConnection - guard の寿命に接続を結びつける
//!
//! `Signal::connect_scoped` が返します。guard が drop されると slot も切れます。

use super::ids::ConnectionId;
use super::registry::SignalCore;
use std::rc::Weak;

/// RAII guard: drop で接続を切る
///
/// `release()` すると guard を外し、通常の `ConnectionId` として扱えます。
#[must_use = "dropping a ScopedConnection disconnects the slot immediately"]
pub struct ScopedConnection<Args> {
    signal: Weak<SignalCore<Args>>,
    id: ConnectionId,
    armed: bool,
}

impl<Args> ScopedConnection<Args> {
    pub(crate) fn new(signal: Weak<SignalCore<Args>>, id: ConnectionId) -> Self {
        Self {
            signal,
            id,
            armed: true,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Keep the slot connected and hand back its id.
    pub fn release(mut self) -> ConnectionId {
        self.armed = false;
        self.id
    }
}

impl<Args> Drop for ScopedConnection<Args> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}
