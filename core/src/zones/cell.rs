use crate::zones::engine::ZoneEngine;
use crate::zones::model::ZoneSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Single mutable home of the active zone configuration.
///
/// Writers swap in a whole new [`ZoneSet`]; readers hold `Arc` snapshots that
/// never change underneath them. Clones share the same cell.
#[derive(Debug, Clone)]
pub struct ZoneConfigCell {
    sender: Arc<watch::Sender<Arc<ZoneSet>>>,
}

impl ZoneConfigCell {
    pub fn new(initial: ZoneSet) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn snapshot(&self) -> Arc<ZoneSet> {
        self.sender.borrow().clone()
    }

    /// Engine bound to the current snapshot.
    pub fn engine(&self) -> ZoneEngine {
        ZoneEngine::new(self.snapshot())
    }

    /// Replaces the configuration and returns the previous one.
    pub fn replace(&self, next: ZoneSet) -> Arc<ZoneSet> {
        self.sender.send_replace(Arc::new(next))
    }

    /// Derives the next configuration from the current one while holding the
    /// write lock, so no other writer lands in between. `derive` must not
    /// touch the cell.
    pub fn update<F>(&self, derive: F) -> Arc<ZoneSet>
    where
        F: FnOnce(&ZoneSet) -> ZoneSet,
    {
        let mut installed = None;
        self.sender.send_modify(|current| {
            let next = Arc::new(derive(current));
            installed = Some(next.clone());
            *current = next;
        });
        installed.unwrap_or_else(|| self.snapshot())
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ZoneSet>> {
        self.sender.subscribe()
    }
}

impl Default for ZoneConfigCell {
    fn default() -> Self {
        Self::new(ZoneSet::default())
    }
}
