use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

/// Two connections matched into one session. `first` was waiting.
#[derive(Debug)]
pub struct Pairing<C> {
    pub first: C,
    pub second: C,
}

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Pairing queue poisoned")]
    StoragePoisoned,
}

/// Waiting room that matches connections two at a time.
///
/// The pop-or-push decision happens inside one critical section, so two
/// concurrent arrivals can never claim the same waiting connection.
#[derive(Debug)]
pub struct PairingQueue<C> {
    waiting: Mutex<VecDeque<C>>,
}

impl<C> Default for PairingQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> PairingQueue<C> {
    pub fn new() -> Self {
        Self {
            waiting: Mutex::new(VecDeque::new()),
        }
    }

    /// Matches `conn` with the longest-waiting connection, or parks it.
    pub fn enqueue(&self, conn: C) -> Result<Option<Pairing<C>>, PairingError> {
        let mut guard = self
            .waiting
            .lock()
            .map_err(|_| PairingError::StoragePoisoned)?;
        match guard.pop_front() {
            Some(first) => Ok(Some(Pairing {
                first,
                second: conn,
            })),
            None => {
                guard.push_back(conn);
                Ok(None)
            }
        }
    }

    pub fn waiting(&self) -> usize {
        self.waiting.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.waiting.lock();
            panic!("poisoning pairing queue");
        }));
    }

    /// Drops every parked connection, closing them.
    pub fn clear(&self) -> usize {
        match self.waiting.lock() {
            Ok(mut guard) => {
                let dropped = guard.len();
                guard.clear();
                dropped
            }
            Err(_) => 0,
        }
    }
}
