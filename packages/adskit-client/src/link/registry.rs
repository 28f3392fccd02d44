//! The pending-request map: invoke id → responder.

use crate::error::ClientError;
use adskit_core::ads::AdsHeader;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// A matched response: the ADS header and the command body that followed it.
#[derive(Debug)]
pub struct AdsResponse {
    pub header: AdsHeader,
    pub body: Vec<u8>,
}

type Responder = oneshot::Sender<Result<AdsResponse, ClientError>>;

/// Pending requests keyed by invoke id.
///
/// Exactly one of {response, timeout eviction, teardown} consumes each entry;
/// whichever happens first takes the responder out of the map, so a request
/// resolves exactly once.
#[derive(Default)]
pub struct RequestRegistry {
    pending: Mutex<HashMap<u32, Responder>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending request. The invoke-id space wraps at `2^32 - 1`,
    /// far beyond any realistic number of in-flight requests, so a collision
    /// means a stuck entry; the old responder is dropped (its caller gets a
    /// cancellation).
    pub fn insert(&self, invoke_id: u32, responder: Responder) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(invoke_id, responder);
    }

    /// Takes the responder for an arriving response. `None` means the entry
    /// is gone (timed out or never existed): a stale response.
    pub fn take(&self, invoke_id: u32) -> Option<Responder> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&invoke_id)
    }

    /// Number of requests currently in flight.
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails every pending request with connection-lost. Used on teardown;
    /// requests enqueued before a reconnect are never silently re-sent.
    pub fn fail_all(&self) {
        let drained: Vec<Responder> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain().map(|(_, responder)| responder).collect()
        };
        for responder in drained {
            let _ = responder.send(Err(ClientError::ConnectionLost));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adskit_core::ads::{AdsCommandId, AdsReturnCode, StateFlags};
    use adskit_core::ams::AmsAddr;

    fn response(invoke_id: u32) -> AdsResponse {
        AdsResponse {
            header: AdsHeader::new(
                AmsAddr::default(),
                AmsAddr::default(),
                AdsCommandId::Read,
                StateFlags::response(),
                0,
                AdsReturnCode::OK,
                invoke_id,
            ),
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn take_resolves_once() {
        let registry = RequestRegistry::new();
        let (tx, rx) = oneshot::channel();
        registry.insert(1, tx);

        registry.take(1).unwrap().send(Ok(response(1))).unwrap();
        assert!(registry.take(1).is_none());
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn fail_all_drains() {
        let registry = RequestRegistry::new();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        registry.insert(1, tx1);
        registry.insert(2, tx2);

        registry.fail_all();
        assert!(registry.is_empty());
        assert!(matches!(rx1.await.unwrap(), Err(ClientError::ConnectionLost)));
        assert!(matches!(rx2.await.unwrap(), Err(ClientError::ConnectionLost)));
    }
}
