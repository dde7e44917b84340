//! Hand-written port doubles shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use harbor_domain::ResponseSpec;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::{ApiTarget, ClientConfig};
use crate::ports::{
    Clock, DurableStore, HttpTransport, StorageChange, StorageError, TransportError,
    TransportFuture, TransportRequest,
};
use crate::session::TokenStore;

/// In-memory store that records every write.
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    changes: broadcast::Sender<StorageChange>,
    write_delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Self::with_write_delay(Duration::ZERO)
    }

    /// A store whose writes take `delay` before they land.
    pub fn with_write_delay(delay: Duration) -> Arc<Self> {
        let (changes, _) = broadcast::channel(16);
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            changes,
            write_delay: delay,
        })
    }

    async fn pause(&self) {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Writes a value as another client instance would.
    pub fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn written_values(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.pause().await;
        self.put(key, value);
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.pause().await;
        self.values.lock().unwrap().remove(key);
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value: None,
        });
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        Some(self.changes.subscribe())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()),
        })
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

type Handler = dyn Fn(&TransportRequest) -> Result<ResponseSpec, TransportError> + Send + Sync;

/// Transport answering from a closure, recording every request.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<TransportRequest>>,
    delay: Duration,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&TransportRequest) -> Result<ResponseSpec, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Self::with_delay(Duration::ZERO, handler)
    }

    /// Every response is held back by `delay`, so concurrent calls overlap.
    pub fn with_delay(
        delay: Duration,
        handler: impl Fn(&TransportRequest) -> Result<ResponseSpec, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.handler)(&request)
        })
    }
}

pub fn json(status: u16, body: &Value) -> Result<ResponseSpec, TransportError> {
    Ok(ResponseSpec::json(status, body))
}

pub fn no_content() -> Result<ResponseSpec, TransportError> {
    Ok(ResponseSpec::new(204, HashMap::new(), Vec::new(), Duration::ZERO))
}

pub fn bearer(request: &TransportRequest) -> Option<&str> {
    request
        .header("Authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Relative URLs keep assertions on paths readable.
pub fn test_config() -> ClientConfig {
    ClientConfig::new(ApiTarget::SameOrigin)
}

pub fn token_store(storage: &Arc<MemoryStore>) -> TokenStore {
    TokenStore::new(storage.clone(), ManualClock::new())
}
