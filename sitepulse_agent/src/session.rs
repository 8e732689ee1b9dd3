//! Per-session anti-forgery nonces guarding the WebSocket fallback.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const NONCE_LIFETIME: Duration = Duration::from_secs(24 * 3600);

pub struct NonceStore {
    lifetime: Duration,
    issued: Mutex<HashMap<String, Instant>>,
}

impl Default for NonceStore {
    fn default() -> Self {
        Self::new(NONCE_LIFETIME)
    }
}

impl NonceStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh 32-hex-digit nonce. Expired ones are pruned on the way.
    pub fn issue(&self) -> String {
        let bytes: [u8; 16] = rand::thread_rng().gen();
        let nonce: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let now = Instant::now();
        if let Ok(mut issued) = self.issued.lock() {
            let lifetime = self.lifetime;
            issued.retain(|_, at| now.duration_since(*at) < lifetime);
            issued.insert(nonce.clone(), now);
        }
        nonce
    }

    pub fn verify(&self, nonce: &str) -> bool {
        let Ok(issued) = self.issued.lock() else {
            return false;
        };
        issued
            .get(nonce)
            .is_some_and(|at| at.elapsed() < self.lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_nonces_verify_and_others_do_not() {
        let store = NonceStore::default();
        let n = store.issue();
        assert_eq!(n.len(), 32);
        assert!(store.verify(&n));
        assert!(!store.verify("deadbeef"));
        assert!(!store.verify(""));
    }

    #[test]
    fn expired_nonces_are_rejected() {
        let store = NonceStore::new(Duration::ZERO);
        let n = store.issue();
        assert!(!store.verify(&n));
    }
}
