//! Windowed request tokens.
//!
//! Tokens are truncated SHA-256 digests of `secret:scope:window`, where the
//! window is the current 12-hour slot. Verification accepts the current and
//! the previous window, so a token survives a slot rollover but expires
//! within a day. Comparison is constant-time.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::application::tokens::{TokenScope, TokenService};

const WINDOW_SECS: u64 = 12 * 60 * 60;
const TOKEN_LEN: usize = 20;

pub struct WindowedTokens {
    secret: String,
}

impl WindowedTokens {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn current_window() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            / WINDOW_SECS
    }

    fn token_for(&self, scope: TokenScope, window: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(scope.tag().as_bytes());
        hasher.update(b":");
        hasher.update(window.to_string().as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(TOKEN_LEN);
        digest
    }
}

impl TokenService for WindowedTokens {
    fn issue(&self, scope: TokenScope) -> String {
        self.token_for(scope, Self::current_window())
    }

    fn verify(&self, token: &str, scope: TokenScope) -> bool {
        let window = Self::current_window();
        [window, window.saturating_sub(1)].into_iter().any(|w| {
            let expected = self.token_for(scope, w);
            expected.as_bytes().ct_eq(token.as_bytes()).unwrap_u8() == 1
        })
    }
}
