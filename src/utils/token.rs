//! Cancellation handle for blink activities.

use tokio::sync::watch;

/// Cooperative cancellation handle shared between a blink loop and the
/// callers that may want to stop it.
///
/// Signaling is broadcast and idempotent: [`BlinkToken::cancel`] wakes every
/// waiter and may be called any number of times, including when no loop is
/// listening anymore. Clones share the same underlying signal.
#[derive(Clone, Debug)]
pub struct BlinkToken {
    signal: watch::Sender<bool>,
}

impl BlinkToken {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self { signal }
    }

    /// Broadcasts the cancellation signal to every waiter.
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    /// Resolves once [`BlinkToken::cancel`] has been called, immediately if
    /// it already was.
    pub async fn cancelled(&self) {
        let mut receiver = self.signal.subscribe();
        // Cannot fail: `self` holds the sender side alive.
        let _ = receiver.wait_for(|canceled| *canceled).await;
    }

    /// Whether `other` is a handle to this very token.
    pub fn same_token(&self, other: &Self) -> bool {
        self.signal.same_channel(&other.signal)
    }
}

impl Default for BlinkToken {
    fn default() -> Self {
        Self::new()
    }
}
