use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;

use crate::errors::Error;
use crate::hardware::OutputRegister;
use crate::utils::BlinkToken;

/// Controls a single binary light wired to an [`OutputRegister`].
///
/// The handle is cheap to clone: clones share the same logical state and the
/// same register, so one copy can live in every HTTP handler and blink task
/// at once. All mutators serialize on an internal lock, which guarantees the
/// final physical register state always matches the final logical state
/// (last writer wins).
#[derive(Clone, Debug)]
pub struct Light {
    /// Logical on/off state, committed together with its register write.
    state: Arc<Mutex<LightState>>,
    /// Cancellation handles of the blink loops currently toggling the light.
    blinkers: Arc<Mutex<Vec<BlinkToken>>>,
}

#[derive(Debug)]
struct LightState {
    status: bool,
    register: Box<dyn OutputRegister>,
}

impl Light {
    /// Binds a light to its output register.
    ///
    /// The register is forced off so the logical and physical states agree
    /// from the start.
    pub fn new(mut register: Box<dyn OutputRegister>) -> Self {
        register.deactivate();
        Self {
            state: Arc::new(Mutex::new(LightState {
                status: false,
                register,
            })),
            blinkers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Current logical state. Never blocks on I/O.
    pub fn is_on(&self) -> bool {
        self.state.lock().status
    }

    /// Turns the light on. Idempotent: re-activating an energized register
    /// is safe.
    pub fn turn_on(&self) {
        let mut state = self.state.lock();
        state.status = true;
        state.register.activate();
    }

    /// Turns the light off.
    pub fn turn_off(&self) {
        let mut state = self.state.lock();
        state.status = false;
        state.register.deactivate();
    }

    /// Inverts the current state. The read and the write happen under a
    /// single lock acquisition, so no concurrent mutator can interleave
    /// between them.
    pub fn toggle(&self) {
        let mut state = self.state.lock();
        state.status = !state.status;
        match state.status {
            true => state.register.activate(),
            false => state.register.deactivate(),
        }
    }

    /// Toggles the light every `interval` until `token` is canceled, then
    /// forces the light off and returns.
    ///
    /// This is a long-running activity; run it as a background task
    /// (`tokio::spawn`) whenever the caller must stay responsive. The token
    /// is registered so [`Light::stop_blink`] reaches this loop; the caller
    /// may keep a clone of it to cancel this one loop directly. The token is
    /// deregistered on every exit path.
    ///
    /// Starting a blink does not cancel a previous one: any number of blink
    /// loops may toggle the same light concurrently.
    pub async fn blink(&self, interval: Duration, token: BlinkToken) {
        self.blinkers.lock().push(token.clone());

        let mut ticker = tokio::time::interval(interval);
        // The first tick of a tokio interval completes immediately; swallow
        // it so the light holds its current state for one full period.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("blink loop received cancellation");
                    self.turn_off();
                    break;
                }
                _ = ticker.tick() => self.toggle(),
            }
        }

        self.blinkers.lock().retain(|other| !token.same_token(other));
    }

    /// Cancels every outstanding blink loop, without waiting for them to
    /// retire. Each canceled loop leaves the light off on its way out.
    ///
    /// Safe to call with no blinker registered, and safe to call twice.
    pub fn stop_blink(&self) {
        let blinkers = self.blinkers.lock();
        if !blinkers.is_empty() {
            info!("stopping {} blink task(s)", blinkers.len());
        }
        for token in blinkers.iter() {
            token.cancel();
        }
    }

    /// Number of blink loops currently registered.
    pub fn active_blinkers(&self) -> usize {
        self.blinkers.lock().len()
    }

    /// JSON representation of the light: `{"status": <bool>}`.
    ///
    /// The status is read under the state lock, so the snapshot is exact at
    /// the instant of serialization.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        let status = self.state.lock().status;
        Ok(serde_json::to_vec(&serde_json::json!({ "status": status }))?)
    }
}

impl Display for Light {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Light [status={}, blinkers={}]",
            self.is_on(),
            self.active_blinkers(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::mocks::{MockRegister, RegisterCall};

    use super::*;

    fn setup() -> (Light, MockRegister) {
        let register = MockRegister::new();
        let light = Light::new(Box::new(register.clone()));
        (light, register)
    }

    #[test]
    fn test_creation_forces_off() {
        let (light, register) = setup();
        assert!(!light.is_on());
        assert_eq!(register.last_call(), Some(RegisterCall::Deactivate));
        assert_eq!(light.active_blinkers(), 0);
    }

    #[test]
    fn test_turn_on_and_off() {
        let (light, register) = setup();

        light.turn_on();
        assert!(light.is_on());
        assert_eq!(register.last_call(), Some(RegisterCall::Activate));

        light.turn_off();
        assert!(!light.is_on());
        assert_eq!(register.last_call(), Some(RegisterCall::Deactivate));
    }

    #[test]
    fn test_turn_on_is_idempotent() {
        let (light, register) = setup();
        light.turn_on();
        let calls = register.call_count();
        light.turn_on();
        assert!(light.is_on());
        // The register is re-activated, which is safe, but the observable
        // state is unchanged.
        assert_eq!(register.last_call(), Some(RegisterCall::Activate));
        assert_eq!(register.call_count(), calls + 1);
    }

    #[test]
    fn test_toggle() {
        let (light, register) = setup();
        light.toggle();
        assert!(light.is_on());
        assert_eq!(register.last_call(), Some(RegisterCall::Activate));
        light.toggle();
        assert!(!light.is_on());
        assert_eq!(register.last_call(), Some(RegisterCall::Deactivate));
    }

    #[test]
    fn test_concurrent_mutators_last_writer_wins() {
        let (light, register) = setup();

        let handles: Vec<_> = (0..9)
            .map(|i| {
                let light = light.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        match i % 3 {
                            0 => light.turn_on(),
                            1 => light.turn_off(),
                            _ => light.toggle(),
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Whatever the interleaving, the most recent register call must
        // agree with the final logical state.
        let expected = match light.is_on() {
            true => RegisterCall::Activate,
            false => RegisterCall::Deactivate,
        };
        assert_eq!(register.last_call(), Some(expected));
    }

    #[test]
    fn test_to_json_round_trip() {
        let (light, _) = setup();
        let decoded: serde_json::Value =
            serde_json::from_slice(&light.to_json().unwrap()).unwrap();
        assert_eq!(decoded, json!({"status": false}));

        light.turn_on();
        let decoded: serde_json::Value =
            serde_json::from_slice(&light.to_json().unwrap()).unwrap();
        assert_eq!(decoded, json!({"status": true}));
    }

    #[tokio::test]
    async fn test_blink_toggles_on_the_period() {
        let (light, _) = setup();
        let blinker = light.clone();
        let task = tokio::spawn(async move {
            blinker
                .blink(Duration::from_millis(100), BlinkToken::new())
                .await
        });

        // Sample mid-period: t=50ms, t=150ms, t=250ms.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let first = light.is_on();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = light.is_on();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let third = light.is_on();

        assert_ne!(first, second, "state must alternate between periods");
        assert_ne!(second, third, "state must alternate between periods");

        light.stop_blink();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_forces_off_and_deregisters() {
        let (light, _) = setup();
        // Start from ON so a cancellation in the first phase still ends off.
        light.turn_on();

        let token = BlinkToken::new();
        let blinker = light.clone();
        let task = tokio::spawn(async move {
            blinker.blink(Duration::from_millis(10), token).await
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(light.active_blinkers(), 1);

        light.stop_blink();
        task.await.unwrap();

        assert!(!light.is_on(), "a canceled blink must leave the light off");
        assert_eq!(light.active_blinkers(), 0);
    }

    #[tokio::test]
    async fn test_stop_blink_broadcasts_to_all() {
        let (light, _) = setup();

        let first = tokio::spawn({
            let light = light.clone();
            async move {
                light
                    .blink(Duration::from_millis(10), BlinkToken::new())
                    .await
            }
        });
        let second = tokio::spawn({
            let light = light.clone();
            async move {
                light
                    .blink(Duration::from_millis(15), BlinkToken::new())
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(light.active_blinkers(), 2);

        light.stop_blink();
        first.await.unwrap();
        second.await.unwrap();

        assert!(!light.is_on());
        assert_eq!(light.active_blinkers(), 0);

        // A second broadcast with nothing registered is a no-op.
        light.stop_blink();
    }

    #[tokio::test]
    async fn test_caller_token_cancels_a_single_loop() {
        let (light, _) = setup();

        let kept = BlinkToken::new();
        let canceled = BlinkToken::new();

        let survivor = tokio::spawn({
            let light = light.clone();
            let token = kept.clone();
            async move { light.blink(Duration::from_millis(10), token).await }
        });
        let victim = tokio::spawn({
            let light = light.clone();
            let token = canceled.clone();
            async move { light.blink(Duration::from_millis(10), token).await }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(light.active_blinkers(), 2);

        canceled.cancel();
        victim.await.unwrap();
        assert_eq!(light.active_blinkers(), 1);

        light.stop_blink();
        survivor.await.unwrap();
        assert_eq!(light.active_blinkers(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_before_first_tick() {
        let (light, _) = setup();
        let token = BlinkToken::new();
        token.cancel();

        // An already-canceled token retires the loop before any toggle.
        light.blink(Duration::from_secs(3600), token).await;
        assert!(!light.is_on());
        assert_eq!(light.active_blinkers(), 0);
    }

    #[tokio::test]
    async fn test_stop_scenario_settles_off() {
        let (light, _) = setup();

        light.turn_off();
        assert!(!light.is_on());

        let blinker = light.clone();
        let task = tokio::spawn(async move {
            blinker
                .blink(Duration::from_millis(50), BlinkToken::new())
                .await
        });

        tokio::time::sleep(Duration::from_millis(125)).await;
        light.stop_blink();
        task.await.unwrap();

        // Off, and it stays off.
        assert!(!light.is_on());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!light.is_on());
    }

    #[test]
    fn test_display_impl() {
        let (light, _) = setup();
        light.turn_on();
        assert_eq!(format!("{}", light), "Light [status=true, blinkers=0]");
    }
}
