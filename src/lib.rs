//! **lightd** drives a single light wired to a GPIO output register and
//! exposes its state and behavior over a small HTTP API.
//!
//! The heart of the crate is [`devices::Light`]: a concurrency-safe on/off
//! controller with a cancelable blink behavior. A `Light` handle is cheap to
//! clone and is shared between the HTTP handlers in [`server`] and any number
//! of background blink tasks.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use lightd::devices::Light;
//! use lightd::hardware::NullRegister;
//! use lightd::utils::BlinkToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let light = Light::new(Box::new(NullRegister));
//!     light.turn_on();
//!
//!     // Blink in the background every 500ms.
//!     let token = BlinkToken::new();
//!     let blinker = light.clone();
//!     tokio::spawn(async move { blinker.blink(Duration::from_millis(500), token).await });
//!
//!     // Later: cancel every outstanding blink task. The light ends up off.
//!     light.stop_blink();
//! }
//! ```
//!
//! # Feature flags
//!
//! - **pi** -- Enables the `rppal`-backed [`hardware::GpioRegister`]. Without
//!   it the binary runs with a no-op register, which is handy off-Pi.
//! - **mocks** -- Exposes the [`mocks`] module outside of tests.

pub mod config;
pub mod devices;
pub mod errors;
pub mod hardware;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod server;
pub mod utils;
