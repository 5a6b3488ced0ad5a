//! Mocked entities for testing purposes.

mod register;

pub use register::{MockRegister, RegisterCall};
