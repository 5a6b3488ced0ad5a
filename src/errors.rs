use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Hardware error: {source}.
    HardwareError { source: HardwareError },
    /// State encoding error: {info}.
    EncodingError { info: String },
    /// Invalid request: {info}.
    InvalidRequest { info: String },
}

impl From<HardwareError> for Error {
    fn from(value: HardwareError) -> Self {
        Self::HardwareError { source: value }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::EncodingError {
            info: value.to_string(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HardwareError {
    /// GPIO is not available: {info}
    GpioUnavailable { info: String },
    /// Pin ({pin}) cannot be acquired: {info}
    PinUnavailable { pin: u8, info: String },
}
