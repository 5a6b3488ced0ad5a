use std::fmt::Debug;

use log::trace;

#[cfg(feature = "pi")]
use crate::errors::{Error, HardwareError};

/// The only side of the hardware the controller is allowed to touch.
///
/// Both operations are idempotent and fire-and-forget: once constructed, a
/// register either works or the process should not have started (acquisition
/// failures are fatal at startup, see [`crate::errors`]).
pub trait OutputRegister: Debug + Send {
    /// Energizes the output.
    fn activate(&mut self);

    /// De-energizes the output.
    fn deactivate(&mut self);
}

/// Register backed by a Raspberry Pi GPIO pin (BCM numbering).
#[cfg(feature = "pi")]
#[derive(Debug)]
pub struct GpioRegister {
    pin: rppal::gpio::OutputPin,
}

#[cfg(feature = "pi")]
impl GpioRegister {
    /// Acquires the pin and takes it into output mode.
    ///
    /// # Errors
    /// * `GpioUnavailable`: the GPIO peripheral cannot be opened.
    /// * `PinUnavailable`: the pin does not exist or is already claimed.
    pub fn new(pin: u8) -> Result<Self, Error> {
        let gpio = rppal::gpio::Gpio::new().map_err(|err| HardwareError::GpioUnavailable {
            info: err.to_string(),
        })?;
        let pin = gpio
            .get(pin)
            .map_err(|err| HardwareError::PinUnavailable {
                pin,
                info: err.to_string(),
            })?
            .into_output();
        Ok(Self { pin })
    }
}

#[cfg(feature = "pi")]
impl OutputRegister for GpioRegister {
    fn activate(&mut self) {
        self.pin.set_high();
    }

    fn deactivate(&mut self) {
        self.pin.set_low();
    }
}

/// No-op register used when running without GPIO support (development
/// machines, CI).
#[derive(Debug, Default)]
pub struct NullRegister;

impl OutputRegister for NullRegister {
    fn activate(&mut self) {
        trace!("null register: activate");
    }

    fn deactivate(&mut self) {
        trace!("null register: deactivate");
    }
}
