//! The physical output the light controller drives.

mod register;

#[cfg(feature = "pi")]
pub use register::GpioRegister;
pub use register::NullRegister;
pub use register::OutputRegister;
