//! Controllable devices. This crate manages exactly one: the light.

mod light;

pub use light::Light;
