//! PWM output abstraction layer
//!
//! Keeps the driver hardware-agnostic: the LEDC peripheral on the board,
//! a recording mock in tests and the preview window all implement
//! [`PwmOutput`].

/// Hardware PWM channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PwmChannel(pub u8);

/// GPIO pin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin(pub u8);

/// Error reported by a PWM backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Channel is unknown to the backend or was never set up
    InvalidChannel,
    /// The platform refused the request
    Rejected,
}

/// Abstract PWM output
///
/// Implement this trait to support different hardware platforms.
/// The channel driver is generic over this trait.
pub trait PwmOutput {
    /// Configure a channel timer
    fn setup(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<(), PwmError>;

    /// Route a channel to a GPIO pin
    fn attach(&mut self, pin: GpioPin, channel: PwmChannel) -> Result<(), PwmError>;

    /// Write a duty value to a channel
    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<(), PwmError>;
}
