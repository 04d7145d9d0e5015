//! External controller requests
//!
//! Handles requests from the configuration portal. The portal only ever
//! talks to a [`Channel`] and a [`SharedStatus`]; the control loop drains
//! the channel and applies the requests to the driver.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::channel::{Channel, Receiver, Sender};
use crate::color::{ColorIntent, PwmColor};
use crate::driver::{ChannelWrites, PowerLimitedDriver};
use crate::mode::OperationMode;
use crate::output::PwmOutput;
use crate::power::PowerCeiling;
use crate::storage::KeyValueStore;

/// Request sent by an external controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExternalRequest {
    /// Show a color
    Color(ColorIntent),
    /// Persistently raise the power ceiling
    Unlock,
    /// Persistently return to the safe power ceiling
    ResetToSafeMode,
}

/// Side effects of one drain
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExternalEffects {
    /// Writes caused by the applied color
    pub writes: ChannelWrites,
    /// Color requests seen, including coalesced and dropped ones
    pub colors_received: u8,
    /// Color requests dropped because the source had no authority
    pub colors_dropped: u8,
    /// Ceiling after an unlock or reset request
    pub ceiling: Option<PowerCeiling>,
}

impl ExternalEffects {
    /// Check if anything was received
    pub const fn has_effects(&self) -> bool {
        self.colors_received > 0 || self.ceiling.is_some()
    }
}

/// Type alias for the request sender
pub type ExternalSender<'a, const SIZE: usize> = Sender<'a, ExternalRequest, SIZE>;

/// Type alias for the request receiver
pub type ExternalReceiver<'a, const SIZE: usize> = Receiver<'a, ExternalRequest, SIZE>;

/// Type alias for the request channel
pub type ExternalChannel<const SIZE: usize> = Channel<ExternalRequest, SIZE>;

/// Drains external requests into the driver
pub struct ExternalProcessor<'a, const SIZE: usize> {
    requests: ExternalReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> ExternalProcessor<'a, SIZE> {
    pub const fn new(requests: ExternalReceiver<'a, SIZE>) -> Self {
        Self { requests }
    }

    /// Process all pending requests (non-blocking)
    ///
    /// Ceiling requests apply in arrival order and are followed by a
    /// power limit refresh. Color requests collapse to the newest one and
    /// reach the driver only when `has_authority` is set.
    pub fn process_pending<O: PwmOutput, S: KeyValueStore>(
        &mut self,
        driver: &mut PowerLimitedDriver<O, S>,
        has_authority: bool,
    ) -> ExternalEffects {
        let mut effects = ExternalEffects::default();
        let mut latest_color = None;

        while let Ok(request) = self.requests.try_receive() {
            match request {
                ExternalRequest::Color(intent) => {
                    effects.colors_received = effects.colors_received.saturating_add(1);
                    if has_authority {
                        latest_color = Some(intent);
                    } else {
                        effects.colors_dropped = effects.colors_dropped.saturating_add(1);
                    }
                }
                ExternalRequest::Unlock => {
                    driver.unlock();
                    effects.ceiling = Some(driver.check_and_update_power_limit());
                }
                ExternalRequest::ResetToSafeMode => {
                    driver.reset_to_safe_mode();
                    effects.ceiling = Some(driver.check_and_update_power_limit());
                }
            }
        }

        if let Some(intent) = latest_color {
            effects.writes = driver.render(intent);
        }

        #[cfg(feature = "esp32-log")]
        if effects.has_effects() {
            println!(
                "[ExternalProcessor.process_pending] colors {} (dropped {}), ceiling {:?}",
                effects.colors_received,
                effects.colors_dropped,
                effects.ceiling.map(PowerCeiling::fraction)
            );
        }

        effects
    }
}

/// Fixture status readable from any context
///
/// The control loop republishes it every tick; the portal reads it to
/// answer lock status and color queries without touching the driver.
pub struct SharedStatus {
    unlocked: AtomicBool,
    mode: AtomicU8,
    r: AtomicU16,
    g: AtomicU16,
    b: AtomicU16,
}

impl SharedStatus {
    pub const fn new() -> Self {
        Self {
            unlocked: AtomicBool::new(false),
            mode: AtomicU8::new(OperationMode::Rgb as u8),
            r: AtomicU16::new(0),
            g: AtomicU16::new(0),
            b: AtomicU16::new(0),
        }
    }

    // === Read methods (for external observation) ===

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::Relaxed)
    }

    pub fn mode(&self) -> OperationMode {
        OperationMode::from_raw(self.mode.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Last intended color of the driver
    pub fn color(&self) -> PwmColor {
        PwmColor {
            r: self.r.load(Ordering::Relaxed),
            g: self.g.load(Ordering::Relaxed),
            b: self.b.load(Ordering::Relaxed),
        }
    }

    // === Write methods (for the control loop) ===

    pub fn publish<O: PwmOutput, S: KeyValueStore>(
        &self,
        driver: &PowerLimitedDriver<O, S>,
        mode: OperationMode,
    ) {
        let color = driver.color();
        self.unlocked.store(driver.is_unlocked(), Ordering::Relaxed);
        self.mode.store(mode.as_raw(), Ordering::Relaxed);
        self.r.store(color.r, Ordering::Relaxed);
        self.g.store(color.g, Ordering::Relaxed);
        self.b.store(color.b, Ordering::Relaxed);
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}
