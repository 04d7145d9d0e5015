#![no_std]

//! Power-limited RGB PWM fixture engine
//!
//! Layers, leaf first:
//! - `color` - color space conversions and [`ColorIntent`]
//! - `unlock` - persisted unlock flag selecting the [`PowerCeiling`]
//! - `driver` - trim, remap, power limit and hysteresis in front of the PWM
//! - `mode` - debounced button cycling the color source
//! - `fixture` - one control loop iteration wiring all of the above
//!
//! Hardware is reached only through [`PwmOutput`], [`AnalogInput`],
//! [`ButtonInput`] and [`KeyValueStore`].

pub mod assignment;
pub mod channel;
pub mod color;
pub mod config;
pub mod driver;
pub mod external;
pub mod fixture;
pub mod input;
pub mod math;
pub mod mode;
pub mod output;
pub mod power;
pub mod scheduler;
pub mod storage;
pub mod unlock;

pub use assignment::{ChannelAssignment, ChannelSpec, LogicalColor};
pub use color::{ColorIntent, PwmColor, Rgb8, UnitRgb};
pub use driver::{ChannelWrites, DriverConfig, PowerLimitedDriver};
pub use external::{
    ExternalChannel, ExternalEffects, ExternalProcessor, ExternalReceiver, ExternalRequest,
    ExternalSender, SharedStatus,
};
pub use fixture::{Fixture, FixtureConfig, TickReport};
pub use input::{AnalogInput, ButtonInput, KnobConfig, Knobs};
pub use mode::{ModeTransition, OperationMode, OperationModeController};
pub use output::{GpioPin, PwmChannel, PwmError, PwmOutput};
pub use power::{PowerCeiling, PowerLevels};
pub use scheduler::{ControlLoop, TickScheduler};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use unlock::PersistedUnlockState;

pub use embassy_time::{Duration, Instant};
