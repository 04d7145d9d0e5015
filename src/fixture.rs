//! Fixture - the control loop orchestrator
//!
//! One [`Fixture::tick`] is one iteration of the control loop:
//! 1. sample the mode button, applying handover side effects
//! 2. read the knobs
//! 3. feed the source selected by the mode into the driver, or retry
//!    rejected writes when the mode has nothing to render
//! 4. publish the status for external readers

use embassy_time::{Duration, Instant};

use crate::color::ColorIntent;
use crate::config::{BUTTON_DEBOUNCE, RGB_KNOB_ORDER};
use crate::driver::{ChannelWrites, DriverConfig, PowerLimitedDriver};
use crate::external::{ExternalEffects, ExternalProcessor, ExternalReceiver, SharedStatus};
use crate::input::{AnalogInput, ButtonInput, KnobConfig, Knobs};
use crate::mode::{ModeTransition, OperationMode, OperationModeController};
use crate::output::{PwmError, PwmOutput};
use crate::scheduler::ControlLoop;
use crate::storage::KeyValueStore;

/// Configuration for the whole fixture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureConfig {
    pub driver: DriverConfig,
    pub knobs: KnobConfig,
    /// Knob index (left / middle / right) feeding red, green and blue
    pub rgb_knob_order: [usize; 3],
    pub debounce: Duration,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            knobs: KnobConfig::default(),
            rgb_knob_order: RGB_KNOB_ORDER,
            debounce: BUTTON_DEBOUNCE,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Mode after the tick
    pub mode: OperationMode,
    /// Mode change accepted during the tick
    pub transition: Option<ModeTransition>,
    /// All channel writes of the tick
    pub writes: ChannelWrites,
    /// External requests handled during the tick
    pub external: ExternalEffects,
}

/// The complete fixture: driver, mode selector, knobs and portal inbox
pub struct Fixture<'a, O, S, A, B, const QUEUE_SIZE: usize>
where
    O: PwmOutput,
    S: KeyValueStore,
    A: AnalogInput,
    B: ButtonInput,
{
    // Hardware
    driver: PowerLimitedDriver<O, S>,
    adc: A,
    button: B,

    // Sources
    modes: OperationModeController,
    knobs: Knobs,
    rgb_knob_order: [usize; 3],
    external: ExternalProcessor<'a, QUEUE_SIZE>,
    status: Option<&'a SharedStatus>,
}

impl<'a, O, S, A, B, const QUEUE_SIZE: usize> Fixture<'a, O, S, A, B, QUEUE_SIZE>
where
    O: PwmOutput,
    S: KeyValueStore,
    A: AnalogInput,
    B: ButtonInput,
{
    pub fn new(
        config: &FixtureConfig,
        output: O,
        store: S,
        adc: A,
        button: B,
        requests: ExternalReceiver<'a, QUEUE_SIZE>,
    ) -> Self {
        Self {
            driver: PowerLimitedDriver::new(&config.driver, output, store),
            adc,
            button,
            modes: OperationModeController::new(config.debounce),
            knobs: Knobs::new(config.knobs),
            rgb_knob_order: config.rgb_knob_order.map(|i| i.min(2)),
            external: ExternalProcessor::new(requests),
            status: None,
        }
    }

    /// Publish status into `status` after every tick
    #[must_use]
    pub fn with_status(mut self, status: &'a SharedStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Bring up the driver and publish the initial status
    pub fn begin(&mut self) -> Result<(), PwmError> {
        let result = self.driver.begin();
        self.publish();
        result
    }

    /// Run one control loop iteration
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let pressed = self.button.read_button();
        let transition = self.modes.update(pressed, now);
        let mut writes = match transition {
            Some(transition) => {
                if transition.leaves_external() {
                    self.knobs.reset();
                }
                transition.hand_over(&mut self.driver)
            }
            None => ChannelWrites::default(),
        };

        let full_scale = self.driver.full_scale();
        let knobs = self.knobs.read(&mut self.adc, full_scale);

        let mode = self.modes.mode();
        let has_authority = mode == OperationMode::External;
        // Drained every tick so stale portal requests never pile up
        let external = self.external.process_pending(&mut self.driver, has_authority);
        writes = writes.merge(external.writes);

        let source = match mode {
            OperationMode::Rgb => {
                let [r, g, b] = self.rgb_knob_order.map(|i| knobs[i]);
                Some(ColorIntent::rgb(r, g, b))
            }
            OperationMode::Ltt => Some(ColorIntent::Ltt {
                luminance: knobs[0],
                temperature: knobs[1],
                tint: knobs[2],
            }),
            OperationMode::External | OperationMode::Off => None,
        };
        // Sources that stay silent still get rejected writes retried
        let source_writes = match source {
            Some(intent) => self.driver.render(intent),
            None => self.driver.retry_pending(),
        };
        writes = writes.merge(source_writes);

        self.publish();

        TickReport {
            mode,
            transition,
            writes,
            external,
        }
    }

    pub const fn mode(&self) -> OperationMode {
        self.modes.mode()
    }

    pub const fn driver(&self) -> &PowerLimitedDriver<O, S> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PowerLimitedDriver<O, S> {
        &mut self.driver
    }

    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    pub fn button_mut(&mut self) -> &mut B {
        &mut self.button
    }

    fn publish(&self) {
        if let Some(status) = self.status {
            status.publish(&self.driver, self.modes.mode());
        }
    }
}

impl<O, S, A, B, const QUEUE_SIZE: usize> ControlLoop for Fixture<'_, O, S, A, B, QUEUE_SIZE>
where
    O: PwmOutput,
    S: KeyValueStore,
    A: AnalogInput,
    B: ButtonInput,
{
    fn tick(&mut self, now: Instant) {
        Fixture::tick(self, now);
    }
}
