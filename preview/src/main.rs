//! Desktop simulator for the myrtio-pwm-fixture control loop
//!
//! Runs the real fixture against simulated PWM, ADC and button backends.
//! Knobs and the mode button are sliders and a button; the portal column
//! talks to the fixture only through the request channel and the shared
//! status, exactly like the network task on the board.

use std::time::{Duration as StdDuration, Instant as StdInstant};

use eframe::egui::{self};
use myrtio_pwm_fixture::config::{EXTERNAL_QUEUE_SIZE, KNOB_MAX_MV, KNOB_MIN_MV, PWM_RESOLUTION_BITS};
use myrtio_pwm_fixture::math::rescale;
use myrtio_pwm_fixture::{
    AnalogInput, ButtonInput, ColorIntent, ExternalChannel, ExternalRequest, ExternalSender,
    Fixture, FixtureConfig, GpioPin, Instant, LogicalColor, MemoryStore, OperationMode,
    PwmChannel, PwmError, PwmOutput, Rgb8, SharedStatus, TickScheduler,
};

/// Number of channels the simulated PWM peripheral has
const PWM_CHANNELS: usize = 8;

/// Number of inputs the simulated ADC has
const ADC_CHANNELS: usize = 8;

/// Size of the LED swatches in pixels
const SWATCH_SIZE: f32 = 96.0;

/// Requests from the portal column to the control loop
static REQUESTS: ExternalChannel<EXTERNAL_QUEUE_SIZE> = ExternalChannel::new();

/// Status published by the control loop
static STATUS: SharedStatus = SharedStatus::new();

type SimFixture = Fixture<'static, SimPwm, MemoryStore<4>, SimAdc, SimButton, EXTERNAL_QUEUE_SIZE>;

/// PWM peripheral that remembers the last duty of every channel
#[derive(Debug, Default)]
struct SimPwm {
    configured: [bool; PWM_CHANNELS],
    duty: [u16; PWM_CHANNELS],
    /// Channel routed to each pin
    routes: Vec<(GpioPin, PwmChannel)>,
}

impl SimPwm {
    /// Duty currently driving `pin`
    fn duty_at(&self, pin: GpioPin) -> u16 {
        self.routes
            .iter()
            .find(|(routed, _)| *routed == pin)
            .map_or(0, |(_, channel)| self.duty[usize::from(channel.0)])
    }

    fn index(&self, channel: PwmChannel) -> Result<usize, PwmError> {
        let index = usize::from(channel.0);
        if index >= PWM_CHANNELS {
            return Err(PwmError::InvalidChannel);
        }
        Ok(index)
    }
}

impl PwmOutput for SimPwm {
    fn setup(
        &mut self,
        channel: PwmChannel,
        _frequency_hz: u32,
        _resolution_bits: u8,
    ) -> Result<(), PwmError> {
        let index = self.index(channel)?;
        self.configured[index] = true;
        Ok(())
    }

    fn attach(&mut self, pin: GpioPin, channel: PwmChannel) -> Result<(), PwmError> {
        self.index(channel)?;
        self.routes.retain(|(routed, _)| *routed != pin);
        self.routes.push((pin, channel));
        Ok(())
    }

    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<(), PwmError> {
        let index = self.index(channel)?;
        if !self.configured[index] {
            return Err(PwmError::InvalidChannel);
        }
        self.duty[index] = duty;
        Ok(())
    }
}

/// ADC whose inputs are set by the knob sliders, in millivolts
#[derive(Debug, Default)]
struct SimAdc {
    millivolts: [u16; ADC_CHANNELS],
}

impl AnalogInput for SimAdc {
    fn read_channel(&mut self, id: u8) -> u16 {
        self.millivolts.get(usize::from(id)).copied().unwrap_or(0)
    }
}

/// Button held down for exactly one tick per click
#[derive(Debug, Default)]
struct SimButton {
    pending: bool,
}

impl ButtonInput for SimButton {
    fn read_button(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 520.0])
            .with_title("PWM Fixture Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-pwm-fixture-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

struct PreviewApp {
    /// The paced control loop
    scheduler: TickScheduler<SimFixture>,
    /// Portal side of the request channel
    portal: ExternalSender<'static, EXTERNAL_QUEUE_SIZE>,
    /// ADC input of the left, middle and right knob
    knob_inputs: [u8; 3],
    /// Wall-clock start, the loop clock counts from here
    started: StdInstant,

    // UI state
    /// Knob positions in millivolts
    knobs: [u16; 3],
    /// Portal color picker
    portal_color: [u8; 3],
    /// Portal white point slider
    portal_kelvin: f32,
    /// Requests the queue refused
    rejected: usize,
    /// Error reported by the PWM bring-up
    begin_error: Option<PwmError>,
}

impl PreviewApp {
    fn new() -> Self {
        let config = FixtureConfig::default();
        let mut fixture = Fixture::new(
            &config,
            SimPwm::default(),
            MemoryStore::new(),
            SimAdc::default(),
            SimButton::default(),
            REQUESTS.receiver(),
        )
        .with_status(&STATUS);
        let begin_error = fixture.begin().err();

        Self {
            scheduler: TickScheduler::new(fixture),
            portal: REQUESTS.sender(),
            knob_inputs: config.knobs.channels,
            started: StdInstant::now(),
            knobs: [KNOB_MIN_MV; 3],
            portal_color: [255, 180, 100],
            portal_kelvin: 4000.0,
            rejected: 0,
            begin_error,
        }
    }

    fn fixture(&self) -> &SimFixture {
        self.scheduler.control()
    }

    /// Push a portal request, counting the ones the queue refused
    fn send(&mut self, request: ExternalRequest) {
        if self.portal.try_send(request).is_err() {
            self.rejected += 1;
        }
    }

    /// Copy the knob sliders into the simulated ADC
    fn sync_knobs(&mut self) {
        let inputs = self.knob_inputs;
        let knobs = self.knobs;
        let adc = self.scheduler.control_mut().adc_mut();
        for (id, value) in inputs.into_iter().zip(knobs) {
            if let Some(slot) = adc.millivolts.get_mut(usize::from(id)) {
                *slot = value;
            }
        }
    }

    /// Run one control loop tick, returning the time until the next one
    fn step(&mut self) -> StdDuration {
        self.sync_knobs();
        #[allow(clippy::cast_possible_truncation)]
        let elapsed = self.started.elapsed().as_millis() as u64;
        let result = self.scheduler.tick(Instant::from_millis(elapsed));
        StdDuration::from_millis(result.sleep_duration.as_millis())
    }

    /// Color shown by the LED, as the pins see it
    fn emitted_color(&self) -> egui::Color32 {
        let driver = self.fixture().driver();
        let assignment = driver.assignment();
        let [r, g, b] = LogicalColor::ALL
            .map(|color| narrow(driver.output().duty_at(assignment.pin_for(color))));
        egui::Color32::from_rgb(r, g, b)
    }

    /// Intended color before the power ceiling
    fn intended_color(&self) -> egui::Color32 {
        let color = self.fixture().driver().color();
        egui::Color32::from_rgb(narrow(color.r), narrow(color.g), narrow(color.b))
    }
}

/// Duty to an 8-bit display value
#[allow(clippy::cast_possible_truncation)]
fn narrow(duty: u16) -> u8 {
    rescale(duty, PWM_RESOLUTION_BITS, 8) as u8
}

fn swatch(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
    ui.vertical(|ui| {
        ui.label(label);
        let (response, painter) =
            ui.allocate_painter(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::hover());
        painter.rect_filled(response.rect, 6.0, color);
    });
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let sleep = self.step();
        ctx.request_repaint_after(sleep);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <FixtureControls>
                ui.vertical(|ui| {
                    ui.heading("Fixture");
                    ui.add_space(4.0);

                    let mode = self.fixture().mode();
                    ui.horizontal(|ui| {
                        ui.label(format!("Mode: {}", mode.as_str()));
                        if ui.button("Mode").clicked() {
                            self.scheduler.control_mut().button_mut().pending = true;
                        }
                    });

                    ui.add_space(4.0);

                    let names = match mode {
                        OperationMode::Ltt => ["Luminance", "Temperature", "Tint"],
                        _ => ["Left", "Middle", "Right"],
                    };
                    for (name, knob) in names.into_iter().zip(self.knobs.iter_mut()) {
                        ui.add(egui::Slider::new(knob, KNOB_MIN_MV..=KNOB_MAX_MV).text(name));
                    }
                });
                // </FixtureControls>
                ui.add_space(24.0);
                // <PortalControls>
                ui.vertical(|ui| {
                    ui.heading("Portal");
                    ui.add_space(4.0);

                    ui.label(format!(
                        "Status: {} / {}",
                        STATUS.mode().as_str(),
                        if STATUS.is_unlocked() { "unlocked" } else { "locked" }
                    ));

                    ui.horizontal(|ui| {
                        ui.label("Color:");
                        let old_color = self.portal_color;
                        if ui.color_edit_button_srgb(&mut self.portal_color).changed()
                            && old_color != self.portal_color
                        {
                            let [r, g, b] = self.portal_color;
                            self.send(ExternalRequest::Color(Rgb8::new(r, g, b).into()));
                        }
                    });

                    ui.horizontal(|ui| {
                        let old_kelvin = self.portal_kelvin;
                        ui.add(
                            egui::Slider::new(&mut self.portal_kelvin, 1667.0..=25000.0)
                                .logarithmic(true)
                                .text("K"),
                        );
                        if (self.portal_kelvin - old_kelvin).abs() > f32::EPSILON {
                            self.send(ExternalRequest::Color(ColorIntent::Cct {
                                kelvin: self.portal_kelvin,
                                duv: 0.0,
                            }));
                        }
                    });

                    ui.horizontal(|ui| {
                        if ui.button("Unlock").clicked() {
                            self.send(ExternalRequest::Unlock);
                        }
                        if ui.button("Reset to safe mode").clicked() {
                            self.send(ExternalRequest::ResetToSafeMode);
                        }
                    });

                    if self.rejected > 0 {
                        ui.label(format!("Queue full, {} requests dropped", self.rejected));
                    }
                });
                // </PortalControls>
            });

            ui.add_space(16.0);

            // === Output ===
            ui.horizontal(|ui| {
                swatch(ui, "Intended", self.intended_color());
                ui.add_space(8.0);
                swatch(ui, "Emitted", self.emitted_color());
            });

            ui.add_space(8.0);

            let driver = self.fixture().driver();
            let ceiling = driver.power_ceiling().fraction();
            let power = driver.output_power();
            ui.add(
                egui::ProgressBar::new(power)
                    .text(format!("{:.1}% of {:.0}% ceiling", power * 100.0, ceiling * 100.0)),
            );

            let duty = driver.output_duty();
            ui.label(format!("Duty R {} G {} B {}", duty.r, duty.g, duty.b));

            if let Some(err) = self.begin_error {
                ui.colored_label(egui::Color32::RED, format!("PWM bring-up failed: {err:?}"));
            }
        });
    }
}
