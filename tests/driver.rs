mod common;

mod tests {
    use myrtio_pwm_fixture::{
        ChannelAssignment, ChannelSpec, ColorIntent, DriverConfig, GpioPin, LogicalColor,
        MemoryStore, PowerCeiling, PowerLimitedDriver, PwmChannel, PwmColor, Rgb8,
    };

    use crate::common::MockPwm;

    type Driver = PowerLimitedDriver<MockPwm, MemoryStore<4>>;

    fn driver() -> Driver {
        let mut driver = PowerLimitedDriver::new(
            &DriverConfig::default(),
            MockPwm::default(),
            MemoryStore::new(),
        );
        driver.begin().unwrap();
        driver
    }

    #[test]
    fn test_begin_configures_channels() {
        let driver = driver();
        let output = driver.output();

        assert_eq!(
            output.setups,
            vec![
                (PwmChannel(0), 19_000, 11),
                (PwmChannel(1), 19_000, 11),
                (PwmChannel(2), 19_000, 11),
            ]
        );
        // Red and blue wiring is swapped on the production board
        assert_eq!(
            output.attachments,
            vec![
                (GpioPin(5), PwmChannel(2)),
                (GpioPin(6), PwmChannel(1)),
                (GpioPin(7), PwmChannel(0)),
            ]
        );
        assert_eq!(output.write_count(), 3);
        assert!(output.writes.iter().all(|&(_, duty)| duty == 0));
        assert_eq!(driver.power_ceiling(), PowerCeiling::LOCKED);
        assert!(!driver.is_unlocked());
    }

    #[test]
    fn test_set_color_is_idempotent() {
        let mut driver = driver();

        let writes = driver.set_color(1000, 1000, 1000);
        assert_eq!(writes.count(), 3);
        assert_eq!(driver.output().duty_of(0), 300);
        assert_eq!(driver.output().duty_of(1), 300);
        assert_eq!(driver.output().duty_of(2), 300);

        let writes = driver.set_color(1000, 1000, 1000);
        assert!(writes.is_empty());
        assert_eq!(driver.output().write_count(), 6);
    }

    #[test]
    fn test_update_threshold_is_exclusive() {
        let mut driver = driver();
        driver.set_color(1000, 1000, 1000);

        let writes = driver.set_color(1004, 996, 1005);
        assert_eq!(writes.count(), 1);
        assert!(writes.contains(LogicalColor::Blue));
        assert!(!writes.contains(LogicalColor::Red));
        assert_eq!(driver.color(), PwmColor { r: 1000, g: 1000, b: 1005 });
        assert_eq!(driver.output().duty_of(2), 301);
    }

    #[test]
    fn test_blue_is_clamped_to_its_limit() {
        let mut driver = driver();
        driver.set_color(0, 0, 2047);
        assert_eq!(driver.color().b, 2000);
        assert_eq!(driver.output().duty_of(2), 600);
    }

    #[test]
    fn test_trim_applies_before_threshold() {
        let assignment = ChannelAssignment::new(
            ChannelSpec::new(5, 0, 2047).with_trim(0.5),
            ChannelSpec::new(6, 1, 2047),
            ChannelSpec::new(7, 2, 2047),
        );
        let config = DriverConfig {
            assignment,
            ..DriverConfig::default()
        };
        let mut driver = PowerLimitedDriver::new(&config, MockPwm::default(), MemoryStore::<4>::new());
        driver.begin().unwrap();

        driver.set_color(1000, 0, 0);
        assert_eq!(driver.color().r, 500);

        // 1006 trims to 503, within the threshold of 500
        let writes = driver.set_color(1006, 0, 0);
        assert!(writes.is_empty());
        assert_eq!(driver.color().r, 500);
    }

    #[test]
    fn test_output_never_exceeds_ceiling() {
        let mut driver = driver();
        let steps = [0, 1, 5, 512, 1023, 1500, 2000, 2047, u16::MAX];

        for unlocked in [false, true] {
            if unlocked {
                driver.unlock();
            }
            let ceiling = driver.power_ceiling().fraction();
            for r in steps {
                for g in steps {
                    for b in steps {
                        driver.set_color(r, g, b);
                        assert!(driver.output_power() <= ceiling + 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unlock_reemits_at_new_scale() {
        let mut driver = driver();
        driver.set_color(0, 0, 2047);
        assert_eq!(driver.output().duty_of(2), 600);

        let ceiling = driver.unlock();
        assert_eq!(ceiling, PowerCeiling::UNLOCKED);
        assert!(driver.is_unlocked());
        assert_eq!(driver.output().duty_of(2), 1200);
        // Intended state is untouched by re-emission
        assert_eq!(driver.color().b, 2000);

        driver.reset_to_safe_mode();
        assert_eq!(driver.output().duty_of(2), 600);
        assert_eq!(driver.power_ceiling(), PowerCeiling::LOCKED);
    }

    #[test]
    fn test_unchanged_ceiling_writes_nothing() {
        let mut driver = driver();
        driver.set_color(1000, 1000, 1000);
        let before = driver.output().write_count();

        driver.check_and_update_power_limit();
        assert_eq!(driver.output().write_count(), before);
    }

    #[test]
    fn test_unlock_survives_restart() {
        let mut driver = driver();
        driver.unlock();
        let (_, store) = driver.into_parts();

        let mut restarted = PowerLimitedDriver::new(&DriverConfig::default(), MockPwm::default(), store);
        assert_eq!(restarted.power_ceiling(), PowerCeiling::LOCKED);
        restarted.begin().unwrap();
        assert_eq!(restarted.power_ceiling(), PowerCeiling::UNLOCKED);
    }

    #[test]
    fn test_rejected_write_is_retried() {
        let mut driver = driver();
        driver.output_mut().reject = Some(PwmChannel(0));

        let writes = driver.set_color(1000, 1000, 1000);
        assert!(writes.has_failures());
        assert!(writes.failed(LogicalColor::Red));
        assert_eq!(writes.count(), 2);
        assert_eq!(driver.color(), PwmColor { r: 0, g: 1000, b: 1000 });

        driver.output_mut().reject = None;
        let writes = driver.set_color(1000, 1000, 1000);
        assert_eq!(writes.count(), 1);
        assert!(writes.contains(LogicalColor::Red));
        assert_eq!(driver.output().duty_of(0), 300);
    }

    #[test]
    fn test_rejected_reemit_on_lower_ceiling_is_retried() {
        let mut driver = driver();
        driver.unlock();
        driver.set_color(2047, 2047, 2047);

        driver.output_mut().reject = Some(PwmChannel(0));
        driver.reset_to_safe_mode();
        assert!(driver.has_pending());
        driver.output_mut().reject = None;

        // Same color, inside the threshold, but red is still at the old scale
        for _ in 0..5 {
            driver.set_color(2047, 2047, 2047);
            let power = driver.output_power();
            assert!(power <= PowerCeiling::LOCKED.fraction() + 1e-6, "power {power}");
        }
        assert!(!driver.has_pending());
        assert_eq!(driver.output().duty_of(0), 614);
    }

    #[test]
    fn test_retry_pending_without_new_color() {
        let mut driver = driver();
        driver.set_color(1000, 1000, 1000);

        driver.output_mut().reject = Some(PwmChannel(2));
        let writes = driver.blank();
        assert!(writes.failed(LogicalColor::Blue));
        assert_eq!(driver.color(), PwmColor { r: 0, g: 0, b: 0 });
        assert_eq!(driver.output().duty_of(2), 300);

        driver.output_mut().reject = None;
        let writes = driver.retry_pending();
        assert_eq!(writes.count(), 1);
        assert!(writes.contains(LogicalColor::Blue));
        assert_eq!(driver.output_duty(), PwmColor { r: 0, g: 0, b: 0 });
        assert!(driver.retry_pending().is_empty());
    }

    #[test]
    fn test_low_resolution_clamps_to_duty_range() {
        let config = DriverConfig {
            resolution_bits: 8,
            ..DriverConfig::default()
        };
        let mut driver = PowerLimitedDriver::new(&config, MockPwm::default(), MemoryStore::<4>::new());
        driver.begin().unwrap();
        assert_eq!(driver.full_scale(), 255);

        driver.set_color(2047, 2047, 2047);
        assert_eq!(driver.color(), PwmColor { r: 255, g: 255, b: 255 });
        assert_eq!(driver.output_duty(), PwmColor { r: 76, g: 76, b: 76 });
        assert!(driver.output_power() <= PowerCeiling::LOCKED.fraction() + 1e-6);
    }

    #[test]
    fn test_blank_bypasses_threshold() {
        let mut driver = driver();
        driver.set_color(3, 1000, 2);

        let writes = driver.blank();
        assert_eq!(writes.count(), 3);
        assert_eq!(driver.color(), PwmColor { r: 0, g: 0, b: 0 });
        assert_eq!(driver.output_duty(), PwmColor { r: 0, g: 0, b: 0 });
        assert_eq!(driver.output_power(), 0.0);
    }

    #[test]
    fn test_render_intents() {
        let mut driver = driver();

        driver.render(ColorIntent::Ltt {
            luminance: 2047,
            temperature: 0,
            tint: 0,
        });
        assert_eq!(driver.color(), PwmColor { r: 2047, g: 818, b: 1023 });

        driver.render(Rgb8::new(255, 128, 0).into());
        assert_eq!(driver.color(), PwmColor { r: 2047, g: 1027, b: 0 });
        assert_eq!(driver.output_duty(), PwmColor { r: 614, g: 308, b: 0 });
    }
}
