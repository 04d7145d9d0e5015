mod common;

mod tests {
    use myrtio_pwm_fixture::{
        DriverConfig, Duration, Instant, OperationMode, OperationModeController, PersistedUnlockState,
        PowerCeiling, PowerLevels, PowerLimitedDriver, PwmColor,
    };

    use crate::common::{MockPwm, SharedStore};

    fn ms(value: u64) -> Instant {
        Instant::from_millis(value)
    }

    fn controller() -> OperationModeController {
        OperationModeController::new(Duration::from_millis(15))
    }

    /// Press and release, returning the time after the release
    fn click(modes: &mut OperationModeController, at: u64) -> u64 {
        modes.update(true, ms(at));
        modes.update(false, ms(at + 20));
        at + 40
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(OperationMode::Rgb.next(), OperationMode::Ltt);
        assert_eq!(OperationMode::Ltt.next(), OperationMode::External);
        assert_eq!(OperationMode::External.next(), OperationMode::Off);
        assert_eq!(OperationMode::Off.next(), OperationMode::Rgb);
    }

    #[test]
    fn test_mode_raw_roundtrip() {
        assert_eq!(OperationMode::from_raw(2), Some(OperationMode::External));
        assert_eq!(OperationMode::from_raw(9), None);
        assert_eq!(OperationMode::Ltt.as_str(), "ltt");
        assert_eq!(OperationMode::default(), OperationMode::Rgb);
    }

    #[test]
    fn test_four_presses_return_to_rgb() {
        let mut modes = controller();
        let mut seen = Vec::new();
        let mut now = 0;
        for _ in 0..4 {
            now = click(&mut modes, now);
            seen.push(modes.mode());
        }
        assert_eq!(
            seen,
            vec![
                OperationMode::Ltt,
                OperationMode::External,
                OperationMode::Off,
                OperationMode::Rgb,
            ]
        );
    }

    #[test]
    fn test_first_press_is_accepted() {
        let mut modes = controller();
        let transition = modes.update(true, ms(0)).unwrap();
        assert_eq!(transition.from, OperationMode::Rgb);
        assert_eq!(transition.to, OperationMode::Ltt);
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut modes = controller();
        assert!(modes.update(true, ms(100)).is_some());
        assert!(modes.update(false, ms(105)).is_none());
        assert!(modes.update(true, ms(110)).is_none());
        assert_eq!(modes.mode(), OperationMode::Ltt);

        assert!(modes.update(false, ms(112)).is_none());
        assert!(modes.update(true, ms(130)).is_some());
        assert_eq!(modes.mode(), OperationMode::External);
    }

    #[test]
    fn test_held_button_advances_once() {
        let mut modes = controller();
        assert!(modes.update(true, ms(0)).is_some());
        assert!(modes.update(true, ms(100)).is_none());
        assert!(modes.update(true, ms(1000)).is_none());
        assert_eq!(modes.mode(), OperationMode::Ltt);
    }

    #[test]
    fn test_transition_direction() {
        let mut modes = controller();
        let mut now = click(&mut modes, 0);
        let entering = modes.update(true, ms(now)).unwrap();
        assert!(entering.enters_external());
        assert!(!entering.leaves_external());

        modes.update(false, ms(now + 20));
        now += 40;
        let leaving = modes.update(true, ms(now)).unwrap();
        assert!(leaving.leaves_external());
        assert!(!leaving.enters_external());
    }

    #[test]
    fn test_leaving_external_blanks_driver() {
        let mut driver =
            PowerLimitedDriver::new(&DriverConfig::default(), MockPwm::default(), SharedStore::default());
        driver.begin().unwrap();
        let mut modes = controller();

        modes.poll(true, ms(0), &mut driver);
        modes.poll(false, ms(20), &mut driver);
        modes.poll(true, ms(40), &mut driver);
        modes.poll(false, ms(60), &mut driver);
        assert_eq!(modes.mode(), OperationMode::External);

        driver.set_color(1500, 200, 900);
        modes.poll(true, ms(80), &mut driver);
        assert_eq!(modes.mode(), OperationMode::Off);
        assert_eq!(driver.color(), PwmColor { r: 0, g: 0, b: 0 });
        assert_eq!(driver.output_duty(), PwmColor { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_entering_external_adopts_outside_unlock() {
        let store = SharedStore::default();
        let mut driver =
            PowerLimitedDriver::new(&DriverConfig::default(), MockPwm::default(), store.clone());
        driver.begin().unwrap();
        driver.set_color(1000, 0, 0);
        let mut modes = controller();

        // Another actor unlocks behind the driver's back
        PersistedUnlockState::new(store, PowerLevels::default()).unlock();

        modes.poll(true, ms(0), &mut driver);
        modes.poll(false, ms(20), &mut driver);
        assert_eq!(modes.mode(), OperationMode::Ltt);
        assert_eq!(driver.power_ceiling(), PowerCeiling::LOCKED);

        modes.poll(true, ms(40), &mut driver);
        assert_eq!(modes.mode(), OperationMode::External);
        assert_eq!(driver.power_ceiling(), PowerCeiling::UNLOCKED);
        assert_eq!(driver.output().duty_of(0), 600);
    }
}
