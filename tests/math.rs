mod tests {
    use myrtio_pwm_fixture::math::{
        clamp_unit, map_range, max_for_bits, native_to_unit, rescale, unit_to_native,
    };

    #[test]
    fn test_max_for_bits() {
        assert_eq!(max_for_bits(8), 255);
        assert_eq!(max_for_bits(11), 2047);
        assert_eq!(max_for_bits(12), 4095);
        assert_eq!(max_for_bits(0), 1);
        assert_eq!(max_for_bits(20), u16::MAX);
    }

    #[test]
    fn test_map_range_knob_window() {
        assert_eq!(map_range(5, 5, 950, 0, 2047), 0);
        assert_eq!(map_range(950, 5, 950, 0, 2047), 2047);
        assert_eq!(map_range(477, 5, 950, 0, 2047), 1022);
    }

    #[test]
    fn test_map_range_degenerate_input() {
        assert_eq!(map_range(42, 10, 10, 7, 100), 7);
    }

    #[test]
    fn test_rescale_between_depths() {
        assert_eq!(rescale(255, 8, 11), 2047);
        assert_eq!(rescale(128, 8, 11), 1027);
        assert_eq!(rescale(0, 8, 11), 0);
        assert_eq!(rescale(4095, 12, 11), 2047);
        assert_eq!(rescale(2048, 12, 11), 1023);
        // Out of range input saturates
        assert_eq!(rescale(300, 8, 11), 2047);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(unit_to_native(0.5, 2047), 1023);
        assert_eq!(unit_to_native(2.0, 2047), 2047);
        assert_eq!(unit_to_native(f32::NAN, 2047), 0);
        assert_eq!(native_to_unit(2047, 2047), 1.0);
        assert_eq!(native_to_unit(100, 0), 0.0);
        assert_eq!(clamp_unit(-0.5), 0.0);
    }
}
