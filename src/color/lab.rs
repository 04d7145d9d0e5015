use super::UnitRgb;
use crate::math::clamp_unit;

/// Cube threshold of the inverse Lab companding
const T1: f32 = 0.008_856;
/// Same threshold expressed on the cube-root side
const T2: f32 = 0.206_893;

/// D65 reference white
const WHITE_X: f32 = 0.950_47;
const WHITE_Z: f32 = 1.088_83;

/// Inverse of the Lab companding function
fn lab_f_inv(t: f32) -> f32 {
    if t > T2 {
        libm::powf(t, 3.0)
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

/// Convert CIE Lab (D65) to a normalized linear RGB color
///
/// `l` is expected in `[0, 100]`, `a` and `b` roughly in `[-128, 127]`.
/// Out of gamut results are clamped per channel, no gamut mapping is done.
pub fn lab_to_rgb(l: f32, a: f32, b: f32) -> UnitRgb {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let y = if libm::powf(fy, 3.0) > T1 {
        libm::powf(fy, 3.0)
    } else {
        (fy - 16.0 / 116.0) / 7.787
    };
    let x = lab_f_inv(fx) * WHITE_X;
    let z = lab_f_inv(fz) * WHITE_Z;

    UnitRgb {
        r: clamp_unit(3.240_6 * x - 1.537_2 * y - 0.498_6 * z),
        g: clamp_unit(-0.968_9 * x + 1.875_8 * y + 0.041_5 * z),
        b: clamp_unit(0.055_7 * x - 0.204_0 * y + 1.057_0 * z),
    }
}
