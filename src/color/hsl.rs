use super::UnitRgb;
use crate::math::clamp_unit;

/// Convert HSL (every component nominally in `[0, 1]`) to a normalized RGB color
///
/// Hue wraps around the color wheel, saturation and lightness are
/// clamped. An achromatic color (`s == 0`) returns `l` on every channel.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> UnitRgb {
    let h = if h.is_finite() { h - libm::floorf(h) } else { 0.0 };
    let s = clamp_unit(s);
    let l = clamp_unit(l);

    if s == 0.0 {
        return UnitRgb { r: l, g: l, b: l };
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    UnitRgb {
        r: clamp_unit(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        g: clamp_unit(hue_to_rgb(p, q, h)),
        b: clamp_unit(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    }
}

/// Piecewise-linear hue ramp
///
/// `t` is wrapped into `[0, 1]` first, breakpoints sit at 1/6, 1/2 and 2/3.
pub fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
