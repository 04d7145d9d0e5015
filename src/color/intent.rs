use super::{PwmColor, Rgb8, UnitRgb, cct_to_rgb, hsl_to_rgb, lab_to_rgb, ltt_to_rgb};
use crate::math::{map_range, unit_to_native};

/// A request for a color, in whichever representation the source speaks
///
/// Produced by a knob, portal or mode source and consumed once by
/// [`ColorIntent::to_pwm`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorIntent {
    /// Direct RGB in native duty units
    Rgb(PwmColor),
    /// 8-bit RGB as used by the portal color picker
    Rgb8(Rgb8),
    /// Luminance / temperature / tint, all in native duty units
    Ltt {
        luminance: u16,
        temperature: u16,
        tint: u16,
    },
    /// Hue / saturation / lightness, all in `[0, 1]`
    Hsl { h: f32, s: f32, l: f32 },
    /// Correlated color temperature in kelvin plus tint
    Cct { kelvin: f32, duv: f32 },
    /// CIE Lab with D65 white
    Lab { l: f32, a: f32, b: f32 },
}

impl ColorIntent {
    /// Direct RGB intent
    pub const fn rgb(r: u16, g: u16, b: u16) -> Self {
        Self::Rgb(PwmColor { r, g, b })
    }

    /// Render the intent into native duty units with full scale `max`
    ///
    /// Channels are not clamped to per-channel limits here, the driver
    /// does that.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn to_pwm(self, max: u16) -> PwmColor {
        match self {
            Self::Rgb(color) => color,
            Self::Rgb8(color) => {
                let widen = |v: u8| map_range(i32::from(v), 0, 255, 0, i32::from(max)) as u16;
                PwmColor {
                    r: widen(color.r),
                    g: widen(color.g),
                    b: widen(color.b),
                }
            }
            Self::Ltt {
                luminance,
                temperature,
                tint,
            } => ltt_to_rgb(luminance, temperature, tint, max),
            Self::Hsl { h, s, l } => widen_unit(hsl_to_rgb(h, s, l), max),
            Self::Cct { kelvin, duv } => widen_unit(cct_to_rgb(kelvin, duv), max),
            Self::Lab { l, a, b } => widen_unit(lab_to_rgb(l, a, b), max),
        }
    }
}

impl From<PwmColor> for ColorIntent {
    fn from(color: PwmColor) -> Self {
        Self::Rgb(color)
    }
}

impl From<Rgb8> for ColorIntent {
    fn from(color: Rgb8) -> Self {
        Self::Rgb8(color)
    }
}

fn widen_unit(color: UnitRgb, max: u16) -> PwmColor {
    PwmColor {
        r: unit_to_native(color.r, max),
        g: unit_to_native(color.g, max),
        b: unit_to_native(color.b, max),
    }
}
