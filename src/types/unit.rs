//! Distance units.

use std::fmt;

/// Unit used to report distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeasureUnit {
    /// Centimeters, as reported by the module.
    #[default]
    Centimeters,
    /// Inches.
    Inches,
    /// Meters.
    Meters,
    /// Feet.
    Feet,
}

impl MeasureUnit {
    /// Centimeters per one of this unit.
    #[must_use]
    pub const fn centimeters_per_unit(self) -> f64 {
        match self {
            Self::Centimeters => 1.0,
            Self::Inches => 2.54,
            Self::Meters => 100.0,
            Self::Feet => 30.48,
        }
    }

    /// Short symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "in",
            Self::Meters => "m",
            Self::Feet => "ft",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts a distance in centimeters into `unit`. No rounding is applied.
#[must_use]
pub fn convert(distance_cm: i32, unit: MeasureUnit) -> f64 {
    let cm = f64::from(distance_cm);
    match unit {
        MeasureUnit::Centimeters => cm,
        other => cm / other.centimeters_per_unit(),
    }
}

/// Converts a distance in `unit` back into centimeters.
#[must_use]
pub fn to_centimeters(distance: f64, unit: MeasureUnit) -> f64 {
    distance * unit.centimeters_per_unit()
}
