use serde::{Serialize, Serializer};
use std::fmt;

pub const DEFAULT_CEILING_FT: f64 = 6000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb::new(0x00, 0xFF, 0x00);
    pub const RED: Rgb = Rgb::new(0xFF, 0x00, 0x00);
    /// Unknown altitude. Not reachable from the gradient since its blue channel is set.
    pub const GRAY: Rgb = Rgb::new(0x80, 0x80, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Green at 0 ft to red at the ceiling, linear in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeGradient {
    ceiling_ft: f64,
}

impl Default for AltitudeGradient {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING_FT)
    }
}

impl AltitudeGradient {
    pub fn new(ceiling_ft: f64) -> Self {
        Self { ceiling_ft }
    }

    pub fn ceiling_ft(&self) -> f64 {
        self.ceiling_ft
    }

    pub fn color(&self, altitude_ft: Option<f64>) -> Rgb {
        let alt = match altitude_ft {
            Some(alt) if !alt.is_nan() => alt,
            _ => return Rgb::GRAY,
        };

        if alt <= 0.0 {
            return Rgb::GREEN;
        }
        if alt >= self.ceiling_ft {
            return Rgb::RED;
        }

        let ratio = alt / self.ceiling_ft;
        Rgb {
            r: (255.0 * ratio) as u8,
            g: (255.0 * (1.0 - ratio)) as u8,
            b: 0,
        }
    }

    /// Evenly spaced `(altitude, color)` pairs from 0 ft to the ceiling, for legends.
    pub fn stops(&self, count: usize) -> Vec<(f64, Rgb)> {
        let count = count.max(2);
        (0..count)
            .map(|i| {
                let alt = self.ceiling_ft * i as f64 / (count - 1) as f64;
                (alt, self.color(Some(alt)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_altitude_is_gray() {
        let gradient = AltitudeGradient::default();
        assert_eq!(gradient.color(None), Rgb::GRAY);
        assert_eq!(gradient.color(Some(f64::NAN)), Rgb::GRAY);
        for alt in (0..=7000).step_by(50) {
            assert_ne!(gradient.color(Some(alt as f64)), Rgb::GRAY);
        }
    }

    #[test]
    fn bounds_are_pure_green_and_red() {
        let gradient = AltitudeGradient::default();
        assert_eq!(gradient.color(Some(0.0)), Rgb::GREEN);
        assert_eq!(gradient.color(Some(-150.0)), Rgb::GREEN);
        assert_eq!(gradient.color(Some(6000.0)), Rgb::RED);
        assert_eq!(gradient.color(Some(35_000.0)), Rgb::RED);
    }

    #[test]
    fn half_ceiling_has_equal_channels() {
        let gradient = AltitudeGradient::new(6000.0);
        let c = gradient.color(Some(3000.0));
        assert_eq!(c.r, c.g);
        assert_eq!(c.b, 0);
        assert_eq!(c.to_string(), "#7f7f00");
    }

    #[test]
    fn channels_are_monotonic() {
        let gradient = AltitudeGradient::new(4500.0);
        let mut previous = gradient.color(Some(0.0));
        for alt in (1..=4500).map(f64::from) {
            let c = gradient.color(Some(alt));
            assert!(c.r >= previous.r, "red decreased at {alt}");
            assert!(c.g <= previous.g, "green increased at {alt}");
            previous = c;
        }
    }

    #[test]
    fn ceiling_is_a_parameter() {
        let low = AltitudeGradient::new(1000.0);
        assert_eq!(low.color(Some(1000.0)), Rgb::RED);
        assert_ne!(AltitudeGradient::new(6000.0).color(Some(1000.0)), Rgb::RED);
    }

    #[test]
    fn stops_span_the_gradient() {
        let stops = AltitudeGradient::new(6000.0).stops(5);
        assert_eq!(stops.len(), 5);
        assert_eq!(stops[0], (0.0, Rgb::GREEN));
        assert_eq!(stops[4], (6000.0, Rgb::RED));
        assert_eq!(stops[2].0, 3000.0);
    }

    #[test]
    fn serializes_as_hex() {
        let json = serde_json::to_string(&Rgb::new(0x12, 0xab, 0x00)).unwrap();
        assert_eq!(json, "\"#12ab00\"");
    }
}
