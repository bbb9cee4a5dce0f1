use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Domain tag carried by client nodes; never consumes a palette slot
pub const LOCALDOMAIN: &str = "localdomain";

pub const COLOR_LOCALDOMAIN: Rgb = Rgb(236, 236, 236);
/// Shared by every domain seen after the palette runs out
pub const COLOR_DEFAULT: Rgb = Rgb(212, 212, 212);

const HUES: usize = 26;
const SATURATION: f64 = 0.85;
const VALUE: f64 = 0.93;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// From a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let channel = |c: f64| (c * 255.0).round() as u8;
    Rgb(channel(r), channel(g), channel(b))
}

/// Evenly spaced hues followed by a gray ramp
pub fn generate_palette() -> Vec<Rgb> {
    let mut colors: Vec<Rgb> = (0..HUES)
        .map(|i| hsv_to_rgb(i as f64 / HUES as f64, SATURATION, VALUE))
        .collect();
    colors.extend((32..=200).step_by(12).map(|g: u8| Rgb(g, g, g)));
    colors
}

/// First-come, first-served palette slots per domain.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
    next: usize,
    assigned: HashMap<String, Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        Self {
            colors: generate_palette(),
            next: 0,
            assigned: HashMap::new(),
        }
    }

    /// Color for `domain`, assigning the next free slot on first sight.
    /// [`LOCALDOMAIN`] always maps to [`COLOR_LOCALDOMAIN`].
    pub fn assign(&mut self, domain: &str) -> Rgb {
        if domain == LOCALDOMAIN {
            return COLOR_LOCALDOMAIN;
        }
        if let Some(color) = self.assigned.get(domain) {
            return *color;
        }

        let color = match self.colors.get(self.next) {
            Some(color) => {
                self.next += 1;
                *color
            }
            None => COLOR_DEFAULT,
        };
        self.assigned.insert(domain.to_string(), color);
        color
    }

    pub fn get(&self, domain: &str) -> Option<Rgb> {
        if domain == LOCALDOMAIN {
            return Some(COLOR_LOCALDOMAIN);
        }
        self.assigned.get(domain).copied()
    }

    /// Number of distinct domains that have been given a color
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn capacity(&self) -> usize {
        self.colors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_layout() {
        let palette = generate_palette();
        assert_eq!(palette.len(), 26 + 15);
        // hue 0 is pure red at s=0.85 v=0.93
        assert_eq!(palette[0], Rgb(237, 36, 36));
        assert_eq!(palette[26], Rgb(32, 32, 32));
        assert_eq!(palette[40], Rgb(200, 200, 200));
    }

    #[test]
    fn test_display_is_css_rgb() {
        assert_eq!(Rgb(1, 2, 3).to_string(), "rgb(1,2,3)");
        assert_eq!(Rgb::from_hex(0x30363d), Rgb(48, 54, 61));
    }
}
