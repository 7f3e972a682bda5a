//! Dashboard colors shared by the interactive and static charts.

/// RGB triple.
pub type Rgb = (u8, u8, u8);

pub const ACCENT: Rgb = (0x00, 0xCD, 0xAC);
pub const CARD_FILL: Rgb = (0x74, 0x73, 0x7A);
pub const CARD_BORDER: Rgb = (0x15, 0x1B, 0x54);
pub const LIGHT_TEXT: Rgb = (0xF5, 0xF1, 0xF1);

/// Series colors, cycled by index.
pub const SERIES: [Rgb; 8] = [
    (0x00, 0xCD, 0xAC),
    (0x15, 0x1B, 0x54),
    (0x74, 0x73, 0x7A),
    (0x4A, 0x90, 0xE2),
    (0xE9, 0x4B, 0x3C),
    (0xF3, 0x9C, 0x12),
    (0x9B, 0x59, 0xB6),
    (0x1A, 0xBC, 0x9C),
];

// Teal-green continuous scale, low to high
const HEAT_STOPS: [Rgb; 5] = [
    (0xB0, 0xF2, 0xBC),
    (0x89, 0xE8, 0xAC),
    (0x4C, 0xC8, 0xA3),
    (0x2C, 0x98, 0xA0),
    (0x25, 0x5F, 0x85),
];

pub fn series_color(idx: usize) -> Rgb {
    SERIES[idx % SERIES.len()]
}

/// Map a correlation in [-1, 1] onto the heat scale. Undefined values are grey.
pub fn heat_color(value: Option<f64>) -> Rgb {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return (0xDD, 0xDD, 0xDD);
    };

    let t = ((v.clamp(-1.0, 1.0) + 1.0) / 2.0) * (HEAT_STOPS.len() - 1) as f64;
    let lower = (t.floor() as usize).min(HEAT_STOPS.len() - 2);
    let frac = t - lower as f64;
    let (a, b) = (HEAT_STOPS[lower], HEAT_STOPS[lower + 1]);

    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Dark or light label color for text drawn over `background`.
pub fn contrast_text(background: Rgb) -> Rgb {
    let luma = 0.299 * background.0 as f64 + 0.587 * background.1 as f64 + 0.114 * background.2 as f64;
    if luma > 150.0 {
        (0x20, 0x20, 0x20)
    } else {
        (0xFF, 0xFF, 0xFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_scale_endpoints() {
        assert_eq!(heat_color(Some(-1.0)), HEAT_STOPS[0]);
        assert_eq!(heat_color(Some(1.0)), HEAT_STOPS[4]);
        assert_eq!(heat_color(Some(0.0)), HEAT_STOPS[2]);
        assert_eq!(heat_color(Some(5.0)), HEAT_STOPS[4]);
        assert_eq!(heat_color(None), (0xDD, 0xDD, 0xDD));
        assert_eq!(heat_color(Some(f64::NAN)), (0xDD, 0xDD, 0xDD));
    }

    #[test]
    fn test_series_cycles() {
        assert_eq!(series_color(0), ACCENT);
        assert_eq!(series_color(8), ACCENT);
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(contrast_text((255, 255, 255)), (0x20, 0x20, 0x20));
        assert_eq!(contrast_text(CARD_BORDER), (0xFF, 0xFF, 0xFF));
    }
}
