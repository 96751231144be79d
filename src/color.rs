use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Risk colour scale
// ---------------------------------------------------------------------------

/// Green for low default probability through yellow to red for high.
pub fn risk_color(probability: f64) -> Color32 {
    let p = probability.clamp(0.0, 1.0) as f32;
    let hue = (1.0 - p) * 120.0;
    let hsl = Hsl::new(hue, 0.75, 0.45);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_risk_is_green_high_risk_is_red() {
        let low = risk_color(0.0);
        let high = risk_color(1.0);
        assert!(low.g() > low.r());
        assert!(high.r() > high.g());
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(risk_color(-1.0), risk_color(0.0));
        assert_eq!(risk_color(7.0), risk_color(1.0));
    }
}
