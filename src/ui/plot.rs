use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::color::risk_color;
use crate::data::model::ResultTable;

const BINS: usize = 10;

// ---------------------------------------------------------------------------
// Score distribution (central panel, below the results)
// ---------------------------------------------------------------------------

/// Count probabilities into `bins` equal-width bins over [0, 1].
/// A probability of exactly 1 lands in the last bin.
pub fn histogram(probabilities: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    for &p in probabilities {
        let idx = ((p.clamp(0.0, 1.0) * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Render a histogram of the default probabilities.
pub fn score_histogram(ui: &mut Ui, results: &ResultTable) {
    let width = 1.0 / BINS as f64;
    let bars: Vec<Bar> = histogram(&results.probabilities, BINS)
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let center = (i as f64 + 0.5) * width;
            Bar::new(center, count as f64)
                .width(width * 0.95)
                .fill(risk_color(center))
        })
        .collect();

    Plot::new("score_histogram")
        .height(220.0)
        .x_axis_label("Probability of default")
        .y_axis_label("Applicants")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("TARGET"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_the_closed_interval() {
        let counts = histogram(&[0.0, 0.05, 0.1, 0.55, 0.99, 1.0], 10);
        assert_eq!(counts, vec![2, 1, 0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(counts.iter().sum::<usize>(), 6);
    }
}
