use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Visit mode distribution (bar chart)
// ---------------------------------------------------------------------------

/// One bar per visit mode, most frequent first. Each bar is its own series
/// so the legend names the modes.
pub fn visit_mode_chart(ui: &mut Ui, state: &AppState) {
    let color_map = &state.visit_mode_colors;

    Plot::new("visit_mode_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Visit Mode")
        .y_axis_label("Visits")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (mode, count)) in state.summary.visit_modes.iter().enumerate() {
                let color = color_map
                    .as_ref()
                    .map(|cm| cm.color_for_label(mode))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let bar = Bar::new(i as f64, *count as f64).width(0.7).name(mode);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(mode).color(color));
            }
        });
}

// ---------------------------------------------------------------------------
// Rating distribution (histogram)
// ---------------------------------------------------------------------------

pub fn rating_histogram_chart(ui: &mut Ui, state: &AppState) {
    let bars: Vec<Bar> = state
        .summary
        .ratings
        .iter()
        .map(|bin| {
            Bar::new(bin.center(), bin.count as f64)
                .width(bin.width())
                .name(format!("{:.2} – {:.2}", bin.lower, bin.upper))
        })
        .collect();

    Plot::new("rating_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Rating")
        .y_axis_label("Frequency")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Rating")
                    .color(Color32::LIGHT_BLUE),
            );
        });
}
