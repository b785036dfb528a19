use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::aggregate::RatedAttraction;
use crate::data::model::{Column, Record};
use crate::state::AppState;
use crate::ui::plot;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every section of the dashboard for the current selection.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.label(RichText::new(msg).color(Color32::RED).heading());
            }
            None => {
                ui.heading("Loading dataset…");
            }
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Dataset Preview (Full Data)");
            record_table(ui, "full_preview", &state.table_preview);
            ui.add_space(12.0);

            ui.heading("Filtered Data");
            if state.filtered_preview.is_empty() {
                ui.label(
                    RichText::new("No data found for the current selection")
                        .color(Color32::YELLOW),
                );
            } else {
                record_table(ui, "filtered_preview", &state.filtered_preview);
            }
            ui.add_space(12.0);

            key_metrics(ui, state);
            ui.add_space(12.0);

            ui.heading("Top Recommendations");
            top_table(ui, &state.summary.top_rated);
            ui.add_space(12.0);

            ui.heading("Data Insights");
            ui.columns(2, |cols| {
                cols[0].label("Visit Mode Distribution");
                plot::visit_mode_chart(&mut cols[0], state);
                cols[1].label("Rating Distribution");
                plot::rating_histogram_chart(&mut cols[1], state);
            });
            ui.add_space(12.0);

            key_insights(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn key_metrics(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;
    let average = summary
        .average_rating
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "not available".to_string());

    ui.heading("Key Metrics");
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Visits", summary.total_visits.to_string());
        metric(&mut cols[1], "Average Rating", average);
        metric(&mut cols[2], "Unique Attractions", summary.unique_attractions.to_string());
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

fn key_insights(ui: &mut Ui, state: &AppState) {
    let Some(insights) = &state.summary.insights else {
        return;
    };
    ui.heading("Key Insights");
    ui.label(format!("Most Common Visit Mode: {}", insights.most_common_visit_mode));
    ui.label(format!(
        "Most Popular Attraction Type: {}",
        insights.most_popular_attraction_type
    ));
    ui.label(format!(
        "Highest Rated Attraction: {}",
        insights.highest_rated_attraction
    ));
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn record_table(ui: &mut Ui, id: &str, records: &[Record]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(70.0), Column::ALL.len())
            .header(20.0, |mut header| {
                for column in Column::ALL {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.header());
                    });
                }
            })
            .body(|mut body| {
                for record in records {
                    body.row(ROW_HEIGHT, |mut row| {
                        for column in Column::ALL {
                            row.col(|ui: &mut Ui| {
                                ui.label(record.display(column));
                            });
                        }
                    });
                }
            });
    });
}

fn top_table(ui: &mut Ui, top: &[RatedAttraction]) {
    if top.is_empty() {
        ui.label(RichText::new("No attractions to rank").weak());
        return;
    }
    ui.push_id("top_rated", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(TableColumn::auto().at_least(120.0))
            .column(TableColumn::auto().at_least(80.0))
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong(Column::AttractionId.header());
                });
                header.col(|ui: &mut Ui| {
                    ui.strong(Column::Rating.header());
                });
            })
            .body(|mut body| {
                for entry in top {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(entry.attraction_id.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", entry.mean_rating));
                        });
                    });
                }
            });
    });
}
