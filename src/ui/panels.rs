use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::{CellValue, Column};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – cascading selectors
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("User Input");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state after the loop.
    let stages = state.stages.clone();
    let mut picked: Option<(Column, CellValue)> = None;

    for stage in &stages {
        ui.strong(stage.column.label());

        let current = match stage.selection() {
            Ok(value) => value.to_string(),
            Err(e) => {
                ui.label(RichText::new(e.to_string()).color(Color32::RED));
                ui.add_space(6.0);
                continue;
            }
        };

        egui::ComboBox::from_id_salt(stage.column.header())
            .selected_text(current)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                for value in &stage.domain {
                    let is_selected = stage.selected.as_ref() == Some(value);
                    if ui
                        .selectable_label(is_selected, value.to_string())
                        .clicked()
                        && !is_selected
                    {
                        picked = Some((stage.column, value.clone()));
                    }
                }
            });
        ui.label(
            RichText::new(format!("{} options, {} rows", stage.domain.len(), stage.remaining))
                .small()
                .weak(),
        );
        ui.add_space(6.0);
    }

    if let Some((column, value)) = picked {
        log::debug!("{} set to {value}", column.label());
        state.select(column, value);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with row counts and the status line.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong(&state.config.window_title);

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} visits loaded from {}, {} matching",
                table.len(),
                state.config.dataset_path.display(),
                state.matching_rows()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
