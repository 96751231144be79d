use anyhow::Context;
use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::{EXPORT_FILE_NAME, PREVIEW_ROWS};
use crate::state::{SessionState, Stage, UserError};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the toolbar: upload button and artifact/upload status.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.add_enabled_ui(state.can_upload() && !state.compute_pending(), |ui: &mut Ui| {
            if ui.button("📁 Upload CSV…").clicked() {
                open_file_dialog(state);
            }
        });

        ui.separator();

        if let Some(bundle) = state.bundle() {
            ui.label(
                RichText::new(format!(
                    "✅ Artifacts loaded ({} features)",
                    bundle.feature_names().len()
                ))
                .color(Color32::DARK_GREEN),
            );
        } else {
            ui.label(RichText::new("❌ Artifacts unavailable").color(Color32::RED));
        }

        if let Some(upload) = &state.upload {
            ui.separator();
            ui.label(format!(
                "{}: {} rows, {} columns",
                upload.file_name,
                upload.table.len(),
                upload.table.columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the upload preview, compute action, and results.
pub fn central_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading(crate::config::APP_TITLE);
    ui.label(
        "Upload a CSV with the applicants' data (same schema as the enriched test dataset) \
         to get the probability of default (TARGET) for each row.",
    );
    ui.separator();

    let stage = state.stage();

    if let Some(error) = &state.error {
        error_box(ui, error);
    }

    match stage {
        // Nothing else is offered until the application is restarted.
        Stage::ArtifactsFailed => return,
        Stage::AwaitingUpload => {
            ui.label("⬆ Upload a CSV to start  (Upload CSV…)");
            return;
        }
        Stage::UploadFailed => return,
        _ => {}
    }

    let Some(upload) = &state.upload else {
        return;
    };

    let mut compute_clicked = false;
    let mut download_clicked = false;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Preview of the uploaded data");
            table::raw_preview(ui, &upload.table, PREVIEW_ROWS);
            ui.add_space(8.0);

            ui.horizontal(|ui: &mut Ui| {
                let busy = stage == Stage::Computing;
                compute_clicked = ui
                    .add_enabled(!busy, egui::Button::new("Compute default probability"))
                    .clicked();
                if busy {
                    ui.spinner();
                    ui.label("Computing scores…");
                }
            });

            if let Some(results) = &state.results {
                ui.add_space(8.0);
                ui.strong("Scoring results");
                ui.label("Estimated probability of default (TARGET) per record:");
                table::result_preview(ui, results, PREVIEW_ROWS);
                ui.add_space(4.0);
                download_clicked = ui.button("💾 Download results CSV").clicked();
                ui.add_space(8.0);
                plot::score_histogram(ui, results);
            }
        });

    if compute_clicked {
        state.request_compute();
        ui.ctx().request_repaint();
    }
    if download_clicked {
        save_results_dialog(state);
    }
}

fn error_box(ui: &mut Ui, error: &UserError) {
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, Color32::RED))
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(format!("❌ {}", error.message)).color(Color32::RED));
            ui.label(RichText::new(&error.cause).monospace().small());
        });
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload applicants CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(&path).with_context(|| format!("reading {}", path.display())) {
            Ok(bytes) => state.ingest_upload(&name, &bytes),
            Err(e) => state.upload_read_failed(e),
        }
    }
}

pub fn save_results_dialog(state: &mut SessionState) {
    let bytes = match state.export_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            state.export_failed(e);
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Download results")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display())) {
            Ok(()) => state.export_saved(&path),
            Err(e) => state.export_failed(e),
        }
    }
}
