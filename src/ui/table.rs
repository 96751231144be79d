use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::risk_color;
use crate::data::model::{format_float, RawTable, ResultTable, TARGET_COLUMN};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data previews
// ---------------------------------------------------------------------------

/// First `n` rows of the upload, every column.
pub fn raw_preview(ui: &mut Ui, table: &RawTable, n: usize) {
    let shown = n.min(table.len());
    ScrollArea::horizontal()
        .id_salt("raw_preview")
        .show(ui, |ui: &mut Ui| {
            ui.push_id("raw_preview_table", |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(Column::auto().at_least(60.0).resizable(true), table.columns().len())
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        for name in table.column_names() {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for i in 0..shown {
                            body.row(ROW_HEIGHT, |mut row| {
                                for cell in table.row(i) {
                                    row.col(|ui: &mut Ui| {
                                        ui.label(cell.to_string());
                                    });
                                }
                            });
                        }
                    });
            });
        });
}

/// First `n` rows of the results, probabilities on the risk colour scale.
pub fn result_preview(ui: &mut Ui, results: &ResultTable, n: usize) {
    ui.push_id("result_preview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(100.0))
            .column(Column::auto().at_least(100.0))
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong(&results.id_column);
                });
                header.col(|ui: &mut Ui| {
                    ui.strong(TARGET_COLUMN);
                });
            })
            .body(|mut body| {
                for (id, probability) in results.rows().take(n) {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(id.to_field());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(
                                RichText::new(format_float(probability))
                                    .color(risk_color(probability)),
                            );
                        });
                    });
                }
            });
    });
}
