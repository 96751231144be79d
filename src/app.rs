use eframe::egui;

use crate::scoring::ArtifactStore;
use crate::state::SessionState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CreditScorerApp {
    pub state: SessionState,
    /// Whether a frame showing the busy spinner has been painted since the
    /// compute action.
    busy_painted: bool,
}

impl CreditScorerApp {
    pub fn new(store: &ArtifactStore) -> Self {
        Self {
            state: SessionState::start(store),
            busy_painted: false,
        }
    }
}

impl eframe::App for CreditScorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Scoring blocks this thread, so it runs only after a frame with the
        // spinner has been painted.
        let pending_at_start = self.state.compute_pending();
        if pending_at_start && self.busy_painted {
            self.state.run_pending_compute();
            self.busy_painted = false;
        }

        // ---- Top panel: upload + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: previews, compute, results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &mut self.state);
        });

        if self.state.compute_pending() {
            self.busy_painted = pending_at_start;
            ctx.request_repaint();
        }
    }
}
