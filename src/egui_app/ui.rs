//! egui renderer for the browser window.

mod dialogs;
pub mod style;
mod tree;

use eframe::egui::{self, RichText};

use crate::egui_app::controller::BrowserController;

use tree::TreeInput;

/// Smallest window size that still fits the tree and output panes.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(720.0, 420.0);

/// Renders the egui UI using the shared controller state.
pub struct BrowserApp {
    controller: BrowserController,
    visuals_set: bool,
}

impl BrowserApp {
    /// Create the app, loading persisted configuration.
    pub fn new(ctx: &egui::Context) -> Result<Self, String> {
        let controller = BrowserController::from_config()
            .map_err(|err| format!("Failed to load config: {err}"))?;
        Ok(Self::with_controller(ctx, controller))
    }

    /// Wrap an existing controller, wiring worker events to repaints.
    pub fn with_controller(ctx: &egui::Context, mut controller: BrowserController) -> Self {
        let repaint = ctx.clone();
        controller.set_repaint_waker(move || repaint.request_repaint());
        Self {
            controller,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Refresh").clicked() {
                    self.controller.refresh();
                }
                if ui.button("Add Working Copy...").clicked() {
                    self.controller.add_wc_bookmark_via_dialog();
                }
                if ui.button("Add Repository...").clicked() {
                    self.controller.open_repo_bookmark_prompt();
                }
                ui.separator();
                let mut per_bookmark = self.controller.browser().auth_per_bookmark();
                if ui.checkbox(&mut per_bookmark, "Login per bookmark").changed() {
                    self.controller.set_auth_per_bookmark(per_bookmark);
                }
                let running = self.controller.running_count();
                if running > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(format!("{running} running"));
                }
            });
        });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status = &self.controller.ui.status;
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("●").color(style::status_badge_color(status.tone)));
                ui.label(status.tone.label());
                ui.separator();
                ui.label(status.text.as_str());
            });
        });
    }

    fn render_tree_panel(&mut self, ctx: &egui::Context) {
        let inputs = egui::SidePanel::left("folders")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .id_salt("folder_tree")
                    .auto_shrink([false, false])
                    .show(ui, |ui| tree::render_tree(ui, self.controller.browser()))
                    .inner
            })
            .inner;
        if self.controller.has_prompt() {
            return;
        }
        for input in inputs {
            match input {
                TreeInput::Toggle(id) => self.controller.toggle(id),
                TreeInput::Select(id) => self.controller.select(id),
                TreeInput::Menu(id, command) => self.controller.handle_menu(id, command),
            }
        }
    }

    fn render_output(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Output").color(style::palette().text_muted));
                if ui.small_button("Clear").clicked() {
                    self.controller.ui.output.clear();
                }
            });
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("output")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in self.controller.ui.output.lines() {
                        ui.label(
                            RichText::new(line.text.as_str())
                                .monospace()
                                .color(style::output_color(line.kind)),
                        );
                    }
                });
        });
    }

    fn render_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.controller.ui.prompt.as_mut() else {
            return;
        };
        let reply = dialogs::render_prompt(ctx, prompt);
        if reply.confirm {
            self.controller.confirm_prompt();
        } else if reply.cancel {
            self.controller.cancel_prompt();
        }
    }
}

impl eframe::App for BrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.poll_events();
        self.render_top_bar(ctx);
        self.render_status(ctx);
        self.render_tree_panel(ctx);
        self.render_output(ctx);
        self.render_prompt(ctx);
    }
}

impl Drop for BrowserApp {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
