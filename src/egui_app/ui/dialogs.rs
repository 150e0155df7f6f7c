use eframe::egui::{self, Align2, Area, Color32, Frame, Id, Order, RichText, Stroke, Ui};
use rfd::FileDialog;

use crate::actions::ActionKind;
use crate::egui_app::state::{ActionPrompt, LoginPrompt, Prompt, RepoBookmarkPrompt};

use super::style;

/// What the user did with the open prompt this frame.
#[derive(Default)]
pub(super) struct PromptReply {
    pub(super) confirm: bool,
    pub(super) cancel: bool,
}

/// Dims and swallows pointer input behind the prompt; the prompt itself is
/// drawn one order above.
fn modal_backdrop(ctx: &egui::Context, id: Id) {
    let rect = ctx.viewport_rect();
    ctx.layer_painter(egui::LayerId::new(Order::Foreground, id.with("paint")))
        .rect_filled(rect, 0.0, Color32::from_black_alpha(140));
    Area::new(id.with("blocker"))
        .order(Order::Foreground)
        .fixed_pos(rect.min)
        .show(ctx, |ui| {
            ui.allocate_rect(rect, egui::Sense::click_and_drag());
        });
}

pub(super) fn render_prompt(ctx: &egui::Context, prompt: &mut Prompt) -> PromptReply {
    let mut reply = PromptReply::default();
    let title = match prompt {
        Prompt::Action(prompt) => prompt.kind.label().to_string(),
        Prompt::Login(_) => "Login".to_string(),
        Prompt::AddRepoBookmark(_) => "Add Repository Bookmark".to_string(),
    };
    let id = Id::new("prompt_modal");
    modal_backdrop(ctx, id.with("backdrop"));
    let palette = style::palette();
    Area::new(id)
        .order(Order::Tooltip)
        .constrain(true)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            Frame::window(&ctx.style())
                .fill(palette.bg_secondary)
                .stroke(Stroke::new(1.0, palette.panel_outline))
                .show(ui, |ui| {
                    ui.set_min_width(360.0);
                    ui.heading(RichText::new(title).color(palette.text_primary));
                    ui.add_space(6.0);
                    match prompt {
                        Prompt::Action(prompt) => render_action_body(ui, prompt),
                        Prompt::Login(prompt) => render_login_body(ui, prompt),
                        Prompt::AddRepoBookmark(prompt) => render_repo_body(ui, prompt),
                    }
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            reply.confirm = true;
                        }
                        if ui.button("Cancel").clicked() {
                            reply.cancel = true;
                        }
                    });
                });
        });
    if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
        reply.cancel = true;
    }
    reply
}

fn render_action_body(ui: &mut Ui, prompt: &mut ActionPrompt) {
    for target in &prompt.targets {
        ui.label(RichText::new(target).color(style::palette().text_muted));
    }
    ui.add_space(6.0);
    match &mut prompt.kind {
        ActionKind::Delete { force } => {
            ui.label("Delete the selected item?");
            ui.checkbox(force, "Force removal of modified items");
        }
        ActionKind::Mkdir { name, message } => {
            labelled_line(ui, "Folder name", name);
            ui.label("Log message");
            ui.text_edit_multiline(message);
        }
        ActionKind::Export { force, .. } => {
            ui.horizontal(|ui| {
                ui.label("Destination");
                ui.text_edit_singleline(&mut prompt.destination);
                if ui.button("Browse...").clicked()
                    && let Some(dir) = FileDialog::new().pick_folder()
                {
                    prompt.destination = dir.to_string_lossy().into_owned();
                }
            });
            labelled_line(ui, "Revision", &mut prompt.revision);
            ui.checkbox(force, "Overwrite existing files");
        }
        ActionKind::Update { recursive, .. } => {
            labelled_line(ui, "Revision", &mut prompt.revision);
            ui.checkbox(recursive, "Recursive");
        }
        ActionKind::Commit { message, recursive } => {
            ui.label("Log message");
            ui.text_edit_multiline(message);
            ui.checkbox(recursive, "Recursive");
        }
        ActionKind::Merge {
            path1,
            path2,
            recursive,
            force,
            username,
            password,
            ..
        } => {
            labelled_line(ui, "From", path1);
            labelled_line(ui, "Revision", &mut prompt.revision);
            labelled_line(ui, "To", path2);
            labelled_line(ui, "Revision", &mut prompt.revision2);
            ui.checkbox(recursive, "Recursive");
            ui.checkbox(force, "Force");
            labelled_line(ui, "Username", username);
            ui.horizontal(|ui| {
                ui.label("Password");
                ui.add(egui::TextEdit::singleline(password).password(true));
            });
        }
        ActionKind::Unlock { force } => {
            ui.checkbox(force, "Break locks held by others");
        }
    }
    if let Some(error) = &prompt.error {
        ui.colored_label(style::palette().warning, error.as_str());
    }
}

fn render_login_body(ui: &mut Ui, prompt: &mut LoginPrompt) {
    let scope = if prompt.shared {
        "Shared login for all bookmarks".to_string()
    } else {
        prompt.bookmark.clone()
    };
    ui.label(RichText::new(scope).color(style::palette().text_muted));
    labelled_line(ui, "Username", &mut prompt.username);
    ui.horizontal(|ui| {
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut prompt.password).password(true));
    });
}

fn render_repo_body(ui: &mut Ui, prompt: &mut RepoBookmarkPrompt) {
    labelled_line(ui, "URL", &mut prompt.url);
    if let Some(error) = &prompt.error {
        ui.colored_label(style::palette().warning, error.as_str());
    }
}

fn labelled_line(ui: &mut Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(value);
    });
}
