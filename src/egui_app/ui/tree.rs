use eframe::egui::{self, RichText, Ui};

use crate::folder_browser::{FolderBrowser, MenuCommand, MenuEntry, NodeId};

use super::style;

const INDENT: f32 = 14.0;

/// User input collected while drawing, applied once the tree is released.
pub(super) enum TreeInput {
    Toggle(NodeId),
    Select(NodeId),
    Menu(NodeId, MenuCommand),
}

pub(super) fn render_tree(ui: &mut Ui, browser: &FolderBrowser) -> Vec<TreeInput> {
    let mut inputs = Vec::new();
    render_node(ui, browser, browser.root(), 0, &mut inputs);
    inputs
}

fn render_node(
    ui: &mut Ui,
    browser: &FolderBrowser,
    id: NodeId,
    depth: usize,
    inputs: &mut Vec<TreeInput>,
) {
    let Some(node) = browser.node(id) else {
        return;
    };
    let selected = browser.selection() == Some(id);
    ui.horizontal(|ui| {
        ui.add_space(depth as f32 * INDENT);
        if node.is_expandable() || node.is_expanded() {
            let arrow = if node.is_expanded() { "⏷" } else { "⏵" };
            if ui.small_button(arrow).clicked() {
                inputs.push(TreeInput::Toggle(id));
            }
        } else {
            ui.add_space(INDENT + 4.0);
        }
        ui.label(style::folder_glyph(node.icon()));
        let response = ui.selectable_label(selected, node.data().label.as_str());
        if response.clicked() || response.secondary_clicked() {
            inputs.push(TreeInput::Select(id));
        }
        if response.double_clicked() {
            inputs.push(TreeInput::Toggle(id));
        }
        response.context_menu(|ui| {
            for entry in browser.context_menu(id) {
                match entry {
                    MenuEntry::Separator => {
                        ui.separator();
                    }
                    MenuEntry::Item {
                        command,
                        label,
                        enabled,
                    } => {
                        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                            inputs.push(TreeInput::Menu(id, command));
                            ui.close();
                        }
                    }
                }
            }
        });
        if node.data().is_real {
            response.on_hover_text(
                RichText::new(&node.data().path).color(style::palette().text_muted),
            );
        }
    });
    if node.is_expanded() {
        for child in browser.children(id) {
            render_node(ui, browser, *child, depth + 1, inputs);
        }
    }
}
