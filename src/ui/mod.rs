use eframe::egui::{self, RichText, Stroke};

use crate::identity::AppIdentity;
use crate::localizations::Localizations;
use crate::models::{LinkTarget, ShellState};
use crate::theme::*;

pub fn render_header(ui: &mut egui::Ui, identity: &AppIdentity, localizer: &Localizations) {
    ui.label(
        RichText::new(localizer.text("app-title"))
            .size(TITLE_FONT_SIZE)
            .strong(),
    );
    ui.add_space(4.0);
    ui.label(
        RichText::new(format!(
            "{} · {} {}",
            identity.name,
            localizer.text("version-label"),
            identity.version_string
        ))
        .color(SECONDARY_TEXT),
    );
}

/// Returns the link the user clicked this frame, if any.
pub fn render_links(ui: &mut egui::Ui, localizer: &Localizations) -> Option<LinkTarget> {
    let mut clicked = None;

    ui.horizontal(|ui| {
        let project = link_button(
            localizer.text(LinkTarget::ProjectPage.label_key()),
            BUTTON_MAIN_TEXT,
            PRIMARY_BUTTON_BG,
        );
        if ui.add(project).clicked() {
            clicked = Some(LinkTarget::ProjectPage);
        }

        let release = link_button(
            localizer.text(LinkTarget::LatestRelease.label_key()),
            BUTTON_SECONDARY_TEXT,
            SECONDARY_BUTTON_BG,
        );
        if ui.add(release).clicked() {
            clicked = Some(LinkTarget::LatestRelease);
        }
    });

    clicked
}

fn link_button(text: String, color: egui::Color32, fill: egui::Color32) -> impl egui::Widget {
    egui::Button::new(RichText::new(text).size(BUTTON_FONT_SIZE).color(color))
        .min_size(MIN_SIZE_BUTTON)
        .fill(fill)
        .rounding(ROUNDING_BUTTON)
        .stroke(Stroke::new(1.0, BORDER_COLOR))
}

pub fn render_status(ui: &mut egui::Ui, state: &ShellState) {
    egui::Frame::group(ui.style())
        .fill(STATUS_BG)
        .rounding(ROUNDING_FRAME)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            let status_text = if let Some(error) = &state.last_error {
                RichText::new(error).color(TEXT_ERROR)
            } else {
                RichText::new(&state.status).color(SECONDARY_TEXT)
            };
            ui.label(status_text);
        });
}
