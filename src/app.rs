use std::ffi::OsString;
use std::sync::Arc;

use eframe::egui;

use crate::identity::AppIdentity;
use crate::localizations::Localizations;
use crate::models::{LinkTarget, ShellState};
use crate::ui;
use crate::webview::WebViewProvider;

pub struct ShellApp {
    pub state: ShellState,
    identity: &'static AppIdentity,
    localizer: Localizations,
    web_view: Arc<dyn WebViewProvider>,
}

impl ShellApp {
    pub fn new(
        identity: &'static AppIdentity,
        web_view: Arc<dyn WebViewProvider>,
        launch_args: Vec<OsString>,
    ) -> Self {
        let localizer = Localizations::new();
        log::trace!("shell window created with launch arguments {launch_args:?}");

        Self {
            state: ShellState::new(localizer.text("status-ready"), launch_args),
            identity,
            localizer,
            web_view,
        }
    }

    pub fn open_link(&mut self, target: LinkTarget) {
        let title = self.localizer.text(target.label_key());
        let url = target.url(self.identity);

        match self.web_view.open(&title, url) {
            Ok(()) => self.state.clear_error(),
            Err(error) => {
                log::warn!("failed to open {url}: {error:#}");
                self.state
                    .record_error(format!("{}: {error}", self.localizer.text("open-failed")));
            }
        }
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(12.0);
            ui::render_header(ui, self.identity, &self.localizer);
            ui.add_space(24.0);

            if let Some(target) = ui::render_links(ui, &self.localizer) {
                self.open_link(target);
            }

            ui.add_space(24.0);
            ui::render_status(ui, &self.state);
        });
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::debug!("shell window closed");
    }
}
