#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};

mod app;
mod identity;
mod lifecycle;
mod localizations;
mod logging;
mod models;
mod notifier;
mod platform;
mod runtime;
mod theme;
mod ui;
mod webview;

use platform::Platform;

fn main() -> Result<()> {
    platform::ensure_main_thread()?;

    let builder = runtime::build_desktop_app();
    logging::init(builder.log_sink());

    let identity = identity::current();
    log::info!("{} v{} starting", identity.name, identity.version_string);

    platform::enter_ui_apartment().context("failed to prepare the UI thread")?;
    let runtime = builder
        .build()
        .context("failed to assemble the desktop runtime")?;
    log::debug!("selected {:?} backend", runtime.backend());

    let notifier = notifier::for_platform(Platform::current());
    let code = lifecycle::run(runtime, std::env::args_os().collect(), notifier.as_deref())?;

    std::process::exit(code)
}
