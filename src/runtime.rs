use std::ffi::OsString;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use eframe::egui;

use crate::app::ShellApp;
use crate::identity::{self, AppIdentity};
use crate::logging::LogSink;
use crate::platform::Platform;
use crate::webview::{self, WebViewProvider};

/// Something that holds resources until it is explicitly released.
pub trait Dispose {
    fn dispose(&mut self) -> Result<()>;
}

/// A GUI runtime that owns the process while its top-level windows are open.
pub trait DesktopRuntime {
    /// Blocks until the last top-level window closes, then returns the exit code.
    fn start_with_classic_desktop_lifetime(&mut self, args: Vec<OsString>) -> Result<i32>;

    /// The application instance created while starting, if it needs releasing.
    fn instance(&mut self) -> Option<&mut dyn Dispose>;
}

/// Windowing system the runtime drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Win32,
    AppKit,
    Wayland,
    X11,
}

impl Backend {
    pub fn detect() -> Option<Self> {
        Self::detect_for(Platform::current(), |key| {
            std::env::var_os(key).filter(|value| !value.is_empty()).is_some()
        })
    }

    /// `has_env` reports whether a session variable is set and non-empty.
    pub fn detect_for(platform: Platform, has_env: impl Fn(&str) -> bool) -> Option<Self> {
        match platform {
            Platform::Windows => Some(Self::Win32),
            Platform::MacOs => Some(Self::AppKit),
            Platform::Linux | Platform::Other => {
                if has_env("WAYLAND_DISPLAY") {
                    Some(Self::Wayland)
                } else if has_env("DISPLAY") {
                    Some(Self::X11)
                } else {
                    None
                }
            }
        }
    }

    /// Pins winit to this backend instead of letting it detect one again.
    #[cfg(target_os = "linux")]
    pub fn event_loop_hook(self) -> Option<eframe::EventLoopBuilderHook> {
        let hook: eframe::EventLoopBuilderHook = match self {
            Self::Wayland => Box::new(pin_wayland),
            Self::X11 => Box::new(pin_x11),
            Self::Win32 | Self::AppKit => return None,
        };
        Some(hook)
    }

    /// Windows and macOS have a single windowing backend.
    #[cfg(not(target_os = "linux"))]
    pub fn event_loop_hook(self) -> Option<eframe::EventLoopBuilderHook> {
        None
    }
}

#[cfg(target_os = "linux")]
fn pin_wayland<T>(builder: &mut winit::event_loop::EventLoopBuilder<T>) {
    use winit::platform::wayland::EventLoopBuilderExtWayland;
    builder.with_wayland();
}

#[cfg(target_os = "linux")]
fn pin_x11<T>(builder: &mut winit::event_loop::EventLoopBuilder<T>) {
    use winit::platform::x11::EventLoopBuilderExtX11;
    builder.with_x11();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendChoice {
    Unset,
    Detected(Option<Backend>),
}

/// Assembles the desktop runtime without starting anything.
pub struct RuntimeBuilder {
    identity: &'static AppIdentity,
    backend: BackendChoice,
    log_sink: LogSink,
    web_view: Option<Arc<dyn WebViewProvider>>,
}

impl RuntimeBuilder {
    pub fn configure() -> Self {
        Self {
            identity: identity::current(),
            backend: BackendChoice::Unset,
            log_sink: LogSink::Disabled,
            web_view: None,
        }
    }

    pub fn use_platform_detect(mut self) -> Self {
        self.backend = BackendChoice::Detected(Backend::detect());
        self
    }

    pub fn log_to_trace(mut self) -> Self {
        self.log_sink = LogSink::Trace;
        self
    }

    pub fn use_desktop_web_view(self) -> Self {
        self.use_web_view(webview::desktop_web_view())
    }

    pub fn use_web_view(mut self, provider: Arc<dyn WebViewProvider>) -> Self {
        self.web_view = Some(provider);
        self
    }

    pub fn log_sink(&self) -> LogSink {
        self.log_sink
    }

    pub fn build(self) -> Result<EframeRuntime> {
        let backend = match self.backend {
            BackendChoice::Unset => bail!("no GUI backend selected"),
            BackendChoice::Detected(None) => {
                bail!("no display server detected (neither WAYLAND_DISPLAY nor DISPLAY is set)")
            }
            BackendChoice::Detected(Some(backend)) => backend,
        };
        let web_view = self
            .web_view
            .ok_or_else(|| anyhow!("no web-view capability attached"))?;

        Ok(EframeRuntime {
            identity: self.identity,
            backend,
            web_view,
            instance: None,
        })
    }
}

/// The shell's runtime configuration.
pub fn build_desktop_app() -> RuntimeBuilder {
    RuntimeBuilder::configure()
        .use_platform_detect()
        .log_to_trace()
        .use_desktop_web_view()
}

pub struct EframeRuntime {
    identity: &'static AppIdentity,
    backend: Backend,
    web_view: Arc<dyn WebViewProvider>,
    instance: Option<AppInstance>,
}

impl EframeRuntime {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    fn native_options(&self) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([520.0, 320.0])
                .with_min_inner_size([420.0, 260.0])
                .with_title(self.identity.name.as_str()),
            event_loop_builder: self.backend.event_loop_hook(),
            ..Default::default()
        }
    }
}

impl DesktopRuntime for EframeRuntime {
    fn start_with_classic_desktop_lifetime(&mut self, args: Vec<OsString>) -> Result<i32> {
        log::info!(
            "starting desktop lifetime on {:?} with web view '{}'",
            self.backend,
            self.web_view.name()
        );
        self.instance = Some(AppInstance {
            web_view: Arc::clone(&self.web_view),
        });

        let options = self.native_options();
        let identity = self.identity;
        let web_view = Arc::clone(&self.web_view);
        eframe::run_native(
            &identity.name,
            options,
            Box::new(move |cc| {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
                Box::new(ShellApp::new(identity, web_view, args))
            }),
        )
        .map_err(|error| anyhow!("desktop runtime failed: {error}"))?;

        Ok(0)
    }

    fn instance(&mut self) -> Option<&mut dyn Dispose> {
        self.instance.as_mut().map(|instance| instance as &mut dyn Dispose)
    }
}

/// Application-wide resources created when the runtime starts.
struct AppInstance {
    web_view: Arc<dyn WebViewProvider>,
}

impl Dispose for AppInstance {
    fn dispose(&mut self) -> Result<()> {
        log::debug!("shutting down web view provider '{}'", self.web_view.name());
        self.web_view.shutdown()
    }
}
