use std::sync::Arc;
#[cfg(any(test, all(feature = "webview", not(target_os = "macos"))))]
use std::sync::Mutex;

#[cfg(any(test, all(feature = "webview", not(target_os = "macos"))))]
use anyhow::anyhow;
use anyhow::{bail, Context, Result};
use url::Url;

/// Lets the shell's views show web content.
pub trait WebViewProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn open(&self, title: &str, url: &str) -> Result<()>;

    /// Closes everything this provider opened. Called once at teardown.
    fn shutdown(&self) -> Result<()>;
}

/// The web-view provider suited to this desktop build.
pub fn desktop_web_view() -> Arc<dyn WebViewProvider> {
    #[cfg(all(feature = "webview", not(target_os = "macos")))]
    {
        Arc::new(embedded::EmbeddedWebView::default())
    }
    #[cfg(not(all(feature = "webview", not(target_os = "macos"))))]
    {
        Arc::new(SystemBrowser)
    }
}

pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid URL '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => bail!("refusing to open '{raw}': unsupported scheme '{scheme}'"),
    }
}

/// Hands pages to the user's default browser.
pub struct SystemBrowser;

impl WebViewProvider for SystemBrowser {
    fn name(&self) -> &'static str {
        "system-browser"
    }

    fn open(&self, title: &str, url: &str) -> Result<()> {
        let url = validate_url(url)?;
        log::debug!("opening '{title}' in the system browser: {url}");
        open::that(url.as_str()).with_context(|| format!("failed to open {url} in the system browser"))
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(any(test, all(feature = "webview", not(target_os = "macos"))))]
enum HostState<H> {
    Idle,
    Running(H),
    Stopped,
}

/// A background host started on first use. Once stopped it stays stopped.
#[cfg(any(test, all(feature = "webview", not(target_os = "macos"))))]
struct HostSlot<H> {
    state: Mutex<HostState<H>>,
}

#[cfg(any(test, all(feature = "webview", not(target_os = "macos"))))]
impl<H> HostSlot<H> {
    fn new() -> Self {
        Self {
            state: Mutex::new(HostState::Idle),
        }
    }

    /// Runs `act` against the host, calling `start` first if none is running yet.
    fn with_host<T>(
        &self,
        start: impl FnOnce() -> Result<H>,
        act: impl FnOnce(&H) -> Result<T>,
    ) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("web view host state is poisoned"))?;
        if matches!(*state, HostState::Idle) {
            *state = HostState::Running(start()?);
        }
        match &*state {
            HostState::Running(host) => act(host),
            _ => bail!("web view host has already shut down"),
        }
    }

    /// Hands back the running host, if any, and refuses to start another.
    fn stop(&self) -> Result<Option<H>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("web view host state is poisoned"))?;
        match std::mem::replace(&mut *state, HostState::Stopped) {
            HostState::Running(host) => Ok(Some(host)),
            HostState::Idle | HostState::Stopped => Ok(None),
        }
    }
}

#[cfg(all(feature = "webview", not(target_os = "macos")))]
mod embedded {
    use std::collections::HashMap;
    use std::sync::mpsc::{self, Sender};
    use std::thread::{self, JoinHandle};

    use anyhow::{anyhow, Context, Result};
    use tao::event::{Event, WindowEvent};
    use tao::event_loop::{
        ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget,
    };
    use tao::platform::run_return::EventLoopExtRunReturn;
    use tao::window::{Window, WindowBuilder, WindowId};
    use wry::{WebView, WebViewBuilder};

    use super::{validate_url, HostSlot, WebViewProvider};

    enum HostEvent {
        Open {
            title: String,
            url: String,
            reply: Sender<Result<()>>,
        },
        Shutdown,
    }

    struct Host {
        proxy: EventLoopProxy<HostEvent>,
        thread: JoinHandle<()>,
    }

    // Field order is drop order: the web view goes before its window.
    struct HostedPage {
        _webview: WebView,
        _window: Window,
    }

    /// Native windows with embedded web views, all owned by one event loop on a
    /// dedicated thread so the egui loop on the main thread is untouched.
    pub struct EmbeddedWebView {
        host: HostSlot<Host>,
    }

    impl Default for EmbeddedWebView {
        fn default() -> Self {
            Self {
                host: HostSlot::new(),
            }
        }
    }

    impl WebViewProvider for EmbeddedWebView {
        fn name(&self) -> &'static str {
            "embedded-webview"
        }

        fn open(&self, title: &str, url: &str) -> Result<()> {
            let url = validate_url(url)?;
            let (reply, opened) = mpsc::channel();
            let event = HostEvent::Open {
                title: title.to_string(),
                url: url.to_string(),
                reply,
            };

            self.host.with_host(spawn_host, |host| {
                host.proxy
                    .send_event(event)
                    .map_err(|_| anyhow!("web view host is no longer running"))
            })?;

            opened
                .recv()
                .map_err(|_| anyhow!("web view host stopped before opening {url}"))?
        }

        fn shutdown(&self) -> Result<()> {
            let Some(host) = self.host.stop()? else {
                return Ok(());
            };
            // Fails only when the loop already ended; joining tells us how.
            let _ = host.proxy.send_event(HostEvent::Shutdown);
            host.thread
                .join()
                .map_err(|_| anyhow!("web view host thread panicked"))
        }
    }

    fn spawn_host() -> Result<Host> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("webview-host".to_string())
            .spawn(move || {
                let mut event_loop = new_event_loop();
                if ready_tx.send(event_loop.create_proxy()).is_ok() {
                    run_host(&mut event_loop);
                }
            })
            .context("failed to spawn web view host thread")?;

        match ready_rx.recv() {
            Ok(proxy) => {
                log::debug!("web view host started");
                Ok(Host { proxy, thread })
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow!("web view host exited before it was ready"))
            }
        }
    }

    fn run_host(event_loop: &mut EventLoop<HostEvent>) {
        let mut pages: HashMap<WindowId, HostedPage> = HashMap::new();

        event_loop.run_return(move |event, target, control_flow| {
            *control_flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(HostEvent::Open { title, url, reply }) => {
                    let opened = open_page(target, &title, &url).map(|(id, page)| {
                        pages.insert(id, page);
                        log::debug!("web view window opened: {url} ({} open)", pages.len());
                    });
                    let _ = reply.send(opened);
                }
                Event::WindowEvent {
                    window_id,
                    event: WindowEvent::CloseRequested,
                    ..
                } => {
                    if pages.remove(&window_id).is_some() {
                        log::debug!("web view window closed ({} open)", pages.len());
                    }
                }
                Event::UserEvent(HostEvent::Shutdown) => {
                    pages.clear();
                    *control_flow = ControlFlow::Exit;
                }
                _ => {}
            }
        });
    }

    fn open_page(
        target: &EventLoopWindowTarget<HostEvent>,
        title: &str,
        url: &str,
    ) -> Result<(WindowId, HostedPage)> {
        let window = WindowBuilder::new()
            .with_title(title)
            .build(target)
            .map_err(|error| anyhow!("failed to create web view window: {error}"))?;
        let webview = build_webview(&window, url)?;
        Ok((
            window.id(),
            HostedPage {
                _webview: webview,
                _window: window,
            },
        ))
    }

    fn new_event_loop() -> EventLoop<HostEvent> {
        let mut builder = EventLoopBuilder::<HostEvent>::with_user_event();
        #[cfg(windows)]
        {
            use tao::platform::windows::EventLoopBuilderExtWindows;
            builder.with_any_thread(true);
        }
        #[cfg(not(windows))]
        {
            use tao::platform::unix::EventLoopBuilderExtUnix;
            builder.with_any_thread(true);
        }
        builder.build()
    }

    #[cfg(target_os = "linux")]
    fn build_webview(window: &Window, url: &str) -> Result<WebView> {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;

        let container = window
            .default_vbox()
            .ok_or_else(|| anyhow!("web view window has no GTK container"))?;
        WebViewBuilder::new_gtk(container)
            .with_url(url)
            .build()
            .map_err(|error| anyhow!("failed to create web view: {error}"))
    }

    #[cfg(not(target_os = "linux"))]
    fn build_webview(window: &Window, url: &str) -> Result<WebView> {
        WebViewBuilder::new(window)
            .with_url(url)
            .build()
            .map_err(|error| anyhow!("failed to create web view: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn validate_url_accepts_web_schemes_only() {
        assert!(validate_url("https://github.com/owner/repo/releases/latest").is_ok());
        assert!(validate_url("http://localhost:8080/").is_ok());
        assert!(validate_url("file:///etc/passwd").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn system_browser_rejects_unsupported_urls_before_launching() {
        let error = SystemBrowser.open("Local file", "file:///tmp/x").unwrap_err();
        assert!(error.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn desktop_web_view_shuts_down_cleanly_when_nothing_was_opened() {
        let provider = desktop_web_view();
        assert!(!provider.name().is_empty());
        assert!(provider.shutdown().is_ok());
    }

    #[test]
    fn host_is_started_once_and_reused() {
        let slot = HostSlot::new();
        let starts = Cell::new(0);
        let start = || {
            starts.set(starts.get() + 1);
            Ok(7)
        };

        assert_eq!(slot.with_host(start, |host| Ok(*host)).unwrap(), 7);
        assert_eq!(slot.with_host(start, |host| Ok(*host + 1)).unwrap(), 8);
        assert_eq!(starts.get(), 1);
    }

    #[test]
    fn failed_start_can_be_retried() {
        let slot = HostSlot::new();
        assert!(slot
            .with_host(|| Err(anyhow!("no display")), |host: &u8| Ok(*host))
            .is_err());
        assert_eq!(slot.with_host(|| Ok(1_u8), |host| Ok(*host)).unwrap(), 1);
    }

    #[test]
    fn stopped_host_is_handed_back_once_and_never_restarted() {
        let slot = HostSlot::new();
        slot.with_host(|| Ok("host"), |_| Ok(())).unwrap();

        assert_eq!(slot.stop().unwrap(), Some("host"));
        assert_eq!(slot.stop().unwrap(), None);

        let started = Cell::new(false);
        let error = slot
            .with_host(
                || {
                    started.set(true);
                    Ok("again")
                },
                |_| Ok(()),
            )
            .unwrap_err();
        assert!(error.to_string().contains("already shut down"));
        assert!(!started.get());
    }

    #[test]
    fn stopping_an_unused_host_starts_nothing() {
        let slot = HostSlot::<u8>::new();
        assert_eq!(slot.stop().unwrap(), None);
        assert!(slot.with_host(|| Ok(1), |_| Ok(())).is_err());
    }
}
