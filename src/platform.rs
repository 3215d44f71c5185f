use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// The GUI runtime must be driven from the process's first thread.
pub fn ensure_main_thread() -> Result<()> {
    let current = std::thread::current();
    if current.name() != Some("main") {
        bail!(
            "the desktop runtime must start on the main thread (running on {:?})",
            current.name().unwrap_or("<unnamed>")
        );
    }
    Ok(())
}

/// Puts the UI thread into a single-threaded COM apartment before any window or
/// web view exists. Dialogs, drag and drop and WebView2 all require it.
#[cfg(windows)]
pub fn enter_ui_apartment() -> Result<()> {
    use winapi::shared::winerror::{RPC_E_CHANGED_MODE, SUCCEEDED};
    use winapi::um::combaseapi::CoInitializeEx;
    use winapi::um::objbase::COINIT_APARTMENTTHREADED;

    let hr = unsafe { CoInitializeEx(std::ptr::null_mut(), COINIT_APARTMENTTHREADED) };
    if hr == RPC_E_CHANGED_MODE {
        bail!("UI thread is already initialized as a multi-threaded apartment");
    }
    if !SUCCEEDED(hr) {
        bail!("CoInitializeEx failed with HRESULT {hr:#010x}");
    }
    log::trace!("entered single-threaded apartment");
    Ok(())
}

#[cfg(not(windows))]
pub fn enter_ui_apartment() -> Result<()> {
    Ok(())
}
