use std::any::Any;

use anyhow::Result;

use crate::platform::Platform;

pub const FATAL_ERROR_TITLE: &str = "Fatal Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
}

/// An unrecovered fault raised by the desktop runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalFault {
    pub detail: String,
    pub severity: Severity,
}

impl FatalFault {
    pub fn from_error(error: &anyhow::Error) -> Self {
        Self {
            // `{:?}` renders the whole context chain, plus a backtrace when captured.
            detail: format!("{error:?}"),
            severity: Severity::Fatal,
        }
    }

    /// `origin` is what the panic hook saw: location and stack, when available.
    pub fn from_panic(payload: &(dyn Any + Send), origin: Option<&PanicOrigin>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };

        let detail = match origin {
            Some(origin) => format!(
                "panicked at {}: {message}\n\nstack backtrace:\n{}",
                origin.location, origin.backtrace
            ),
            None => format!("panicked: {message}"),
        };

        Self {
            detail,
            severity: Severity::Fatal,
        }
    }
}

/// Where a panic was raised, captured from inside the panic hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicOrigin {
    pub location: String,
    pub backtrace: String,
}

/// A blocking, native way of telling the user the application is going down.
pub trait FatalNotifier {
    fn notify(&self, fault: &FatalFault) -> Result<()>;
}

/// Modal error box, shown on the calling thread.
pub struct MessageBoxNotifier;

impl FatalNotifier for MessageBoxNotifier {
    fn notify(&self, fault: &FatalFault) -> Result<()> {
        // The only button is OK, so the answer carries nothing.
        let _ = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(FATAL_ERROR_TITLE)
            .set_description(&fault.detail)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
        Ok(())
    }
}

fn message_box() -> Box<dyn FatalNotifier> {
    Box::new(MessageBoxNotifier)
}

// Platforms with a native modal notifier. Others let the fault surface through the
// process exit status and stderr.
const NATIVE_NOTIFIERS: &[(Platform, fn() -> Box<dyn FatalNotifier>)] =
    &[(Platform::Windows, message_box)];

pub fn for_platform(platform: Platform) -> Option<Box<dyn FatalNotifier>> {
    NATIVE_NOTIFIERS
        .iter()
        .find(|(candidate, _)| *candidate == platform)
        .map(|(_, create)| create())
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn only_windows_has_a_native_notifier() {
        assert!(for_platform(Platform::Windows).is_some());
        assert!(for_platform(Platform::Linux).is_none());
        assert!(for_platform(Platform::MacOs).is_none());
        assert!(for_platform(Platform::Other).is_none());
    }

    #[test]
    fn fault_from_error_keeps_the_whole_chain() {
        let error = Err::<(), _>(anyhow!("surface lost"))
            .context("renderer crashed")
            .unwrap_err();
        let fault = FatalFault::from_error(&error);

        assert_eq!(fault.severity, Severity::Fatal);
        assert!(fault.detail.contains("renderer crashed"));
        assert!(fault.detail.contains("surface lost"));
    }

    #[test]
    fn fault_from_panic_reads_str_and_string_payloads() {
        let fault = FatalFault::from_panic(&"boom", None);
        assert_eq!(fault.detail, "panicked: boom");

        let fault = FatalFault::from_panic(&String::from("owned boom"), None);
        assert_eq!(fault.detail, "panicked: owned boom");

        let fault = FatalFault::from_panic(&42_u32, None);
        assert_eq!(fault.detail, "panicked: unknown panic payload");
    }

    #[test]
    fn fault_from_panic_includes_location_and_stack() {
        let origin = PanicOrigin {
            location: "src/app.rs:42:9".to_string(),
            backtrace: "0: youtube_downloader::app::ShellApp::update_ui".to_string(),
        };
        let fault = FatalFault::from_panic(&"index out of bounds", Some(&origin));

        assert!(fault
            .detail
            .starts_with("panicked at src/app.rs:42:9: index out of bounds"));
        assert!(fault.detail.contains("ShellApp::update_ui"));
    }
}
