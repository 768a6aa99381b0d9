// src/host.rs
use crate::error::ClipboardError;
use crate::notify::Notification;

/// The outside world as seen by the interaction handler: a clipboard, a
/// blocking yes/no prompt, and a surface for transient notifications.
pub trait Host {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn confirm(&mut self, message: &str) -> bool;
    fn notify(&mut self, notification: Notification);
}

/// Destination for copied text.
pub trait ClipboardWriter {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

fn open_clipboard() -> Result<arboard::Clipboard, ClipboardError> {
    arboard::Clipboard::new().map_err(|err| {
        log::error!("Error initializing clipboard: {}", err);
        ClipboardError::Unavailable(err.to_string())
    })
}

fn write_error(err: arboard::Error) -> ClipboardError {
    log::error!("Error setting clipboard text: {}", err);
    ClipboardError::Write(err.to_string())
}

/// System clipboard through `arboard` for a long-running session. The handle
/// is opened lazily and kept, since on X11 and Wayland the content is only
/// served while the handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardWriter for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.inner.as_mut() {
            Some(clipboard) => clipboard,
            None => self.inner.insert(open_clipboard()?),
        };
        clipboard.set_text(text.to_string()).map_err(write_error)
    }
}

/// Clipboard for one-shot commands whose process exits right after copying.
///
/// On Linux the selection dies with its owner, so the text is handed to
/// `wl-copy` or `xclip`, which keep serving it in the background. Without
/// either tool, arboard holds the selection and this call blocks until
/// another program takes the clipboard over.
#[derive(Default)]
pub struct DetachedClipboard;

#[cfg(target_os = "linux")]
fn copy_with_helper(text: &str) -> bool {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut command = if std::env::var("WAYLAND_DISPLAY").is_ok() {
        Command::new("wl-copy")
    } else {
        let mut xclip = Command::new("xclip");
        xclip.args(["-selection", "clipboard"]);
        xclip
    };
    let Ok(mut child) = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        log::debug!("No clipboard helper available");
        return false;
    };
    let written = child
        .stdin
        .take()
        .map(|mut stdin| stdin.write_all(text.as_bytes()).is_ok())
        .unwrap_or(false);
    let exited_ok = child.wait().map(|status| status.success()).unwrap_or(false);
    written && exited_ok
}

impl ClipboardWriter for DetachedClipboard {
    #[cfg(target_os = "linux")]
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        if copy_with_helper(text) {
            return Ok(());
        }
        eprintln!("Keeping the clipboard until it is replaced (Ctrl-C discards it)...");
        open_clipboard()?
            .set()
            .wait()
            .text(text.to_string())
            .map_err(write_error)
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        open_clipboard()?.set_text(text.to_string()).map_err(write_error)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Scripted host that records everything the handler asks of it.
    #[derive(Default)]
    pub struct FakeHost {
        pub clipboard: Option<String>,
        pub clipboard_fails: bool,
        pub confirm_answer: bool,
        pub prompts: Vec<String>,
        pub notifications: Vec<Notification>,
    }

    impl FakeHost {
        pub fn confirming() -> Self {
            Self {
                confirm_answer: true,
                ..Default::default()
            }
        }

        pub fn last_notification(&self) -> Option<&Notification> {
            self.notifications.last()
        }
    }

    impl Host for FakeHost {
        fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.clipboard_fails {
                return Err(ClipboardError::Write("denied".to_string()));
            }
            self.clipboard = Some(text.to_string());
            Ok(())
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.prompts.push(message.to_string());
            self.confirm_answer
        }

        fn notify(&mut self, notification: Notification) {
            self.notifications.push(notification);
        }
    }
}
