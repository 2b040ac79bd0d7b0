//! Line-oriented session on the process's controlling terminal.
//!
//! The agent opens the controlling terminal once at startup and shares the
//! handle behind a mutex ([`SharedTerminal`]). Whoever holds the lock owns the
//! terminal for a whole prompt/read sequence, so two authentication requests
//! never interleave their output or steal each other's input.

mod error;
#[cfg(any(test, feature = "testing"))]
mod scripted;

use std::ffi::CStr;
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

pub use error::{TerminalError, TerminalResult};
#[cfg(any(test, feature = "testing"))]
pub use scripted::Transcript;

/// ANSI sequence starting a highlighted (bold red) banner.
pub const HIGHLIGHT_ON: &str = "\x1B[1;31m";
/// ANSI sequence resetting attributes after a banner.
pub const HIGHLIGHT_OFF: &str = "\x1B[0m";

/// Room for any `ctermid` result; macOS uses MAXPATHLEN for `L_ctermid`.
const CTERMID_BUF_LEN: usize = 1024;

/// Process-wide terminal handle, locked for the duration of one interaction.
pub type SharedTerminal = Arc<Mutex<TerminalSession>>;

/// A bidirectional line stream over the controlling terminal.
pub struct TerminalSession {
    path: PathBuf,
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
    highlight: bool,
}

impl TerminalSession {
    /// Open the controlling terminal of the current process for read+write.
    pub fn open() -> TerminalResult<Self> {
        let path = controlling_terminal_path()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| open_error(&path, &e))?;
        let reader = file.try_clone().map_err(|e| open_error(&path, &e))?;

        debug!(path = %path.display(), "Opened controlling terminal");
        Ok(Self::from_streams(path, BufReader::new(reader), file))
    }

    /// Build a session over arbitrary streams.
    pub fn from_streams(
        path: impl Into<PathBuf>,
        reader: impl BufRead + Send + 'static,
        writer: impl Write + Send + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            reader: Box::new(reader),
            writer: Box::new(writer),
            highlight: true,
        }
    }

    /// Enable or disable ANSI highlighting of banners.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Wrap the session for sharing across requests.
    pub fn into_shared(self) -> SharedTerminal {
        Arc::new(Mutex::new(self))
    }

    /// Path of the terminal device backing this session.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `text` as-is and flush it before returning, so a following
    /// blocking read sees the prompt on screen.
    pub fn prompt(&mut self, text: &str) -> TerminalResult<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write `text` followed by a newline.
    pub fn write_line(&mut self, text: &str) -> TerminalResult<()> {
        self.prompt(&format!("{text}\n"))
    }

    /// Write a highlighted line.
    pub fn banner(&mut self, text: &str) -> TerminalResult<()> {
        if self.highlight {
            self.prompt(&format!("{HIGHLIGHT_ON}{text}\n{HIGHLIGHT_OFF}"))
        } else {
            self.write_line(text)
        }
    }

    /// Block until a full line is read and return it without the `\n`.
    ///
    /// End of input before the terminator is reported as
    /// [`TerminalError::UnexpectedEndOfInput`], even when some characters
    /// were already read.
    pub fn read_line(&mut self) -> TerminalResult<String> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;

        if read == 0 || line.last() != Some(&b'\n') {
            return Err(TerminalError::UnexpectedEndOfInput);
        }
        line.pop();

        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("path", &self.path)
            .field("highlight", &self.highlight)
            .finish_non_exhaustive()
    }
}

/// Resolve the controlling terminal's pathname via `ctermid(3)`.
pub fn controlling_terminal_path() -> TerminalResult<PathBuf> {
    let mut buf: Vec<libc::c_char> = vec![0; CTERMID_BUF_LEN];

    // SAFETY: `buf` is writable, NUL-initialized and larger than L_ctermid.
    let ptr = unsafe { libc::ctermid(buf.as_mut_ptr()) };
    if ptr.is_null() || buf[0] == 0 {
        return Err(TerminalError::Unavailable(format!(
            "Cannot determine pathname for current controlling terminal for the process: {}",
            io::Error::last_os_error()
        )));
    }

    // SAFETY: ctermid wrote a NUL-terminated string into `buf`.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(PathBuf::from(name.to_string_lossy().into_owned()))
}

fn open_error(path: &Path, err: &io::Error) -> TerminalError {
    TerminalError::Unavailable(format!(
        "Error opening current controlling terminal for the process (`{}'): {}",
        path.display(),
        err
    ))
}
