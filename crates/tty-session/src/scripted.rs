//! In-memory terminal sessions driven by a fixed input script.

use std::io::{self, Cursor, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::TerminalSession;

/// Everything written to a scripted session, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Transcript {
    /// Output so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TerminalSession {
    /// A session reading from `input` and recording output in the returned
    /// [`Transcript`].
    pub fn scripted(input: &str) -> (Self, Transcript) {
        let transcript = Transcript::default();
        let session = Self::from_streams(
            "/dev/scripted",
            Cursor::new(input.as_bytes().to_vec()),
            transcript.clone(),
        );
        (session, transcript)
    }
}
