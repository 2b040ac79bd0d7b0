//! Interactive choice among several identities.

use thiserror::Error;
use tracing::debug;
use tty_session::{TerminalResult, TerminalSession};

use crate::{Identity, IdentityPresenter};

/// Outcome of asking the user to pick an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The user picked this identity.
    Chosen(&'a Identity),
    /// The answer was not a valid choice.
    Cancelled,
}

/// A selection answer that is not a number in range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid response `{raw}'.")]
pub struct InvalidSelection {
    /// The line exactly as typed.
    pub raw: String,
}

/// Parse `raw` as a 1-based index into a list of `count` entries.
///
/// Surrounding whitespace is ignored; anything else that is not a base-10
/// number in `1..=count` is rejected. Returns the 0-based index.
pub fn parse_selection(raw: &str, count: usize) -> Result<usize, InvalidSelection> {
    let invalid = || InvalidSelection {
        raw: raw.to_string(),
    };

    let number: usize = raw.trim().parse().map_err(|_| invalid())?;
    if number == 0 || number > count {
        return Err(invalid());
    }
    Ok(number - 1)
}

/// List `identities`, ask for a number and read one answer.
///
/// An invalid answer is reported on the terminal and yields
/// [`Selection::Cancelled`]; there is no retry. Terminal failures,
/// including end of input, are returned to the caller.
pub fn choose<'a>(
    terminal: &mut TerminalSession,
    presenter: &IdentityPresenter,
    identities: &'a [Identity],
) -> TerminalResult<Selection<'a>> {
    terminal.write_line("Multiple identities can be used for authentication:")?;
    for (n, identity) in identities.iter().enumerate() {
        terminal.write_line(&format!(" {}.  {}", n + 1, presenter.describe(identity)))?;
    }
    terminal.prompt(&format!(
        "Choose identity to authenticate as (1-{}): ",
        identities.len()
    ))?;

    let answer = terminal.read_line()?;
    match parse_selection(&answer, identities.len()) {
        Ok(index) => {
            debug!(choice = index + 1, "Identity chosen");
            Ok(Selection::Chosen(&identities[index]))
        }
        Err(invalid) => {
            terminal.write_line(&invalid.to_string())?;
            Ok(Selection::Cancelled)
        }
    }
}
