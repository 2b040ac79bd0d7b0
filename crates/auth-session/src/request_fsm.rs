//! Request state machine using rust-fsm.
//!
//! One machine tracks one authentication request from the banner to its
//! outcome.
//!
//! ## State Diagram
//!
//! ```text
//!                    ┌─────────────────┐
//!                    │     Started     │ (initial)
//!                    └────────┬────────┘
//!     OneIdentityOffered      │      SeveralIdentitiesOffered
//!          ┌──────────────────┴──────────────────┐
//!          ▼                                     ▼
//! ┌─────────────────┐                   ┌─────────────────┐
//! │ SingleIdentity  │                   │ChoosingIdentity │──► Cancelled
//! └────────┬────────┘                   └────────┬────────┘  SelectionInvalid
//!          │ IdentityAnnounced                   │ IdentityChosen
//!          └──────────────────┬──────────────────┘
//!                             ▼
//!                    ┌─────────────────┐
//!                    │AwaitingResponse │
//!                    └────────┬────────┘
//!                             │ ResponseCollected
//!                             ▼
//!                         Succeeded
//! ```
//!
//! `NoIdentitiesOffered` and `TerminalFailed` lead to `Failed`.

use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub request_machine(Started)

    Started => {
        OneIdentityOffered => SingleIdentity,
        SeveralIdentitiesOffered => ChoosingIdentity,
        NoIdentitiesOffered => Failed,
        TerminalFailed => Failed
    },
    SingleIdentity => {
        IdentityAnnounced => AwaitingResponse,
        TerminalFailed => Failed
    },
    ChoosingIdentity => {
        IdentityChosen => AwaitingResponse,
        SelectionInvalid => Cancelled,
        TerminalFailed => Failed
    },
    AwaitingResponse => {
        ResponseCollected => Succeeded,
        TerminalFailed => Failed
    }
}

pub use request_machine::Input as RequestInput;
pub use request_machine::State as RequestState;
pub use request_machine::StateMachine as RequestMachine;

impl RequestState {
    /// True once the request has an outcome.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            RequestState::Succeeded | RequestState::Cancelled | RequestState::Failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_started() {
        let machine = RequestMachine::new();
        assert_eq!(*machine.state(), RequestState::Started);
        assert!(!machine.state().is_final());
    }

    #[test]
    fn single_identity_flow() {
        let mut machine = RequestMachine::new();

        machine.consume(&RequestInput::OneIdentityOffered).unwrap();
        assert_eq!(*machine.state(), RequestState::SingleIdentity);

        machine.consume(&RequestInput::IdentityAnnounced).unwrap();
        assert_eq!(*machine.state(), RequestState::AwaitingResponse);

        machine.consume(&RequestInput::ResponseCollected).unwrap();
        assert_eq!(*machine.state(), RequestState::Succeeded);
        assert!(machine.state().is_final());
    }

    #[test]
    fn choosing_then_success() {
        let mut machine = RequestMachine::new();

        machine.consume(&RequestInput::SeveralIdentitiesOffered).unwrap();
        machine.consume(&RequestInput::IdentityChosen).unwrap();
        machine.consume(&RequestInput::ResponseCollected).unwrap();
        assert_eq!(*machine.state(), RequestState::Succeeded);
    }

    #[test]
    fn invalid_selection_cancels() {
        let mut machine = RequestMachine::new();

        machine.consume(&RequestInput::SeveralIdentitiesOffered).unwrap();
        machine.consume(&RequestInput::SelectionInvalid).unwrap();
        assert_eq!(*machine.state(), RequestState::Cancelled);
        assert!(machine.state().is_final());
    }

    #[test]
    fn single_identity_never_chooses() {
        let mut machine = RequestMachine::new();

        machine.consume(&RequestInput::OneIdentityOffered).unwrap();
        assert!(machine.consume(&RequestInput::IdentityChosen).is_err());
        assert!(machine.consume(&RequestInput::SelectionInvalid).is_err());
        assert_eq!(*machine.state(), RequestState::SingleIdentity);
    }

    #[test]
    fn empty_identity_list_fails() {
        let mut machine = RequestMachine::new();

        machine.consume(&RequestInput::NoIdentitiesOffered).unwrap();
        assert_eq!(*machine.state(), RequestState::Failed);
    }

    #[test]
    fn terminal_failure_from_any_active_state() {
        for path in [
            vec![],
            vec![RequestInput::OneIdentityOffered],
            vec![RequestInput::SeveralIdentitiesOffered],
            vec![
                RequestInput::OneIdentityOffered,
                RequestInput::IdentityAnnounced,
            ],
        ] {
            let mut machine = RequestMachine::new();
            for input in &path {
                machine.consume(input).unwrap();
            }
            machine.consume(&RequestInput::TerminalFailed).unwrap();
            assert_eq!(*machine.state(), RequestState::Failed);
        }
    }

    #[test]
    fn final_states_accept_nothing() {
        let mut machine = RequestMachine::new();
        machine.consume(&RequestInput::NoIdentitiesOffered).unwrap();

        for input in [
            RequestInput::OneIdentityOffered,
            RequestInput::ResponseCollected,
            RequestInput::TerminalFailed,
        ] {
            assert!(machine.consume(&input).is_err());
        }
        assert_eq!(*machine.state(), RequestState::Failed);
    }
}
