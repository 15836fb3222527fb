//! Single-occupancy command mailbox.
//!
//! The TV multiplexes every response onto one message stream without
//! correlation ids, so a connection can only pair an inbound frame with
//! "the" outstanding command. [`CommandSlot`] holds that command.
//!
//! # Rules
//!
//! - [`CommandSlot::issue`] fails with [`Error::CommandInProgress`] while a
//!   live command occupies the slot. A command whose waiter was dropped is
//!   superseded instead.
//! - [`CommandSlot::resolve`] and [`CommandSlot::reject`] are no-ops on an
//!   empty slot, since socket close and error notifications may arrive after
//!   a command already completed.
//! - Exactly one outcome is delivered per occupancy and the slot clears
//!   itself on delivery.
//! - The `_ticket` variants only act on the occupancy they were issued for,
//!   so a late timer cannot complete a newer command.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Ticket
// ============================================================================

/// Occupancy number of a slot entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// PendingCommand
// ============================================================================

/// The caller's side of an issued command.
#[derive(Debug)]
pub struct PendingCommand<T> {
    ticket: Ticket,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> PendingCommand<T> {
    /// Returns the ticket of this command.
    #[inline]
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Waits for the command to be resolved or rejected.
    ///
    /// # Errors
    ///
    /// Returns the rejection error, or [`Error::ChannelClosed`] if the slot
    /// was dropped with this command still in it.
    pub async fn wait(self) -> Result<T> {
        self.rx.await?
    }
}

// ============================================================================
// CommandSlot
// ============================================================================

struct Occupant<T> {
    ticket: Ticket,
    tx: oneshot::Sender<Result<T>>,
}

struct SlotState<T> {
    occupant: Option<Occupant<T>>,
    issued: u64,
}

/// Holder of the one in-flight command of a connection.
pub struct CommandSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for CommandSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CommandSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CommandSlot")
            .field("pending", &state.occupant.as_ref().map(|o| o.ticket))
            .field("issued", &state.issued)
            .finish()
    }
}

impl<T> CommandSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                occupant: None,
                issued: 0,
            }),
        }
    }

    /// Installs a new command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandInProgress`] if a command is already pending.
    pub fn issue(&self) -> Result<PendingCommand<T>> {
        let mut state = self.state.lock();

        if let Some(occupant) = &state.occupant {
            if !occupant.tx.is_closed() {
                return Err(Error::CommandInProgress);
            }
            debug!(ticket = %occupant.ticket, "Superseding abandoned command");
        }

        state.issued += 1;
        let ticket = Ticket(state.issued);
        let (tx, rx) = oneshot::channel();
        state.occupant = Some(Occupant { ticket, tx });

        trace!(%ticket, "Command issued");
        Ok(PendingCommand { ticket, rx })
    }

    /// Resolves the pending command, if any.
    ///
    /// Returns `false` if the slot was empty.
    pub fn resolve(&self, value: T) -> bool {
        self.complete(None, Ok(value))
    }

    /// Rejects the pending command, if any.
    ///
    /// Returns `false` if the slot was empty.
    pub fn reject(&self, error: Error) -> bool {
        self.complete(None, Err(error))
    }

    /// Resolves the pending command only if it holds `ticket`.
    pub fn resolve_ticket(&self, ticket: Ticket, value: T) -> bool {
        self.complete(Some(ticket), Ok(value))
    }

    /// Rejects the pending command only if it holds `ticket`.
    pub fn reject_ticket(&self, ticket: Ticket, error: Error) -> bool {
        self.complete(Some(ticket), Err(error))
    }

    /// Returns `true` if a command occupies the slot.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.lock().occupant.is_some()
    }

    fn complete(&self, ticket: Option<Ticket>, outcome: Result<T>) -> bool {
        let occupant = {
            let mut state = self.state.lock();
            match (&state.occupant, ticket) {
                (Some(current), Some(expected)) if current.ticket != expected => None,
                _ => state.occupant.take(),
            }
        };

        match occupant {
            Some(occupant) => {
                trace!(ticket = %occupant.ticket, ok = outcome.is_ok(), "Command completed");
                // The waiter may have gone away; the slot is cleared either way.
                let _ = occupant.tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use tokio::sync::oneshot::error::TryRecvError;

    #[test]
    fn test_resolve_delivers_value() {
        let slot = CommandSlot::new();
        let mut pending = slot.issue().expect("issue");

        assert!(slot.is_pending());
        assert!(slot.resolve(7));
        assert!(!slot.is_pending());
        assert_eq!(pending.rx.try_recv().expect("delivered").expect("ok"), 7);
    }

    #[test]
    fn test_second_issue_fails_fast() {
        let slot = CommandSlot::new();
        let mut first = slot.issue().expect("issue");

        let second = slot.issue();
        assert!(matches!(second, Err(Error::CommandInProgress)));

        // The first command is unaffected
        assert!(slot.resolve("done"));
        assert_eq!(first.rx.try_recv().expect("delivered").expect("ok"), "done");
    }

    #[test]
    fn test_empty_slot_is_noop() {
        let slot: CommandSlot<u8> = CommandSlot::new();
        assert!(!slot.resolve(1));
        assert!(!slot.reject(Error::ConnectionClosed));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_late_close_after_resolve_is_noop() {
        let slot = CommandSlot::new();
        let mut pending = slot.issue().expect("issue");

        assert!(slot.resolve(1u8));
        assert!(!slot.reject(Error::ConnectionClosed));
        assert_eq!(pending.rx.try_recv().expect("delivered").expect("ok"), 1);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let slot = CommandSlot::new();
        let first = slot.issue().expect("issue");
        let stale = first.ticket();
        assert!(slot.reject(Error::ConnectionClosed));

        let mut second = slot.issue().expect("issue");
        assert_ne!(second.ticket(), stale);
        assert!(!slot.resolve_ticket(stale, 1u8));
        assert!(slot.is_pending());
        assert!(matches!(second.rx.try_recv(), Err(TryRecvError::Empty)));

        assert!(slot.resolve_ticket(second.ticket(), 2));
        assert_eq!(second.rx.try_recv().expect("delivered").expect("ok"), 2);
    }

    #[test]
    fn test_abandoned_command_is_superseded() {
        let slot: CommandSlot<u8> = CommandSlot::new();
        let abandoned = slot.issue().expect("issue");
        drop(abandoned);

        let pending = slot.issue().expect("abandoned command should be superseded");
        assert!(slot.is_pending());
        assert!(slot.resolve_ticket(pending.ticket(), 3));
    }

    #[tokio::test]
    async fn test_wait_returns_rejection() {
        let slot: CommandSlot<()> = CommandSlot::new();
        let pending = slot.issue().expect("issue");
        slot.reject(Error::AuthorizationRequired);

        let result = pending.wait().await;
        assert!(matches!(result, Err(Error::AuthorizationRequired)));
    }

    #[tokio::test]
    async fn test_wait_after_slot_dropped() {
        let slot: CommandSlot<()> = CommandSlot::new();
        let pending = slot.issue().expect("issue");
        drop(slot);

        assert!(matches!(pending.wait().await, Err(Error::ChannelClosed(_))));
    }

    proptest! {
        #[test]
        fn prop_sequential_commands_complete_exactly_once(outcomes in proptest::collection::vec(any::<bool>(), 1..64)) {
            let slot = CommandSlot::new();

            for (index, resolve) in outcomes.into_iter().enumerate() {
                let mut pending = slot.issue().expect("slot must be free");

                let completed = if resolve {
                    slot.resolve(index)
                } else {
                    slot.reject(Error::ConnectionClosed)
                };
                prop_assert!(completed);

                // Any further completion is a no-op
                prop_assert!(!slot.resolve(usize::MAX));
                prop_assert!(!slot.reject(Error::ConnectionClosed));
                prop_assert!(!slot.is_pending());

                match pending.rx.try_recv() {
                    Ok(Ok(value)) => prop_assert!(resolve && value == index),
                    Ok(Err(_)) => prop_assert!(!resolve),
                    Err(_) => prop_assert!(false, "outcome not delivered"),
                }
            }
        }
    }
}
