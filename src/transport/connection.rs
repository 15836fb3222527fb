//! WebSocket connection and event loop.
//!
//! This module owns the socket to the TV, pairs inbound frames with the one
//! outstanding command, and turns socket failures into command rejections.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames from the TV (handshake, responses, notifications)
//! - Outgoing commands from the Rust API
//! - Synthetic acknowledgments for fire-and-forget commands
//! - Rejection of the pending command when the socket closes or fails

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{from_str, to_string};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Command, ConnectAck, EventNames, InboundEvent, InboundMessage};

use super::endpoint::SocketStream;
use super::slot::{CommandSlot, PendingCommand, Ticket};

// ============================================================================
// Constants
// ============================================================================

/// Delay after which a fire-and-forget command counts as acknowledged.
///
/// Key presses have no acknowledgment frame in the protocol.
pub const KEY_PRESS_GRACE: Duration = Duration::from_millis(500);

// ============================================================================
// Types
// ============================================================================

/// Outcome of a command: the matching event, or `None` for a synthetic
/// acknowledgment.
pub type Reply = Option<InboundEvent>;

/// Callback persisting a token received in the handshake acknowledgment.
///
/// Awaited before the handshake command is resolved.
pub type TokenHandler = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

type SocketSink = SplitSink<SocketStream, Message>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a frame for the command holding `ticket`.
    Send {
        frame: String,
        ticket: Ticket,
        expects_reply: bool,
    },
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a TV.
///
/// Cloning is cheap; all clones drive the same socket and share its
/// command slot.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// The one outstanding command (shared with the event loop).
    slot: Arc<CommandSlot<Reply>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .field("slot", &self.slot)
            .finish()
    }
}

impl Connection {
    /// Takes over an open socket and arms the handshake command.
    ///
    /// The handshake is armed before the event loop starts, so the first
    /// frame from the TV always finds it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandInProgress`] only if the fresh slot is
    /// occupied, which cannot happen.
    pub(crate) fn establish(
        stream: SocketStream,
        events: EventNames,
        on_token: Option<TokenHandler>,
    ) -> Result<(Self, PendingCommand<Reply>)> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let slot = Arc::new(CommandSlot::new());
        let handshake = slot.issue()?;

        tokio::spawn(Self::run_event_loop(
            stream,
            command_rx,
            Arc::clone(&slot),
            events,
            on_token,
        ));

        Ok((Self { command_tx, slot }, handshake))
    }

    /// Waits for the handshake to complete.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthorizationRequired`] if the TV refused access
    /// - [`Error::ConnectionClosed`] if the socket closed first
    /// - [`Error::Protocol`] if another event completed the handshake
    pub async fn wait_connected(handshake: PendingCommand<Reply>) -> Result<ConnectAck> {
        match handshake.wait().await? {
            Some(InboundEvent::Connected(ack)) => {
                debug!(client_id = ?ack.client_id, "Handshake completed");
                Ok(ack)
            }
            Some(other) => Err(Error::protocol(format!(
                "Unexpected {} event during handshake",
                other.kind()
            ))),
            None => Err(Error::protocol("Handshake completed without acknowledgment")),
        }
    }

    /// Sends a command and waits for its outcome.
    ///
    /// With `expects_reply == false` the command resolves to `None`
    /// [`KEY_PRESS_GRACE`] after the frame was written.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandInProgress`] if another command is pending
    /// - [`Error::ConnectionClosed`] if the socket is closed
    /// - [`Error::Connection`] if the frame cannot be written
    /// - any rejection delivered by the TV
    pub async fn send(&self, command: &Command, expects_reply: bool) -> Result<Reply> {
        let frame = to_string(command)?;
        let pending = self.slot.issue()?;
        let ticket = pending.ticket();

        trace!(%ticket, method = command.method(), expects_reply, "Command queued");

        if self
            .command_tx
            .send(ConnectionCommand::Send {
                frame,
                ticket,
                expects_reply,
            })
            .is_err()
        {
            self.slot.reject_ticket(ticket, Error::ConnectionClosed);
        }

        pending.wait().await
    }

    /// Returns `true` once the event loop has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Returns `true` while a command is outstanding.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.slot.is_pending()
    }

    /// Closes the socket.
    ///
    /// A pending command is rejected with [`Error::ConnectionClosed`].
    /// Calling this on a closed connection does nothing.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        stream: SocketStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        slot: Arc<CommandSlot<Reply>>,
        events: EventNames,
        on_token: Option<TokenHandler>,
    ) {
        let (mut ws_write, mut ws_read) = stream.split();

        let failure = loop {
            tokio::select! {
                // Incoming frames from the TV
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &slot, &events, on_token.as_ref())
                                .await;
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "Socket closed by TV");
                            break Error::ConnectionClosed;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "Socket error");
                            break Error::WebSocket(e);
                        }

                        None => {
                            debug!("Socket stream ended");
                            break Error::ConnectionClosed;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { frame, ticket, expects_reply }) => {
                            Self::handle_send_command(
                                frame,
                                ticket,
                                expects_reply,
                                &mut ws_write,
                                &slot,
                            )
                            .await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break Error::ConnectionClosed;
                        }

                        None => {
                            debug!("All connection handles dropped");
                            let _ = ws_write.close().await;
                            break Error::ConnectionClosed;
                        }
                    }
                }
            }
        };

        // Refuse further sends, then fail whatever was already queued
        command_rx.close();
        while let Ok(command) = command_rx.try_recv() {
            if let ConnectionCommand::Send { ticket, .. } = command {
                slot.reject_ticket(ticket, Error::ConnectionClosed);
            }
        }

        Self::fail_pending(&slot, failure);

        debug!("Event loop terminated");
    }

    /// Handles an incoming text frame from the TV.
    async fn handle_incoming_message(
        text: &str,
        slot: &CommandSlot<Reply>,
        events: &EventNames,
        on_token: Option<&TokenHandler>,
    ) {
        let message = match from_str::<InboundMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, text = %text, "Failed to parse incoming message");
                return;
            }
        };

        trace!(event = %message.event, "Frame received");
        Self::dispatch(message.into_event(events), slot, on_token).await;
    }

    /// Routes a parsed event to the command slot.
    async fn dispatch(event: InboundEvent, slot: &CommandSlot<Reply>, on_token: Option<&TokenHandler>) {
        match event {
            InboundEvent::Unauthorized => {
                if !slot.reject(Error::AuthorizationRequired) {
                    warn!("Unauthorized event with no command pending");
                }
            }

            InboundEvent::Connected(ack) => {
                if let (Some(token), Some(handler)) = (&ack.token, on_token) {
                    debug!("Token received in handshake acknowledgment");
                    handler(token.clone()).await;
                }
                slot.resolve(Some(InboundEvent::Connected(ack)));
            }

            event @ (InboundEvent::InstalledApps(_) | InboundEvent::LaunchResult(_)) => {
                let kind = event.kind().to_string();
                if !slot.resolve(Some(event)) {
                    debug!(kind, "Response with no command pending");
                }
            }

            InboundEvent::Malformed { event, reason } => {
                warn!(event = %event, reason = %reason, "Malformed event");
                slot.reject(Error::protocol(format!("Malformed {event} event: {reason}")));
            }

            InboundEvent::Unknown { event, .. } => {
                debug!(event = %event, "Unhandled event");
            }
        }
    }

    /// Writes a frame for the command holding `ticket`.
    async fn handle_send_command(
        frame: String,
        ticket: Ticket,
        expects_reply: bool,
        ws_write: &mut SocketSink,
        slot: &Arc<CommandSlot<Reply>>,
    ) {
        if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
            slot.reject_ticket(ticket, Error::connection(format!("Failed to send frame: {e}")));
            return;
        }

        trace!(%ticket, "Frame sent");

        if !expects_reply {
            let slot = Arc::clone(slot);
            tokio::spawn(async move {
                sleep(KEY_PRESS_GRACE).await;
                slot.resolve_ticket(ticket, None);
            });
        }
    }

    /// Rejects the pending command with the reason the loop ended.
    fn fail_pending(slot: &CommandSlot<Reply>, failure: Error) {
        let transport_error = matches!(failure, Error::WebSocket(_));
        let description = failure.to_string();

        if slot.reject(failure) {
            debug!(reason = %description, "Failed pending command on shutdown");
        } else if transport_error {
            warn!(error = %description, "Socket error with no command pending");
        } else {
            debug!(reason = %description, "Socket closed with no command pending");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
