//! Commands accepted by the hub and the domain servers.

use uuid::Uuid;

/// A request that changes hub or domain state.
///
/// The route layer logs every command under its `command_type` and
/// `correlation_id` before handing it to an application handler.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name, prefixed by the server that handles it (`hub.login_user`).
    fn command_type(&self) -> &'static str;

    /// Identifier tying the command's log lines together.
    fn correlation_id(&self) -> Uuid;
}
