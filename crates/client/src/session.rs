//! Sessions

use uuid::Uuid;

/// The subject a cart belongs to: a guest browser session or an
/// authenticated customer account, never both at once.
///
/// Credential handling lives outside this crate; an authenticated session
/// only carries the customer identity the auth layer resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Guest,
    Authenticated {
        /// The signed-in customer account.
        customer: Uuid,
    },
}

impl Session {
    /// Whether this session is backed by a customer account.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
