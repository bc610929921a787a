use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::domain::UserId;

pub const REPLY_ENABLED: &str = "Bot service started!";
pub const REPLY_DISABLED: &str = "Bot service stopped!";
pub const REPLY_PERMISSION_DENIED: &str = "You have no permission to perform this operation!";

/// Process-wide relay switch. Starts enabled and is never persisted.
#[derive(Debug)]
pub struct RelayState {
    enabled: AtomicBool,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RelayState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    Enable,
    Disable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminReply {
    Enabled,
    Disabled,
    PermissionDenied,
}

impl AdminReply {
    pub fn text(&self) -> &'static str {
        match self {
            AdminReply::Enabled => REPLY_ENABLED,
            AdminReply::Disabled => REPLY_DISABLED,
            AdminReply::PermissionDenied => REPLY_PERMISSION_DENIED,
        }
    }
}

/// Identity check shared by the admin controller and the audit skip rule.
///
/// With no admin configured nobody is the admin, but everybody may use the
/// admin commands (see [`AdminController::is_permitted`]).
pub fn is_admin(admin_id: Option<&str>, user_id: UserId) -> bool {
    admin_id.is_some_and(|admin| admin == user_id.to_string())
}

#[derive(Clone, Debug)]
pub struct AdminController {
    admin_id: Option<String>,
    state: Arc<RelayState>,
}

impl AdminController {
    pub fn new(admin_id: Option<String>, state: Arc<RelayState>) -> Self {
        Self { admin_id, state }
    }

    pub fn state(&self) -> &Arc<RelayState> {
        &self.state
    }

    pub fn is_permitted(&self, sender: UserId) -> bool {
        match self.admin_id.as_deref() {
            None => true,
            Some(_) => is_admin(self.admin_id.as_deref(), sender),
        }
    }

    pub fn handle(&self, sender: UserId, cmd: AdminCommand) -> AdminReply {
        if !self.is_permitted(sender) {
            tracing::warn!(user_id = sender.0, ?cmd, "admin command refused");
            return AdminReply::PermissionDenied;
        }

        match cmd {
            AdminCommand::Enable => {
                let changed = !self.state.set_enabled(true);
                tracing::info!(user_id = sender.0, changed, "relay enabled");
                AdminReply::Enabled
            }
            AdminCommand::Disable => {
                let changed = self.state.set_enabled(false);
                tracing::info!(user_id = sender.0, changed, "relay disabled");
                AdminReply::Disabled
            }
        }
    }
}
