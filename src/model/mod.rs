//! Domain types shared between the data layer and the lifecycle services.
//!
//! Entity state machines are persisted as strings; the enums here are the
//! typed views the services work with. JSON columns (bindings, participant
//! sets, menu options) get tolerant decode helpers so a malformed row logs
//! and degrades instead of panicking.

use serde::{Deserialize, Serialize};

/// Support ticket states. `Closed` and `Orphaned` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketState {
    /// Record inserted, Discord channel not yet confirmed.
    Pending,
    Open,
    Closed,
    Orphaned,
}

impl TicketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Pending => "pending",
            TicketState::Open => "open",
            TicketState::Closed => "closed",
            TicketState::Orphaned => "orphaned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TicketState::Pending),
            "open" => Some(TicketState::Open),
            "closed" => Some(TicketState::Closed),
            "orphaned" => Some(TicketState::Orphaned),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketState::Closed | TicketState::Orphaned)
    }
}

/// Role menu entity states. Per-user selection state lives in the
/// `role_menu_selection` table, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleMenuState {
    Pending,
    Active,
    Orphaned,
}

impl RoleMenuState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleMenuState::Pending => "pending",
            RoleMenuState::Active => "active",
            RoleMenuState::Orphaned => "orphaned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RoleMenuState::Pending),
            "active" => Some(RoleMenuState::Active),
            "orphaned" => Some(RoleMenuState::Orphaned),
            _ => None,
        }
    }
}

/// Temp voice channel states. `Deleted` and `Orphaned` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempVoiceState {
    Active,
    /// Channel is empty; the grace timer is armed. A join before the
    /// deadline returns the channel to `Active`.
    PendingDelete,
    Deleted,
    Orphaned,
}

impl TempVoiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempVoiceState::Active => "active",
            TempVoiceState::PendingDelete => "pending_delete",
            TempVoiceState::Deleted => "deleted",
            TempVoiceState::Orphaned => "orphaned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TempVoiceState::Active),
            "pending_delete" => Some(TempVoiceState::PendingDelete),
            "deleted" => Some(TempVoiceState::Deleted),
            "orphaned" => Some(TempVoiceState::Orphaned),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TempVoiceState::Deleted | TempVoiceState::Orphaned)
    }
}

/// Giveaway states. The `Active -> Drawn` transition is one-way and
/// version-guarded; rerolls stay in `Drawn`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GiveawayState {
    Pending,
    Active,
    Drawn,
    Orphaned,
}

impl GiveawayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiveawayState::Pending => "pending",
            GiveawayState::Active => "active",
            GiveawayState::Drawn => "drawn",
            GiveawayState::Orphaned => "orphaned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(GiveawayState::Pending),
            "active" => Some(GiveawayState::Active),
            "drawn" => Some(GiveawayState::Drawn),
            "orphaned" => Some(GiveawayState::Orphaned),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GiveawayState::Drawn | GiveawayState::Orphaned)
    }
}

/// One selectable option in a role menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub role_id: String,
    pub label: String,
    pub emoji: Option<String>,
}

/// Decodes a JSON array of strings (bindings, participants, winners, role
/// ids). A malformed column decodes as empty rather than failing the
/// transition.
pub fn decode_ids(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn encode_ids(ids: &[String]) -> serde_json::Value {
    serde_json::json!(ids)
}

/// Decodes the `options` column of a role menu.
pub fn decode_options(value: &serde_json::Value) -> Vec<MenuOption> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn encode_options(options: &[MenuOption]) -> serde_json::Value {
    serde_json::json!(options)
}
