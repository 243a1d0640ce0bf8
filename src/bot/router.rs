//! Component custom-id encoding.
//!
//! The custom-id is the only wire contract between a posted message component
//! and this process: `<kind>:<action>` for entity-creating buttons and
//! `<kind>:<action>:<entity-id>` for entity-bound ones. The encoding is
//! stable across restarts; persisted `bindings` store these same strings and
//! the reconciliation pass decodes them back into targets.

/// A decoded component identifier: which entity kind, which entity, which
/// action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentTarget {
    /// Panel button that opens a new ticket for the clicking user.
    TicketCreate,
    TicketClose { ticket_id: i32 },
    RoleMenuSelect { menu_id: i32 },
    GiveawayEnter { giveaway_id: i32 },
}

pub fn ticket_create_id() -> String {
    "ticket:create".to_string()
}

pub fn ticket_close_id(ticket_id: i32) -> String {
    format!("ticket:close:{ticket_id}")
}

pub fn role_menu_select_id(menu_id: i32) -> String {
    format!("rolemenu:select:{menu_id}")
}

pub fn giveaway_enter_id(giveaway_id: i32) -> String {
    format!("giveaway:enter:{giveaway_id}")
}

/// Decodes a component custom-id. Returns `None` for malformed or unknown
/// identifiers; the caller logs and acknowledges those instead of failing,
/// so the platform does not redeliver them.
pub fn decode(custom_id: &str) -> Option<ComponentTarget> {
    let mut parts = custom_id.splitn(3, ':');
    let kind = parts.next()?;
    let action = parts.next()?;
    let id = parts.next();

    match (kind, action, id) {
        ("ticket", "create", None) => Some(ComponentTarget::TicketCreate),
        ("ticket", "close", Some(id)) => id
            .parse()
            .ok()
            .map(|ticket_id| ComponentTarget::TicketClose { ticket_id }),
        ("rolemenu", "select", Some(id)) => id
            .parse()
            .ok()
            .map(|menu_id| ComponentTarget::RoleMenuSelect { menu_id }),
        ("giveaway", "enter", Some(id)) => id
            .parse()
            .ok()
            .map(|giveaway_id| ComponentTarget::GiveawayEnter { giveaway_id }),
        _ => None,
    }
}
