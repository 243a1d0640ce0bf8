pub use super::giveaway::Entity as Giveaway;
pub use super::guild_config::Entity as GuildConfig;
pub use super::role_menu::Entity as RoleMenu;
pub use super::role_menu_selection::Entity as RoleMenuSelection;
pub use super::temp_voice::Entity as TempVoice;
pub use super::ticket::Entity as Ticket;
