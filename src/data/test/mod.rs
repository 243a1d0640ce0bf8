mod giveaway;
mod guild_config;
mod role_menu;
mod role_menu_selection;
mod temp_voice;
mod ticket;
