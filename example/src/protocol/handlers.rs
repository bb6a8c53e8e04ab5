use super::commands;
use super::events;
use super::marshal;
use super::types;

pub fn handle_show_message(params: commands::show_message::Params) -> commands::show_message::Result {
    marshal::emit_dialog_opened(events::dialog_opened::Params { title: params.title });
    commands::show_message::Result {}
}

pub fn handle_quit(_params: commands::quit::Params) -> commands::quit::Result {
    commands::quit::Result {}
}

/// Paths without a `.qst` extension are rejected with error code 2.
pub fn handle_load_quest(params: commands::load_quest::Params) -> commands::load_quest::Result {
    if !params.path.ends_with(".qst") {
        return commands::load_quest::Result {
            error_code: 2,
            success:    false,
        };
    }
    marshal::emit_quest_loaded(events::quest_loaded::Params { path: params.path });
    commands::load_quest::Result {
        error_code: 0,
        success:    true,
    }
}

fn inventory() -> Vec<types::Item> {
    vec![
        types::Item { id: 1, name: "Wooden Sword".to_string(), tile: 12 },
        types::Item { id: 2, name: "Blue Candle".to_string(), tile: 40 },
    ]
}

pub fn handle_get_items(_params: commands::get_items::Params) -> commands::get_items::Result {
    commands::get_items::Result { items: inventory() }
}

pub fn handle_get_item_names(_params: commands::get_item_names::Params) -> commands::get_item_names::Result {
    commands::get_item_names::Result {
        names: inventory().into_iter().map(|item| item.name).collect(),
    }
}

pub fn handle_set_options(params: commands::set_options::Params) -> commands::set_options::Result {
    commands::set_options::Result {
        difficulty: params.difficulty,
        volume:     params.volume,
        muted:      params.muted,
        ids:        params.ids,
    }
}

pub fn handle_open_window(params: commands::open_window::Params) -> commands::open_window::Result {
    commands::open_window::Result { settings: params.settings }
}

pub fn handle_click_screen(_params: commands::click_screen::Params) -> commands::click_screen::Result {
    todo!("click_screen")
}
