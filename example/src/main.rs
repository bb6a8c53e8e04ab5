use serde_json::json;

use example_app::protocol::{marshal, take_emitted};

fn main() {
    let requests = [
        ("load_quest", json!({ "path": "quests/classic.qst" })),
        ("get_items", json!({})),
        ("set_options", json!({ "difficulty": "hard", "ids": [3, 5] })),
        ("set_options", json!({ "difficulty": "impossible", "ids": [] })),
        ("open_window", json!({ "settings": { "title": "Editor" } })),
        ("teleport", json!({})),
    ];

    for (command, params) in &requests {
        let kind = marshal::parse_command(command);
        let result = marshal::handle_command(kind, params);
        println!("{} ({:?}) -> {}", command, kind, result);
    }

    for (kind, params) in take_emitted() {
        println!("event {} {}", marshal::event_to_string(kind), params);
    }
}
