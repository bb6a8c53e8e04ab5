use syn::{Item, ItemMod};
use wiregen_compiler::{
    compile_protocol, generate, generate_declarations, generate_marshaling, sync_stubs,
    GenerateOptions, ProtocolError, SchemaFormat, HANDLERS_PREAMBLE,
};

const SCHEMA: &str = r#"
types:
  item:
    id: int
    name: string
  shelf:
    label: { type: string, default: "misc", description: "Shown above the shelf." }
    items: item[]
    top: item

commands:
  show_message:
    description: Opens a dialog.
    params:
      type: [info, alert]
      title: string
      content: string
  quit:
  load_quest:
    params:
      show_progress: { type: bool, default: true }
    result:
      error_code: int
      success: bool
  get_items:
    result:
      items: item[]
  set_tiles:
    params:
      tiles: int[]
      shelves: shelf[]

events:
  quest_loaded:
    params:
      path: string
  quest_saved:
"#;

fn options() -> GenerateOptions {
    GenerateOptions::new("protocol.yml")
}

fn find_module<'a>(items: &'a [Item], name: &str) -> &'a ItemMod {
    items
        .iter()
        .find_map(|item| match item {
            Item::Mod(module) if module.ident == name => Some(module),
            _ => None,
        })
        .unwrap_or_else(|| panic!("module {} not generated", name))
}

fn variant_names(module: &ItemMod) -> Vec<String> {
    let items = &module.content.as_ref().expect("inline module").1;
    items
        .iter()
        .find_map(|item| match item {
            Item::Enum(e) if e.ident == "Type" => Some(e.variants.iter().map(|v| v.ident.to_string()).collect()),
            _ => None,
        })
        .expect("ordinal enum")
}

#[test]
fn test_generation_is_deterministic() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let first = generate(&config, &options()).unwrap();
    let again = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let second = generate(&again, &options()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_artifacts_are_valid_rust_with_banner() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let artifacts = generate(&config, &options()).unwrap();
    for text in [&artifacts.declarations, &artifacts.marshaling] {
        assert!(text.starts_with("// This file is generated by wiregen from protocol.yml. Do not edit."));
        syn::parse_file(text).expect("generated code parses");
    }
}

#[test]
fn test_ordinals_follow_declaration_order() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let file = syn::parse_file(&generate_declarations(&config, &options()).unwrap()).unwrap();

    let commands = find_module(&file.items, "commands");
    assert_eq!(
        variant_names(commands),
        ["None", "ShowMessage", "Quit", "LoadQuest", "GetItems", "SetTiles"]
    );
    let events = find_module(&file.items, "events");
    assert_eq!(variant_names(events), ["None", "QuestLoaded", "QuestSaved"]);
}

#[test]
fn test_declarations_shape() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let text = generate_declarations(&config, &options()).unwrap();
    assert!(text.contains("pub struct Item {"));
    assert!(text.contains("pub items: Vec<Item>,"));
    assert!(text.contains("pub r#type: String,"));
    assert!(text.contains("pub items: Vec<super::super::types::Item>,"));
    assert!(text.contains("pub type Handle = fn(Params) -> Result;"));
    assert!(text.contains("pub type Emit = fn(Params);"));
    assert!(text.contains("/// Shown above the shelf."));
    assert!(text.contains("/// Opens a dialog."));
}

#[test]
fn test_custom_writer_writes_every_field() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let text = generate_marshaling(&config, &options()).unwrap();
    assert!(text.contains("impl WriteJson for super::types::Item"));
    assert!(text.contains("object.insert(\"id\".to_string(), Value::from(self.id));"));
    assert!(text.contains("object.insert(\"name\".to_string(), Value::from(self.name.as_str()));"));
    assert!(text.contains("object.insert(\"items\".to_string(), self.items.write_json());"));
    assert!(text.contains("object.insert(\"top\".to_string(), self.top.write_json());"));
}

#[test]
fn test_dispatch_reads_defaults_enums_and_arrays() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let text = generate_marshaling(&config, &options()).unwrap();
    assert!(text.contains("read_bool(params_json, \"show_progress\", Some(true))?"));
    assert!(text.contains("check_enumerated(value, &[\"info\", \"alert\"])"));
    assert!(text.contains("read_array(params_json, \"tiles\")?"));
    assert!(text.contains("read_string(value, \"label\", Some(\"misc\".to_string()))?"));
    assert!(text.contains("super::handlers::handle_show_message"));
    assert!(text.contains("super::broadcast_event("));
    assert!(text.contains("super::events::Type::QuestLoaded"));
    assert!(text.contains("super::commands::Type::None => Err(\"unknown command\".to_string())"));
}

#[test]
fn test_custom_paths_are_used() {
    let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();
    let options = options()
        .with_declarations_path("crate::protocol")
        .with_handlers_path("crate::handlers")
        .with_broadcast_path("crate::server::broadcast");
    let text = generate_marshaling(&config, &options).unwrap();
    assert!(text.contains("crate::handlers::handle_quit"));
    assert!(text.contains("crate::server::broadcast("));
    assert!(text.contains("crate::protocol::events::Type::QuestSaved"));
    assert!(!text.contains("super::"));
}

#[test]
fn test_json_schema_matches_yaml() {
    let json = r#"{
        "types": { "item": { "id": "int", "name": "string" } },
        "commands": { "get_items": { "result": { "items": "item[]" } } },
        "events": {}
    }"#;
    let yaml = "types:\n  item:\n    id: int\n    name: string\ncommands:\n  get_items:\n    result:\n      items: item[]\nevents: {}\n";
    assert_eq!(
        compile_protocol(json, SchemaFormat::Json).unwrap(),
        compile_protocol(yaml, SchemaFormat::Yaml).unwrap()
    );
}

#[test]
fn test_schema_errors_abort_compilation() {
    let err = compile_protocol("commands:\n  open:\n    params:\n      target: widget\n", SchemaFormat::Yaml)
        .unwrap_err();
    assert!(
        err.to_string().contains("commands.open.params.target"),
        "error should name the field: {}",
        err
    );

    let err = compile_protocol("commands:\n  get-items:\n", SchemaFormat::Yaml).unwrap_err();
    assert!(matches!(err, ProtocolError::VerifierError(_)), "{:?}", err);
}

#[test]
fn test_stub_sync_places_missing_handlers_around_existing_one() {
    let config = compile_protocol("commands:\n  a:\n  b:\n  c:\n", SchemaFormat::Yaml).unwrap();
    let handlers = format!(
        "{}\npub fn handle_b(_params: commands::b::Params) -> commands::b::Result {{\n    commands::b::Result {{}}\n}}\n",
        HANDLERS_PREAMBLE
    );

    let first = sync_stubs(&config.commands, &handlers);
    assert_eq!(first.inserted, ["a", "c"]);
    let a = first.text.find("fn handle_a(").unwrap();
    let b = first.text.find("fn handle_b(").unwrap();
    let c = first.text.find("fn handle_c(").unwrap();
    assert!(a < b && b < c);
    assert!(first.text.contains("    commands::b::Result {}\n"), "existing body kept");
    assert!(first.text.ends_with("todo!(\"c\")\n}\n"));

    let second = sync_stubs(&config.commands, &first.text);
    assert!(!second.is_changed());
    assert_eq!(second.text, first.text);
}
