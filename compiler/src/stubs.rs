use syn::{parse_quote, Item};
use tracing::info;
use wiregen_schema::Command;

use crate::naming::{handler_name, module_ident, plain_ident};

/// First lines of a handler module created from scratch.
pub const HANDLERS_PREAMBLE: &str = "use super::commands;\n";

/// The text a handler definition for `method` must contain.
pub fn handler_signature(method: &str) -> String {
    format!("fn {}(", handler_name(method))
}

/// A placeholder handler that aborts with "not yet implemented" when called.
pub fn render_stub(method: &str) -> String {
    let handler = plain_ident(&handler_name(method));
    let module = module_ident(method);
    let item: Item = parse_quote! {
        pub fn #handler(_params: commands::#module::Params) -> commands::#module::Result {
            todo!(#method)
        }
    };
    prettyplease::unparse(&syn::File {
        shebang: None,
        attrs:   Vec::new(),
        items:   vec![item],
    })
}

/// One stub to splice into the handler text at byte `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    pub method: String,
    pub text:   String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSync {
    pub text:     String,
    /// Methods that received a stub, in declaration order.
    pub inserted: Vec<String>,
}

impl StubSync {
    pub fn is_changed(&self) -> bool {
        !self.inserted.is_empty()
    }
}

/// `"\r\n"` when the text already uses CRLF line endings, `"\n"` otherwise.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte offset where the definition of the handler begins, including doc
/// comments and attributes directly above its signature line.
fn find_definition(text: &str, signature: &str) -> Option<usize> {
    let position = text.find(signature)?;
    let mut start = line_start(text, position);
    while start > 0 {
        let previous = line_start(text, start - 1);
        let line = text[previous..start].trim();
        if line.starts_with("//") || line.starts_with("#[") {
            start = previous;
        } else {
            break;
        }
    }
    Some(start)
}

/// Computes the insertions for every command without a handler in `text`.
///
/// Commands are visited in reverse declaration order. A stub goes right
/// before the definition of the next declared command that already has a
/// handler, or at the end of the text when there is none. The plan is sorted
/// by descending offset (stable, so stubs sharing an anchor keep their
/// relative order) and can be applied front to back.
pub fn plan_insertions(commands: &[Command], text: &str) -> Vec<Insertion> {
    let anchors: Vec<Option<usize>> = commands
        .iter()
        .map(|command| find_definition(text, &handler_signature(&command.method)))
        .collect();

    let newline = line_ending(text);
    let mut plan = Vec::new();
    for (index, command) in commands.iter().enumerate().rev() {
        if anchors[index].is_some() {
            continue;
        }
        let stub = render_stub(&command.method).replace('\n', newline);
        let insertion = match anchors[index + 1..].iter().flatten().next() {
            Some(&offset) => Insertion {
                offset,
                method: command.method.clone(),
                text:   format!("{}{}", stub, newline),
            },
            None => Insertion {
                offset: text.len(),
                method: command.method.clone(),
                text:   format!("{}{}", newline, stub),
            },
        };
        plan.push(insertion);
    }
    plan.sort_by(|a, b| b.offset.cmp(&a.offset));
    plan
}

pub fn apply_insertions(text: &str, plan: &[Insertion]) -> String {
    let mut output = text.to_string();
    for insertion in plan {
        output.insert_str(insertion.offset, &insertion.text);
    }
    output
}

/// Adds a stub for every command whose handler is missing from `text`.
/// Existing handlers are never modified, and a text that already defines every
/// handler comes back unchanged.
pub fn sync_stubs(commands: &[Command], text: &str) -> StubSync {
    let missing: Vec<String> = commands
        .iter()
        .filter(|command| !text.contains(&handler_signature(&command.method)))
        .map(|command| command.method.clone())
        .collect();
    if missing.is_empty() {
        return StubSync {
            text:     text.to_string(),
            inserted: missing,
        };
    }

    let mut base = text.to_string();
    if !base.is_empty() && !base.ends_with('\n') {
        base.push_str(line_ending(text));
    }
    let plan = plan_insertions(commands, &base);
    for insertion in &plan {
        info!(method = %insertion.method, offset = insertion.offset, "inserting handler stub");
    }
    StubSync {
        text:     apply_insertions(&base, &plan),
        inserted: missing,
    }
}
