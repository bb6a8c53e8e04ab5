use proc_macro2::TokenStream;
use quote::quote;
use syn::Item;

/// An ordered list of items rendered as one Rust source file.
#[derive(Default)]
pub struct RustFile {
    items: Vec<Item>,
}

impl RustFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn extend<I: IntoIterator<Item = Item>>(&mut self, items: I) {
        self.items.extend(items);
    }

    pub fn render(self, schema_name: &str) -> String {
        let file = syn::File {
            shebang: None,
            attrs:   Vec::new(),
            items:   self.items,
        };
        format!("{}{}", banner(schema_name), prettyplease::unparse(&file))
    }
}

pub fn banner(schema_name: &str) -> String {
    format!(
        "// This file is generated by wiregen from {}. Do not edit.\n\n",
        schema_name
    )
}

/// `///` lines for an optional schema description.
pub fn doc_attrs(description: Option<&str>) -> Vec<TokenStream> {
    description
        .map(|text| {
            text.lines()
                .map(|line| {
                    let line = format!(" {}", line.trim_end());
                    quote!(#[doc = #line])
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_render_starts_with_banner() {
        let mut file = RustFile::new();
        file.push(parse_quote! { pub struct Empty {} });
        let text = file.render("protocol.yml");
        assert!(text.starts_with("// This file is generated by wiregen from protocol.yml. Do not edit.\n\n"));
        assert!(text.contains("pub struct Empty"));
    }

    #[test]
    fn test_doc_attrs_render_as_doc_comments() {
        let docs = doc_attrs(Some("First line.\nSecond line."));
        assert_eq!(docs.len(), 2);

        let mut file = RustFile::new();
        file.push(parse_quote! { #(#docs)* pub struct Documented; });
        let text = file.render("x");
        assert!(text.contains("/// First line.\n/// Second line.\npub struct Documented;"));
        assert!(doc_attrs(None).is_empty());
    }
}
