use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Type};

/// Derive macro that describes the CSV columns accepted for an input row.
///
/// For each field, extracts:
/// - Column name (respects `#[serde(rename = "...")]`)
/// - Required (false for `Option<T>` or `#[serde(default)]` fields)
/// - Description (from doc comments)
/// - Alternative headings (from `#[serde(alias = "...")]`)
///
/// Generates a `csv_schema() -> &'static [CsvField]` method. `CsvField` must be
/// in scope where the derive is used.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldInfo {
    name: String,
    required: bool,
    description: String,
    aliases: Vec<String>,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "CsvSchema only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "CsvSchema only supports structs")),
    };

    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let serde = SerdeAttrs::parse(&field.attrs)?;

        infos.push(FieldInfo {
            name: serde.rename.unwrap_or_else(|| ident.to_string()),
            required: !serde.default && !is_option_type(&field.ty),
            description: get_doc_comment(&field.attrs),
            aliases: serde.aliases,
        });
    }

    let field_entries = infos.iter().map(|info| {
        let FieldInfo {
            name,
            required,
            description,
            aliases,
        } = info;
        quote! {
            CsvField {
                name: #name,
                required: #required,
                description: #description,
                aliases: &[#(#aliases),*],
            }
        }
    });

    Ok(quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }
        }
    })
}

#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    aliases: Vec<String>,
    default: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = SerdeAttrs::default();
        for attr in attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    out.rename = Some(value.value());
                } else if meta.path.is_ident("alias") {
                    let value: LitStr = meta.value()?.parse()?;
                    out.aliases.push(value.value());
                } else if meta.path.is_ident("default") {
                    out.default = true;
                    if meta.input.peek(syn::Token![=]) {
                        let _: LitStr = meta.value()?.parse()?;
                    }
                } else if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let _: proc_macro2::TokenStream = content.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
