use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, Ident, LitStr};

mod pattern;

use pattern::OpcodePattern;

/// Derives `decode(word) -> Option<Self>` and `encode(&self) -> u16` for an
/// instruction enum whose variants each carry an `#[opcode("....")]` pattern.
///
/// Patterns are four nibbles: hex digits must match exactly, `X` and `Y` bind
/// the `x` and `y` fields, and a run of `N` binds `n`, `nn` or `nnn`.
/// Variants are tried in declaration order.
#[proc_macro_derive(Decode, attributes(opcode))]
pub fn decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_decode(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_decode(input: DeriveInput) -> syn::Result<TokenStream2> {
    let enum_name = input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let data = match input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(Error::new(
                Span::call_site(),
                "Decode can only be derived for enums",
            ))
        }
    };

    let mut decode_arms = vec![];
    let mut encode_arms = vec![];

    for variant in &data.variants {
        let variant_name = &variant.ident;

        let attribute = variant
            .attrs
            .iter()
            .find(|attribute| attribute.path().is_ident("opcode"))
            .ok_or_else(|| Error::new_spanned(variant, "missing #[opcode(\"....\")] attribute"))?;
        let literal: LitStr = attribute.parse_args()?;
        let pattern = OpcodePattern::parse(&literal.value())
            .map_err(|message| Error::new(literal.span(), message))?;

        let mut field_names: Vec<String> = match &variant.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
                .collect(),
            Fields::Unit => vec![],
            Fields::Unnamed(_) => {
                return Err(Error::new_spanned(
                    variant,
                    "opcode operands must be named fields",
                ))
            }
        };
        let mut operand_names: Vec<String> = pattern
            .operand_names()
            .into_iter()
            .map(String::from)
            .collect();

        field_names.sort();
        operand_names.sort();
        if field_names != operand_names {
            return Err(Error::new(
                literal.span(),
                format!(
                    "pattern binds [{}] but `{}` has fields [{}]",
                    operand_names.join(", "),
                    variant_name,
                    field_names.join(", ")
                ),
            ));
        }

        let mask = pattern.mask;
        let value = pattern.value;

        let operands: Vec<Ident> = pattern
            .operands
            .iter()
            .map(|operand| Ident::new(operand.name, Span::call_site()))
            .collect();
        let shifts: Vec<u32> = pattern.operands.iter().map(|operand| operand.shift).collect();
        let masks: Vec<u16> = pattern.operands.iter().map(|operand| operand.mask).collect();

        if operands.is_empty() {
            decode_arms.push(quote! {
                if word & #mask == #value {
                    return ::core::option::Option::Some(Self::#variant_name);
                }
            });
            encode_arms.push(quote! {
                Self::#variant_name => #value
            });
        } else {
            decode_arms.push(quote! {
                if word & #mask == #value {
                    return ::core::option::Option::Some(Self::#variant_name {
                        #(#operands: ((word >> #shifts) & #masks) as _),*
                    });
                }
            });
            encode_arms.push(quote! {
                Self::#variant_name { #(#operands),* } => {
                    #value #(| (((#operands as u16) & #masks) << #shifts))*
                }
            });
        }
    }

    Ok(quote! {
        impl #impl_generics #enum_name #type_generics #where_clause {
            /// Decodes a raw instruction word, or `None` when no pattern matches.
            pub fn decode(word: u16) -> ::core::option::Option<Self> {
                #(#decode_arms)*
                ::core::option::Option::None
            }

            /// Packs the instruction and its operands back into a raw word.
            pub fn encode(&self) -> u16 {
                match *self {
                    #(#encode_arms),*
                }
            }
        }
    })
}
