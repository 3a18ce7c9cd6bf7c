use std::borrow::Cow;

use proc_macro2::{TokenStream, Ident, Span};
use syn::{DeriveInput, Data, Fields, DataStruct, FieldsNamed, FieldsUnnamed};
use quote::quote;

/// Maps a helper attribute to the number of bytes it discards before the field.
fn skip_len(attr: &str) -> Option<usize> {
	match attr {
		"skip_1" => Some(1),
		"skip_4" => Some(4),
		"skip_12" => Some(12),
		_ => None,
	}
}

fn read_derive_impl(input: &DeriveInput) -> TokenStream {
	let (fields, tuple) = match &input.data {
		Data::Struct(DataStruct { fields: Fields::Named(FieldsNamed { named, .. }), .. }) => (named, false),
		Data::Struct(DataStruct { fields: Fields::Unnamed(FieldsUnnamed { unnamed, .. }), .. }) => (unnamed, true),
		_ => {
			return syn::Error::new_spanned(&input.ident, "only tuple struct or struct with named fields supported")
				.to_compile_error();
		},
	};
	let mut body = quote! {};
	let mut initializer = quote! {};
	for (index, field) in fields.iter().enumerate() {
		let mut field_expr = quote! { tr_reader::Readable::read(reader)? };
		let skip = field
			.attrs
			.iter()
			.filter_map(|attr| attr.path().get_ident())
			.filter_map(|ident| skip_len(&ident.to_string()))
			.sum::<usize>();
		if skip > 0 {
			field_expr = quote! {{
				tr_reader::skip(reader, #skip)?;
				#field_expr
			}};
		}
		let field_ident = match &field.ident {
			Some(field_ident) => Cow::Borrowed(field_ident),
			None => Cow::Owned(Ident::new(&format!("field{}", index), Span::call_site())),
		};
		body = quote! {
			#body
			let #field_ident = #field_expr;
		};
		initializer = quote! { #initializer #field_ident, };
	}
	initializer = if tuple { quote! { (#initializer) } } else { quote! { {#initializer} } };
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let type_name = &input.ident;
	quote! {
		impl #impl_generics tr_reader::Readable for #type_name #ty_generics #where_clause {
			fn read<R: std::io::Read>(reader: &mut R) -> tr_reader::Result<Self> {
				#body
				Ok(#type_name #initializer)
			}
		}
	}
}

/// Reads each field in declaration order with its own `Readable` impl.
#[proc_macro_derive(
	Readable,
	attributes(
		skip_1,
		skip_4,
		skip_12,
	)
)]
pub fn read_derive(tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
	read_derive_impl(&syn::parse_macro_input!(tokens)).into()
}
