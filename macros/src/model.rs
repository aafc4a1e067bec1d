use darling::{ast, util::PathList, FromDeriveInput, FromField, FromMeta};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Meta, Token};

#[derive(Debug, Default, FromMeta)]
struct ModelArgs {
	#[darling(default)]
	summary: Option<PathList>,
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Whether the field carries `#[serde(skip_deserializing)]` or `#[serde(skip)]`.
fn is_server_owned(attrs: &[syn::Attribute]) -> bool {
	attrs.iter().any(|attr| {
		let Meta::List(ref list) = attr.meta else {
			return false;
		};

		if !list.path.is_ident("serde") {
			return false;
		}

		list.tokens.to_token_stream().into_iter().any(|token| {
			matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
		})
	})
}

/// Removes the `derive_names` from a `#[derive(...)]` attribute, dropping the attribute
/// entirely if nothing else is left in it. Doc comments are dropped too, since every
/// generated struct gets its own.
fn strip_derive(attr: &syn::Attribute, derive_names: &[&str]) -> Option<syn::Attribute> {
	if attr.path().is_ident("doc") {
		return None;
	}

	if !attr.path().is_ident("derive") {
		return Some(attr.clone());
	}

	let Ok(paths) = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
	else {
		return Some(attr.clone());
	};

	let kept = paths
		.into_iter()
		.filter(|path| {
			path.segments
				.last()
				.map_or(true, |segment| !derive_names.iter().any(|name| segment.ident == *name))
		})
		.collect::<Vec<_>>();

	if kept.is_empty() {
		return None;
	}

	Some(syn::parse_quote!(#[derive(#(#kept),*)]))
}

pub fn from_input(
	args: proc_macro::TokenStream,
	input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match ModelArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let create_ident = format_ident!("Create{}Input", ident);
	let update_ident = format_ident!("Update{}Input", ident);

	let attrs = &receiver.attrs;
	let input_attrs = attrs
		.iter()
		.filter_map(|attr| strip_derive(attr, &["FromRow"]))
		.collect::<Vec<_>>();
	let summary_attrs = attrs
		.iter()
		.filter_map(|attr| strip_derive(attr, &["Deserialize", "Validate"]))
		.collect::<Vec<_>>();

	let create_doc = format!("The fields required to create a new [`{ident}`].");
	let update_doc = format!("The fields of a [`{ident}`] to change. Omitted fields are left as-is.");
	let summary_doc = format!("A condensed view of a [`{ident}`].");

	let all_fields = receiver.data.take_struct().expect("expected struct").fields;
	let fields = all_fields
		.iter()
		.filter(|field| !is_server_owned(&field.attrs))
		.filter_map(|field| Some((&field.attrs, field.ident.as_ref()?, &field.ty, &field.vis)))
		.collect::<Vec<_>>();

	let create_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	let update_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: Option<#ty>,
		}
	});

	let summary = args.summary.map(|names| {
		let summary_ident = format_ident!("{}Summary", ident);

		for name in names.iter() {
			let known = all_fields
				.iter()
				.any(|field| field.ident.as_ref().is_some_and(|ident| name.is_ident(ident)));

			if !known {
				return syn::Error::new_spanned(name, "unknown summary field").into_compile_error();
			}
		}

		let summary_fields = all_fields
			.iter()
			.filter(|field| {
				field
					.ident
					.as_ref()
					.is_some_and(|ident| names.iter().any(|name| name.is_ident(ident)))
			})
			.map(|field| {
				// the summary is never validated
				let attrs = field.attrs.iter().filter(|attr| !attr.path().is_ident("validate"));
				let ident = &field.ident;
				let ty = &field.ty;
				let vis = &field.vis;

				quote! {
					#(#attrs)*
					#vis #ident: #ty,
				}
			});

		quote! {
			#[doc = #summary_doc]
			#(#summary_attrs)*
			#vis struct #summary_ident #generics {
				#(
					#summary_fields
				)*
			}
		}
	});

	quote! {
		#input

		#[doc = #create_doc]
		#(#input_attrs)*
		#[serde(deny_unknown_fields)]
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}

		#[doc = #update_doc]
		#(#input_attrs)*
		#[serde(deny_unknown_fields)]
		#vis struct #update_ident #generics {
			#(
				#update_fields
			)*
		}

		#summary
	}
	.into()
}
