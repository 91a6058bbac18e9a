//! Procedural macros shared by the gpkgtiles crates.
//!
//! The only macro exported here is [`macro@context`], an attribute for functions
//! returning `anyhow::Result`. It evaluates the original body and attaches a
//! formatted context message to any error leaving the function:
//!
//! ```ignore
//! #[context("adding tile matrix {} to '{}'", zoom_level, tile_set.table_name)]
//! pub fn add_tile_matrix(&self, tile_set: &TileSet, zoom_level: i32) -> Result<TileMatrix> {
//!     // ...
//! }
//! ```
//!
//! The format arguments are evaluated lazily, only when the body fails. Use
//! `#[context(move, "...")]` when the body needs to take ownership of captured
//! arguments.

mod args;

use crate::args::ContextArgs;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::parse_macro_input;

#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let ContextArgs { move_token, message } = parse_macro_input!(args);
	let mut function = parse_macro_input!(input as syn::ItemFn);

	if function.sig.asyncness.is_some() {
		return syn::Error::new_spanned(function.sig.fn_token, "#[context] supports synchronous functions only")
			.to_compile_error()
			.into();
	}

	let return_type = match &function.sig.output {
		syn::ReturnType::Default => {
			return syn::Error::new_spanned(&function.sig, "#[context] requires a function returning Result")
				.to_compile_error()
				.into();
		}
		syn::ReturnType::Type(arrow, ty) => quote! { #arrow #ty },
	};

	let body = &function.block;
	let err = Ident::new("err", Span::mixed_site());
	let once = Ident::new("once", Span::mixed_site());

	// The body runs inside an immediately called closure so that `?` and
	// `return` keep working and still pass through the error mapping.
	let new_body = quote! {
		let #once = ::core::iter::empty::<()>();
		(#move_token || #return_type {
			::core::mem::drop(#once);
			#body
		})()
		.map_err(|#err| #err.context(format!(#message)).into())
	};
	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(new_body), None)];

	function.into_token_stream().into()
}
