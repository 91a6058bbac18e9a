use proc_macro2::TokenStream as TokenStream2;
use syn::{
	Token,
	parse::{self, Parse, ParseStream},
};

/// Arguments of `#[context(...)]`: an optional leading `move,` followed by
/// the tokens handed to `format!`.
#[derive(Debug)]
pub struct ContextArgs {
	pub move_token: Option<Token![move]>,
	pub message: TokenStream2,
}

impl Parse for ContextArgs {
	fn parse(input: ParseStream<'_>) -> parse::Result<Self> {
		let move_token = if input.peek(Token![move]) {
			let token = input.parse()?;
			input.parse::<Token![,]>()?;
			Some(token)
		} else {
			None
		};

		let message: TokenStream2 = input.parse()?;
		if message.is_empty() {
			return Err(input.error("expected a format string"));
		}

		Ok(Self { move_token, message })
	}
}
