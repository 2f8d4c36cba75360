pub mod meili;

use color_eyre::Result;
use reqwest::header::{AUTHORIZATION, HeaderMap};

pub fn auth_headers(api_key: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if !api_key.is_empty() {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	Ok(headers)
}
