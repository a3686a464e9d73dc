//! Canonicalization of rendered source.

use log::trace;

use crate::{Error, Result};

/// Checks that `text` is a well-formed Rust file and, when `pretty` is set and the `format`
/// feature is enabled, lays it out with `prettyplease`.
///
/// `name` identifies the generated file in the error.
pub(crate) fn canonicalize(name: &str, text: String, pretty: bool) -> Result<String> {
    let file = match syn::parse_file(&text) {
        Ok(file) => file,
        Err(error) => {
            return Err(Error::MalformedSource {
                name: name.to_owned(),
                text,
                reason: error.to_string(),
            })
        }
    };

    if !pretty {
        return Ok(text);
    }

    trace!("formatting {:?}", name);
    Ok(unparse(&file).unwrap_or(text))
}

#[cfg(feature = "format")]
fn unparse(file: &syn::File) -> Option<String> {
    Some(prettyplease::unparse(file))
}

#[cfg(not(feature = "format"))]
fn unparse(_file: &syn::File) -> Option<String> {
    None
}
