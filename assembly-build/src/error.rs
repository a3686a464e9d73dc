use std::io;

use thiserror::Error;

/// A `Result` alias whose error is the generator [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors which abort a generation run.
///
/// None of these are recovered from: the first one encountered ends the run and no response is
/// produced.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the request or writing the response failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The request bytes are not a `CodeGeneratorRequest`.
    #[error("unable to decode CodeGeneratorRequest: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The response could not be encoded.
    #[error("unable to encode CodeGeneratorResponse: {0}")]
    Encode(#[from] prost::EncodeError),

    /// A file's package option is not usable.
    #[error("{file}: go_package '{option}' contains more than 1 ';'")]
    Configuration { file: String, option: String },

    /// The rendered source for a generated file is not valid Rust.
    #[error("unable to format {name}: {reason}")]
    MalformedSource {
        /// Name of the generated file.
        name: String,
        /// The rendered text which failed to parse.
        text: String,
        /// The parser's explanation.
        reason: String,
    },
}
