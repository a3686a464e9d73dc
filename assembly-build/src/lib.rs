#![doc(html_root_url = "https://docs.rs/assembly-build/0.1.0")]

//! `assembly-build` generates pluggable-callback scaffolds, "assemblies", for the services
//! declared in `.proto` files.
//!
//! For a service `Greeter`, the generated `GreeterAssembly` holds one boxed callback per RPC
//! method, implements the `GreeterServer` trait of the RPC framework by forwarding every call to
//! its callback, and can register itself with a server. `GreeterAssembly::new()` fills every
//! callback with a stub which fails with an `Unimplemented` status, so an assembly can be
//! registered before any method is written.
//!
//! The library is driven by the `protoc-gen-assembly` plugin:
//!
//! ```bash
//! $ protoc --plugin=protoc-gen-assembly --assembly_out=src/ helloworld.proto
//! ```
//!
//! which writes `helloworld.assembly.rs` next to the output of the other plugins. The generated
//! file declares a module named after the file's package and is meant to be included where the
//! message types and the framework's server code are in scope:
//!
//! ```rust,ignore
//! include!("helloworld.assembly.rs");
//!
//! let mut greeter = helloworld::GreeterAssembly::new();
//! greeter.say_hello_method = Box::new(|_ctx, request| {
//!     Ok(HelloReply { message: format!("Hello {}!", request.name) })
//! });
//! greeter.register(&mut server);
//! ```
//!
//! ## Naming
//!
//! The generated module is named after the file's `go_package` option if present (the part
//! after the last `/`, or after the `;` of an `import/path;name` option), then its `package`
//! clause, then its base name. An import path in the option relocates the generated file under
//! that path.

mod ast;
mod classify;
mod code_generator;
mod error;
mod format;
mod ident;
mod naming;
mod template;

pub use crate::ast::{InterfaceFile, Method, Service};
pub use crate::classify::{classify, Classification, InteractionShape};
pub use crate::code_generator::{generate, GeneratedUnit};
pub use crate::error::{Error, Result};
pub use crate::naming::{resolve, ResolvedNaming, GENERATED_SUFFIX};

use std::io::{Read, Write};

use log::{debug, warn};
use once_cell::sync::Lazy;
use prost::Message;
use prost_types::compiler::code_generator_response::{self, Feature};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

/// Configuration options for assembly generation.
///
/// This configuration builder can be used to set non-default code generation options.
#[derive(Clone, Debug)]
pub struct Config {
    format: bool,
}

impl Config {
    /// Creates a new code generator configuration with default options.
    ///
    /// This also parses the shared template, so that a defect in it surfaces immediately.
    pub fn new() -> Config {
        Lazy::force(&template::TEMPLATE);
        Config { format: true }
    }

    /// Configures the code generator to format the output code via `prettyplease`.
    ///
    /// By default, this is enabled but if the `format` feature is not enabled this does
    /// nothing. Generated code is checked for well-formedness either way.
    pub fn format(&mut self, enabled: bool) -> &mut Self {
        self.format = enabled;
        self
    }

    /// Generates one file per service of every file of `request`, in request order.
    ///
    /// Any failure aborts the whole run: either every file is generated, or none is.
    pub fn generate(&self, request: CodeGeneratorRequest) -> Result<Vec<GeneratedUnit>> {
        if !request.parameter().is_empty() {
            warn!("ignoring plugin parameter: {:?}", request.parameter());
        }

        let mut units = Vec::new();
        for file in request.proto_file {
            let file = InterfaceFile::from(file);
            debug!("file: {:?}, package: {:?}", file.name, file.package);

            let naming = resolve(&file)?;
            for service in &file.services {
                let unit = generate(service, file.package_name(), &naming);
                let content = format::canonicalize(&unit.file_name, unit.content, self.format)?;
                units.push(GeneratedUnit {
                    file_name: unit.file_name,
                    content,
                });
            }
        }
        Ok(units)
    }

    /// Processes a plugin request, producing the response to hand back to `protoc`.
    pub fn run_plugin(&self, request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse> {
        let file = self
            .generate(request)?
            .into_iter()
            .map(|unit| code_generator_response::File {
                name: Some(unit.file_name),
                content: Some(unit.content),
                ..Default::default()
            })
            .collect();

        Ok(CodeGeneratorResponse {
            file,
            supported_features: Some(Feature::Proto3Optional as u64),
            ..Default::default()
        })
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// Reads a `CodeGeneratorRequest` from `input` until EOF.
pub fn read_request<R: Read>(mut input: R) -> Result<CodeGeneratorRequest> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    Ok(CodeGeneratorRequest::decode(buf.as_slice())?)
}

/// Writes `response` to `output`.
pub fn write_response<W: Write>(response: &CodeGeneratorResponse, mut output: W) -> Result<()> {
    let mut buf = Vec::with_capacity(response.encoded_len());
    response.encode(&mut buf)?;
    output.write_all(&buf)?;
    output.flush()?;
    Ok(())
}

/// Runs the plugin with the default configuration: reads a request from `input`, and writes the
/// response to `output` only if generation succeeds.
pub fn run<R: Read, W: Write>(input: R, output: W) -> Result<()> {
    let request = read_request(input)?;
    let response = Config::new().run_plugin(request)?;
    write_response(&response, output)
}
