//! The source template of generated assemblies.
//!
//! The template is a set of text snippets containing `{{slot}}` placeholders. It is parsed once,
//! on first use, into [`TEMPLATE`] and never modified afterwards.

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::classify::InteractionShape;

const FILE: &str = r#"/// Code initially generated by protoc-gen-assembly.
pub mod {{module}} {
    #![allow(clippy::type_complexity, unused_imports)]

    use super::*;
    use grpc::{Code, Context, Server, Status};

    /// `{{assembly}}` is an implementation of the grpc-defined type, `{{service}}`.
    /// Its members are functions which implement the defined rpc endpoints.
    pub struct {{assembly}} {
{{fields}}    }

    impl {{server_trait}} for {{assembly}} {
{{forwards}}    }

    impl {{assembly}} {
        /// Associates the implementation with a grpc server.
        pub fn register(self, srv: &mut Server) {
            {{register_fn}}(srv, self)
        }

        /// Creates an instance of `{{service}}` with unimplemented method stubs.
        ///
        /// NOTE: you should provide your own functions which implement the underlying methods.
        pub fn new() -> {{assembly}} {
            {{assembly}} {
{{defaults}}            }
        }
    }

    impl Default for {{assembly}} {
        fn default() -> {{assembly}} {
            {{assembly}}::new()
        }
    }
}
"#;

const UNARY_FIELD: &str = r#"        /// Implements `{{rpc}}`.
        pub {{field}}: Box<dyn Fn(Context, {{input}}) -> Result<{{output}}, Status> + Send + Sync>,
"#;

const UNARY_FORWARD: &str = r#"        /// `{{method}}` calls the provided implementation, `{{field}}`.
        fn {{method}}(&self, ctx: Context, input: {{input}}) -> Result<{{output}}, Status> {
            (self.{{field}})(ctx, input)
        }
"#;

const UNARY_DEFAULT: &str = r#"                {{field}}: Box::new(|_ctx: Context, _input: {{input}}| {
                    Err(Status::new(Code::Unimplemented, "{{rpc}} has not been implemented"))
                }),
"#;

const SERVER_STREAMING_FIELD: &str = r#"        /// Implements `{{rpc}}`.
        pub {{field}}: Box<dyn Fn({{input}}, {{stream}}) -> Result<(), Status> + Send + Sync>,
"#;

const SERVER_STREAMING_FORWARD: &str = r#"        /// `{{method}}` calls the provided implementation, `{{field}}`.
        fn {{method}}(&self, input: {{input}}, stream: {{stream}}) -> Result<(), Status> {
            (self.{{field}})(input, stream)
        }
"#;

const SERVER_STREAMING_DEFAULT: &str = r#"                {{field}}: Box::new(|_input: {{input}}, _stream: {{stream}}| {
                    Err(Status::new(Code::Unimplemented, "{{rpc}} has not been implemented"))
                }),
"#;

const STREAMING_FIELD: &str = r#"        /// Implements `{{rpc}}`.
        pub {{field}}: Box<dyn Fn({{stream}}) -> Result<(), Status> + Send + Sync>,
"#;

const STREAMING_FORWARD: &str = r#"        /// `{{method}}` calls the provided implementation, `{{field}}`.
        fn {{method}}(&self, stream: {{stream}}) -> Result<(), Status> {
            (self.{{field}})(stream)
        }
"#;

const STREAMING_DEFAULT: &str = r#"                {{field}}: Box::new(|_stream: {{stream}}| {
                    Err(Status::new(Code::Unimplemented, "{{rpc}} has not been implemented"))
                }),
"#;

/// The parsed template, shared by every render.
pub(crate) static TEMPLATE: Lazy<Template> = Lazy::new(|| {
    // The snippets are constants: a parse failure is a bug in this module and is covered by
    // `test_template_parses`.
    Template::parse().unwrap_or_else(|error| panic!("invalid assembly template: {}", error))
});

/// A defect in the template text.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },
    #[error("unknown placeholder `{{{{{name}}}}}`")]
    Unknown { name: String },
    #[error("placeholder `{{{{{name}}}}}` is not available in {scope:?} snippets")]
    OutOfScope { name: String, scope: Scope },
}

/// The part of the template a snippet belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// The file snippet: service slots and method sections.
    File,
    /// A per-method snippet: service and method slots.
    Method,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Module,
    Service,
    Assembly,
    ServerTrait,
    RegisterFn,

    Rpc,
    Method,
    Field,
    Input,
    Output,
    Stream,

    Fields,
    Forwards,
    Defaults,
}

impl Slot {
    fn from_name(name: &str) -> Option<Slot> {
        Some(match name {
            "module" => Slot::Module,
            "service" => Slot::Service,
            "assembly" => Slot::Assembly,
            "server_trait" => Slot::ServerTrait,
            "register_fn" => Slot::RegisterFn,
            "rpc" => Slot::Rpc,
            "method" => Slot::Method,
            "field" => Slot::Field,
            "input" => Slot::Input,
            "output" => Slot::Output,
            "stream" => Slot::Stream,
            "fields" => Slot::Fields,
            "forwards" => Slot::Forwards,
            "defaults" => Slot::Defaults,
            _ => return None,
        })
    }

    fn is_available_in(self, scope: Scope) -> bool {
        match self {
            Slot::Module | Slot::Service | Slot::Assembly | Slot::ServerTrait | Slot::RegisterFn => {
                true
            }
            Slot::Rpc | Slot::Method | Slot::Field | Slot::Input | Slot::Output | Slot::Stream => {
                scope == Scope::Method
            }
            Slot::Fields | Slot::Forwards | Slot::Defaults => scope == Scope::File,
        }
    }
}

#[derive(Debug)]
enum Piece<'a> {
    Text(&'a str),
    Slot(Slot),
}

/// A parsed snippet of template text.
#[derive(Debug)]
pub(crate) struct Snippet<'a> {
    pieces: Vec<Piece<'a>>,
}

impl<'a> Snippet<'a> {
    pub(crate) fn parse(text: &'a str, scope: Scope) -> Result<Snippet<'a>, TemplateError> {
        let mut pieces = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                pieces.push(Piece::Text(&rest[..start]));
            }
            let end = rest[start..]
                .find("}}")
                .ok_or(TemplateError::Unterminated {
                    offset: text.len() - rest.len() + start,
                })?;
            let name = rest[start + 2..start + end].trim();
            let slot = Slot::from_name(name).ok_or_else(|| TemplateError::Unknown {
                name: name.to_owned(),
            })?;
            if !slot.is_available_in(scope) {
                return Err(TemplateError::OutOfScope {
                    name: name.to_owned(),
                    scope,
                });
            }
            pieces.push(Piece::Slot(slot));
            rest = &rest[start + end + 2..];
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest));
        }

        Ok(Snippet { pieces })
    }
}

/// Service-level values substituted into the template.
#[derive(Debug)]
pub(crate) struct ServiceBindings {
    pub module: String,
    pub service: String,
    pub assembly: String,
    pub server_trait: String,
    pub register_fn: String,
}

/// Method-level values substituted into the template.
#[derive(Debug)]
pub(crate) struct MethodBindings {
    pub shape: InteractionShape,
    pub rpc: String,
    pub method: String,
    pub field: String,
    pub input: String,
    pub output: String,
    pub stream: String,
}

#[derive(Debug)]
struct ShapeSnippets {
    field: Snippet<'static>,
    forward: Snippet<'static>,
    default: Snippet<'static>,
}

impl ShapeSnippets {
    fn section(&self, slot: Slot) -> Option<&Snippet<'static>> {
        match slot {
            Slot::Fields => Some(&self.field),
            Slot::Forwards => Some(&self.forward),
            Slot::Defaults => Some(&self.default),
            _ => None,
        }
    }

    fn parse(
        field: &'static str,
        forward: &'static str,
        default: &'static str,
    ) -> Result<ShapeSnippets, TemplateError> {
        Ok(ShapeSnippets {
            field: Snippet::parse(field, Scope::Method)?,
            forward: Snippet::parse(forward, Scope::Method)?,
            default: Snippet::parse(default, Scope::Method)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct Template {
    file: Snippet<'static>,
    unary: ShapeSnippets,
    server_streaming: ShapeSnippets,
    /// Client and bidirectional streaming methods share a signature.
    streaming: ShapeSnippets,
}

impl Template {
    fn parse() -> Result<Template, TemplateError> {
        Ok(Template {
            file: Snippet::parse(FILE, Scope::File)?,
            unary: ShapeSnippets::parse(UNARY_FIELD, UNARY_FORWARD, UNARY_DEFAULT)?,
            server_streaming: ShapeSnippets::parse(
                SERVER_STREAMING_FIELD,
                SERVER_STREAMING_FORWARD,
                SERVER_STREAMING_DEFAULT,
            )?,
            streaming: ShapeSnippets::parse(STREAMING_FIELD, STREAMING_FORWARD, STREAMING_DEFAULT)?,
        })
    }

    fn shape(&self, shape: InteractionShape) -> &ShapeSnippets {
        match shape {
            InteractionShape::Unary => &self.unary,
            InteractionShape::ServerStreaming => &self.server_streaming,
            InteractionShape::ClientStreaming | InteractionShape::BidiStreaming => &self.streaming,
        }
    }

    /// Renders the file snippet, expanding each section once per method in order.
    pub(crate) fn render(&self, service: &ServiceBindings, methods: &[MethodBindings]) -> String {
        let mut buf = String::new();
        for piece in &self.file.pieces {
            match piece {
                Piece::Text(text) => buf.push_str(text),
                Piece::Slot(slot @ (Slot::Fields | Slot::Forwards | Slot::Defaults)) => {
                    for method in methods {
                        if let Some(snippet) = self.shape(method.shape).section(*slot) {
                            append(snippet, service, method, &mut buf);
                        }
                    }
                }
                Piece::Slot(slot) => buf.push_str(value(*slot, service, None)),
            }
        }
        buf
    }
}

fn append(snippet: &Snippet, service: &ServiceBindings, method: &MethodBindings, buf: &mut String) {
    for piece in &snippet.pieces {
        match piece {
            Piece::Text(text) => buf.push_str(text),
            Piece::Slot(slot) => buf.push_str(value(*slot, service, Some(method))),
        }
    }
}

fn value<'a>(slot: Slot, service: &'a ServiceBindings, method: Option<&'a MethodBindings>) -> &'a str {
    match (slot, method) {
        (Slot::Module, _) => &service.module,
        (Slot::Service, _) => &service.service,
        (Slot::Assembly, _) => &service.assembly,
        (Slot::ServerTrait, _) => &service.server_trait,
        (Slot::RegisterFn, _) => &service.register_fn,
        (Slot::Rpc, Some(method)) => &method.rpc,
        (Slot::Method, Some(method)) => &method.method,
        (Slot::Field, Some(method)) => &method.field,
        (Slot::Input, Some(method)) => &method.input,
        (Slot::Output, Some(method)) => &method.output,
        (Slot::Stream, Some(method)) => &method.stream,
        // Scope checks at parse time rule out method slots without a method, and sections are
        // expanded by `Template::render`.
        (slot, _) => unreachable!("slot {:?} rendered outside of its scope", slot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> ServiceBindings {
        ServiceBindings {
            module: "b".to_owned(),
            service: "Greeter".to_owned(),
            assembly: "GreeterAssembly".to_owned(),
            server_trait: "GreeterServer".to_owned(),
            register_fn: "register_greeter_server".to_owned(),
        }
    }

    fn method(shape: InteractionShape) -> MethodBindings {
        MethodBindings {
            shape,
            rpc: "SayHello".to_owned(),
            method: "say_hello".to_owned(),
            field: "say_hello_method".to_owned(),
            input: "HelloRequest".to_owned(),
            output: "HelloReply".to_owned(),
            stream: "Greeter_SayHelloServer".to_owned(),
        }
    }

    #[test]
    fn test_template_parses() {
        Lazy::force(&TEMPLATE);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Snippet::parse("pub mod {{module", Scope::File).unwrap_err(),
            TemplateError::Unterminated { offset: 8 }
        );
        assert_eq!(
            Snippet::parse("{{ nope }}", Scope::File).unwrap_err(),
            TemplateError::Unknown {
                name: "nope".to_owned()
            }
        );
        assert_eq!(
            Snippet::parse("{{field}}", Scope::File).unwrap_err(),
            TemplateError::OutOfScope {
                name: "field".to_owned(),
                scope: Scope::File
            }
        );
        assert_eq!(
            Snippet::parse("{{fields}}", Scope::Method).unwrap_err(),
            TemplateError::OutOfScope {
                name: "fields".to_owned(),
                scope: Scope::Method
            }
        );
        assert_eq!(
            TemplateError::Unknown {
                name: "nope".to_owned()
            }
            .to_string(),
            "unknown placeholder `{{nope}}`"
        );
    }

    #[test]
    fn test_render_unary() {
        let text = TEMPLATE.render(&service(), &[method(InteractionShape::Unary)]);

        assert!(text.starts_with("/// Code initially generated by protoc-gen-assembly.\npub mod b {\n"));
        assert!(text.contains(
            "        pub say_hello_method: Box<dyn Fn(Context, HelloRequest) -> Result<HelloReply, Status> + Send + Sync>,\n    }\n"
        ));
        assert!(text.contains("    impl GreeterServer for GreeterAssembly {\n"));
        assert!(text.contains(
            "        fn say_hello(&self, ctx: Context, input: HelloRequest) -> Result<HelloReply, Status> {\n            (self.say_hello_method)(ctx, input)\n        }\n"
        ));
        assert!(text.contains("            register_greeter_server(srv, self)\n"));
        assert!(text.contains(
            "                say_hello_method: Box::new(|_ctx: Context, _input: HelloRequest| {\n                    Err(Status::new(Code::Unimplemented, \"SayHello has not been implemented\"))\n                }),\n            }\n"
        ));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_render_streaming_shapes() {
        let text = TEMPLATE.render(&service(), &[method(InteractionShape::ServerStreaming)]);
        assert!(text.contains(
            "pub say_hello_method: Box<dyn Fn(HelloRequest, Greeter_SayHelloServer) -> Result<(), Status> + Send + Sync>,"
        ));
        assert!(text.contains(
            "fn say_hello(&self, input: HelloRequest, stream: Greeter_SayHelloServer) -> Result<(), Status> {"
        ));
        assert!(!text.contains("HelloReply"));

        for shape in [InteractionShape::ClientStreaming, InteractionShape::BidiStreaming] {
            let text = TEMPLATE.render(&service(), &[method(shape)]);
            assert!(text.contains(
                "pub say_hello_method: Box<dyn Fn(Greeter_SayHelloServer) -> Result<(), Status> + Send + Sync>,"
            ));
            assert!(text.contains(
                "fn say_hello(&self, stream: Greeter_SayHelloServer) -> Result<(), Status> {"
            ));
            assert!(text.contains("Box::new(|_stream: Greeter_SayHelloServer| {"));
        }
    }

    #[test]
    fn test_render_without_methods() {
        let text = TEMPLATE.render(&service(), &[]);
        assert!(text.contains("    pub struct GreeterAssembly {\n    }\n"));
        assert!(text.contains("            GreeterAssembly {\n            }\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let methods = [
            method(InteractionShape::Unary),
            method(InteractionShape::BidiStreaming),
        ];
        assert_eq!(
            TEMPLATE.render(&service(), &methods),
            TEMPLATE.render(&service(), &methods)
        );
    }

    #[test]
    #[should_panic(expected = "rendered outside of its scope")]
    fn test_method_slot_requires_method() {
        value(Slot::Rpc, &service(), None);
    }
}
