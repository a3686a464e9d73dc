//! Method classification.

use std::fmt;

use crate::ast::Method;

/// The calling convention of an RPC method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionShape {
    Unary,
    ServerStreaming,
    ClientStreaming,
    BidiStreaming,
}

impl InteractionShape {
    pub fn new(client_streaming: bool, server_streaming: bool) -> InteractionShape {
        match (client_streaming, server_streaming) {
            (false, false) => InteractionShape::Unary,
            (false, true) => InteractionShape::ServerStreaming,
            (true, false) => InteractionShape::ClientStreaming,
            (true, true) => InteractionShape::BidiStreaming,
        }
    }

    /// Whether methods of this shape exchange messages through a stream handle.
    pub fn uses_stream(self) -> bool {
        self != InteractionShape::Unary
    }
}

impl fmt::Display for InteractionShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            InteractionShape::Unary => "unary",
            InteractionShape::ServerStreaming => "server streaming",
            InteractionShape::ClientStreaming => "client streaming",
            InteractionShape::BidiStreaming => "bidirectional streaming",
        })
    }
}

/// The properties of a method which shape its generated signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub shape: InteractionShape,
    /// The input type, without the file's own package qualifier.
    pub trimmed_input_type: String,
    /// The output type, without the file's own package qualifier.
    pub trimmed_output_type: String,
    /// Name of the stream handle type the RPC framework generates for the method.
    pub stream_type_name: String,
}

/// Classifies `method` of service `service` declared in the logical package `package`.
///
/// Type references are trimmed with a plain prefix match: a type from another package keeps its
/// leading qualifier. In a file without a package the prefix is the root qualifier `.` alone.
///
/// Only top-level types of the file's own package trim to a valid Rust type. Foreign and nested
/// references (`Outer.Inner`) keep their dots, and the generated unit fails canonicalization
/// with `MalformedSource`.
pub fn classify(method: &Method, service: &str, package: &str) -> Classification {
    let prefix = package_qualifier(package);
    Classification {
        shape: InteractionShape::new(method.client_streaming, method.server_streaming),
        trimmed_input_type: trim_type(&method.input_type, &prefix).to_owned(),
        trimmed_output_type: trim_type(&method.output_type, &prefix).to_owned(),
        stream_type_name: format!("{}_{}Server", service, method.name),
    }
}

/// The qualifier prepended to names in `package`, e.g. `.foo.bar.` for `foo.bar`.
fn package_qualifier(package: &str) -> String {
    if package.is_empty() {
        ".".to_owned()
    } else {
        format!(".{}.", package)
    }
}

fn trim_type<'a>(type_name: &'a str, prefix: &str) -> &'a str {
    type_name.strip_prefix(prefix).unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(input: &str, output: &str, client: bool, server: bool) -> Method {
        Method {
            name: "SayHello".to_owned(),
            input_type: input.to_owned(),
            output_type: output.to_owned(),
            client_streaming: client,
            server_streaming: server,
        }
    }

    #[test]
    fn test_shape() {
        assert_eq!(InteractionShape::new(false, false), InteractionShape::Unary);
        assert_eq!(
            InteractionShape::new(false, true),
            InteractionShape::ServerStreaming
        );
        assert_eq!(
            InteractionShape::new(true, false),
            InteractionShape::ClientStreaming
        );
        assert_eq!(
            InteractionShape::new(true, true),
            InteractionShape::BidiStreaming
        );

        assert!(!InteractionShape::Unary.uses_stream());
        assert!(InteractionShape::BidiStreaming.uses_stream());
    }

    #[test]
    fn test_classify() {
        let m = method(".helloworld.HelloRequest", ".helloworld.HelloReply", false, true);
        let classification = classify(&m, "Greeter", "helloworld");
        assert_eq!(
            classification,
            Classification {
                shape: InteractionShape::ServerStreaming,
                trimmed_input_type: "HelloRequest".to_owned(),
                trimmed_output_type: "HelloReply".to_owned(),
                stream_type_name: "Greeter_SayHelloServer".to_owned(),
            }
        );
        assert_eq!(classify(&m, "Greeter", "helloworld"), classification);
    }

    #[test]
    fn test_trim_exact_prefix_only() {
        let case = |type_name: &str, package: &str, trimmed: &str| {
            let m = method(type_name, type_name, false, false);
            let classification = classify(&m, "Greeter", package);
            assert_eq!(classification.trimmed_input_type, trimmed);
            assert_eq!(classification.trimmed_output_type, trimmed);
        };

        case(".foo.bar.Baz", "foo.bar", "Baz");
        case(".foo.bar.Baz.Nested", "foo.bar", "Baz.Nested");
        case(".foo.barx.Baz", "foo.bar", ".foo.barx.Baz");
        case(".foo.Baz", "foo.bar", ".foo.Baz");
        case("foo.bar.Baz", "foo.bar", "foo.bar.Baz");
        case(".other.Baz", "foo", ".other.Baz");
        case(".Baz", "", "Baz");
        case(".other.Baz", "", "other.Baz");
    }

    #[test]
    fn test_stream_type_name_keeps_proto_spelling() {
        let mut m = method(".p.In", ".p.Out", true, true);
        m.name = "route_chat".to_owned();
        assert_eq!(
            classify(&m, "route_guide", "p").stream_type_name,
            "route_guide_route_chatServer"
        );
    }
}
