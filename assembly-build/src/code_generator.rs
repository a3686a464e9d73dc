use log::{debug, trace};

use crate::ast::Service;
use crate::classify::classify;
use crate::ident::{to_module, to_snake, to_upper_camel};
use crate::naming::ResolvedNaming;
use crate::template::{MethodBindings, ServiceBindings, TEMPLATE};

/// The source of one generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub file_name: String,
    pub content: String,
}

/// Renders the assembly of `service`, declared in a file with logical package `package` and
/// output names `naming`.
///
/// The content is the raw template output; it has not been canonicalized.
pub fn generate(service: &Service, package: &str, naming: &ResolvedNaming) -> GeneratedUnit {
    debug!("  service: {:?}", service.name);

    let type_name = to_upper_camel(&service.name);
    let bindings = ServiceBindings {
        module: to_module(&naming.output_package),
        service: service.name.clone(),
        assembly: format!("{}Assembly", type_name),
        server_trait: format!("{}Server", type_name),
        register_fn: format!("register_{}_server", plain_snake(&service.name)),
    };

    let methods = service
        .methods
        .iter()
        .map(|method| {
            let classification = classify(method, &service.name, package);
            trace!(
                "  method: {:?}, shape: {}, input: {:?}, output: {:?}",
                method.name,
                classification.shape,
                classification.trimmed_input_type,
                classification.trimmed_output_type
            );

            MethodBindings {
                shape: classification.shape,
                rpc: method.name.clone(),
                method: to_snake(&method.name),
                field: format!("{}_method", plain_snake(&method.name)),
                input: classification.trimmed_input_type,
                output: classification.trimmed_output_type,
                stream: classification.stream_type_name,
            }
        })
        .collect::<Vec<_>>();

    GeneratedUnit {
        file_name: naming.output_file_path.clone(),
        content: TEMPLATE.render(&bindings, &methods),
    }
}

/// Snake case without raw identifier escaping, for use as an identifier prefix.
fn plain_snake(s: &str) -> String {
    let ident = to_snake(s);
    match ident.strip_prefix("r#") {
        Some(ident) => ident.to_owned(),
        None => ident,
    }
}
