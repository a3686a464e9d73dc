use prost_types::{FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};

/// A `.proto` file, reduced to what the generator reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceFile {
    /// The file's path, as it appears in the request.
    pub name: String,
    /// The file's `package` clause, if any.
    pub package: Option<String>,
    /// The file's `go_package` option, if any.
    ///
    /// It follows the `import/path;name` convention: an optional import path which relocates the
    /// generated file, and an optional package name override.
    pub package_option: Option<String>,
    /// The services declared in the file, in declaration order.
    pub services: Vec<Service>,
}

impl InterfaceFile {
    /// The logical package name, or the empty string when the file has none.
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }
}

impl From<FileDescriptorProto> for InterfaceFile {
    fn from(file: FileDescriptorProto) -> InterfaceFile {
        let package_option = file
            .options
            .as_ref()
            .map(|options| options.go_package())
            .filter(|option| !option.is_empty())
            .map(str::to_owned);

        InterfaceFile {
            name: file.name().to_owned(),
            package: file.package.filter(|package| !package.is_empty()),
            package_option,
            services: file.service.into_iter().map(Service::from).collect(),
        }
    }
}

/// A service descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Service {
    /// The service name as it appears in the .proto file.
    pub name: String,
    /// The service methods.
    pub methods: Vec<Method>,
}

impl From<ServiceDescriptorProto> for Service {
    fn from(service: ServiceDescriptorProto) -> Service {
        Service {
            name: service.name().to_owned(),
            methods: service.method.into_iter().map(Method::from).collect(),
        }
    }
}

/// A service method descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Method {
    /// The name of the method as it appears in the .proto file.
    pub name: String,
    /// The fully qualified input Protobuf type.
    pub input_type: String,
    /// The fully qualified output Protobuf type.
    pub output_type: String,
    /// Identifies if client streams multiple client messages.
    pub client_streaming: bool,
    /// Identifies if server streams multiple server messages.
    pub server_streaming: bool,
}

impl From<MethodDescriptorProto> for Method {
    fn from(method: MethodDescriptorProto) -> Method {
        Method {
            name: method.name().to_owned(),
            input_type: method.input_type().to_owned(),
            output_type: method.output_type().to_owned(),
            client_streaming: method.client_streaming(),
            server_streaming: method.server_streaming(),
        }
    }
}
