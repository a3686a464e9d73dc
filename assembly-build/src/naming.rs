//! Output package and file name resolution.

use log::trace;

use crate::ast::InterfaceFile;
use crate::{Error, Result};

/// Marker inserted between a file's base name and the `.rs` extension of generated files.
pub const GENERATED_SUFFIX: &str = ".assembly.rs";

/// Extensions recognized as `.proto` sources and stripped from generated file names.
const SOURCE_EXTENSIONS: &[&str] = &[".proto", ".protodevel"];

/// The output names of one `.proto` file, shared by every service it declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNaming {
    /// The package the generated code is declared in.
    pub output_package: String,
    /// The path of the generated file, relative to the plugin output directory.
    pub output_file_path: String,
}

/// An interpreted package option.
#[derive(Debug, PartialEq, Eq)]
struct PackageOption<'a> {
    /// Directory which replaces the `.proto` file's own, if any.
    import_path: Option<&'a str>,
    package: &'a str,
}

impl<'a> PackageOption<'a> {
    /// Interprets `option`.
    ///
    /// A simple name is the package. A name containing a `/` is an import path whose last
    /// component is the package, unless a non-empty `;`-delimited suffix names the package
    /// explicitly.
    fn parse(file: &str, option: &'a str) -> Result<PackageOption<'a>> {
        if option.matches(';').count() > 1 {
            return Err(Error::Configuration {
                file: file.to_owned(),
                option: option.to_owned(),
            });
        }

        let slash = match option.rfind('/') {
            Some(slash) => slash,
            None => {
                return Ok(PackageOption {
                    import_path: None,
                    package: option,
                })
            }
        };

        let (import_path, package) = match option.split_once(';') {
            Some((import_path, "")) => (import_path, base(import_path)),
            Some((import_path, package)) => (import_path, package),
            None => (option, &option[slash + 1..]),
        };

        Ok(PackageOption {
            import_path: Some(import_path).filter(|path| !path.is_empty()),
            package,
        })
    }
}

/// Resolves the output package and file path of `file`.
pub fn resolve(file: &InterfaceFile) -> Result<ResolvedNaming> {
    let file_name = generated_file_name(&file.name);

    let naming = if let Some(option) = &file.package_option {
        let option = PackageOption::parse(&file.name, option)?;
        let output_file_path = match option.import_path {
            Some(import_path) => join(import_path, base(&file_name)),
            None => file_name,
        };
        ResolvedNaming {
            output_package: option.package.to_owned(),
            output_file_path,
        }
    } else if let Some(package) = &file.package {
        ResolvedNaming {
            output_package: package.clone(),
            output_file_path: file_name,
        }
    } else {
        ResolvedNaming {
            output_package: base_name(&file.name).to_owned(),
            output_file_path: file_name,
        }
    };

    trace!(
        "file: {:?}, package: {:?}, output: {:?}",
        file.name,
        naming.output_package,
        naming.output_file_path
    );
    Ok(naming)
}

/// Replaces a recognized `.proto` extension of `name` with the generated suffix.
fn generated_file_name(name: &str) -> String {
    let stem = SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name);
    format!("{}{}", stem, GENERATED_SUFFIX)
}

/// The last `/`-separated component of `path`.
fn base(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The last path component of `name`, with its last dotted suffix removed.
fn base_name(name: &str) -> &str {
    let name = base(name);
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{}/{}", dir, name)
    }
}
