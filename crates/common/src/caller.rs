//! Caller information for diagnostics
//!
//! Use the [`caller!`](crate::caller!) macro to capture where it was
//! invoked: module, enclosing function, source file and line.

use std::path::{Path, PathBuf};

/// Location of a call site. Write-once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    package: String,
    function: String,
    path: String,
    line: u32,
}

impl Caller {
    /// Build from the raw pieces the [`caller!`](crate::caller!) macro expands to.
    ///
    /// `function_path` is the type name of a marker fn declared inside the
    /// calling function, e.g. `my_crate::handlers::Team::create::__marker`.
    #[doc(hidden)]
    pub fn from_raw(module_path: &str, function_path: &str, path: &str, line: u32) -> Self {
        let function_path = function_path
            .strip_suffix("::__marker")
            .unwrap_or(function_path);
        let function_path = function_path.trim_end_matches("::{{closure}}");

        let function = function_path
            .strip_prefix(module_path)
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or("");
        let function = function.replace("::{{closure}}", "");

        let package = module_path.rsplit("::").next().unwrap_or(module_path);

        Self {
            package: package.to_string(),
            function,
            path: path.to_string(),
            line,
        }
    }

    /// Innermost module of the caller
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Function or method of the caller, relative to its module
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn line_number(&self) -> u32 {
        self.line
    }

    /// Source path of the caller.
    ///
    /// With a `basedir`, the path is rebuilt starting at the last component
    /// equal to it. A blank or absent `basedir`, or one that is not a
    /// component of the path, yields the full path.
    pub fn file_path(&self, basedir: Option<&str>) -> PathBuf {
        let full = PathBuf::from(&self.path);

        let directory = match basedir.map(str::trim) {
            Some(dir) if !dir.is_empty() => dir,
            _ => return full,
        };

        let components: Vec<_> = Path::new(&self.path).components().collect();
        match components
            .iter()
            .rposition(|c| c.as_os_str() == directory)
        {
            Some(start) => components[start..].iter().collect(),
            None => full,
        }
    }
}

/// Capture the current call site as a [`Caller`](crate::caller::Caller).
#[macro_export]
macro_rules! caller {
    () => {{
        fn __marker() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::caller::Caller::from_raw(
            module_path!(),
            __type_name_of(__marker),
            file!(),
            line!(),
        )
    }};
}
