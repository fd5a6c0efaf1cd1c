//! Arguments of the `execute-python` tool.

use std::borrow::Cow;

use rmcp::schemars::{self, JsonSchema, Schema, SchemaGenerator};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RequestError;

/// Parameters advertised for `execute-python`.
///
/// This type supplies the published JSON schema. Incoming arguments are decoded
/// through [`ToolArguments`] and [`ExecutePythonRequest::from_arguments`] so a
/// malformed call becomes a tool error result instead of a protocol error.
#[derive(Debug, JsonSchema)]
pub struct ExecutePythonParams {
    /// The Python code to execute
    pub code: String,

    /// Comma-separated list of Python modules to install. If your code requires
    /// external modules, we will install the modules before trying to run the python code.
    pub modules: Option<String>,
}

/// Raw tool arguments, accepted in any shape and validated afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(pub Value);

impl ToolArguments {
    /// Returns the wrapped JSON value.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl JsonSchema for ToolArguments {
    fn schema_name() -> Cow<'static, str> {
        ExecutePythonParams::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ExecutePythonParams::json_schema(generator)
    }
}

/// A validated `execute-python` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutePythonRequest {
    /// Python source, written to the script file verbatim.
    pub code: String,
    /// Packages to pip-install before running, in order.
    pub modules: Vec<String>,
}

impl ExecutePythonRequest {
    /// Creates a request with no modules.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            modules: Vec::new(),
        }
    }

    /// Sets the modules from a comma-separated list.
    #[must_use]
    pub fn with_modules(mut self, modules: &str) -> Self {
        self.modules = parse_modules(modules);
        self
    }

    /// Validates untyped tool arguments.
    ///
    /// A non-string `modules` value is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::InvalidArguments` if `arguments` is not an object and
    /// `RequestError::MissingCode` if `code` is absent or not a string.
    pub fn from_arguments(arguments: Value) -> Result<Self, RequestError> {
        let Value::Object(mut map) = arguments else {
            return Err(RequestError::InvalidArguments);
        };

        let code = match map.remove("code") {
            Some(Value::String(code)) => code,
            _ => return Err(RequestError::MissingCode),
        };

        let modules = match map.get("modules") {
            Some(Value::String(modules)) => parse_modules(modules),
            _ => Vec::new(),
        };

        Ok(Self { code, modules })
    }
}

/// Splits a comma-separated module list, trimming entries and dropping empty ones.
#[must_use]
pub fn parse_modules(modules: &str) -> Vec<String> {
    modules
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
