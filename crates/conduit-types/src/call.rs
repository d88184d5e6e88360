//! Options for invoking a bound application method.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structural descriptor identifying a bound method by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodSignature {
    /// Package (or module) that owns the receiver.
    pub package_name: String,
    /// Receiver type name.
    pub struct_name: String,
    /// Method name on the receiver.
    pub method_name: String,
}

impl MethodSignature {
    /// Builds a signature from its three name components.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        struct_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            struct_name: struct_name.into(),
            method_name: method_name.into(),
        }
    }

    /// Returns the dotted name, omitting empty components.
    ///
    /// ```
    /// use conduit_types::MethodSignature;
    ///
    /// let signature = MethodSignature::new("main", "Greeter", "Greet");
    /// assert_eq!(signature.canonical_name(), "main.Greeter.Greet");
    /// ```
    #[must_use]
    pub fn canonical_name(&self) -> String {
        [
            self.package_name.as_str(),
            self.struct_name.as_str(),
            self.method_name.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.canonical_name())
    }
}

/// Options decoded for a `Call.Call` request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallOptions {
    /// Package (or module) that owns the receiver.
    pub package_name: String,
    /// Receiver type name.
    pub struct_name: String,
    /// Method name on the receiver.
    pub method_name: String,
    /// Positional arguments forwarded to the method.
    pub args: Vec<Value>,
}

impl CallOptions {
    /// Returns the structural signature described by these options.
    #[must_use]
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(
            self.package_name.clone(),
            self.struct_name.clone(),
            self.method_name.clone(),
        )
    }
}
