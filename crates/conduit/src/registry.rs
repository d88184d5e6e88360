//! Registry of application methods bound for calls from the UI surface.
//!
//! Methods are registered once through [`BindingsBuilder`] while the
//! application starts, then frozen into an immutable [`Bindings`] table that
//! request handlers share through an `Arc`. Every method is reachable both by
//! a stable numeric id and by its structural [`MethodSignature`]; the two
//! indices hold the same `Arc<BoundMethod>`, so they cannot disagree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use conduit_types::MethodSignature;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// A method result awaiting JSON encoding.
///
/// Implemented for every serialisable value so handlers can return their
/// own types; encoding is deferred to the correlator so that failures become
/// error outcomes.
pub trait CallResult: Send + fmt::Debug {
    /// Encodes the result as JSON text.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error when the value cannot be represented.
    fn to_json(&self) -> serde_json::Result<String>;
}

impl<T> CallResult for T
where
    T: Serialize + Send + fmt::Debug,
{
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outcome of invoking a bound method. `Ok(None)` means "no result".
pub type MethodResult = Result<Option<Box<dyn CallResult>>, MethodError>;

/// Wraps a value as a successful method result.
pub fn reply<T>(value: T) -> MethodResult
where
    T: Serialize + Send + fmt::Debug + 'static,
{
    Ok(Some(Box::new(value)))
}

type Handler = dyn Fn(&[Value]) -> MethodResult + Send + Sync;

/// Errors reported by a bound method.
#[derive(Debug, Error)]
pub enum MethodError {
    /// The call supplied the wrong number of arguments.
    #[error("{method} expects {expected} arguments, received {received}")]
    ArgumentCount {
        method: String,
        expected: usize,
        received: usize,
    },

    /// The method ran and failed.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MethodError {
    /// Creates a failure without an underlying source.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure wrapping an underlying source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Errors raised while populating the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Id `0` means "resolve by signature" and cannot be bound.
    #[error("method id 0 is reserved (method {signature})")]
    ReservedId { signature: String },

    /// Two methods claimed the same numeric id.
    #[error("method id {id} of {incoming} is already bound to {existing}")]
    DuplicateId {
        id: u32,
        existing: String,
        incoming: String,
    },

    /// The same signature was bound twice.
    #[error("method {signature} is already bound")]
    DuplicateSignature { signature: String },
}

/// Computes the default numeric id for a signature.
///
/// The id is the 32-bit FNV-1a hash of the canonical dotted name, remapped
/// away from the reserved value `0`.
#[must_use]
pub fn method_id(signature: &MethodSignature) -> u32 {
    let hash = signature
        .canonical_name()
        .bytes()
        .fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
        });
    hash.max(1)
}

/// An application method callable from the UI surface.
pub struct BoundMethod {
    id: u32,
    signature: MethodSignature,
    arity: Option<usize>,
    handler: Box<Handler>,
}

impl BoundMethod {
    /// Binds a handler under a signature, using the hashed default id.
    pub fn new<F>(signature: MethodSignature, handler: F) -> Self
    where
        F: Fn(&[Value]) -> MethodResult + Send + Sync + 'static,
    {
        Self {
            id: method_id(&signature),
            signature,
            arity: None,
            handler: Box::new(handler),
        }
    }

    /// Overrides the numeric id.
    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Declares the exact number of arguments the method accepts.
    #[must_use]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Returns the numeric id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the structural signature.
    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Invokes the method with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::ArgumentCount`] when an arity was declared and
    /// does not match, otherwise whatever the handler reports.
    pub fn call(&self, args: &[Value]) -> MethodResult {
        if let Some(expected) = self.arity
            && expected != args.len()
        {
            return Err(MethodError::ArgumentCount {
                method: self.signature.canonical_name(),
                expected,
                received: args.len(),
            });
        }
        (self.handler)(args)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BoundMethod")
            .field("id", &self.id)
            .field("signature", &self.signature.canonical_name())
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for BoundMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}#{}", self.signature, self.id)
    }
}

/// Immutable lookup table of bound methods.
#[derive(Debug, Default)]
pub struct Bindings {
    by_id: HashMap<u32, Arc<BoundMethod>>,
    by_signature: HashMap<MethodSignature, Arc<BoundMethod>>,
}

impl Bindings {
    /// Starts populating a new table.
    #[must_use]
    pub fn builder() -> BindingsBuilder {
        BindingsBuilder::default()
    }

    /// Looks a method up by numeric id.
    #[must_use]
    pub fn get_by_id(&self, id: u32) -> Option<Arc<BoundMethod>> {
        self.by_id.get(&id).cloned()
    }

    /// Looks a method up by structural signature.
    #[must_use]
    pub fn get(&self, signature: &MethodSignature) -> Option<Arc<BoundMethod>> {
        self.by_signature.get(signature).cloned()
    }

    /// Returns the number of bound methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns whether no method is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Collects methods before freezing them into [`Bindings`].
#[derive(Debug, Default)]
pub struct BindingsBuilder {
    bindings: Bindings,
}

impl BindingsBuilder {
    /// Registers a method.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the id is reserved or when the id or
    /// signature is already taken. The builder is left unchanged on error.
    pub fn bind(&mut self, method: BoundMethod) -> Result<&mut Self, RegistryError> {
        let incoming = method.signature.canonical_name();
        if method.id == 0 {
            return Err(RegistryError::ReservedId {
                signature: incoming,
            });
        }
        if let Some(existing) = self.bindings.by_id.get(&method.id) {
            return Err(RegistryError::DuplicateId {
                id: method.id,
                existing: existing.signature.canonical_name(),
                incoming,
            });
        }
        if self.bindings.by_signature.contains_key(&method.signature) {
            return Err(RegistryError::DuplicateSignature {
                signature: incoming,
            });
        }

        let method = Arc::new(method);
        self.bindings
            .by_signature
            .insert(method.signature.clone(), Arc::clone(&method));
        self.bindings.by_id.insert(method.id, method);
        Ok(self)
    }

    /// Freezes the registered methods.
    #[must_use]
    pub fn build(self) -> Bindings {
        self.bindings
    }
}
