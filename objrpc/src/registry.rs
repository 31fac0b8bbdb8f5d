use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::message::{RegistryEntry, RemoteError};

/// A registered operation body. Receives the request's positional and
/// keyword arguments; whatever it returns (or fails with) crosses the wire.
pub type Handler =
    Box<dyn Fn(Vec<Value>, Map<String, Value>) -> Result<Value, RemoteError> + Send + Sync>;

struct Method {
    doc: String,
    handler: Handler,
}

/// The set of operations a server exposes.
///
/// Built before the server binds and immutable afterwards; only what is
/// explicitly registered here is remotely callable, so the dispatch loop and
/// the discovery handler are never part of the advertised surface.
#[derive(Default)]
pub struct Registry {
    methods: BTreeMap<String, Method>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation under `name` with its documentation string.
    ///
    /// Names starting with `_` are reserved for the protocol and rejected,
    /// as are empty and already-taken names.
    pub fn register<F>(&mut self, name: &str, doc: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(Vec<Value>, Map<String, Value>) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        if name.is_empty() || name.starts_with('_') {
            return Err(Error::ReservedName(name.to_string()));
        }
        if self.methods.contains_key(name) {
            return Err(Error::DuplicateMethod(name.to_string()));
        }
        self.methods.insert(
            name.to_string(),
            Method {
                doc: doc.to_string(),
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Case-sensitive exact lookup.
    pub fn resolve(&self, name: &str) -> Option<&Handler> {
        self.methods.get(name).map(|method| &method.handler)
    }

    /// Ordered `{name, doc}` snapshot advertised to clients.
    pub fn capabilities(&self) -> Vec<RegistryEntry> {
        self.methods
            .iter()
            .map(|(name, method)| RegistryEntry {
                name: name.clone(),
                doc: method.doc.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
