//! Discovery filter over an object's `value`.
//!
//! A [`Schema`] is a JSON Schema document compiled once with the `jsonschema`
//! crate. Stores evaluate it against every candidate object during discovery;
//! records evaluate the same document before decoding.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::RecordError;

/// A compiled JSON Schema. Cloning shares the compiled validator.
#[derive(Clone)]
pub struct Schema {
    document: Arc<Value>,
    validator: Arc<jsonschema::Validator>,
}

impl Schema {
    /// Compile a JSON Schema document.
    pub fn compile(document: Value) -> Result<Self, RecordError> {
        let validator = jsonschema::options()
            .build(&document)
            .map_err(|e| RecordError::InvalidSchema(e.to_string()))?;

        Ok(Self {
            document: Arc::new(document),
            validator: Arc::new(validator),
        })
    }

    /// Schema admitting every JSON object.
    pub fn any_object() -> Result<Self, RecordError> {
        Self::compile(json!({ "type": "object" }))
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn matches(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}
