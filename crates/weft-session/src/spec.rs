//! Handler specification documents
//!
//! A handler is loaded and saved whole: metadata plus the entire `body`
//! tree. There is no field-level persistence.

use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use weft_ast::{duplicate_ids, Body};

/// Identifier of a stored handler document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Handler parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub optional: bool,
}

impl Param {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Named handler with its logic tree
///
/// Keys this crate does not model are carried in `extra` so a load/save
/// cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSpec {
    pub name: String,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub body: Body,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HandlerSpec {
    /// Empty async handler
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async: true,
            params: Vec::new(),
            return_type: None,
            body: Body::new(),
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Decode and validate a stored document
    ///
    /// # Errors
    /// - [`SpecError::Decode`] for malformed data or unknown node types
    /// - [`SpecError::DuplicateIds`] if the body breaks id uniqueness
    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        let spec: Self = serde_json::from_str(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the id-uniqueness invariant of the body
    ///
    /// # Errors
    /// Returns [`SpecError::DuplicateIds`] listing each repeated id.
    pub fn validate(&self) -> Result<(), SpecError> {
        let ids = duplicate_ids(&self.body);
        if ids.is_empty() {
            Ok(())
        } else {
            Err(SpecError::DuplicateIds { ids })
        }
    }

    /// Pretty JSON for storage
    ///
    /// # Errors
    /// Only fails if `extra` holds data serde cannot encode.
    pub fn to_json_string(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
