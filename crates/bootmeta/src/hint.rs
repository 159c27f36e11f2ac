//! Hint value providers.
//!
//! The metadata format declares a closed set of provider kinds. This module
//! parses each provider ref into a tagged union carrying the kind's declared
//! parameters. Actually producing candidates for `class-reference`,
//! `handle-as` and friends needs a type system, so the resolution strategy is
//! delegated to external collaborators; `any` and `spring-bean-reference`
//! carry nothing actionable at this layer.

use serde_json::Value;
use thiserror::Error;

use crate::model::{HintMetadata, ProviderRef, ValueHint};
use crate::name::PropertyName;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Any,
    ClassReference,
    HandleAs,
    LoggerName,
    SpringBeanReference,
    SpringProfileName,
}

/// A parsed value-provider descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueProvider {
    /// Permits any additional value on top of the literal hint values.
    Any,
    /// Candidates are class names assignable to `target`.
    ClassReference {
        target: Option<String>,
        /// When true, only concrete (instantiable) classes qualify.
        concrete: bool,
    },
    /// Treat the property as if it were of type `target`.
    HandleAs { target: String },
    /// Candidates are logger names (and logger groups when `group` is set).
    LoggerName { group: bool },
    /// Candidates are bean names assignable to `target`.
    SpringBeanReference { target: Option<String> },
    /// Candidates are profile names from the project configuration.
    SpringProfileName,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown value provider '{0}'")]
    UnknownKind(String),
    #[error("value provider '{kind}' is missing required parameter '{parameter}'")]
    MissingParameter {
        kind: &'static str,
        parameter: &'static str,
    },
}

impl ValueProvider {
    /// Parse one `providers` entry. Unknown kinds and missing required
    /// parameters are errors; the caller decides whether to skip or abort
    /// (index ingestion skips with a warning).
    pub fn from_ref(provider: &ProviderRef) -> Result<Self, ProviderError> {
        match provider.name.as_str() {
            "any" => Ok(Self::Any),
            "class-reference" => Ok(Self::ClassReference {
                target: string_parameter(provider, "target"),
                concrete: bool_parameter(provider, "concrete").unwrap_or(true),
            }),
            "handle-as" => {
                let target = string_parameter(provider, "target").ok_or(
                    ProviderError::MissingParameter {
                        kind: "handle-as",
                        parameter: "target",
                    },
                )?;
                Ok(Self::HandleAs { target })
            }
            "logger-name" => Ok(Self::LoggerName {
                group: bool_parameter(provider, "group").unwrap_or(true),
            }),
            "spring-bean-reference" => Ok(Self::SpringBeanReference {
                target: string_parameter(provider, "target"),
            }),
            "spring-profile-name" => Ok(Self::SpringProfileName),
            other => Err(ProviderError::UnknownKind(other.to_string())),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Any => ProviderKind::Any,
            Self::ClassReference { .. } => ProviderKind::ClassReference,
            Self::HandleAs { .. } => ProviderKind::HandleAs,
            Self::LoggerName { .. } => ProviderKind::LoggerName,
            Self::SpringBeanReference { .. } => ProviderKind::SpringBeanReference,
            Self::SpringProfileName => ProviderKind::SpringProfileName,
        }
    }
}

fn string_parameter(provider: &ProviderRef, key: &str) -> Option<String> {
    match provider.parameters.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn bool_parameter(provider: &ProviderRef, key: &str) -> Option<bool> {
    match provider.parameters.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    }
}

/// A hint as stored in the index: its name, literal value hints, and the
/// providers that parsed cleanly.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataHint {
    name: PropertyName,
    values: Vec<ValueHint>,
    providers: Vec<ValueProvider>,
}

impl MetadataHint {
    pub(crate) fn from_metadata(name: PropertyName, metadata: HintMetadata) -> Self {
        let mut providers = Vec::with_capacity(metadata.providers.len());
        for provider in &metadata.providers {
            match ValueProvider::from_ref(provider) {
                Ok(parsed) => providers.push(parsed),
                Err(err) => {
                    tracing::warn!(hint = %name, %err, "skipping invalid value provider");
                }
            }
        }
        Self {
            name,
            values: metadata.values,
            providers,
        }
    }

    #[must_use]
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[ValueHint] {
        &self.values
    }

    #[must_use]
    pub fn providers(&self) -> &[ValueProvider] {
        &self.providers
    }
}
