use std::{collections::BTreeMap, fmt::Display};

use serde::{Serialize, Serializer};

use crate::{
    annotations::{AnnotationSet, ResourceId},
    directive::ParsedValue,
    err::{DirectiveError, EvaluationError, ResolverError},
    registry::{Policy, Registered},
    resolver::Resolver,
};

fn display<S: Serializer>(value: &impl Display, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Optional directive that failed and the value used in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveWarning {
    pub directive: &'static str,
    #[serde(serialize_with = "display")]
    pub error: DirectiveError,
    pub fallback: Option<ParsedValue>,
}

/// Parsed directives of a single resource, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRecord {
    resource: ResourceId,
    values: BTreeMap<&'static str, ParsedValue>,
    warnings: Vec<DirectiveWarning>,
}

impl ConfigRecord {
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn get(&self, directive: &str) -> Option<&ParsedValue> {
        self.values.get(directive)
    }

    pub fn values(&self) -> &BTreeMap<&'static str, ParsedValue> {
        &self.values
    }

    pub fn warnings(&self) -> &[DirectiveWarning] {
        &self.warnings
    }

    /// First warning caused by the resolver cache not being synced yet.
    /// Such a record reflects startup state, not the ingress.
    pub fn unsynced_lookup(&self) -> Option<&DirectiveWarning> {
        self.warnings.iter().find(|warning| {
            matches!(
                warning.error,
                DirectiveError::ResolverLookupFailed {
                    source: ResolverError::NotSynced,
                    ..
                }
            )
        })
    }
}

/// Runs every directive of `registry` against one resource.
///
/// A failing required directive aborts with the resource identity attached.
/// A failing optional directive is replaced by its fallback, or left out
/// when it has none, and reported in [`ConfigRecord::warnings`].
pub fn evaluate(
    registry: &[Registered],
    annotations: &AnnotationSet,
    resolver: &dyn Resolver,
) -> Result<ConfigRecord, EvaluationError> {
    let mut values = BTreeMap::new();
    let mut warnings = vec![];

    for entry in registry {
        let name = entry.name();
        let err = match entry.directive.parse_erased(annotations, resolver) {
            Ok(value) => {
                values.insert(name, value);
                continue;
            }
            Err(err) => err,
        };
        match entry.policy {
            Policy::Required => {
                return Err(EvaluationError {
                    resource: annotations.resource().clone(),
                    source: err,
                });
            }
            Policy::Optional => {
                let fallback = entry.directive.fallback_erased();
                tracing::warn!(
                    resource = %annotations.resource(),
                    key = err.key(),
                    fallback = ?fallback,
                    "Ignoring invalid directive: {err}"
                );
                if let Some(value) = &fallback {
                    values.insert(name, value.clone());
                }
                warnings.push(DirectiveWarning {
                    directive: name,
                    error: err,
                    fallback,
                });
            }
        }
    }

    Ok(ConfigRecord {
        resource: annotations.resource().clone(),
        values,
        warnings,
    })
}
