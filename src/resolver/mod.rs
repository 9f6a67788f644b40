//! Lookups of cluster objects that directives reference.
//!
//! Directives never reach for cluster state themselves. The caller hands a
//! [`Resolver`] to every parse call, so the same directive runs against the
//! reflector caches in the operator and against [`MockResolver`] in tests.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::Serialize;

use crate::err::ResolverResult;

mod cluster;
mod mock;

pub use cluster::ClusterResolver;
pub use mock::{Lookup, MockResolver};

pub trait Resolver: Send + Sync {
    fn get_secret(&self, namespace: &str, name: &str) -> ResolverResult<SecretRef>;
    fn get_service(&self, namespace: &str, name: &str) -> ResolverResult<ServiceRef>;
    fn get_default_backend(&self) -> ResolverResult<BackendRef>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
    /// Data keys present in the secret. Values are never copied out.
    pub keys: BTreeSet<String>,
}

impl SecretRef {
    pub fn has_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRef {
    pub namespace: String,
    pub name: String,
    pub ports: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendRef {
    pub namespace: String,
    pub service: String,
    pub port: i32,
}

/// `namespace/name` pair as written in flags and annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ObjectName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => Ok(Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            _ => Err(format!("expected namespace/name, got '{value}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::ObjectName;

    #[rstest]
    #[case("default/backend", Some(("default", "backend")))]
    #[case("backend", None)]
    #[case("/backend", None)]
    #[case("default/", None)]
    fn object_name(#[case] raw: &str, #[case] expected: Option<(&str, &str)>) {
        let parsed = ObjectName::from_str(raw).ok();
        assert_eq!(
            parsed.as_ref().map(|o| (o.namespace.as_str(), o.name.as_str())),
            expected
        );
    }
}
