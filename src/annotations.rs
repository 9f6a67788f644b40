use std::{collections::BTreeMap, fmt};

use kube::{Resource, ResourceExt};
use serde::Serialize;

use crate::consts;

/// Namespace prefix shared by all directive keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPrefix(String);

impl AnnotationPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins the prefix with a directive name. Every annotation key this
    /// crate reads is built here.
    pub fn key(&self, name: &str) -> AnnotationKey {
        AnnotationKey(format!("{}/{}", self.0, name))
    }
}

impl Default for AnnotationPrefix {
    fn default() -> Self {
        Self::new(consts::DEFAULT_ANNOTATIONS_PREFIX)
    }
}

/// Full key under the default prefix.
pub fn annotation_with_prefix(name: &str) -> String {
    AnnotationPrefix::default().key(name).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationKey(String);

impl AnnotationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the resource an annotation set was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read-only view over one resource's annotations.
///
/// Lookups take the bare directive name; the prefix is applied internally.
/// A key that is absent yields `None`, while a key set to `""` yields
/// `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    prefix: AnnotationPrefix,
    resource: ResourceId,
    annotations: BTreeMap<String, String>,
}

impl AnnotationSet {
    pub fn new(
        prefix: AnnotationPrefix,
        resource: ResourceId,
        annotations: BTreeMap<String, String>,
    ) -> Self {
        Self {
            prefix,
            resource,
            annotations,
        }
    }

    /// Never fails: a resource without annotations gives an empty set and a
    /// cluster scoped one an empty namespace.
    pub fn from_resource<K>(resource: &K, prefix: AnnotationPrefix) -> Self
    where
        K: Resource,
    {
        Self {
            prefix,
            resource: ResourceId::new(resource.namespace().unwrap_or_default(), resource.name_any()),
            annotations: resource.annotations().clone(),
        }
    }

    pub fn key(&self, name: &str) -> AnnotationKey {
        self.prefix.key(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_raw(name).is_some()
    }

    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.annotations
            .get(self.key(name).as_str())
            .map(String::as_str)
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::networking::v1::Ingress;
    use kube::api::ObjectMeta;
    use rstest::rstest;

    use super::{AnnotationPrefix, AnnotationSet, ResourceId, annotation_with_prefix};

    #[rstest]
    #[case("nginx.ingress.kubernetes.io", "nginx.ingress.kubernetes.io/ssl-redirect")]
    #[case("nginx.ingress.kubernetes.io/", "nginx.ingress.kubernetes.io/ssl-redirect")]
    #[case("custom.example.com", "custom.example.com/ssl-redirect")]
    fn prefix_joining(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(
            AnnotationPrefix::new(prefix).key("ssl-redirect").as_str(),
            expected
        );
    }

    #[test]
    fn default_prefix_helper() {
        assert_eq!(
            annotation_with_prefix("proxy-intercept-errors"),
            "nginx.ingress.kubernetes.io/proxy-intercept-errors"
        );
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        let set = AnnotationSet::new(
            AnnotationPrefix::default(),
            ResourceId::new("default", "foo"),
            BTreeMap::from([(annotation_with_prefix("ssl-redirect"), String::new())]),
        );
        assert!(set.has("ssl-redirect"));
        assert_eq!(set.get_raw("ssl-redirect"), Some(""));
        assert!(!set.has("force-ssl-redirect"));
        assert_eq!(set.get_raw("force-ssl-redirect"), None);
    }

    #[test]
    fn unprefixed_keys_are_ignored() {
        let set = AnnotationSet::new(
            AnnotationPrefix::default(),
            ResourceId::default(),
            BTreeMap::from([("ssl-redirect".to_string(), "false".to_string())]),
        );
        assert!(!set.has("ssl-redirect"));
    }

    #[test]
    fn from_resource_without_metadata() {
        let ingress = Ingress::default();
        let set = AnnotationSet::from_resource(&ingress, AnnotationPrefix::default());
        assert!(set.is_empty());
        assert_eq!(set.resource(), &ResourceId::default());
    }

    #[test]
    fn from_resource_reads_identity() {
        let ingress = Ingress {
            metadata: ObjectMeta {
                name: Some("foo".into()),
                namespace: Some("default".into()),
                annotations: Some(BTreeMap::from([(
                    "custom.example.com/ssl-redirect".to_string(),
                    "false".to_string(),
                )])),
                ..ObjectMeta::default()
            },
            ..Ingress::default()
        };
        let set = AnnotationSet::from_resource(&ingress, AnnotationPrefix::new("custom.example.com"));
        assert_eq!(set.resource().to_string(), "default/foo");
        assert_eq!(set.get_raw("ssl-redirect"), Some("false"));
    }
}
