use std::collections::{BTreeMap, BTreeSet};

use super::{BackendRef, Resolver, SecretRef, ServiceRef};
use crate::{
    consts,
    err::{ResolverError, ResolverResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lookup {
    Secret,
    Service,
    DefaultBackend,
}

/// Deterministic resolver: every lookup succeeds with a canned object
/// named after the request, unless a failure was registered for it.
///
/// - secrets carry `ca.crt`, `tls.crt` and `tls.key`
/// - services expose port 80
/// - the default backend is `default/default-backend:80`
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    failures: BTreeMap<Lookup, ResolverError>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, lookup: Lookup, err: ResolverError) -> Self {
        self.failures.insert(lookup, err);
        self
    }

    fn check(&self, lookup: Lookup) -> ResolverResult<()> {
        match self.failures.get(&lookup) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Resolver for MockResolver {
    fn get_secret(&self, namespace: &str, name: &str) -> ResolverResult<SecretRef> {
        self.check(Lookup::Secret)?;
        Ok(SecretRef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            keys: BTreeSet::from([
                consts::CA_CERT_KEY.to_string(),
                "tls.crt".to_string(),
                "tls.key".to_string(),
            ]),
        })
    }

    fn get_service(&self, namespace: &str, name: &str) -> ResolverResult<ServiceRef> {
        self.check(Lookup::Service)?;
        Ok(ServiceRef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ports: vec![80],
        })
    }

    fn get_default_backend(&self) -> ResolverResult<BackendRef> {
        self.check(Lookup::DefaultBackend)?;
        Ok(BackendRef {
            namespace: "default".to_string(),
            service: "default-backend".to_string(),
            port: 80,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Lookup, MockResolver};
    use crate::{err::ResolverError, resolver::Resolver};

    #[test]
    fn failure_only_affects_its_lookup() {
        let resolver = MockResolver::new().failing(Lookup::Secret, ResolverError::NotSynced);
        assert_eq!(
            resolver.get_secret("default", "ca"),
            Err(ResolverError::NotSynced)
        );
        assert!(resolver.get_service("default", "svc").is_ok());
        assert!(resolver.get_default_backend().is_ok());
    }

    #[test]
    fn answers_are_stable() {
        let resolver = MockResolver::new();
        assert_eq!(
            resolver.get_service("default", "svc"),
            resolver.get_service("default", "svc")
        );
    }
}
