use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use k8s_openapi::api::core::v1::{Secret, Service};
use kube::runtime::reflector::{ObjectRef, Store};

use super::{BackendRef, ObjectName, Resolver, SecretRef, ServiceRef};
use crate::err::{ResolverError, ResolverResult};

/// Resolver over the operator's reflector caches.
///
/// Lookups never hit the API server. Until [`ClusterResolver::mark_synced`]
/// is called every lookup fails with [`ResolverError::NotSynced`], so a
/// half-filled cache is not mistaken for a missing object.
#[derive(Clone)]
pub struct ClusterResolver {
    secrets: Store<Secret>,
    services: Store<Service>,
    default_backend: Option<(ObjectName, i32)>,
    synced: Arc<AtomicBool>,
}

impl ClusterResolver {
    pub fn new(
        secrets: Store<Secret>,
        services: Store<Service>,
        default_backend: Option<(ObjectName, i32)>,
    ) -> Self {
        Self {
            secrets,
            services,
            default_backend,
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Relaxed);
    }

    /// Resolves once both caches received their initial listing.
    pub async fn wait_until_synced(&self) -> ResolverResult<()> {
        for ready in [
            self.secrets.wait_until_ready().await,
            self.services.wait_until_ready().await,
        ] {
            ready.map_err(|err| ResolverError::Unavailable(err.to_string()))?;
        }
        self.mark_synced();
        Ok(())
    }

    fn ensure_synced(&self) -> ResolverResult<()> {
        if self.synced.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(ResolverError::NotSynced)
        }
    }
}

impl Resolver for ClusterResolver {
    fn get_secret(&self, namespace: &str, name: &str) -> ResolverResult<SecretRef> {
        self.ensure_synced()?;
        let secret = self
            .secrets
            .get(&ObjectRef::new(name).within(namespace))
            .ok_or_else(|| ResolverError::NotFound {
                kind: "secret",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;
        let keys = secret
            .data
            .iter()
            .flat_map(|data| data.keys())
            .chain(secret.string_data.iter().flat_map(|data| data.keys()))
            .cloned()
            .collect();
        Ok(SecretRef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            keys,
        })
    }

    fn get_service(&self, namespace: &str, name: &str) -> ResolverResult<ServiceRef> {
        self.ensure_synced()?;
        let service = self
            .services
            .get(&ObjectRef::new(name).within(namespace))
            .ok_or_else(|| ResolverError::NotFound {
                kind: "service",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;
        let ports = service
            .spec
            .as_ref()
            .and_then(|spec| spec.ports.as_ref())
            .map(|ports| ports.iter().map(|port| port.port).collect())
            .unwrap_or_default();
        Ok(ServiceRef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ports,
        })
    }

    fn get_default_backend(&self) -> ResolverResult<BackendRef> {
        let Some((backend, port)) = &self.default_backend else {
            return Err(ResolverError::NotFound {
                kind: "default backend",
                namespace: String::new(),
                name: String::new(),
            });
        };
        let service = self.get_service(&backend.namespace, &backend.name)?;
        if !service.ports.contains(port) {
            tracing::warn!(
                "Default backend {backend} does not expose port {port}, exposed ports: {:?}",
                service.ports
            );
        }
        Ok(BackendRef {
            namespace: service.namespace,
            service: service.name,
            port: *port,
        })
    }
}
