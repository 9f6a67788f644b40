use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use clap::Parser;
use ingress_directives::{AnnotationPrefix, ClusterResolver, ConfigRecord, ResourceId};
use k8s_openapi::api::core::v1::{Secret, Service};
use kube::runtime::reflector::{self, store::Writer};
use tokio::sync::RwLock;

use crate::args::DirectiveArgs;

/// Assembled records by ingress; the renderer reads from here.
#[derive(Clone, Default)]
pub struct RecordTable(Arc<RwLock<BTreeMap<ResourceId, ConfigRecord>>>);

impl RecordTable {
    pub async fn insert(&self, record: ConfigRecord) {
        self.0
            .write()
            .await
            .insert(record.resource().clone(), record);
    }

    pub async fn remove(&self, resource: &ResourceId) -> Option<ConfigRecord> {
        self.0.write().await.remove(resource)
    }

    /// Drops every record whose ingress is not in `live`, returning the
    /// dropped identities.
    pub async fn retain(&self, live: &BTreeSet<ResourceId>) -> Vec<ResourceId> {
        let mut records = self.0.write().await;
        let stale = records
            .keys()
            .filter(|resource| !live.contains(*resource))
            .cloned()
            .collect::<Vec<_>>();
        for resource in &stale {
            records.remove(resource);
        }
        stale
    }

    pub async fn len(&self) -> usize {
        self.0.read().await.len()
    }
}

#[derive(Clone)]
pub struct Context {
    pub args: DirectiveArgs,
    pub client: kube::Client,
    pub prefix: AnnotationPrefix,
    pub resolver: ClusterResolver,
    pub records: RecordTable,
}

/// Write halves of the resolver caches, fed by watchers in `main`.
pub struct CacheWriters {
    pub secrets: Writer<Secret>,
    pub services: Writer<Service>,
}

impl Context {
    pub async fn new() -> anyhow::Result<(Self, CacheWriters)> {
        let args = DirectiveArgs::parse();
        let client = kube::Client::try_default().await?;
        let prefix = AnnotationPrefix::new(args.annotations_prefix.clone());

        let (secrets, secrets_writer) = reflector::store::<Secret>();
        let (services, services_writer) = reflector::store::<Service>();
        let default_backend = args
            .default_backend_service
            .clone()
            .map(|service| (service, args.default_backend_port));
        let resolver = ClusterResolver::new(secrets, services, default_backend);

        Ok((
            Context {
                args,
                client,
                prefix,
                resolver,
                records: RecordTable::default(),
            },
            CacheWriters {
                secrets: secrets_writer,
                services: services_writer,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use ingress_directives::{
        AnnotationPrefix, AnnotationSet, DEFAULT_REGISTRY, MockResolver, ResourceId, evaluate,
    };

    use super::RecordTable;

    async fn table_with(names: &[&str]) -> RecordTable {
        let table = RecordTable::default();
        for name in names {
            let annotations = AnnotationSet::new(
                AnnotationPrefix::default(),
                ResourceId::new("default", *name),
                BTreeMap::new(),
            );
            let record = evaluate(DEFAULT_REGISTRY, &annotations, &MockResolver::new()).unwrap();
            table.insert(record).await;
        }
        table
    }

    #[tokio::test]
    async fn retain_drops_unknown_ingresses() {
        let table = table_with(&["foo", "bar", "baz"]).await;
        let live = BTreeSet::from([ResourceId::new("default", "bar")]);
        let dropped = table.retain(&live).await;
        assert_eq!(
            dropped,
            vec![ResourceId::new("default", "baz"), ResourceId::new("default", "foo")]
        );
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn remove_returns_previous_record() {
        let table = table_with(&["foo"]).await;
        let foo = ResourceId::new("default", "foo");
        assert!(table.remove(&foo).await.is_some());
        assert!(table.remove(&foo).await.is_none());
        assert_eq!(table.len().await, 0);
    }
}
