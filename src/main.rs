use std::{collections::BTreeSet, sync::Arc, time::Duration};

use futures::StreamExt;
use ingress_directives::{
    AnnotationPrefix, AnnotationSet, DEFAULT_REGISTRY, Resolver, ResourceId, consts,
    err::{OperatorError, OperatorResult},
    evaluate,
};
use k8s_openapi::api::{
    core::v1::{Secret, Service},
    networking::v1::Ingress,
};
use kube::{
    Api, ResourceExt,
    runtime::{
        Controller, WatchStreamExt, controller::Action, reflector, reflector::Store, watcher,
    },
};

use crate::ctx::RecordTable;

mod args;
mod ctx;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

fn matches_class(ingress: &Ingress, class: Option<&String>) -> bool {
    let Some(class) = class else {
        return true;
    };
    ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.ingress_class_name.as_ref())
        == Some(class)
}

fn ingress_id(ingress: &Ingress) -> ResourceId {
    ResourceId::new(ingress.namespace().unwrap_or_default(), ingress.name_any())
}

/// Brings the record of one ingress up to date.
///
/// Ingresses outside the class lose their record. A record that needed a
/// lookup before the caches synced is not stored; the previous one stays.
async fn sync_record(
    records: &RecordTable,
    ingress: &Ingress,
    class: Option<&String>,
    prefix: &AnnotationPrefix,
    resolver: &dyn Resolver,
) -> OperatorResult<Action> {
    if !matches_class(ingress, class) {
        if records.remove(&ingress_id(ingress)).await.is_some() {
            tracing::info!("Ingress left the class, record dropped");
        } else {
            tracing::debug!("Skipping ingress of another class");
        }
        return Ok(Action::await_change());
    }

    let annotations = AnnotationSet::from_resource(ingress, prefix.clone());
    let record = evaluate(DEFAULT_REGISTRY, &annotations, resolver)?;
    if let Some(warning) = record.unsynced_lookup() {
        return Err(OperatorError::CacheNotSynced {
            resource: record.resource().clone(),
            directive: warning.directive,
        });
    }
    tracing::debug!("Configuration record: {}", serde_json::to_string(&record)?);
    tracing::info!(
        directives = record.values().len(),
        warnings = record.warnings().len(),
        "Ingress configured"
    );
    records.insert(record).await;

    Ok(Action::requeue(Duration::from_secs(300)))
}

#[tracing::instrument(skip(ingress, ctx), fields(ingress = ingress.name_any(), namespace = ingress.namespace()), err)]
pub async fn reconcile(ingress: Arc<Ingress>, ctx: Arc<ctx::Context>) -> OperatorResult<Action> {
    sync_record(
        &ctx.records,
        &ingress,
        ctx.args.ingress_class.as_ref(),
        &ctx.prefix,
        &ctx.resolver,
    )
    .await
}

#[tracing::instrument(skip(obj, err, _ctx), fields(ingress = obj.name_any()))]
fn on_error(obj: Arc<Ingress>, err: &OperatorError, _ctx: Arc<ctx::Context>) -> Action {
    match err {
        OperatorError::EvaluationError(err) => {
            // Previous record stays in place until the annotation is fixed.
            tracing::error!(key = err.source.key(), "Ingress left unconfigured: {err}");
        }
        OperatorError::CacheNotSynced { .. } => tracing::warn!("{err}"),
        err => tracing::error!("Reconciliation failed: {err}"),
    }
    Action::requeue(Duration::from_secs(30))
}

/// Ingresses in `store` that this operator keeps records for.
fn live_ingresses(store: &Store<Ingress>, class: Option<&String>) -> BTreeSet<ResourceId> {
    store
        .state()
        .iter()
        .filter(|ingress| matches_class(ingress, class))
        .map(|ingress| ingress_id(ingress))
        .collect()
}

/// Periodically drops records of ingresses that were deleted.
async fn prune_records(ctx: Arc<ctx::Context>, ingresses: Store<Ingress>) {
    if ingresses.wait_until_ready().await.is_err() {
        tracing::error!("Ingress store dropped before it became ready");
        return;
    }
    loop {
        tokio::time::sleep(PRUNE_INTERVAL).await;
        let live = live_ingresses(&ingresses, ctx.args.ingress_class.as_ref());
        for resource in ctx.records.retain(&live).await {
            tracing::info!(ingress = %resource, "Ingress deleted, record dropped");
        }
        tracing::debug!(records = ctx.records.len().await, "Records pruned");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (ctx, caches) = ctx::Context::new().await?;
    let ctx = Arc::new(ctx);
    tracing_subscriber::fmt()
        .with_max_level(ctx.args.log_level)
        .init();
    tracing::info!("Starting {}", consts::CONTROLLER_NAME);
    tracing::info!("CLI argument: {:?}", ctx.args);

    let secrets_watcher = reflector(
        caches.secrets,
        watcher(Api::<Secret>::all(ctx.client.clone()), watcher::Config::default()),
    )
    .default_backoff()
    .touched_objects()
    .for_each(|_| futures::future::ready(()));

    let services_watcher = reflector(
        caches.services,
        watcher(Api::<Service>::all(ctx.client.clone()), watcher::Config::default()),
    )
    .default_backoff()
    .touched_objects()
    .for_each(|_| futures::future::ready(()));

    // Ingresses are only reconciled once both caches hold a full listing.
    let operator = async {
        if let Err(err) = ctx.resolver.wait_until_synced().await {
            tracing::error!("Caches never synced: {err}");
            return;
        }
        tracing::info!("Secret and service caches synced");

        let controller = Controller::new(
            Api::<Ingress>::all(ctx.client.clone()),
            watcher::Config::default(),
        );
        let pruner = prune_records(ctx.clone(), controller.store());
        let ingress_controller = controller
            .run(reconcile, on_error, ctx.clone())
            .for_each(|_| futures::future::ready(()));

        tokio::select! {
            _ = pruner => {
                tracing::error!("Record pruning exited unexpectedly");
            },
            _ = ingress_controller => {
                tracing::error!("Ingress controller task exited unexpectedly");
            },
        }
    };

    tokio::select! {
        _ = secrets_watcher => {
            tracing::error!("Secret watcher exited unexpectedly");
        },
        _ = services_watcher => {
            tracing::error!("Service watcher exited unexpectedly");
        },
        _ = operator => {},
    }

    Ok(())
}
