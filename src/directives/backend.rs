use crate::{
    annotations::AnnotationKey,
    coerce, consts,
    directive::{Directive, ParseContext, WhenAbsent},
    err::{DirectiveError, DirectiveResult},
    resolver::ServiceRef,
};

/// `default-backend`: a service in the ingress namespace that takes over
/// unmatched requests. It must exist and expose at least one port.
#[derive(Debug, Clone, Copy)]
pub struct DefaultBackend;

impl Directive for DefaultBackend {
    type Value = Option<ServiceRef>;

    fn name(&self) -> &'static str {
        consts::DEFAULT_BACKEND
    }

    fn when_absent(&self) -> WhenAbsent<Option<ServiceRef>> {
        WhenAbsent::Default(None)
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Option<ServiceRef>> {
        let namespace = &ctx.annotations.resource().namespace;
        let target = coerce::object_name(key, raw, namespace)?;
        if &target.namespace != namespace {
            return Err(DirectiveError::validation(
                key,
                format!("service {target} is outside of namespace {namespace}"),
            ));
        }
        let service = ctx
            .resolver
            .get_service(&target.namespace, &target.name)
            .map_err(|err| DirectiveError::from_lookup(key, err))?;
        if service.ports.is_empty() {
            return Err(DirectiveError::validation(
                key,
                format!("service {target} has no ports"),
            ));
        }
        Ok(Some(service))
    }
}
