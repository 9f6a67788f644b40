//! Error interception: whether nginx hands upstream error responses to the
//! default backend, and which status codes it does so for.

use crate::{
    annotations::AnnotationKey,
    coerce, consts,
    directive::{Directive, ParseContext, WhenAbsent},
    directives::Flag,
    err::{DirectiveError, DirectiveResult},
};

/// `proxy-intercept-errors`, off unless set.
pub const PROXY_INTERCEPT_ERRORS: Flag = Flag {
    name: consts::PROXY_INTERCEPT_ERRORS,
    default: false,
};

/// `custom-http-errors`: status codes in 400..=599. Intercepted responses
/// are served by the default backend, so one has to resolve.
#[derive(Debug, Clone, Copy)]
pub struct CustomHttpErrors;

impl Directive for CustomHttpErrors {
    type Value = Vec<u16>;

    fn name(&self) -> &'static str {
        consts::CUSTOM_HTTP_ERRORS
    }

    fn when_absent(&self) -> WhenAbsent<Vec<u16>> {
        WhenAbsent::Default(Vec::new())
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Vec<u16>> {
        let mut codes = vec![];
        for item in coerce::list(raw) {
            let code = u16::try_from(coerce::integer(key, &item)?)
                .ok()
                .filter(|code| (400..=599).contains(code))
                .ok_or_else(|| {
                    DirectiveError::validation(key, format!("{item} is not an error status code"))
                })?;
            codes.push(code);
        }
        codes.sort_unstable();
        codes.dedup();

        if !codes.is_empty() {
            let backend = ctx
                .resolver
                .get_default_backend()
                .map_err(|err| DirectiveError::from_lookup(key, err))?;
            tracing::debug!(
                "Custom errors {codes:?} will be served by {}/{}",
                backend.namespace,
                backend.service
            );
        }
        Ok(codes)
    }
}
