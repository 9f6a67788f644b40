//! Client certificate authentication.

use crate::{
    annotations::AnnotationKey,
    coerce, consts,
    directive::{Directive, ParseContext, WhenAbsent},
    directives::Integer,
    err::{DirectiveError, DirectiveResult},
    resolver::SecretRef,
};

pub const VERIFY_CLIENT_MODES: &[&str] = &["on", "off", "optional", "optional_no_ca"];

pub const AUTH_TLS_VERIFY_DEPTH: Integer = Integer {
    name: consts::AUTH_TLS_VERIFY_DEPTH,
    default: 1,
    min: 1,
};

/// `auth-tls-secret`: `namespace/name` of a secret carrying `ca.crt`.
#[derive(Debug, Clone, Copy)]
pub struct AuthTlsSecret;

impl Directive for AuthTlsSecret {
    type Value = Option<SecretRef>;

    fn name(&self) -> &'static str {
        consts::AUTH_TLS_SECRET
    }

    fn when_absent(&self) -> WhenAbsent<Option<SecretRef>> {
        WhenAbsent::Default(None)
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Option<SecretRef>> {
        let target = coerce::object_name(key, raw, &ctx.annotations.resource().namespace)?;
        let secret = ctx
            .resolver
            .get_secret(&target.namespace, &target.name)
            .map_err(|err| DirectiveError::from_lookup(key, err))?;
        if !secret.has_key(consts::CA_CERT_KEY) {
            return Err(DirectiveError::validation(
                key,
                format!("secret {target} has no {} entry", consts::CA_CERT_KEY),
            ));
        }
        Ok(Some(secret))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthTlsVerifyClient;

impl Directive for AuthTlsVerifyClient {
    type Value = String;

    fn name(&self) -> &'static str {
        consts::AUTH_TLS_VERIFY_CLIENT
    }

    fn when_absent(&self) -> WhenAbsent<String> {
        WhenAbsent::Default("on".to_string())
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<String> {
        coerce::one_of(key, raw, VERIFY_CLIENT_MODES).map(str::to_string)
    }
}
