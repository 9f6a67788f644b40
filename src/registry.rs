use crate::directive::ErasedDirective;
use crate::directives::{
    auth_tls::{AUTH_TLS_VERIFY_DEPTH, AuthTlsSecret, AuthTlsVerifyClient},
    backend::DefaultBackend,
    proxy::{
        PROXY_CONNECT_TIMEOUT, PROXY_NEXT_UPSTREAM_TRIES, PROXY_READ_TIMEOUT, PROXY_SEND_TIMEOUT,
        ProxyBodySize,
    },
    proxy_intercept_errors::{CustomHttpErrors, PROXY_INTERCEPT_ERRORS},
    ssl::{AllowlistSourceRange, FORCE_SSL_REDIRECT, SSL_REDIRECT},
};

/// How a directive failure affects the rest of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// The error aborts the whole record.
    Required,
    /// The error is logged and the directive's fallback is used.
    Optional,
}

#[derive(Clone, Copy)]
pub struct Registered {
    pub policy: Policy,
    pub directive: &'static dyn ErasedDirective,
}

impl Registered {
    pub const fn required(directive: &'static dyn ErasedDirective) -> Self {
        Self {
            policy: Policy::Required,
            directive,
        }
    }

    pub const fn optional(directive: &'static dyn ErasedDirective) -> Self {
        Self {
            policy: Policy::Optional,
            directive,
        }
    }

    pub fn name(&self) -> &'static str {
        self.directive.directive_name()
    }
}

impl std::fmt::Debug for Registered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registered")
            .field("name", &self.name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Directives evaluated for every ingress.
///
/// Access control and backend overrides are required: applying an ingress
/// without them would expose or misroute traffic.
pub static DEFAULT_REGISTRY: &[Registered] = &[
    Registered::optional(&PROXY_INTERCEPT_ERRORS),
    Registered::optional(&CustomHttpErrors),
    Registered::optional(&PROXY_CONNECT_TIMEOUT),
    Registered::optional(&PROXY_READ_TIMEOUT),
    Registered::optional(&PROXY_SEND_TIMEOUT),
    Registered::optional(&ProxyBodySize),
    Registered::optional(&PROXY_NEXT_UPSTREAM_TRIES),
    Registered::optional(&SSL_REDIRECT),
    Registered::optional(&FORCE_SSL_REDIRECT),
    Registered::required(&AllowlistSourceRange),
    Registered::required(&DefaultBackend),
    Registered::required(&AuthTlsSecret),
    Registered::optional(&AuthTlsVerifyClient),
    Registered::optional(&AUTH_TLS_VERIFY_DEPTH),
];
