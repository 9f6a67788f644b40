/// Namespace prefix applied to every directive name unless the operator
/// is started with a different `--annotations-prefix`.
pub const DEFAULT_ANNOTATIONS_PREFIX: &str = "nginx.ingress.kubernetes.io";

/// Turns on `proxy_intercept_errors` for the generated locations.
pub const PROXY_INTERCEPT_ERRORS: &str = "proxy-intercept-errors";
/// Comma separated list of upstream status codes served by the default backend.
pub const CUSTOM_HTTP_ERRORS: &str = "custom-http-errors";

pub const PROXY_CONNECT_TIMEOUT: &str = "proxy-connect-timeout";
pub const PROXY_READ_TIMEOUT: &str = "proxy-read-timeout";
/// Falls back to [`PROXY_READ_TIMEOUT`] when it is not set.
pub const PROXY_SEND_TIMEOUT: &str = "proxy-send-timeout";
pub const PROXY_BODY_SIZE: &str = "proxy-body-size";
pub const PROXY_NEXT_UPSTREAM_TRIES: &str = "proxy-next-upstream-tries";

pub const SSL_REDIRECT: &str = "ssl-redirect";
pub const FORCE_SSL_REDIRECT: &str = "force-ssl-redirect";

/// Client source ranges allowed to reach the ingress, in CIDR notation.
pub const ALLOWLIST_SOURCE_RANGE: &str = "allowlist-source-range";

/// Service (in the ingress namespace) that replaces the global default backend.
pub const DEFAULT_BACKEND: &str = "default-backend";

/// `namespace/name` of the secret holding the client CA bundle.
pub const AUTH_TLS_SECRET: &str = "auth-tls-secret";
pub const AUTH_TLS_VERIFY_CLIENT: &str = "auth-tls-verify-client";
pub const AUTH_TLS_VERIFY_DEPTH: &str = "auth-tls-verify-depth";

/// Secret data key that must be present for client certificate verification.
pub const CA_CERT_KEY: &str = "ca.crt";

/// Name the operator reports itself under at startup.
pub const CONTROLLER_NAME: &str = "ingress-directives-controller";
