use ingress_directives::{consts, resolver::ObjectName};

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
/// Ingress directives operator.
///
/// Reads nginx style annotations from every ingress and assembles
/// one validated configuration record per ingress.
pub struct DirectiveArgs {
    /// Prefix shared by all directive annotations.
    #[arg(long, default_value = consts::DEFAULT_ANNOTATIONS_PREFIX, env = "DIRECTIVES_ANNOTATIONS_PREFIX")]
    pub annotations_prefix: String,

    /// Service used as default backend, as `namespace/name`.
    #[arg(long, env = "DIRECTIVES_DEFAULT_BACKEND_SERVICE")]
    pub default_backend_service: Option<ObjectName>,

    /// Port of the default backend service.
    #[arg(long, default_value_t = 80, env = "DIRECTIVES_DEFAULT_BACKEND_PORT")]
    pub default_backend_port: i32,

    /// Only ingresses with this `spec.ingressClassName` are evaluated.
    ///
    /// When unset every ingress is evaluated.
    #[arg(long, env = "DIRECTIVES_INGRESS_CLASS")]
    pub ingress_class: Option<String>,

    /// Log level for the operator.
    #[arg(long, env = "DIRECTIVES_LOG_LEVEL", default_value_t = tracing::level_filters::LevelFilter::INFO)]
    pub log_level: tracing::level_filters::LevelFilter,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::DirectiveArgs;

    #[test]
    fn defaults() {
        let args = DirectiveArgs::try_parse_from(["ingress-directives"]).unwrap();
        assert_eq!(args.annotations_prefix, "nginx.ingress.kubernetes.io");
        assert!(args.default_backend_service.is_none());
        assert_eq!(args.default_backend_port, 80);
    }

    #[test]
    fn default_backend_service() {
        let args = DirectiveArgs::try_parse_from([
            "ingress-directives",
            "--default-backend-service",
            "ingress/default-http-backend",
        ])
        .unwrap();
        let backend = args.default_backend_service.unwrap();
        assert_eq!(backend.namespace, "ingress");
        assert_eq!(backend.name, "default-http-backend");

        assert!(
            DirectiveArgs::try_parse_from([
                "ingress-directives",
                "--default-backend-service",
                "default-http-backend",
            ])
            .is_err()
        );
    }
}
