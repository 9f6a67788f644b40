use std::time::Duration;

use crate::{
    annotations::AnnotationKey,
    coerce, consts,
    directive::{ByteSize, Directive, ParseContext, WhenAbsent},
    directives::Integer,
    err::DirectiveResult,
};

#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    pub name: &'static str,
    pub default: Duration,
    /// Directive whose value is used when this one is not set.
    pub inherit: Option<&'static str>,
}

pub const PROXY_CONNECT_TIMEOUT: Timeout = Timeout {
    name: consts::PROXY_CONNECT_TIMEOUT,
    default: Duration::from_secs(5),
    inherit: None,
};

pub const PROXY_READ_TIMEOUT: Timeout = Timeout {
    name: consts::PROXY_READ_TIMEOUT,
    default: Duration::from_secs(60),
    inherit: None,
};

pub const PROXY_SEND_TIMEOUT: Timeout = Timeout {
    name: consts::PROXY_SEND_TIMEOUT,
    default: Duration::from_secs(60),
    inherit: Some(consts::PROXY_READ_TIMEOUT),
};

pub const PROXY_NEXT_UPSTREAM_TRIES: Integer = Integer {
    name: consts::PROXY_NEXT_UPSTREAM_TRIES,
    default: 3,
    min: 0,
};

impl Directive for Timeout {
    type Value = Duration;

    fn name(&self) -> &'static str {
        self.name
    }

    fn when_absent(&self) -> WhenAbsent<Duration> {
        match self.inherit {
            Some(from) => WhenAbsent::Inherit {
                from,
                otherwise: self.default,
            },
            None => WhenAbsent::Default(self.default),
        }
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Duration> {
        coerce::duration(key, raw)
    }
}

/// `proxy-body-size`, nginx's `client_max_body_size`.
#[derive(Debug, Clone, Copy)]
pub struct ProxyBodySize;

impl Directive for ProxyBodySize {
    type Value = ByteSize;

    fn name(&self) -> &'static str {
        consts::PROXY_BODY_SIZE
    }

    fn when_absent(&self) -> WhenAbsent<ByteSize> {
        WhenAbsent::Default(ByteSize(1 << 20))
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<ByteSize> {
        coerce::size(key, raw).map(ByteSize)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{PROXY_CONNECT_TIMEOUT, PROXY_SEND_TIMEOUT, ProxyBodySize};
    use crate::{
        directive::{ByteSize, Directive},
        directives::test_annotations,
        resolver::MockResolver,
    };

    #[rstest]
    #[case(&[], 60)]
    #[case(&[("proxy-read-timeout", "120")], 120)]
    #[case(&[("proxy-read-timeout", "120"), ("proxy-send-timeout", "2m30s")], 150)]
    #[case(&[("proxy-send-timeout", "10s")], 10)]
    fn send_timeout_inherits_read_timeout(#[case] pairs: &[(&str, &str)], #[case] secs: u64) {
        assert_eq!(
            PROXY_SEND_TIMEOUT.parse(&test_annotations(pairs), &MockResolver::new()),
            Ok(Duration::from_secs(secs))
        );
    }

    #[test]
    fn connect_timeout_default() {
        assert_eq!(
            PROXY_CONNECT_TIMEOUT.parse(&test_annotations(&[]), &MockResolver::new()),
            Ok(Duration::from_secs(5))
        );
    }

    #[rstest]
    #[case(&[], Some(1048576))]
    #[case(&[("proxy-body-size", "8m")], Some(8388608))]
    #[case(&[("proxy-body-size", "0")], Some(0))]
    #[case(&[("proxy-body-size", "lots")], None)]
    fn body_size(#[case] pairs: &[(&str, &str)], #[case] expected: Option<u64>) {
        assert_eq!(
            ProxyBodySize
                .parse(&test_annotations(pairs), &MockResolver::new())
                .ok(),
            expected.map(ByteSize)
        );
    }
}
