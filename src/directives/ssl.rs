use crate::{
    annotations::AnnotationKey,
    coerce, consts,
    directive::{Directive, ParseContext, WhenAbsent},
    directives::Flag,
    err::DirectiveResult,
};

pub const SSL_REDIRECT: Flag = Flag {
    name: consts::SSL_REDIRECT,
    default: true,
};

/// Redirects to HTTPS even when the ingress has no TLS section.
pub const FORCE_SSL_REDIRECT: Flag = Flag {
    name: consts::FORCE_SSL_REDIRECT,
    default: false,
};

#[derive(Debug, Clone, Copy)]
pub struct AllowlistSourceRange;

impl Directive for AllowlistSourceRange {
    type Value = Vec<String>;

    fn name(&self) -> &'static str {
        consts::ALLOWLIST_SOURCE_RANGE
    }

    fn when_absent(&self) -> WhenAbsent<Vec<String>> {
        WhenAbsent::Default(Vec::new())
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Vec<String>> {
        let mut ranges = coerce::list(raw)
            .iter()
            .map(|range| coerce::cidr(key, range))
            .collect::<DirectiveResult<Vec<_>>>()?;
        ranges.sort();
        ranges.dedup();
        Ok(ranges)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AllowlistSourceRange, FORCE_SSL_REDIRECT, SSL_REDIRECT};
    use crate::{
        directive::Directive, directives::test_annotations, err::DirectiveError,
        resolver::MockResolver,
    };

    #[rstest]
    #[case(&[], true, false)]
    #[case(&[("ssl-redirect", "false")], false, false)]
    #[case(&[("force-ssl-redirect", "True")], true, true)]
    fn redirects(#[case] pairs: &[(&str, &str)], #[case] ssl: bool, #[case] force: bool) {
        let annotations = test_annotations(pairs);
        let resolver = MockResolver::new();
        assert_eq!(SSL_REDIRECT.parse(&annotations, &resolver), Ok(ssl));
        assert_eq!(FORCE_SSL_REDIRECT.parse(&annotations, &resolver), Ok(force));
    }

    #[test]
    fn allowlist_normalized() {
        let annotations = test_annotations(&[(
            "allowlist-source-range",
            "10.0.0.0/8, 192.168.0.1,10.1.2.3/8",
        )]);
        assert_eq!(
            AllowlistSourceRange.parse(&annotations, &MockResolver::new()),
            Ok(vec!["10.0.0.0/8".to_string(), "192.168.0.1/32".to_string()])
        );
    }

    #[test]
    fn allowlist_rejects_bad_range() {
        let annotations = test_annotations(&[("allowlist-source-range", "10.0.0.0/8,nope")]);
        let err = AllowlistSourceRange
            .parse(&annotations, &MockResolver::new())
            .unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidFormat { ref value, .. } if value == "nope"));
    }
}
