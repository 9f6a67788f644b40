//! Concrete directives built on [`Directive`].

use crate::{
    annotations::AnnotationKey,
    coerce,
    directive::{Directive, ParseContext, WhenAbsent},
    err::{DirectiveError, DirectiveResult},
};

pub mod auth_tls;
pub mod backend;
pub mod proxy;
pub mod proxy_intercept_errors;
pub mod ssl;

/// Boolean directive with a fixed default.
#[derive(Debug, Clone, Copy)]
pub struct Flag {
    pub name: &'static str,
    pub default: bool,
}

impl Directive for Flag {
    type Value = bool;

    fn name(&self) -> &'static str {
        self.name
    }

    fn when_absent(&self) -> WhenAbsent<bool> {
        WhenAbsent::Default(self.default)
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<bool> {
        coerce::boolean(key, raw)
    }
}

/// Integer directive with a lower bound.
#[derive(Debug, Clone, Copy)]
pub struct Integer {
    pub name: &'static str,
    pub default: i64,
    pub min: i64,
}

impl Directive for Integer {
    type Value = i64;

    fn name(&self) -> &'static str {
        self.name
    }

    fn when_absent(&self) -> WhenAbsent<i64> {
        WhenAbsent::Default(self.default)
    }

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        _ctx: &ParseContext<'_>,
    ) -> DirectiveResult<i64> {
        let value = coerce::integer(key, raw)?;
        if value < self.min {
            return Err(DirectiveError::validation(
                key,
                format!("{value} is below the minimum of {}", self.min),
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
pub(crate) fn test_annotations(pairs: &[(&str, &str)]) -> crate::annotations::AnnotationSet {
    use crate::annotations::{AnnotationPrefix, AnnotationSet, ResourceId};

    let prefix = AnnotationPrefix::default();
    AnnotationSet::new(
        prefix.clone(),
        ResourceId::new("default", "foo"),
        pairs
            .iter()
            .map(|(name, value)| (prefix.key(name).to_string(), value.to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Integer, test_annotations};
    use crate::{directive::Directive, err::DirectiveError, resolver::MockResolver};

    const TRIES: Integer = Integer {
        name: "tries",
        default: 3,
        min: 0,
    };

    #[rstest]
    #[case(&[], Ok(3))]
    #[case(&[("tries", "0")], Ok(0))]
    #[case(&[("tries", "10")], Ok(10))]
    fn integer_values(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: Result<i64, DirectiveError>,
    ) {
        assert_eq!(TRIES.parse(&test_annotations(pairs), &MockResolver::new()), expected);
    }

    #[test]
    fn integer_below_minimum() {
        let err = TRIES
            .parse(&test_annotations(&[("tries", "-1")]), &MockResolver::new())
            .unwrap_err();
        assert!(matches!(err, DirectiveError::ValidationFailed { .. }));
    }

    #[test]
    fn integer_garbage() {
        let err = TRIES
            .parse(&test_annotations(&[("tries", "three")]), &MockResolver::new())
            .unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidFormat { .. }));
    }
}
