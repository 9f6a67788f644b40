use std::time::Duration;

use serde::Serialize;

use crate::{
    annotations::{AnnotationKey, AnnotationSet},
    err::{DirectiveError, DirectiveResult},
    resolver::{Resolver, SecretRef, ServiceRef},
};

/// What a directive yields when its annotation is not set.
#[derive(Debug, Clone, PartialEq)]
pub enum WhenAbsent<T> {
    Default(T),
    Fail,
    /// Parse the raw value of the related directive `from` instead, or use
    /// `otherwise` when that one is absent too.
    Inherit { from: &'static str, otherwise: T },
}

/// Inputs lent to a directive for a single parse call.
pub struct ParseContext<'a> {
    pub annotations: &'a AnnotationSet,
    pub resolver: &'a dyn Resolver,
}

/// One named, typed option read from ingress annotations.
///
/// Implementors describe how to read a present value in
/// [`Directive::parse_value`]; lookup and the absent policy are handled by
/// [`Directive::parse`].
pub trait Directive: Send + Sync {
    type Value: Clone + Into<ParsedValue>;

    /// Directive name without the annotation prefix.
    fn name(&self) -> &'static str;

    fn when_absent(&self) -> WhenAbsent<Self::Value>;

    fn parse_value(
        &self,
        key: &AnnotationKey,
        raw: &str,
        ctx: &ParseContext<'_>,
    ) -> DirectiveResult<Self::Value>;

    fn parse(
        &self,
        annotations: &AnnotationSet,
        resolver: &dyn Resolver,
    ) -> DirectiveResult<Self::Value> {
        let ctx = ParseContext {
            annotations,
            resolver,
        };
        if let Some(raw) = annotations.get_raw(self.name()) {
            return self.parse_value(&annotations.key(self.name()), raw, &ctx);
        }
        match self.when_absent() {
            WhenAbsent::Default(value) => Ok(value),
            WhenAbsent::Fail => Err(DirectiveError::missing(&annotations.key(self.name()))),
            WhenAbsent::Inherit { from, otherwise } => match annotations.get_raw(from) {
                Some(raw) => self.parse_value(&annotations.key(from), raw, &ctx),
                None => Ok(otherwise),
            },
        }
    }

    /// Value used when an optional directive fails.
    fn fallback(&self) -> Option<Self::Value> {
        match self.when_absent() {
            WhenAbsent::Default(value) | WhenAbsent::Inherit { otherwise: value, .. } => {
                Some(value)
            }
            WhenAbsent::Fail => None,
        }
    }
}

/// Object safe face of [`Directive`], used by the registry.
pub trait ErasedDirective: Send + Sync {
    fn directive_name(&self) -> &'static str;
    fn parse_erased(
        &self,
        annotations: &AnnotationSet,
        resolver: &dyn Resolver,
    ) -> DirectiveResult<ParsedValue>;
    fn fallback_erased(&self) -> Option<ParsedValue>;
}

impl<D: Directive> ErasedDirective for D {
    fn directive_name(&self) -> &'static str {
        self.name()
    }

    fn parse_erased(
        &self,
        annotations: &AnnotationSet,
        resolver: &dyn Resolver,
    ) -> DirectiveResult<ParsedValue> {
        self.parse(annotations, resolver).map(Into::into)
    }

    fn fallback_erased(&self) -> Option<ParsedValue> {
        self.fallback().map(Into::into)
    }
}

/// Sizes are kept apart from plain integers so renderers can format them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteSize(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParsedValue {
    Bool(bool),
    Int(i64),
    Duration(Duration),
    Size(u64),
    Text(String),
    List(Vec<String>),
    StatusCodes(Vec<u16>),
    Service(ServiceRef),
    Secret(SecretRef),
    Unset,
}

impl ParsedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for ParsedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParsedValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Duration> for ParsedValue {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<ByteSize> for ParsedValue {
    fn from(value: ByteSize) -> Self {
        Self::Size(value.0)
    }
}

impl From<String> for ParsedValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ParsedValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<u16>> for ParsedValue {
    fn from(value: Vec<u16>) -> Self {
        Self::StatusCodes(value)
    }
}

impl From<Option<ServiceRef>> for ParsedValue {
    fn from(value: Option<ServiceRef>) -> Self {
        value.map_or(Self::Unset, Self::Service)
    }
}

impl From<Option<SecretRef>> for ParsedValue {
    fn from(value: Option<SecretRef>) -> Self {
        value.map_or(Self::Unset, Self::Secret)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::{Directive, ParseContext, WhenAbsent};
    use crate::{
        annotations::{AnnotationKey, AnnotationPrefix, AnnotationSet, ResourceId},
        coerce,
        err::{DirectiveError, DirectiveResult},
        resolver::MockResolver,
    };

    struct Depth(WhenAbsent<i64>);

    impl Directive for Depth {
        type Value = i64;

        fn name(&self) -> &'static str {
            "depth"
        }

        fn when_absent(&self) -> WhenAbsent<i64> {
            self.0.clone()
        }

        fn parse_value(
            &self,
            key: &AnnotationKey,
            raw: &str,
            _ctx: &ParseContext<'_>,
        ) -> DirectiveResult<i64> {
            coerce::integer(key, raw)
        }
    }

    fn set(pairs: &[(&str, &str)]) -> AnnotationSet {
        let prefix = AnnotationPrefix::default();
        AnnotationSet::new(
            prefix.clone(),
            ResourceId::new("default", "foo"),
            pairs
                .iter()
                .map(|(name, value)| (prefix.key(name).to_string(), value.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[rstest]
    #[case(WhenAbsent::Default(1), &[], Ok(1))]
    #[case(WhenAbsent::Default(1), &[("depth", "4")], Ok(4))]
    #[case(WhenAbsent::Inherit { from: "parent", otherwise: 1 }, &[("parent", "7")], Ok(7))]
    #[case(WhenAbsent::Inherit { from: "parent", otherwise: 1 }, &[], Ok(1))]
    #[case(WhenAbsent::Inherit { from: "parent", otherwise: 1 }, &[("parent", "7"), ("depth", "2")], Ok(2))]
    #[case(
        WhenAbsent::Fail,
        &[],
        Err(DirectiveError::MissingAnnotation { key: "nginx.ingress.kubernetes.io/depth".into() })
    )]
    fn absent_policy(
        #[case] policy: WhenAbsent<i64>,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: DirectiveResult<i64>,
    ) {
        let directive = Depth(policy);
        assert_eq!(directive.parse(&set(pairs), &MockResolver::new()), expected);
    }

    #[test]
    fn inherited_value_errors_name_the_source_key() {
        let directive = Depth(WhenAbsent::Inherit {
            from: "parent",
            otherwise: 1,
        });
        let err = directive
            .parse(&set(&[("parent", "x")]), &MockResolver::new())
            .unwrap_err();
        assert_eq!(err.key(), "nginx.ingress.kubernetes.io/parent");
    }

    #[rstest]
    #[case(WhenAbsent::Default(3), Some(3))]
    #[case(WhenAbsent::Inherit { from: "parent", otherwise: 5 }, Some(5))]
    #[case(WhenAbsent::Fail, None)]
    fn fallback(#[case] policy: WhenAbsent<i64>, #[case] expected: Option<i64>) {
        assert_eq!(Depth(policy).fallback(), expected);
    }
}
