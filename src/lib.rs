//! Typed directives read from ingress annotations.
//!
//! An [`AnnotationSet`] is taken from an ingress, every directive of a
//! [`registry`] parses its own key out of it with the help of a
//! [`Resolver`], and [`evaluate`] folds the results into a [`ConfigRecord`].

pub mod annotations;
pub mod coerce;
pub mod consts;
pub mod directive;
pub mod directives;
pub mod err;
pub mod record;
pub mod registry;
pub mod resolver;

pub use annotations::{AnnotationKey, AnnotationPrefix, AnnotationSet, ResourceId};
pub use directive::{Directive, ParsedValue, WhenAbsent};
pub use err::{DirectiveError, EvaluationError, ResolverError};
pub use record::{ConfigRecord, evaluate};
pub use registry::{DEFAULT_REGISTRY, Policy, Registered};
pub use resolver::{ClusterResolver, MockResolver, Resolver};
