//! # Aggregation
//!
//! A page is often built from several independent producers: one loads the
//! user, one loads the sidebar, one adds flash messages. [`aggregate`]
//! resolves each producer and merges the mappings they yield, left to right.
//! On a key collision the later producer's value wins, while the key keeps
//! the position it was first inserted at.
//!
//! A producer that yields nothing contributes nothing. A producer that yields
//! a ready-made body breaks the contract and fails with a configuration
//! error, since there is no way to merge it.

use super::Resolver;
use trellis_core::{
    BoxHandler, ConfigurationError, Context, Exception, Handler, HandlerExt, Invocation, Reply,
    Resolution,
};

/// Resolve every producer with the same invocation and merge the results.
pub fn aggregate<'p, I>(
    producers: I,
    invocation: &Invocation<'_>,
    resolver: &Resolver,
) -> Result<Context, Exception>
where
    I: IntoIterator<Item = &'p BoxHandler>,
{
    let mut merged = Context::new();
    for (index, producer) in producers.into_iter().enumerate() {
        match resolver.resolve(producer.as_ref(), invocation)? {
            Reply::Context(context) => merged.extend(context),
            Reply::Empty => {}
            Reply::Body(_) => return Err(ConfigurationError::ProducerYieldedBody { index }.into()),
        }
    }
    Ok(merged)
}

/// A handler composed of producers whose results are merged.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use trellis_core::{Handler, Invocation, Reply, Resolution};
/// use trellis_std::dispatch::View;
///
/// let view = View::new()
///     .producer(|_: &Invocation<'_>| json!({"a": 1}))
///     .producer(|_: &Invocation<'_>| json!({"a": 2, "b": 3}));
///
/// match view.invoke(&Invocation::empty()).unwrap() {
///     Resolution::Final(Reply::Context(ctx)) => {
///         assert_eq!(serde_json::Value::Object(ctx), json!({"a": 2, "b": 3}));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Default, Clone)]
pub struct View {
    producers: Vec<BoxHandler>,
    resolver: Resolver,
}

impl View {
    /// A view with no producers. It yields an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// A view over already type-erased producers.
    pub fn from_producers(producers: impl IntoIterator<Item = BoxHandler>) -> Self {
        Self {
            producers: producers.into_iter().collect(),
            resolver: Resolver::default(),
        }
    }

    /// Append a producer.
    pub fn producer(mut self, producer: impl Handler) -> Self {
        self.producers.push(producer.boxed());
        self
    }

    /// Resolve producers with `resolver` instead of the default one.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Number of producers.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns true when the view has no producers.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

impl Handler for View {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<Resolution, Exception> {
        aggregate(&self.producers, invocation, &self.resolver)
            .map(|merged| Resolution::Final(Reply::Context(merged)))
    }

    fn name(&self) -> &str {
        "View"
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.producers.iter().map(|p| p.name()).collect();
        f.debug_struct("View")
            .field("producers", &names)
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHandler;
    use serde_json::json;
    use trellis_core::{Body, exception::CONFIGURATION_ERROR, handler_fn};

    fn produce(value: serde_json::Value) -> BoxHandler {
        handler_fn(move |_inv| value.clone()).boxed()
    }

    #[test]
    fn test_later_producer_wins() {
        let producers = [produce(json!({"a": 1})), produce(json!({"a": 2, "b": 3}))];
        let merged = aggregate(&producers, &Invocation::empty(), &Resolver::default()).unwrap();
        assert_eq!(serde_json::Value::Object(merged), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn test_key_keeps_first_position() {
        let producers = [
            produce(json!({"z": 1, "m": 1})),
            produce(json!({"a": 2, "z": 3})),
        ];
        let merged = aggregate(&producers, &Invocation::empty(), &Resolver::default()).unwrap();
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "m", "a"]);
        assert_eq!(merged["z"], json!(3));
    }

    #[test]
    fn test_empty_contributes_nothing() {
        let producers = [
            produce(json!({"a": 1})),
            handler_fn(|_inv| ()).boxed(),
            produce(json!(null)),
        ];
        let merged = aggregate(&producers, &Invocation::empty(), &Resolver::default()).unwrap();
        assert_eq!(serde_json::Value::Object(merged), json!({"a": 1}));

        let none: [BoxHandler; 0] = [];
        assert!(aggregate(&none, &Invocation::empty(), &Resolver::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_body_is_rejected() {
        let producers = [
            produce(json!({"a": 1})),
            handler_fn(|_inv| Body::from("oops")).boxed(),
        ];
        let err = aggregate(&producers, &Invocation::empty(), &Resolver::default()).unwrap_err();
        assert!(err.is_a(&CONFIGURATION_ERROR));
        assert_eq!(
            err.downcast_source::<ConfigurationError>(),
            Some(&ConfigurationError::ProducerYieldedBody { index: 1 })
        );
    }

    #[test]
    fn test_producers_are_resolved() {
        let nested = handler_fn(|_inv| Resolution::next(|_: &Invocation<'_>| json!({"deep": true})));
        let view = View::new().producer(nested).producer(|_: &Invocation<'_>| json!({"top": 1}));
        match view.invoke(&Invocation::empty()).unwrap() {
            Resolution::Final(Reply::Context(ctx)) => {
                assert_eq!(serde_json::Value::Object(ctx), json!({"deep": true, "top": 1}));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_every_producer_sees_invocation() {
        let first = RecordingHandler::new();
        let second = RecordingHandler::new();
        let view = View::from_producers([first.clone().boxed(), second.clone().boxed()]);
        view.invoke(&Invocation::empty()).unwrap();
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 1);
        assert_eq!(view.len(), 2);
    }
}
