//! Bounded handler resolution.

use trellis_core::{DispatchError, Exception, Handler, Invocation, Reply, Resolution};

/// Default number of handler calls allowed while resolving one reply.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 50;

/// Drives a handler chain until it produces a [`Reply`].
///
/// Each [`Resolution::Continue`] replaces the current handler, which is then
/// invoked with the same [`Invocation`]. The loop is iterative and stops
/// with `ResolutionDepthExceeded` once `max_depth` calls have not settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    max_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}

impl Resolver {
    /// A resolver that allows `max_depth` calls. A depth of zero is raised to one.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// The call limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Invoke `handler` and every continuation it hands back.
    pub fn resolve(
        &self,
        handler: &dyn Handler,
        invocation: &Invocation<'_>,
    ) -> Result<Reply, Exception> {
        let mut next = match handler.invoke(invocation)? {
            Resolution::Final(reply) => return Ok(reply),
            Resolution::Continue(next) => next,
        };

        for depth in 2..=self.max_depth {
            #[cfg(feature = "tracing")]
            tracing::trace!(depth, handler = next.name(), "continuing resolution");
            #[cfg(not(feature = "tracing"))]
            let _ = depth;
            next = match next.invoke(invocation)? {
                Resolution::Final(reply) => return Ok(reply),
                Resolution::Continue(following) => following,
            };
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            limit = self.max_depth,
            handler = next.name(),
            "handler chain did not settle"
        );
        Err(DispatchError::ResolutionDepthExceeded {
            limit: self.max_depth,
        }
        .into())
    }
}
