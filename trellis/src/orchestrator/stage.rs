use std::fmt;

/// The phases a request passes through.
///
/// `RequestBuilding`, `RouteLookup`, `HandlerExecution` and `Rendering` can
/// each fail into `ErrorDispatch`. `Responded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Validating the host-supplied request parts.
    RequestBuilding,
    /// Matching the path against the route table.
    RouteLookup,
    /// Resolving the matched handler chain.
    HandlerExecution,
    /// Negotiating an output and rendering the body.
    Rendering,
    /// A response is ready.
    Responded,
    /// Routing a failure to the exception table.
    ErrorDispatch,
}

impl Stage {
    /// The stage's name as used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::RequestBuilding => "request_building",
            Stage::RouteLookup => "route_lookup",
            Stage::HandlerExecution => "handler_execution",
            Stage::Rendering => "rendering",
            Stage::Responded => "responded",
            Stage::ErrorDispatch => "error_dispatch",
        }
    }

    /// Returns true for stages whose failure is routed to the exception table.
    pub const fn is_recoverable(self) -> bool {
        matches!(
            self,
            Stage::RequestBuilding | Stage::RouteLookup | Stage::HandlerExecution | Stage::Rendering
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
