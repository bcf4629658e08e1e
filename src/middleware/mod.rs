pub mod auth;
pub mod matcher;

pub use auth::{route_gate, AuthDecision, AuthProvider, RouteGate, SessionAuthProvider};
pub use matcher::{MatcherError, RouteMatcher};
