//! The authorization guard: an ordered, statically inspectable pipeline of
//! authentication and authorization steps.

pub mod context;
pub mod pipeline;
pub mod request;

pub use context::RequestContext;
pub use pipeline::{GuardPipeline, GuardStep};
pub use request::GuardRequest;
