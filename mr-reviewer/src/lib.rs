//! Public entry for the merge request review hook.
//!
//! One invocation runs these steps in order:
//!
//! 1) **Classify** the inbound event ([`event::classify`]); anything other
//!    than an opened merge request is acknowledged and ignored.
//! 2) **Credentials** from the secret store (`secret-store`).
//! 3) **Diff** of the merge request from GitLab (`git-context-engine`).
//! 4) **Review request**: one completion call with a fixed system prompt and
//!    the raw diff ([`review::ReviewRequester`]).
//! 5) **Format** the summary as canonical markdown ([`markdown::format`]).
//! 6) **Respond** with an HTTP-shaped [`HookResponse`] ([`response::build_response`]).
//!
//! Every failure is mapped to one [`Outcome`] at its call site; callers only
//! see fixed messages. The pipeline avoids `async-trait` and trait objects and
//! relies on plain `async fn` and enum dispatch over thin clients.

pub mod config;
pub mod context;
pub mod errors;
pub mod event;
pub mod markdown;
pub mod outcome;
pub mod pipeline;
pub mod response;
pub mod review;

pub use config::HookConfig;
pub use context::{DiagnosticSink, InvocationContext, Stage};
pub use errors::{Error, MrResult};
pub use event::{Classification, IgnoreReason, InboundEvent, InvocationEvent, classify};
pub use markdown::{FormatOptions, format};
pub use outcome::{Outcome, UpstreamStage};
pub use pipeline::ReviewHook;
pub use response::{HookResponse, build_response};
