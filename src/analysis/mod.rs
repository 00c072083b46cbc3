//! Streaming intent analysis
//!
//! The service answers one query with a server-sent-event stream of typed
//! events. This module turns that stream into view state:
//!
//! - [`client`] - opens the connection and pushes [`StreamUpdate`]s onto a channel
//! - [`sse`] - incremental `text/event-stream` frame decoder
//! - [`events`] - closed set of event variants, validated at the boundary
//! - [`merger`] - pure per-stage reducer into [`AggregateResult`]
//! - [`ledger`] - ordered progress steps
//! - [`state`] - everything the view renders for one query
//! - [`controller`] - single consumer, at most one open stream

pub mod client;
pub mod controller;
pub mod events;
pub mod ledger;
pub mod merger;
pub mod sse;
pub mod state;
pub mod types;

pub use client::{AnalysisClient, AnalysisStream, Closure, StreamError, StreamRequest, StreamUpdate};
pub use controller::{AnalysisController, StreamOpener, SubmitError};
pub use events::{AnalysisEvent, DecodeError, Stage};
pub use ledger::{ProgressLedger, ProgressStep, StepMatcher, StepStatus};
pub use merger::{merge, AggregateResult};
pub use state::{AnalysisState, VisibilityFlags};
