//! # dcaplot-core
//!
//! Cue engine for DCA mixing: the assignment ledger, the live-state tracker and the
//! coordinator that sends cue diffs to a console, independent of any console protocol.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dcaplot_core::config::Config;
//! use dcaplot_core::coordinator::CueHandle;
//! use dcaplot_core::dispatch::dispatch_action;
//! use dcaplot_core::persistence::load_show;
//! use dcaplot_core::sink::LogSink;
//!
//! // 1. Load settings and the show
//! let config = Config::load();
//! let mut show = load_show(path, config.settings())?;
//!
//! // 2. Start the coordinator with the show's groups and a sink
//! let cues = CueHandle::new(show.bus_count(), show.resolver(), Some(Arc::new(LogSink)));
//!
//! // 3. Dispatch edits, selections and executions
//! let result = dispatch_action(&ShowAction::Select(id), &mut show, &cues);
//!
//! // 4. Drain CoordinatorFeedback for previews and execution reports
//! for event in cues.drain_feedback() { /* ... */ }
//! ```
//!
//! ## Module Overview
//!
//! - [`ledger`]: ordered change records with resolved per-bus state and incremental
//!   propagation of edits (`ChangeTuple`s)
//! - [`tracker`]: diffs a cue's target against live state into ordered `WireAction`s
//! - [`coordinator`]: `CueHandle` and the cue worker thread; previews, execution, feedback
//! - [`resolver`]: expands roles and choirs to concrete inputs and fx returns
//! - [`sink`]: `ActionSink` trait with log and test implementations
//! - [`state`] / [`dispatch`]: authored show state and the `ShowAction` entry point
//! - [`persistence`]: JSON show files
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod resolver;
pub mod sink;
pub mod state;
pub mod tracker;

pub use error::{ShowError, ShowResult, SinkError, SinkResult};
