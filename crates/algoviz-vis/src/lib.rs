//! Algoviz Playback
//!
//! Timed playback of algorithm traces with step, scrub and autoplay controls.
//!
//! # Architecture
//!
//! - **Playback**: Holds the trace and an index into it, advanced by timer ticks
//! - **Timer**: Injected scheduling port ([`ManualTimer`] for tests, [`TokioTimer`] live)
//! - **REST API**: Control playback, load new input, read the current step
//! - **WebSocket**: Pushes playback status to the viewer after every change
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::default())?;
//! server.serve().await?;
//! ```

mod config;
mod error;
mod input;
mod playback;
mod server;
mod timer;

pub use config::VisConfig;
pub use error::{Error, Result};
pub use input::{algorithm_for, InputSpec};
pub use playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
pub use server::VisServer;
pub use timer::{ManualTimer, Timer, TimerToken, TokioTimer};
