//! Aurora - streaming intent analysis client
//!
//! Aurora sends a free-text question to the analysis service and follows
//! the server-sent-event stream it answers with. Partial and final stage
//! results are merged into one aggregate as they arrive, status events feed
//! an ordered progress ledger, and the terminal UI redraws after every
//! update.
//!
//! # Modules
//!
//! - [`analysis`] - stream client, event decoding, merger, ledger and state
//! - [`auth`] - optional login, persisted between runs
//! - [`ui`] - ratatui TUI and plain line output
//! - [`config`] - JSON configuration with environment overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use aurora::analysis::{AnalysisClient, AnalysisController};
//! use aurora::config::AppConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let client = AnalysisClient::new(&config)?;
//! let mut controller = AnalysisController::new(client, config.user_id.clone());
//!
//! controller.submit("如何系统地学习 Rust?")?;
//! controller.run_to_completion().await;
//! println!("{:?}", controller.state().result().intent_analysis);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod auth;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod ui;

pub use analysis::{AggregateResult, AnalysisController, AnalysisEvent, AnalysisState};
pub use auth::AuthContext;
pub use i18n::{current_locale, init_locale, t, Locale, Text};
