//! Regex Wizard - natural language to C# regex assistant
//!
//! This crate turns a plain-language description of a text-matching
//! requirement into a C# regex solution by calling a hosted generative
//! model, and verifies a preview pattern locally against sample text.
//!
//! ## Architecture
//! Prompt -> [`ai::AiService`] call -> [`session::GenerationSession`] updated
//! -> preview pattern fed to the [`tester`] whenever it or the sample changes.
//!
//! ## Quick Start
//!
//! ```rust
//! use regex_wizard::tester;
//!
//! let outcome = tester::evaluate(Some(r"\+[^+]*$"), tester::DEFAULT_SAMPLE);
//! assert!(outcome.match_outcome().is_some());
//! ```

// Pattern generation via the hosted model
pub mod ai;

// Generation status state machine and result store
pub mod session;

// Local pattern preview
pub mod tester;

// Public re-exports for the common surface
pub use ai::{AiConfig, AiError, AiResult, AiService, RegexSolution};
pub use session::{GenerationSession, GenerationStatus};
pub use tester::{Highlight, MatchOutcome, TesterOutcome};
