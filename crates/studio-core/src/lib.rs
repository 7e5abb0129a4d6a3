//! Simulation kernel for a fictional game-development studio.
//!
//! One turn is one in-game week: the engine pops a queued player command,
//! translates it into design facts, fans out the scripted agent roles
//! (inquisitor, marketing, producer) concurrently, joins them, and settles
//! their outcomes against the shared state before the week counter advances.
//! Build progress capping at 100 is the only terminal condition.

pub mod engine;
pub mod inquisitor;
pub mod marketing;
pub mod producer;
pub mod rng;
pub mod scoring;
pub mod textgen;
pub mod translator;

pub use engine::StudioEngine;
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use textgen::{CannedTextClient, FallbackTextClient, HttpTextClient, TextGenerator};
