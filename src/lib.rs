//! Server-authoritative engine for Texas Hold'em tables, including a
//! Bomb-Pot variant. One table is one single-writer actor
//! (`orchestrator::TableActor`); everything upstream of it (sessions,
//! transport framing, persistence) is an external collaborator this
//! crate does not own.
//!
//! Money is represented as [`Chips`], integer minor units — no
//! floating point ever touches a stack, a pot, or a bet.

pub type Chips = i64;

pub mod action;
pub mod betting;
pub mod bomb_pot;
pub mod broadcaster;
pub mod cards;
pub mod config;
pub mod connection;
pub mod error;
pub mod eval;
pub mod events;
pub mod hand;
pub mod ids;
pub mod messages;
pub mod orchestrator;
pub mod player;
pub mod pot;
pub mod sanitizer;
pub mod showdown;
pub mod state_machine;
pub mod table;
pub mod timer;

/// Initializes process-wide logging. Mirrors the teacher's
/// `robopoker::init()`: `simplelog` to stderr at a level controlled by
/// `RUST_LOG`/a default, so both the hosting binary and integration
/// tests get consistent formatting.
#[cfg(feature = "server")]
pub fn init_logging() {
    use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}
