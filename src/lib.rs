mod airplane;
pub mod cli;
mod client;
mod common;
mod config;
mod game;
mod grid;
mod ledger;
mod logging;
pub mod protocol;
mod renderer;
mod stats;
pub mod transport;
pub mod ui;
mod victory;

pub use airplane::*;
pub use client::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use grid::*;
pub use ledger::*;
pub use logging::init_logging;
pub use protocol::{decode, GameStateMessage, PlacementStatus, ServerMessage, Update};
pub use renderer::*;
pub use stats::*;
pub use transport::{Connector, Transport, TransportClient, TransportEvent};
pub use victory::*;
