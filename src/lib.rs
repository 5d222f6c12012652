//! Terminal maze chase on evolved mazes.
//!
//! A genetic search breeds a connected maze, pellets are scattered over every reachable cell, and
//! four pursuers hunt the player with A*, uniform-cost, depth-bounded breadth-first and greedy
//! search. Eating a power pellet scares the pursuers for a while and lets the player eat them.
//!
//! The simulation modules are independent of the terminal; [`App`] drives them with a ratatui
//! interface.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

pub mod collision;
pub mod config;
pub mod connectivity;
pub mod game;
pub mod generator;
pub mod grid;
pub mod logging;
pub mod maze;
pub mod pathfinding;
pub mod player;
pub mod pursuer;

mod app;
mod events;
mod types;
mod ui;

pub use app::App;
