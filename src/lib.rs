//! Interactive Braille globe for the terminal: country lookup, hover
//! highlighting and a tidally locked moon.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod geo;
mod hash;
pub mod interaction;
pub mod map;
pub mod ui;
