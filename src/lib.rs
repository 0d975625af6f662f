//! Terminal browser for the ITk production database

pub mod cli;
pub mod config;
pub mod itkdb;
pub mod browser_tui;
