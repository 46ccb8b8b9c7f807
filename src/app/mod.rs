//! Application layer: command line, configuration and the terminal report

pub mod cli;
pub mod report;
pub mod startup;

#[cfg(test)]
mod tests;
