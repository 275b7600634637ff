pub mod commands;
pub mod config;
pub mod error;
pub mod paths;
pub mod profiles;
pub mod rules;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
