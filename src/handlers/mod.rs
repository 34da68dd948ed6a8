//! Presentation-side glue. Rendering is left to the shell; these handlers
//! only translate user input into wizard commands and outcomes into text.

pub mod cli_handler;
