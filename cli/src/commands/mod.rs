pub mod cli;
pub mod watch;
