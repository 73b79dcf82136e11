pub mod account;
pub mod command;
pub mod completion;
pub mod ports;
