mod config;
mod error;
mod listen;
mod replay;
