//! Host service implementations that live outside a real game server

mod memory;

pub use memory::MemoryHost;
