//! Session store implementations for RoboTutor.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;
