//! Playbook catalog and selection for the Sidecar meeting-copilot.
//!
//! A registry is constructed once at startup (seeded with the fixed catalog)
//! and passed by reference to consumers — no hidden global state. Lookup is
//! total: an unknown id resolves to the general playbook, never a panic.

pub mod catalog;
pub mod registry;

pub use registry::PlaybookRegistry;
