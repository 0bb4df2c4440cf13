//! Context classification for the Sidecar meeting-copilot.
//!
//! Pure, synchronous, total computations over in-memory text: meeting-type
//! scoring against a rule table, phase detection, key-moment extraction over
//! recent sentences, next-step predictions, and derived suggestions. Nothing
//! here blocks, locks, or fails.

pub mod classifier;
pub mod moments;
pub mod stream;

pub use classifier::ContextClassifier;
pub use stream::StreamingAnalyzer;
