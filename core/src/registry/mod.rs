//! registry/mod.rs
//! Algorithm identifiers, transform traits and the engine that hands out
//! sessions.
//!
//! Design notes:
//! - One trait per transform kind (`DigestTransform`, `CipherTransform`),
//!   implemented once per adapter; ids map to adapters with an ordinary
//!   `BTreeMap`.
//! - The enabled set is computed once in `Engine::new` from capability
//!   probing and `EngineConfig`, then frozen. No process-wide mutable
//!   tables; the engine is passed explicitly.

pub mod ids;
pub mod transform;
pub mod engine;

pub use ids::*;
pub use transform::*;
pub use engine::*;
