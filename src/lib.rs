//! Editable model of 3-manifold triangulations: tetrahedra with labels whose faces are glued in
//! pairs by vertex permutations, and a way to copy that model to and from a calculation engine.

pub mod data_structs;
pub mod engine;
pub mod error;
pub mod perm;
pub mod triangulation;

pub use data_structs::Label;
pub use error::{EngineError, GluingError, SyncError};
pub use perm::Perm4;
pub use triangulation::{
    Conflict, EditOutcome, FaceState, Gluing, PendingGluing, Target, Tetrahedron, Triangulation,
};
