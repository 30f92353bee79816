use thiserror::Error;

/// Rejected edits and broken model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GluingError {
    #[error("there is no tetrahedron number {index} (the triangulation has {size})")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("{0} is not a tetrahedron face; faces are numbered 0 to 3")]
    InvalidFace(usize),
    #[error("the gluing maps face {face} to face {actual}, but face {expected} was requested")]
    FaceMismatch {
        face: usize,
        expected: usize,
        actual: usize,
    },
    #[error("face {face} of tetrahedron {tet} cannot be glued to itself")]
    SelfGluing { tet: usize, face: usize },
    #[error("face {face} of tetrahedron {tet} is not glued back along the inverse permutation")]
    Asymmetric { tet: usize, face: usize },
    #[error("face {face} of tetrahedron {tet} refers to a tetrahedron outside the triangulation")]
    DanglingNeighbour { tet: usize, face: usize },
    #[error("tetrahedron at position {position} carries index {index}")]
    MisIndexed { position: usize, index: usize },
}

/// Failures reported by an engine while its tetrahedra are being rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the engine has no tetrahedron object {0}")]
    UnknownTetrahedron(String),
    #[error("tetrahedron object {0} is not registered with the triangulation")]
    NotRegistered(String),
    #[error("face {face} of tetrahedron object {tet} is already glued")]
    FaceAlreadyGlued { tet: String, face: usize },
    #[error("{0} is not a tetrahedron face")]
    InvalidFace(usize),
    #[error("face {face} of tetrahedron object {tet} cannot be joined to itself")]
    SelfGluing { tet: String, face: usize },
    #[error("the engine rejected the request: {0}")]
    Rejected(String),
}

/// Failures while copying a triangulation between the model and an engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("face {face} of engine tetrahedron {tet} is glued to a tetrahedron the triangulation does not contain")]
    UnknownNeighbour { tet: usize, face: usize },
    #[error("the engine placed new tetrahedron {expected} at index {actual:?}")]
    IndexMismatch {
        expected: usize,
        actual: Option<usize>,
    },
    #[error("the engine reported an inconsistent triangulation")]
    Inconsistent(#[source] GluingError),
}
