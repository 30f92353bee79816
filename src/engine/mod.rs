//! Copying triangulations between the editable model and a calculation engine.
//!
//! The engine owns the authoritative triangulation. Reading builds a fresh model in two passes
//! (tetrahedra first, neighbours second); writing replaces every tetrahedron on the engine side.

pub mod memory;

pub use memory::{EngineTetrahedron, MemoryEngine, TetHandle};

use crate::{
    data_structs::Label,
    error::{EngineError, SyncError},
    perm::Perm4,
    triangulation::{FaceState, Gluing, Tetrahedron, Triangulation, FACES},
};
use std::fmt;
use tracing::debug;

/// Operations a calculation engine offers on its triangulation.
///
/// Tetrahedra are addressed by engine handles; a registered tetrahedron also has an index, its
/// position in the engine's triangulation.
pub trait Engine {
    type Handle: Copy + Eq + fmt::Debug;

    /// Number of tetrahedra registered with the triangulation.
    fn size(&self) -> usize;
    fn tetrahedron(&self, index: usize) -> Option<Self::Handle>;
    fn index_of(&self, tet: Self::Handle) -> Option<usize>;
    fn label(&self, tet: Self::Handle) -> Result<String, EngineError>;
    /// Tetrahedron glued to `face`, or `None` for a boundary face.
    fn adjacent(&self, tet: Self::Handle, face: usize) -> Result<Option<Self::Handle>, EngineError>;
    /// Vertex map across `face`; only meaningful if the face is glued.
    fn gluing(&self, tet: Self::Handle, face: usize) -> Result<Perm4, EngineError>;

    /// Create a new tetrahedron object that does not belong to the triangulation yet.
    fn create_tetrahedron(&mut self) -> Result<Self::Handle, EngineError>;
    /// Register a tetrahedron object as the last tetrahedron of the triangulation.
    fn add_tetrahedron(&mut self, tet: Self::Handle) -> Result<(), EngineError>;
    fn remove_all_tetrahedra(&mut self) -> Result<(), EngineError>;
    /// Glue `face` of `tet` to face `perm[face]` of `other`; both directions are set at once.
    fn join(
        &mut self,
        tet: Self::Handle,
        face: usize,
        other: Self::Handle,
        perm: Perm4,
    ) -> Result<(), EngineError>;
    fn set_label(&mut self, tet: Self::Handle, label: &str) -> Result<(), EngineError>;
    /// Tell the engine that its gluings were edited, so cached properties can be dropped.
    fn gluings_have_changed(&mut self);
}

/// Tetrahedra read from an engine whose neighbours have not been looked up yet.
#[derive(Clone, Debug)]
pub struct UnresolvedTriangulation<H> {
    tets: Vec<UnresolvedTetrahedron<H>>,
}

#[derive(Clone, Debug)]
pub struct UnresolvedTetrahedron<H> {
    handle: H,
    label: String,
    gluings: [Perm4; FACES],
}

impl<H: Copy + Eq + fmt::Debug> UnresolvedTriangulation<H> {
    /// First pass: copy the label and the four gluing permutations of every engine tetrahedron.
    pub fn from_engine<E: Engine<Handle = H>>(engine: &E) -> Result<Self, SyncError> {
        let tets = (0..engine.size())
            .map(|index| {
                let handle = engine.tetrahedron(index).ok_or_else(|| {
                    EngineError::UnknownTetrahedron(format!("at index {index}"))
                })?;
                let mut gluings = [Perm4::IDENTITY; FACES];
                for (face, gluing) in gluings.iter_mut().enumerate() {
                    *gluing = engine.gluing(handle, face)?;
                }
                Ok(UnresolvedTetrahedron {
                    handle,
                    label: engine.label(handle)?,
                    gluings,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(UnresolvedTriangulation { tets })
    }

    pub fn size(&self) -> usize {
        self.tets.len()
    }

    /// Second pass: point every glued face at the model tetrahedron with the neighbour's engine
    /// index, and hand out the finished triangulation.
    pub fn resolve<E: Engine<Handle = H>>(self, engine: &E) -> Result<Triangulation, SyncError> {
        let size = self.tets.len();
        let mut tets = Vec::with_capacity(size);
        for (index, unresolved) in self.tets.into_iter().enumerate() {
            let mut faces = [FaceState::Boundary; FACES];
            for (face, state) in faces.iter_mut().enumerate() {
                let Some(adj) = engine.adjacent(unresolved.handle, face)? else {
                    continue;
                };
                let neighbour = engine
                    .index_of(adj)
                    .filter(|&j| j < size)
                    .ok_or(SyncError::UnknownNeighbour { tet: index, face })?;
                *state = FaceState::Glued(Gluing {
                    tet: Label::new(neighbour),
                    perm: unresolved.gluings[face],
                });
            }
            tets.push(Tetrahedron::with_faces(unresolved.label, faces));
        }

        let triangulation = Triangulation::from_tetrahedra(tets);
        triangulation
            .check_gluings()
            .map_err(SyncError::Inconsistent)?;
        Ok(triangulation)
    }
}

/// Build a model of the engine's current triangulation.
pub fn read_from_engine<E: Engine>(engine: &E) -> Result<Triangulation, SyncError> {
    let triangulation = UnresolvedTriangulation::from_engine(engine)?.resolve(engine)?;
    debug!(
        size = triangulation.size(),
        gluings = triangulation.gluing_count(),
        "read triangulation from engine"
    );
    Ok(triangulation)
}

/// Replace the engine's triangulation by a copy of the model.
///
/// On failure the engine may be left half written; the model is never touched. Writing the model
/// again from scratch is the way to recover.
pub fn write_to_engine<E: Engine>(
    triangulation: &Triangulation,
    engine: &mut E,
) -> Result<(), SyncError> {
    engine.remove_all_tetrahedra()?;

    let mut handles = Vec::with_capacity(triangulation.size());
    for expected in 0..triangulation.size() {
        let handle = engine.create_tetrahedron()?;
        engine.add_tetrahedron(handle)?;
        let actual = engine.index_of(handle);
        if actual != Some(expected) {
            return Err(SyncError::IndexMismatch { expected, actual });
        }
        handles.push(handle);
    }

    // the engine glues both sides in one call, so every pair is joined from one side only
    let mut joins = 0;
    for (i, tet) in triangulation.tetrahedra().iter().enumerate() {
        for (face, state) in tet.faces().iter().enumerate() {
            let FaceState::Glued(gluing) = *state else {
                continue;
            };
            let j = gluing.tet.value();
            let their_face = gluing.face(face);
            if j > i || (j == i && their_face > face) {
                engine.join(handles[i], face, handles[j], gluing.perm)?;
                joins += 1;
            }
        }
    }

    for (tet, &handle) in triangulation.tetrahedra().iter().zip(&handles) {
        engine.set_label(handle, tet.label())?;
    }
    engine.gluings_have_changed();

    debug!(size = handles.len(), joins, "wrote triangulation to engine");
    Ok(())
}
