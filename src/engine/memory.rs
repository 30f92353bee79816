use super::Engine;
use crate::{
    data_structs::{Label, Pool},
    error::EngineError,
    perm::Perm4,
    triangulation::FACES,
};

pub type TetHandle = Label<EngineTetrahedron>;

/// Engine that keeps its triangulation in memory.
///
/// Tetrahedron objects live in a `Pool` and are addressed by their `Label`; the triangulation is
/// the sequence of registered objects.
#[derive(Clone, Debug, Default)]
pub struct MemoryEngine {
    objects: Pool<EngineTetrahedron>,
    order: Vec<TetHandle>,
    changes: usize,
    joins: usize,
}

/// Tetrahedron object as stored by the engine.
#[derive(Clone, Debug, Default)]
pub struct EngineTetrahedron {
    label: String,
    adj: [Option<(TetHandle, Perm4)>; FACES],
    index: Option<usize>,
}

fn check_face(face: usize) -> Result<(), EngineError> {
    if face < FACES {
        Ok(())
    } else {
        Err(EngineError::InvalidFace(face))
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine::default()
    }

    /// Number of tetrahedron objects alive, registered or not.
    pub fn object_count(&self) -> usize {
        self.objects.size()
    }

    /// How often the gluings were reported as changed.
    pub fn change_count(&self) -> usize {
        self.changes
    }

    /// Number of successful `join` calls so far.
    pub fn join_count(&self) -> usize {
        self.joins
    }

    fn object(&self, tet: TetHandle) -> Result<&EngineTetrahedron, EngineError> {
        self.objects
            .get(tet)
            .ok_or_else(|| EngineError::UnknownTetrahedron(tet.to_string()))
    }

    fn registered(&self, tet: TetHandle) -> Result<&EngineTetrahedron, EngineError> {
        let object = self.object(tet)?;
        if object.index.is_none() {
            return Err(EngineError::NotRegistered(tet.to_string()));
        }
        Ok(object)
    }

    /// Turn a face and its partner back into boundary faces. Return the former partner, if any.
    pub fn unjoin(
        &mut self,
        tet: TetHandle,
        face: usize,
    ) -> Result<Option<(TetHandle, usize)>, EngineError> {
        check_face(face)?;
        let Some((other, perm)) = self.object(tet)?.adj[face] else {
            return Ok(None);
        };
        let other_face = perm.image_of(face);
        self.objects[tet].adj[face] = None;
        if let Some(object) = self.objects.get_mut(other) {
            object.adj[other_face] = None;
        }
        Ok(Some((other, other_face)))
    }

    /// Unglue all four faces of a tetrahedron.
    pub fn isolate(&mut self, tet: TetHandle) -> Result<(), EngineError> {
        for face in 0..FACES {
            self.unjoin(tet, face)?;
        }
        Ok(())
    }

    /// Record a gluing on one side only, bypassing every check.
    #[cfg(test)]
    pub(crate) fn force_gluing(&mut self, tet: TetHandle, face: usize, other: TetHandle, perm: Perm4) {
        self.objects[tet].adj[face] = Some((other, perm));
    }
}

impl Engine for MemoryEngine {
    type Handle = TetHandle;

    fn size(&self) -> usize {
        self.order.len()
    }

    fn tetrahedron(&self, index: usize) -> Option<TetHandle> {
        self.order.get(index).copied()
    }

    fn index_of(&self, tet: TetHandle) -> Option<usize> {
        self.objects.get(tet).and_then(|object| object.index)
    }

    fn label(&self, tet: TetHandle) -> Result<String, EngineError> {
        Ok(self.object(tet)?.label.clone())
    }

    fn adjacent(&self, tet: TetHandle, face: usize) -> Result<Option<TetHandle>, EngineError> {
        check_face(face)?;
        Ok(self.object(tet)?.adj[face].map(|(other, _)| other))
    }

    fn gluing(&self, tet: TetHandle, face: usize) -> Result<Perm4, EngineError> {
        check_face(face)?;
        Ok(self.object(tet)?.adj[face].map_or(Perm4::IDENTITY, |(_, perm)| perm))
    }

    fn create_tetrahedron(&mut self) -> Result<TetHandle, EngineError> {
        Ok(self.objects.insert(EngineTetrahedron::default()))
    }

    fn add_tetrahedron(&mut self, tet: TetHandle) -> Result<(), EngineError> {
        let index = self.order.len();
        let object = self
            .objects
            .get_mut(tet)
            .ok_or_else(|| EngineError::UnknownTetrahedron(tet.to_string()))?;
        if object.index.is_some() {
            return Err(EngineError::Rejected(format!(
                "tetrahedron object {tet} is registered already"
            )));
        }
        object.index = Some(index);
        self.order.push(tet);
        Ok(())
    }

    /// Destroy every tetrahedron object, registered or not.
    fn remove_all_tetrahedra(&mut self) -> Result<(), EngineError> {
        let labels = (&self.objects).into_iter().collect::<Vec<_>>();
        for label in labels {
            self.objects.remove(label);
        }
        self.order.clear();
        Ok(())
    }

    fn join(
        &mut self,
        tet: TetHandle,
        face: usize,
        other: TetHandle,
        perm: Perm4,
    ) -> Result<(), EngineError> {
        check_face(face)?;
        let other_face = perm.image_of(face);
        if tet == other && other_face == face {
            return Err(EngineError::SelfGluing {
                tet: tet.to_string(),
                face,
            });
        }
        if self.registered(tet)?.adj[face].is_some() {
            return Err(EngineError::FaceAlreadyGlued {
                tet: tet.to_string(),
                face,
            });
        }
        if self.registered(other)?.adj[other_face].is_some() {
            return Err(EngineError::FaceAlreadyGlued {
                tet: other.to_string(),
                face: other_face,
            });
        }

        self.objects[tet].adj[face] = Some((other, perm));
        self.objects[other].adj[other_face] = Some((tet, perm.inverse()));
        self.joins += 1;
        Ok(())
    }

    fn set_label(&mut self, tet: TetHandle, label: &str) -> Result<(), EngineError> {
        let object = self
            .objects
            .get_mut(tet)
            .ok_or_else(|| EngineError::UnknownTetrahedron(tet.to_string()))?;
        object.label = label.to_string();
        Ok(())
    }

    fn gluings_have_changed(&mut self) {
        self.changes += 1;
    }
}
