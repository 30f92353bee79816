mod editor;
mod graph;

pub use editor::{Conflict, EditOutcome, PendingGluing, Target};
pub use graph::{Graph, GraphEdge};

use crate::{data_structs::Label, error::GluingError, perm::Perm4};
use std::{collections::BTreeSet, fmt};
use tracing::debug;

/// Number of faces of a tetrahedron.
pub const FACES: usize = 4;

/// Editable structure holding the tetrahedra of a triangulation and their face gluings.
///
/// The triangulation owns its tetrahedra. Faces refer to their neighbours by `Label`, which is the
/// neighbour's current position in the sequence; deleting tetrahedra remaps these labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Triangulation {
    tets: Vec<Tetrahedron>,
}

/// Tetrahedron structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tetrahedron {
    label: String,
    index: usize,
    faces: [FaceState; FACES],
}

/// State of a single face of a tetrahedron.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaceState {
    Boundary,
    Glued(Gluing),
}

/// Neighbour across a face, and the vertex map onto it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Gluing {
    pub tet: Label<Tetrahedron>,
    pub perm: Perm4,
}

impl Gluing {
    /// The face of the neighbour that is glued to `my_face`.
    pub fn face(&self, my_face: usize) -> usize {
        self.perm.image_of(my_face)
    }
}

impl FaceState {
    pub fn gluing(&self) -> Option<Gluing> {
        match *self {
            FaceState::Boundary => None,
            FaceState::Glued(gluing) => Some(gluing),
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, FaceState::Boundary)
    }
}

impl Tetrahedron {
    fn new(index: usize) -> Self {
        Tetrahedron {
            label: String::new(),
            index,
            faces: [FaceState::Boundary; FACES],
        }
    }

    /// Tetrahedron with the given label and faces, not yet placed in a triangulation.
    pub(crate) fn with_faces(label: String, faces: [FaceState; FACES]) -> Self {
        Tetrahedron {
            label,
            index: 0,
            faces,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Position of this tetrahedron in its triangulation.
    pub fn index(&self) -> usize {
        self.index
    }

    /// State of `face`, or `None` if `face` is not between 0 and 3.
    pub fn face(&self, face: usize) -> Option<FaceState> {
        self.faces.get(face).copied()
    }

    pub fn faces(&self) -> &[FaceState; FACES] {
        &self.faces
    }

    pub fn has_boundary(&self) -> bool {
        self.faces.iter().any(FaceState::is_boundary)
    }

    pub fn boundary_count(&self) -> usize {
        self.faces.iter().filter(|state| state.is_boundary()).count()
    }

    fn name(&self) -> String {
        if self.label.is_empty() {
            self.index.to_string()
        } else {
            format!("{} ({})", self.index, self.label)
        }
    }
}

pub(crate) fn check_face(face: usize) -> Result<(), GluingError> {
    if face < FACES {
        Ok(())
    } else {
        Err(GluingError::InvalidFace(face))
    }
}

impl Triangulation {
    pub fn new() -> Self {
        Triangulation { tets: Vec::new() }
    }

    /// Assemble a triangulation from fully resolved tetrahedra, numbering them by position.
    pub(crate) fn from_tetrahedra(tets: Vec<Tetrahedron>) -> Self {
        let mut triangulation = Triangulation { tets };
        triangulation.reindex();
        triangulation
    }

    pub fn size(&self) -> usize {
        self.tets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tets
    }

    pub fn get(&self, tet: Label<Tetrahedron>) -> Option<&Tetrahedron> {
        self.tets.get(tet.value())
    }

    /// Tetrahedron at position `index`.
    pub fn tetrahedron(&self, index: usize) -> Option<&Tetrahedron> {
        self.tets.get(index)
    }

    pub fn labels(&self) -> impl Iterator<Item = Label<Tetrahedron>> {
        (0..self.tets.len()).map(Label::new)
    }

    /// State of a face, checking both the tetrahedron and the face number.
    pub fn face(&self, tet: Label<Tetrahedron>, face: usize) -> Result<FaceState, GluingError> {
        self.check_label(tet)?;
        check_face(face)?;
        Ok(self.face_state(tet, face))
    }

    /// Append a new tetrahedron with an empty label and four boundary faces.
    pub fn add_tetrahedron(&mut self) -> Label<Tetrahedron> {
        let index = self.tets.len();
        self.tets.push(Tetrahedron::new(index));
        debug!(index, "added tetrahedron");
        Label::new(index)
    }

    /// Set the label of a tetrahedron, ignoring surrounding whitespace. Return whether it changed.
    pub fn set_label(&mut self, tet: Label<Tetrahedron>, label: &str) -> Result<bool, GluingError> {
        self.check_label(tet)?;
        let label = label.trim();
        let current = &mut self.tets[tet.value()].label;
        if *current == label {
            return Ok(false);
        }
        *current = label.to_string();
        Ok(true)
    }

    /// Delete a set of tetrahedra as one operation, and return how many were removed.
    ///
    /// Every row is validated before anything is touched. All gluings onto the deleted tetrahedra
    /// are turned into boundary faces first, then the tetrahedra are removed and the survivors are
    /// renumbered.
    pub fn delete_tetrahedra<I>(&mut self, rows: I) -> Result<usize, GluingError>
    where
        I: IntoIterator,
        I::Item: Into<Label<Tetrahedron>>,
    {
        let doomed = rows
            .into_iter()
            .map(|row| {
                let tet = row.into();
                self.check_label(tet).map(|_| tet)
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        if doomed.is_empty() {
            return Ok(0);
        }

        // isolate the tetrahedra before anything moves
        for &tet in &doomed {
            for face in 0..FACES {
                self.detach(tet, face);
            }
        }

        // find where the survivors end up
        let mut new_index = vec![None; self.tets.len()];
        let mut next = 0;
        for (i, slot) in new_index.iter_mut().enumerate() {
            if !doomed.contains(&Label::new(i)) {
                *slot = Some(next);
                next += 1;
            }
        }

        let mut position = 0;
        self.tets.retain(|_| {
            let keep = new_index[position].is_some();
            position += 1;
            keep
        });

        for tet in &mut self.tets {
            for state in &mut tet.faces {
                if let FaceState::Glued(gluing) = state {
                    let index = new_index[gluing.tet.value()]
                        .expect("gluings onto deleted tetrahedra were severed");
                    gluing.tet = Label::new(index);
                }
            }
        }
        self.reindex();

        debug!(
            removed = doomed.len(),
            remaining = self.tets.len(),
            "deleted tetrahedra"
        );
        debug_assert_eq!(self.check_gluings(), Ok(()));
        Ok(doomed.len())
    }

    fn reindex(&mut self) {
        for (position, tet) in self.tets.iter_mut().enumerate() {
            tet.index = position;
        }
    }

    pub(crate) fn check_label(&self, tet: Label<Tetrahedron>) -> Result<(), GluingError> {
        if tet.value() < self.tets.len() {
            Ok(())
        } else {
            Err(GluingError::IndexOutOfRange {
                index: tet.value(),
                size: self.tets.len(),
            })
        }
    }

    pub(crate) fn face_state(&self, tet: Label<Tetrahedron>, face: usize) -> FaceState {
        self.tets[tet.value()].faces[face]
    }

    pub(crate) fn set_face(&mut self, tet: Label<Tetrahedron>, face: usize, state: FaceState) {
        self.tets[tet.value()].faces[face] = state;
    }

    /// Turn a face and its partner (if any) into boundary faces.
    pub(crate) fn detach(&mut self, tet: Label<Tetrahedron>, face: usize) {
        if let FaceState::Glued(gluing) = self.face_state(tet, face) {
            self.set_face(gluing.tet, gluing.face(face), FaceState::Boundary);
            self.set_face(tet, face, FaceState::Boundary);
        }
    }

    /// Render a face gluing as `"<tet> (<vertices>)"`, listing the neighbour's vertices that the
    /// vertices of `face` are glued to; boundary faces render as an empty string.
    pub fn describe_face(&self, tet: Label<Tetrahedron>, face: usize) -> Result<String, GluingError> {
        Ok(match self.face(tet, face)? {
            FaceState::Boundary => String::new(),
            FaceState::Glued(gluing) => format!(
                "{} ({})",
                gluing.tet,
                gluing.perm.compose(&Perm4::face_ordering(face)).trunc3()
            ),
        })
    }

    /// Check that every gluing is mirrored by its partner and that indices match positions.
    pub fn check_gluings(&self) -> Result<(), GluingError> {
        for (position, tet) in self.tets.iter().enumerate() {
            if tet.index != position {
                return Err(GluingError::MisIndexed {
                    position,
                    index: tet.index,
                });
            }
            for (face, state) in tet.faces.iter().enumerate() {
                let FaceState::Glued(gluing) = *state else {
                    continue;
                };
                let Some(other) = self.tets.get(gluing.tet.value()) else {
                    return Err(GluingError::DanglingNeighbour {
                        tet: position,
                        face,
                    });
                };
                let their_face = gluing.face(face);
                if gluing.tet.value() == position && their_face == face {
                    return Err(GluingError::SelfGluing {
                        tet: position,
                        face,
                    });
                }
                let mirror = FaceState::Glued(Gluing {
                    tet: Label::new(position),
                    perm: gluing.perm.inverse(),
                });
                if other.faces[their_face] != mirror {
                    return Err(GluingError::Asymmetric {
                        tet: position,
                        face,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn boundary_faces(&self) -> usize {
        self.tets.iter().map(Tetrahedron::boundary_count).sum()
    }

    pub fn has_boundary(&self) -> bool {
        self.tets.iter().any(Tetrahedron::has_boundary)
    }

    /// Whether every face is glued. The empty triangulation counts as closed.
    pub fn is_closed(&self) -> bool {
        !self.has_boundary()
    }

    /// Graph with a node per tetrahedron and an edge per pair of glued faces.
    pub fn dual_graph(&self) -> Graph {
        let adj = self
            .tets
            .iter()
            .map(|tet| {
                tet.faces
                    .iter()
                    .filter_map(|state| state.gluing().map(|gluing| gluing.tet.value()))
                    .collect()
            })
            .collect();
        Graph::new(adj)
    }

    pub fn component_count(&self) -> usize {
        self.dual_graph().connected_components().len()
    }

    /// Number of pairs of glued faces.
    pub fn gluing_count(&self) -> usize {
        self.dual_graph().edges().len()
    }
}

impl fmt::Display for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}", "Tetrahedron")?;
        for face in (0..FACES).rev() {
            write!(f, "{:<12}", format!("Face {}", Perm4::face_description(face)))?;
        }
        writeln!(f)?;
        for label in self.labels() {
            write!(f, "{:<16}", self.tets[label.value()].name())?;
            for face in (0..FACES).rev() {
                let cell = self.describe_face(label, face).map_err(|_| fmt::Error)?;
                write!(f, "{cell:<12}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn tet(i: usize) -> Label<Tetrahedron> {
        Label::new(i)
    }

    pub fn perm(images: [usize; 4]) -> Perm4 {
        Perm4::new(images).unwrap()
    }

    /// Two tetrahedra with face 3 of the first glued to face 2 of the second.
    pub fn glued_pair() -> (Triangulation, Perm4) {
        let mut triangulation = Triangulation::new();
        triangulation.add_tetrahedron();
        triangulation.add_tetrahedron();
        let p = perm([1, 0, 3, 2]);
        let outcome = triangulation
            .glue(
                tet(0),
                3,
                Target::Face {
                    tet: tet(1),
                    face: 2,
                    perm: p,
                },
                |_| false,
            )
            .unwrap();
        assert_eq!(outcome, EditOutcome::Committed);
        (triangulation, p)
    }

    #[test]
    fn add_two_tetrahedra() {
        let mut triangulation = Triangulation::new();
        assert!(triangulation.is_empty());
        assert_eq!(triangulation.add_tetrahedron(), tet(0));
        assert_eq!(triangulation.add_tetrahedron(), tet(1));
        assert_eq!(triangulation.size(), 2);
        for (position, t) in triangulation.tetrahedra().iter().enumerate() {
            assert_eq!(t.index(), position);
            assert_eq!(t.label(), "");
            assert!(t.faces().iter().all(FaceState::is_boundary));
        }
        assert_eq!(triangulation.boundary_faces(), 8);
        assert_eq!(triangulation.check_gluings(), Ok(()));
    }

    #[test]
    fn delete_severs_survivors() {
        let (mut triangulation, _) = glued_pair();
        assert_eq!(triangulation.delete_tetrahedra([tet(1)]), Ok(1));
        assert_eq!(triangulation.size(), 1);
        assert_eq!(triangulation.tetrahedra()[0].index(), 0);
        assert_eq!(triangulation.face(tet(0), 3), Ok(FaceState::Boundary));
        assert_eq!(triangulation.check_gluings(), Ok(()));
    }

    #[test]
    fn delete_remaps_neighbours() {
        let mut triangulation = Triangulation::new();
        for _ in 0..4 {
            triangulation.add_tetrahedron();
        }
        triangulation.set_label(tet(3), "last").unwrap();
        let p = perm([0, 1, 3, 2]);
        triangulation
            .glue(
                tet(2),
                2,
                Target::Face {
                    tet: tet(3),
                    face: 3,
                    perm: p,
                },
                |_| true,
            )
            .unwrap();
        triangulation
            .glue(
                tet(0),
                0,
                Target::Face {
                    tet: tet(3),
                    face: 0,
                    perm: Perm4::transposition(1, 2),
                },
                |_| true,
            )
            .unwrap();

        // delete the first two rows at once, listing one of them twice
        assert_eq!(triangulation.delete_tetrahedra([tet(1), tet(0), tet(1)]), Ok(2));
        assert_eq!(triangulation.size(), 2);
        assert_eq!(triangulation.tetrahedra()[1].label(), "last");
        assert_eq!(triangulation.tetrahedra()[1].index(), 1);
        assert_eq!(triangulation.face(tet(1), 0), Ok(FaceState::Boundary));
        assert_eq!(
            triangulation.face(tet(0), 2),
            Ok(FaceState::Glued(Gluing { tet: tet(1), perm: p }))
        );
        assert_eq!(
            triangulation.face(tet(1), 3),
            Ok(FaceState::Glued(Gluing {
                tet: tet(0),
                perm: p.inverse()
            }))
        );
        assert_eq!(triangulation.check_gluings(), Ok(()));
    }

    #[test]
    fn delete_out_of_range_is_rejected_without_mutation() {
        let (mut triangulation, _) = glued_pair();
        let before = triangulation.clone();
        assert_eq!(
            triangulation.delete_tetrahedra([tet(0), tet(2)]),
            Err(GluingError::IndexOutOfRange { index: 2, size: 2 })
        );
        assert_eq!(triangulation, before);
        assert_eq!(triangulation.delete_tetrahedra(Vec::<usize>::new()), Ok(0));
    }

    #[test]
    fn delete_everything() {
        let (mut triangulation, _) = glued_pair();
        assert_eq!(triangulation.delete_tetrahedra(triangulation.labels().collect::<Vec<_>>()), Ok(2));
        assert!(triangulation.is_empty());
    }

    #[test]
    fn labels_are_trimmed() {
        let mut triangulation = Triangulation::new();
        triangulation.add_tetrahedron();
        assert_eq!(triangulation.set_label(tet(0), "  apex "), Ok(true));
        assert_eq!(triangulation.tetrahedra()[0].label(), "apex");
        assert_eq!(triangulation.set_label(tet(0), "apex"), Ok(false));
        assert_eq!(
            triangulation.set_label(tet(1), "x"),
            Err(GluingError::IndexOutOfRange { index: 1, size: 1 })
        );
    }

    #[test]
    fn describe_faces() {
        let (triangulation, p) = glued_pair();
        // face 3 is 012, and p sends 0 1 2 to 1 0 3
        assert_eq!(triangulation.describe_face(tet(0), 3).unwrap(), "1 (103)");
        // face 2 is 013, and p⁻¹ = p sends 0 1 3 to 1 0 2
        assert_eq!(p.inverse(), p);
        assert_eq!(triangulation.describe_face(tet(1), 2).unwrap(), "0 (102)");
        assert_eq!(triangulation.describe_face(tet(1), 0).unwrap(), "");
        assert_eq!(
            triangulation.describe_face(tet(0), 4),
            Err(GluingError::InvalidFace(4))
        );
    }

    #[test]
    fn display_table() {
        let (mut triangulation, _) = glued_pair();
        triangulation.set_label(tet(1), "b").unwrap();
        let table = triangulation.to_string();
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Tetrahedron"));
        assert!(lines[0].contains("Face 012"));
        assert!(lines[0].trim_end().ends_with("Face 123"));
        assert!(lines[1].starts_with("0 "));
        assert!(lines[1].contains("1 (103)"));
        assert!(lines[2].starts_with("1 (b)"));
        assert!(lines[2].contains("0 (102)"));
    }

    #[test]
    fn check_gluings_reports_asymmetry() {
        let (mut triangulation, _) = glued_pair();
        triangulation.set_face(tet(1), 2, FaceState::Boundary);
        assert_eq!(
            triangulation.check_gluings(),
            Err(GluingError::Asymmetric { tet: 0, face: 3 })
        );

        let (mut triangulation, p) = glued_pair();
        triangulation.set_face(
            tet(1),
            2,
            FaceState::Glued(Gluing {
                tet: tet(5),
                perm: p,
            }),
        );
        assert_eq!(
            triangulation.check_gluings(),
            Err(GluingError::Asymmetric { tet: 0, face: 3 })
        );
        triangulation.set_face(tet(0), 3, FaceState::Boundary);
        assert_eq!(
            triangulation.check_gluings(),
            Err(GluingError::DanglingNeighbour { tet: 1, face: 2 })
        );
    }

    #[test]
    fn components() {
        let (mut triangulation, _) = glued_pair();
        assert_eq!(triangulation.component_count(), 1);
        assert_eq!(triangulation.gluing_count(), 1);
        triangulation.add_tetrahedron();
        assert_eq!(triangulation.component_count(), 2);
        assert!(triangulation.has_boundary());
        assert_eq!(triangulation.boundary_faces(), 10);
    }

    #[test]
    fn tetrahedron_lookup() {
        let (mut triangulation, p) = glued_pair();
        triangulation.set_label(tet(1), "b").unwrap();
        let second = triangulation.tetrahedron(1).unwrap();
        assert_eq!(second.label(), "b");
        assert_eq!(second.index(), 1);
        assert_eq!(
            second.face(2),
            Some(FaceState::Glued(Gluing { tet: tet(0), perm: p }))
        );
        assert_eq!(second.face(0), Some(FaceState::Boundary));
        assert_eq!(second.face(4), None);
        assert!(triangulation.tetrahedron(2).is_none());
    }

    #[test]
    fn closed_triangulations() {
        assert!(Triangulation::new().is_closed());

        // one tetrahedron folded shut: 0 -- 1 and 2 -- 3
        let mut triangulation = Triangulation::new();
        triangulation.add_tetrahedron();
        assert!(!triangulation.is_closed());
        for (face, other_face) in [(0, 1), (2, 3)] {
            let target = Target::Face {
                tet: tet(0),
                face: other_face,
                perm: Perm4::transposition(face, other_face),
            };
            triangulation.glue(tet(0), face, target, |_| false).unwrap();
        }
        assert!(triangulation.is_closed());
        assert_eq!(triangulation.boundary_faces(), 0);

        triangulation.unglue(tet(0), 3).unwrap();
        assert!(!triangulation.is_closed());
        assert_eq!(triangulation.boundary_faces(), 2);
    }
}
