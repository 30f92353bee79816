use super::{check_face, FaceState, Gluing, Tetrahedron, Triangulation, FACES};
use crate::{data_structs::Label, error::GluingError, perm::Perm4};
use tracing::{debug, trace};

/// Requested new state for a face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Boundary,
    /// Glue to `face` of `tet`; `perm` must map the edited face onto `face`.
    Face {
        tet: Label<Tetrahedron>,
        face: usize,
        perm: Perm4,
    },
}

/// Existing gluing that a request would overwrite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// The target face is glued to some face other than the one being edited.
    GluedElsewhere {
        partner: Label<Tetrahedron>,
        partner_face: usize,
    },
    /// The two faces are already glued together, but with the vertices in a different order.
    Reordered { existing: Perm4, requested: Perm4 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Committed,
    Unchanged,
    Cancelled,
}

/// A validated gluing edit that has not been applied yet.
///
/// Holding the pending edit borrows the triangulation mutably, so no other edit can start until
/// this one is committed or cancelled.
#[derive(Debug)]
#[must_use = "a pending gluing does nothing until it is committed"]
pub struct PendingGluing<'a> {
    triangulation: &'a mut Triangulation,
    tet: Label<Tetrahedron>,
    face: usize,
    target: Target,
    conflict: Option<Conflict>,
}

impl<'a> PendingGluing<'a> {
    pub fn target(&self) -> Target {
        self.target
    }

    /// The existing gluing that committing would overwrite, if any.
    pub fn conflict(&self) -> Option<Conflict> {
        self.conflict
    }

    /// Whether committing would leave the triangulation exactly as it is.
    pub fn is_unchanged(&self) -> bool {
        let current = self.triangulation.face_state(self.tet, self.face);
        match self.target {
            Target::Boundary => current == FaceState::Boundary,
            Target::Face { tet, perm, .. } => current == FaceState::Glued(Gluing { tet, perm }),
        }
    }

    /// Apply the edit, updating both sides of every gluing it touches.
    pub fn commit(self) -> EditOutcome {
        if self.is_unchanged() {
            trace!(tet = %self.tet, face = self.face, "gluing unchanged");
            return EditOutcome::Unchanged;
        }
        let PendingGluing {
            triangulation,
            tet,
            face,
            target,
            ..
        } = self;

        // release the current partner of the edited face
        triangulation.detach(tet, face);

        if let Target::Face {
            tet: other,
            face: other_face,
            perm,
        } = target
        {
            // the target face is taken from whatever it was glued to
            triangulation.detach(other, other_face);
            triangulation.set_face(tet, face, FaceState::Glued(Gluing { tet: other, perm }));
            triangulation.set_face(
                other,
                other_face,
                FaceState::Glued(Gluing {
                    tet,
                    perm: perm.inverse(),
                }),
            );
            debug!(%tet, face, %other, other_face, %perm, "glued faces");
        } else {
            debug!(%tet, face, "made face boundary");
        }

        debug_assert_eq!(triangulation.check_gluings(), Ok(()));
        EditOutcome::Committed
    }

    pub fn cancel(self) -> EditOutcome {
        trace!(tet = %self.tet, face = self.face, "gluing cancelled");
        EditOutcome::Cancelled
    }

    /// Commit unless there is a conflict that `confirm` declines to overwrite.
    pub fn resolve<F>(self, confirm: F) -> EditOutcome
    where
        F: FnOnce(&Conflict) -> bool,
    {
        match self.conflict {
            Some(conflict) if !confirm(&conflict) => self.cancel(),
            _ => self.commit(),
        }
    }
}

impl Triangulation {
    /// Validate a request to change `face` of `tet`, and return it as a pending edit.
    ///
    /// Nothing is modified here; a rejected request leaves the triangulation untouched.
    pub fn request_gluing(
        &mut self,
        tet: Label<Tetrahedron>,
        face: usize,
        target: Target,
    ) -> Result<PendingGluing<'_>, GluingError> {
        self.check_label(tet)?;
        check_face(face)?;
        if let Target::Face {
            tet: other,
            face: other_face,
            perm,
        } = target
        {
            self.check_label(other)?;
            check_face(other_face)?;
            let actual = perm.image_of(face);
            if actual != other_face {
                return Err(GluingError::FaceMismatch {
                    face,
                    expected: other_face,
                    actual,
                });
            }
            if other == tet && other_face == face {
                return Err(GluingError::SelfGluing {
                    tet: tet.value(),
                    face,
                });
            }
        }

        let conflict = self.conflict(tet, face, target);
        Ok(PendingGluing {
            triangulation: self,
            tet,
            face,
            target,
            conflict,
        })
    }

    /// Request a gluing and settle it straight away, asking `confirm` about any conflict.
    pub fn glue<F>(
        &mut self,
        tet: Label<Tetrahedron>,
        face: usize,
        target: Target,
        confirm: F,
    ) -> Result<EditOutcome, GluingError>
    where
        F: FnOnce(&Conflict) -> bool,
    {
        Ok(self.request_gluing(tet, face, target)?.resolve(confirm))
    }

    /// Make a face boundary, releasing its partner.
    pub fn unglue(
        &mut self,
        tet: Label<Tetrahedron>,
        face: usize,
    ) -> Result<EditOutcome, GluingError> {
        Ok(self.request_gluing(tet, face, Target::Boundary)?.commit())
    }

    fn conflict(&self, tet: Label<Tetrahedron>, face: usize, target: Target) -> Option<Conflict> {
        let Target::Face {
            tet: other,
            face: other_face,
            perm,
        } = target
        else {
            return None;
        };
        let existing = self.face_state(other, other_face).gluing()?;
        let partner_face = existing.face(other_face);
        if existing.tet != tet || partner_face != face {
            Some(Conflict::GluedElsewhere {
                partner: existing.tet,
                partner_face,
            })
        } else if existing.perm.inverse() != perm {
            Some(Conflict::Reordered {
                existing: existing.perm.inverse(),
                requested: perm,
            })
        } else {
            None
        }
    }

    /// Draw a random valid request: a face of a random tetrahedron, and either the boundary or a
    /// random face of a random tetrahedron with a random vertex map. Returns `None` when empty.
    pub fn sample_request(&self, rng: &fastrand::Rng) -> Option<(Label<Tetrahedron>, usize, Target)> {
        if self.is_empty() {
            return None;
        }
        let tet = Label::new(rng.usize(0..self.size()));
        let face = rng.usize(0..FACES);
        if rng.usize(0..5) == 0 {
            return Some((tet, face, Target::Boundary));
        }

        let other = Label::new(rng.usize(0..self.size()));
        let mut perm = Perm4::sample(rng);
        if other == tet && perm.image_of(face) == face {
            let swap = (face + 1 + rng.usize(0..3)) % FACES;
            perm = Perm4::transposition(face, swap).compose(&perm);
        }
        let target = Target::Face {
            tet: other,
            face: perm.image_of(face),
            perm,
        };
        Some((tet, face, target))
    }
}
