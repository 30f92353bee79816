use std::fmt;

/// Permutation of the four vertices {0, 1, 2, 3} of a tetrahedron.
///
/// A gluing permutation `p` for face `f` of tetrahedron `A` identifies every vertex `v` of that face
/// with vertex `p.image_of(v)` of the neighbour, and the face of the neighbour that is glued to `f`
/// is `p.image_of(f)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Perm4 {
    images: [u8; 4],
}

impl Perm4 {
    pub const IDENTITY: Perm4 = Perm4 {
        images: [0, 1, 2, 3],
    };

    /// Construct the permutation mapping `i` to `images[i]`, or `None` if `images` is not a bijection.
    pub fn new(images: [usize; 4]) -> Option<Self> {
        let mut seen = [false; 4];
        for &image in &images {
            if image > 3 || seen[image] {
                return None;
            }
            seen[image] = true;
        }
        Some(Perm4 {
            images: images.map(|image| image as u8),
        })
    }

    /// The permutation swapping `a` and `b`.
    pub fn transposition(a: usize, b: usize) -> Self {
        debug_assert!(a < 4 && b < 4, "({a} {b}) is not a transposition of S4");
        let mut images = Self::IDENTITY.images;
        images.swap(a, b);
        Perm4 { images }
    }

    pub fn image_of(&self, source: usize) -> usize {
        self.images[source] as usize
    }

    pub fn pre_image_of(&self, image: usize) -> usize {
        self.images
            .iter()
            .position(|&i| i as usize == image)
            .expect("a permutation of S4 is surjective")
    }

    pub fn inverse(&self) -> Self {
        let mut images = [0; 4];
        for (source, &image) in self.images.iter().enumerate() {
            images[image as usize] = source as u8;
        }
        Perm4 { images }
    }

    /// Return `self ∘ other`, i.e. the permutation applying `other` first and `self` second.
    pub fn compose(&self, other: &Perm4) -> Self {
        Perm4 {
            images: other.images.map(|i| self.images[i as usize]),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Return +1 for even and -1 for odd permutations.
    pub fn sign(&self) -> i32 {
        let mut inversions = 0;
        for i in 0..4 {
            for j in (i + 1)..4 {
                if self.images[i] > self.images[j] {
                    inversions += 1;
                }
            }
        }
        if inversions % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// Canonical ordering of a face: maps (0, 1, 2) to the vertices of `face` in increasing order,
    /// and 3 to `face` itself (face `i` is opposite vertex `i`).
    pub fn face_ordering(face: usize) -> Self {
        let images = match face {
            0 => [1, 2, 3, 0],
            1 => [0, 2, 3, 1],
            2 => [0, 1, 3, 2],
            3 => [0, 1, 2, 3],
            _ => unreachable!("a tetrahedron has no face {face}"),
        };
        Perm4 { images }
    }

    /// The vertices of `face` as a three digit string, e.g. `"013"` for face 2.
    pub fn face_description(face: usize) -> String {
        Self::face_ordering(face).trunc3()
    }

    /// The images of 0, 1 and 2 as a three digit string.
    pub fn trunc3(&self) -> String {
        format!("{}{}{}", self.images[0], self.images[1], self.images[2])
    }

    /// Iterate over all 24 elements of S4 in lexicographic order of their images.
    pub fn all() -> impl Iterator<Item = Perm4> {
        (0..256_usize).filter_map(|code| {
            Perm4::new([(code >> 6) & 3, (code >> 4) & 3, (code >> 2) & 3, code & 3])
        })
    }

    /// Sample a uniformly random element of S4.
    pub fn sample(rng: &fastrand::Rng) -> Self {
        let mut images = Self::IDENTITY.images;
        rng.shuffle(&mut images);
        Perm4 { images }
    }
}

impl Default for Perm4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Perm4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.images;
        write!(f, "{a}{b}{c}{d}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_bijections() {
        assert!(Perm4::new([0, 1, 2, 3]).is_some());
        assert!(Perm4::new([0, 0, 2, 3]).is_none());
        assert!(Perm4::new([0, 1, 2, 4]).is_none());
    }

    #[test]
    fn group_structure() {
        let perms = Perm4::all().collect::<Vec<_>>();
        assert_eq!(perms.len(), 24);
        assert_eq!(perms[0], Perm4::IDENTITY);
        for (i, p) in perms.iter().enumerate() {
            assert!(perms[(i + 1)..].iter().all(|q| q != p));
            assert!(p.compose(&p.inverse()).is_identity());
            assert!(p.inverse().compose(p).is_identity());
            for q in &perms {
                let pq = p.compose(q);
                for v in 0..4 {
                    assert_eq!(pq.image_of(v), p.image_of(q.image_of(v)));
                }
                assert_eq!(pq.sign(), p.sign() * q.sign());
            }
            for v in 0..4 {
                assert_eq!(p.pre_image_of(p.image_of(v)), v);
            }
        }
        assert_eq!(perms.iter().filter(|p| p.sign() == 1).count(), 12);
    }

    #[test]
    fn transpositions_are_odd() {
        let p = Perm4::transposition(1, 3);
        assert_eq!(p, Perm4::new([0, 3, 2, 1]).unwrap());
        assert_eq!(p.sign(), -1);
        assert_eq!(p.inverse(), p);
    }

    #[test]
    fn face_orderings() {
        for face in 0..4 {
            let ordering = Perm4::face_ordering(face);
            assert_eq!(ordering.image_of(3), face);
            assert!(ordering.image_of(0) < ordering.image_of(1));
            assert!(ordering.image_of(1) < ordering.image_of(2));
        }
        assert_eq!(Perm4::face_description(3), "012");
        assert_eq!(Perm4::face_description(2), "013");
        assert_eq!(Perm4::face_description(1), "023");
        assert_eq!(Perm4::face_description(0), "123");
    }

    #[test]
    fn display() {
        let p = Perm4::new([1, 0, 3, 2]).unwrap();
        assert_eq!(p.to_string(), "1032");
        assert_eq!(p.trunc3(), "103");
    }

    #[test]
    fn sampling_stays_in_s4() {
        let rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let p = Perm4::sample(&rng);
            assert!(Perm4::all().any(|q| q == p));
        }
    }
}
