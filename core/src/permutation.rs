//! Index permutations over ordered sequences.
//!
//! A permutation `p` of length `n` reorders a sequence `xs` of the same length
//! into `ys` with `ys[i] = xs[p[i]]`. The same convention is used for inputs,
//! outputs and inversion throughout the crate.
//!
//! An absent permutation (`None`) stands for the identity, which is why the
//! free functions [`invert`] and [`permute`] take `Option`s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FixerError, Result};

/// A validated bijection on `0..len`.
///
/// `perm[i]` gives the source position of the element placed at position `i`.
///
/// # Example
///
/// ```
/// use iofix_rs::Permutation;
///
/// let perm = Permutation::new(vec![2, 0, 1])?;
/// assert_eq!(perm.apply(vec!["x", "y", "z"])?, vec!["z", "x", "y"]);
/// assert_eq!(perm.inverse().as_slice(), &[1, 2, 0]);
/// # Ok::<(), iofix_rs::FixerError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Create a permutation, checking that every index in `0..len` appears
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::InvalidPermutation`] on duplicates or indices
    /// outside the range.
    pub fn new(indices: Vec<usize>) -> Result<Self> {
        validate_permutation(&indices)?;
        Ok(Self(indices))
    }

    /// The identity permutation of length `len`.
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the permutation is over zero positions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if every position maps to itself.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// The raw indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// The permutation `q` with `q[p[i]] = i`.
    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.0.len()];
        for (i, &p) in self.0.iter().enumerate() {
            inverse[p] = i;
        }
        Self(inverse)
    }

    /// Reorder `xs` so that `result[i] = xs[self[i]]`.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::LengthMismatch`] if `xs` does not have exactly
    /// [`len`](Self::len) elements.
    pub fn apply<T>(&self, xs: Vec<T>) -> Result<Vec<T>> {
        permute_by(xs, &self.0)
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = FixerError;

    fn try_from(indices: Vec<usize>) -> Result<Self> {
        Self::new(indices)
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(perm: Permutation) -> Self {
        perm.0
    }
}

impl FromStr for Permutation {
    type Err = FixerError;

    /// Parse a comma-separated index list like "3,1,2,0".
    ///
    /// An empty list is rejected: leave the permutation out to keep the
    /// native order.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('[').trim_end_matches(']');
        if s.trim().is_empty() {
            return Err(FixerError::config("Empty permutation"));
        }
        let indices = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<usize>()
                    .map_err(|_| FixerError::config(format!("Invalid permutation index: {}", part)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(indices)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "]")
    }
}

/// Invert an optional permutation. The identity (`None`) stays the identity.
pub fn invert(perm: Option<&Permutation>) -> Option<Permutation> {
    perm.map(Permutation::inverse)
}

/// Apply an optional permutation, returning `xs` untouched for `None`.
pub fn permute<T>(xs: Vec<T>, perm: Option<&Permutation>) -> Result<Vec<T>> {
    match perm {
        Some(perm) => perm.apply(xs),
        None => Ok(xs),
    }
}

/// Reorder `xs` by raw indices so that `result[i] = xs[indices[i]]`.
///
/// Elements are moved rather than cloned.
///
/// # Errors
///
/// - [`FixerError::LengthMismatch`] if the lengths differ
/// - [`FixerError::IndexOutOfRange`] if an index is past the end of `xs`
/// - [`FixerError::InvalidPermutation`] if an index is repeated
pub fn permute_by<T>(xs: Vec<T>, indices: &[usize]) -> Result<Vec<T>> {
    if indices.len() != xs.len() {
        return Err(FixerError::LengthMismatch {
            expected: indices.len(),
            actual: xs.len(),
        });
    }

    let len = xs.len();
    let mut slots: Vec<Option<T>> = xs.into_iter().map(Some).collect();
    indices
        .iter()
        .map(|&index| {
            let slot = slots
                .get_mut(index)
                .ok_or(FixerError::IndexOutOfRange { index, len })?;
            slot.take()
                .ok_or_else(|| FixerError::invalid_permutation(indices))
        })
        .collect()
}

/// Validate that `indices` is a permutation of `0..indices.len()`.
fn validate_permutation(indices: &[usize]) -> Result<()> {
    let len = indices.len();
    let mut seen = vec![false; len];
    for &p in indices {
        if p >= len || seen[p] {
            return Err(FixerError::invalid_permutation(indices));
        }
        seen[p] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn all_permutations(len: usize) -> Vec<Permutation> {
        (0..len)
            .permutations(len)
            .map(|p| Permutation::new(p).unwrap())
            .collect()
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = Permutation::new(vec![0, 0, 1]).unwrap_err();
        assert!(matches!(
            err,
            FixerError::InvalidPermutation { ref perm, len: 3 } if perm == &[0, 0, 1]
        ));
    }

    #[test]
    fn test_new_rejects_non_contiguous_range() {
        assert!(matches!(
            Permutation::new(vec![0, 1, 3]),
            Err(FixerError::InvalidPermutation { .. })
        ));
    }

    #[test]
    fn test_apply_follows_source_index_convention() {
        let perm = Permutation::new(vec![3, 1, 2, 0]).unwrap();
        let reordered = perm.apply(vec!['a', 'b', 'c', 'd']).unwrap();
        assert_eq!(reordered, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn test_inverse_of_rotation() {
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        assert_eq!(perm.inverse().as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_round_trip_laws() {
        for len in 0..=5 {
            let xs: Vec<usize> = (100..100 + len).collect();
            for perm in all_permutations(len) {
                let inv = perm.inverse();
                let there = perm.apply(xs.clone()).unwrap();
                assert_eq!(inv.apply(there).unwrap(), xs, "perm {}", perm);
                let back = inv.apply(xs.clone()).unwrap();
                assert_eq!(perm.apply(back).unwrap(), xs, "perm {}", perm);
                assert_eq!(inv.inverse(), perm);
            }
        }
    }

    #[test]
    fn test_identity_laws() {
        assert_eq!(invert(None), None);
        let xs = vec!["a".to_string(), "b".to_string()];
        assert_eq!(permute(xs.clone(), None).unwrap(), xs);
        assert!(Permutation::identity(4).is_identity());
        assert!(Permutation::identity(0).is_empty());
        assert_eq!(Permutation::identity(2).apply(xs.clone()).unwrap(), xs);
    }

    #[test]
    fn test_invert_some() {
        let perm = Permutation::new(vec![1, 3, 2, 0]).unwrap();
        let inv = invert(Some(&perm)).unwrap();
        assert_eq!(inv.as_slice(), &[3, 0, 2, 1]);
    }

    #[test]
    fn test_length_mismatch() {
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        let err = perm.apply(vec![1, 2, 3, 4]).unwrap_err();
        assert!(matches!(
            err,
            FixerError::LengthMismatch {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_permute_by_index_out_of_range() {
        let err = permute_by(vec![1, 2, 3], &[0, 1, 5]).unwrap_err();
        assert!(matches!(err, FixerError::IndexOutOfRange { index: 5, len: 3 }));
    }

    #[test]
    fn test_permute_by_duplicate_index() {
        let err = permute_by(vec![1, 2, 3], &[0, 0, 1]).unwrap_err();
        assert!(matches!(err, FixerError::InvalidPermutation { .. }));
    }

    #[test]
    fn test_apply_moves_non_clone_values() {
        struct Opaque(u8);
        let perm = Permutation::new(vec![1, 0]).unwrap();
        let out = perm.apply(vec![Opaque(1), Opaque(2)]).unwrap();
        assert_eq!(out[0].0, 2);
        assert_eq!(out[1].0, 1);
    }

    #[test]
    fn test_from_str() {
        let perm: Permutation = "3, 1,2,0".parse().unwrap();
        assert_eq!(perm.as_slice(), &[3, 1, 2, 0]);
        let perm: Permutation = "[2,0,1]".parse().unwrap();
        assert_eq!(perm.to_string(), "[2, 0, 1]");
        assert!("1,x".parse::<Permutation>().is_err());
        assert!("1,,0".parse::<Permutation>().is_err());
        assert!("1,1".parse::<Permutation>().is_err());
    }

    #[test]
    fn test_from_str_rejects_empty() {
        for input in ["", "  ", "[]", "[ ]"] {
            let err = input.parse::<Permutation>().unwrap_err();
            assert!(matches!(err, FixerError::Config(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_serde_validates() {
        let perm: Permutation = serde_json::from_str("[1, 0]").unwrap();
        assert_eq!(serde_json::to_string(&perm).unwrap(), "[1,0]");
        assert!(serde_json::from_str::<Permutation>("[0, 0]").is_err());
    }
}
