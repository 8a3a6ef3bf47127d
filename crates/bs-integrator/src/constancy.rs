//! Which operators stay fixed over a run.

use crate::error::{IntegratorError, IntegratorResult};

/// Constancy of rhs, K and C, in that order.
///
/// A constant operator is assembled once per run and reused; its cached
/// factorization is reused with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstancyFlags {
    pub rhs: bool,
    pub stiffness: bool,
    pub damping: bool,
}

impl ConstancyFlags {
    /// Everything is reassembled every iteration.
    pub const NONE: Self = Self {
        rhs: false,
        stiffness: false,
        damping: false,
    };

    /// Everything is assembled once.
    pub const ALL: Self = Self {
        rhs: true,
        stiffness: true,
        damping: true,
    };

    /// Parse `[rhs, stiffness, damping]`.
    ///
    /// An empty slice means nothing is constant; any length other than 0 or 3
    /// is rejected.
    pub fn from_slice(flags: &[bool]) -> IntegratorResult<Self> {
        match *flags {
            [] => Ok(Self::NONE),
            [rhs, stiffness, damping] => Ok(Self {
                rhs,
                stiffness,
                damping,
            }),
            _ => Err(IntegratorError::InvalidConstancyFlags { len: flags.len() }),
        }
    }

    pub fn as_array(self) -> [bool; 3] {
        [self.rhs, self.stiffness, self.damping]
    }
}

impl TryFrom<&[bool]> for ConstancyFlags {
    type Error = IntegratorError;

    fn try_from(flags: &[bool]) -> IntegratorResult<Self> {
        Self::from_slice(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_means_nothing_constant() {
        assert_eq!(ConstancyFlags::from_slice(&[]).unwrap(), ConstancyFlags::NONE);
        assert_eq!(
            ConstancyFlags::from_slice(&[]).unwrap(),
            ConstancyFlags::from_slice(&[false, false, false]).unwrap()
        );
    }

    #[test]
    fn order_is_rhs_stiffness_damping() {
        let flags = ConstancyFlags::from_slice(&[true, false, true]).unwrap();
        assert!(flags.rhs);
        assert!(!flags.stiffness);
        assert!(flags.damping);
        assert_eq!(flags.as_array(), [true, false, true]);
    }

    #[test]
    fn other_lengths_are_rejected() {
        for len in [1, 2, 4, 7] {
            let flags = vec![true; len];
            let err = ConstancyFlags::try_from(flags.as_slice()).unwrap_err();
            assert_eq!(err, IntegratorError::InvalidConstancyFlags { len });
        }
    }
}
