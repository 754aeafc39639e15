use super::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A block of conic constraint rows, in the order the rows appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SupportedConeT {
    /// `s = 0` on the given number of rows, i.e. equalities
    ZeroConeT(usize),
    /// `s ≥ 0` on the given number of rows
    NonnegativeConeT(usize),
}

impl SupportedConeT {
    /// Number of constraint rows in the block
    pub(crate) fn nvars(&self) -> usize {
        match *self {
            Self::ZeroConeT(dim) | Self::NonnegativeConeT(dim) => dim,
        }
    }

    fn build<T: FloatT>(&self) -> SupportedCone<T> {
        match *self {
            Self::ZeroConeT(dim) => ZeroCone::new(dim).into(),
            Self::NonnegativeConeT(dim) => NonnegativeCone::new(dim).into(),
        }
    }
}

impl std::fmt::Display for SupportedConeT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.as_tag().as_str(), self.nvars())
    }
}

impl<T: FloatT> From<&SupportedConeT> for SupportedCone<T> {
    fn from(cone: &SupportedConeT) -> Self {
        cone.build()
    }
}

// statically dispatched union of the solver's cones
#[allow(clippy::enum_variant_names)]
#[enum_dispatch(Cone<T>)]
pub(crate) enum SupportedCone<T>
where
    T: FloatT,
{
    ZeroCone(ZeroCone<T>),
    NonnegativeCone(NonnegativeCone<T>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SupportedConeTag {
    ZeroCone,
    NonnegativeCone,
}

impl SupportedConeTag {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroCone => "ZeroCone",
            Self::NonnegativeCone => "NonnegativeCone",
        }
    }
}

pub(crate) trait SupportedConeAsTag {
    fn as_tag(&self) -> SupportedConeTag;
}

impl SupportedConeAsTag for SupportedConeT {
    fn as_tag(&self) -> SupportedConeTag {
        match self {
            Self::ZeroConeT(_) => SupportedConeTag::ZeroCone,
            Self::NonnegativeConeT(_) => SupportedConeTag::NonnegativeCone,
        }
    }
}

impl<T: FloatT> SupportedConeAsTag for SupportedCone<T> {
    fn as_tag(&self) -> SupportedConeTag {
        match self {
            Self::ZeroCone(_) => SupportedConeTag::ZeroCone,
            Self::NonnegativeCone(_) => SupportedConeTag::NonnegativeCone,
        }
    }
}

#[test]
fn test_cone_display() {
    assert_eq!(SupportedConeT::ZeroConeT(2).to_string(), "ZeroCone(2)");
    assert_eq!(SupportedConeT::NonnegativeConeT(5).nvars(), 5);
}
