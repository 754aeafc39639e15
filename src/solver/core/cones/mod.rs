#![allow(non_snake_case)]

use crate::algebra::FloatT;
use crate::solver::CoreSettings;
use enum_dispatch::*;

mod nonnegativecone;
mod zerocone;

mod compositecone;
mod supportedcone;

pub use compositecone::*;
pub use nonnegativecone::*;
pub use supportedcone::*;
pub use zerocone::*;

/// Whether an operation acts on a cone or on its dual.
///
/// The distinction only matters for the zero cone, whose dual is
/// the whole space.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ConeSide {
    Primal,
    Dual,
}

/// Operations the interior point iteration needs from a cone.
///
/// Every cone here has a diagonal Nesterov-Todd scaling `W`, so the
/// Hessian block `WᵀW` placed in the KKT matrix is a diagonal of
/// length `numel`.
#[enum_dispatch]
pub trait Cone<T>
where
    T: FloatT,
{
    /// Contribution to the complementarity degree
    fn degree(&self) -> usize;
    fn numel(&self) -> usize;

    /// `(α, β)` where `α` is the smallest shift taking `z` to the
    /// cone boundary and `β` is the sum of positive parts.
    fn margins(&mut self, z: &mut [T], side: ConeSide) -> (T, T);

    /// `z += α e`, with `e` the cone's unit element
    fn unit_shift(&self, z: &mut [T], α: T, side: ConeSide);

    fn reset_scaling(&mut self);

    /// Recompute the scaling at the point `(s,z)`.  False when the
    /// point is not strictly interior.
    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T) -> bool;

    /// Write the diagonal of `WᵀW`
    fn get_Hs(&self, Hsblock: &mut [T]);

    /// `y = WᵀW x`
    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]);

    // The linearized centrality condition is
    //
    //     λ ∘ (WΔz + W⁻ᵀΔs) = -ds
    //
    // with ds = λ ∘ λ in the affine direction and
    // ds = λ ∘ λ + W⁻ᵀΔs_aff ∘ WΔz_aff - σμe in the combined one.

    /// `ds = λ ∘ λ`
    fn affine_ds(&self, ds: &mut [T], s: &[T]);

    /// `shift = W⁻ᵀΔs_aff ∘ WΔz_aff - σμe`.  The affine step
    /// components may be overwritten.
    fn centering_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T);

    /// `out = Wᵀ(λ \ ds)`, the offset in `Δs = -(out + WᵀWΔz)`
    fn Δs_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]);

    /// Largest steps `(αz, αs)`, each at most `αmax`, keeping
    /// `z + αz dz` and `s + αs ds` in the cone.
    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &CoreSettings<T>,
        αmax: T,
    ) -> (T, T);
}
