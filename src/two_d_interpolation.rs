// Two-dimensional interpolation laws
//
// A 2-D law names the processing of z (the evaluated quantity), y (the
// secondary variable) and x (the primary variable), in that order.
// `LinLogLin` interpolates z linearly, y logarithmically and x linearly.

use std::marker::PhantomData;

use crate::interpolation::{
    Interp, InterpolationLaw, Lin, Log, LogCos, NudgedLogCos, Processing,
};

/// A two-dimensional interpolation law.
///
/// `ZY` interpolates z over y on a single grid, `ZX` interpolates z over x
/// between grids and `YX` interpolates y (bounds, correlated samples) over x.
/// The z processing of `ZY` and `ZX` is always the same.
pub trait TwoDInterpolationLaw: 'static {
    type ZY: InterpolationLaw;
    type ZX: InterpolationLaw;
    type YX: InterpolationLaw;

    fn name() -> String {
        format!(
            "{}{}{}",
            <<Self::ZY as InterpolationLaw>::Dep as Processing>::NAME,
            <<Self::ZY as InterpolationLaw>::Indep as Processing>::NAME,
            <<Self::ZX as InterpolationLaw>::Indep as Processing>::NAME,
        )
    }

    /// Interpolate a secondary grid limit (min or max y) at `x`
    #[inline]
    fn calculate_intermediate_grid_limit(
        x_0: f64,
        x_1: f64,
        x: f64,
        limit_0: f64,
        limit_1: f64,
    ) -> f64 {
        Self::YX::interpolate(x_0, x_1, x, limit_0, limit_1)
    }

    #[inline]
    fn process_first_indep_var(x: f64) -> f64 {
        Self::ZX::process_indep_var(x)
    }

    /// Position of `x` between the bin boundaries in processed x space
    #[inline]
    fn first_indep_fraction(x_0: f64, x_1: f64, x: f64) -> f64 {
        let processed_x_0 = Self::process_first_indep_var(x_0);
        (Self::process_first_indep_var(x) - processed_x_0)
            / (Self::process_first_indep_var(x_1) - processed_x_0)
    }
}

/// Law marker: z processing `Z`, y processing `Y`, x processing `X`.
pub struct TwoDInterp<Z, Y, X>(PhantomData<(Z, Y, X)>);

impl<Z: Processing, Y: Processing, X: Processing> TwoDInterpolationLaw for TwoDInterp<Z, Y, X> {
    type ZY = Interp<Z, Y>;
    type ZX = Interp<Z, X>;
    type YX = Interp<Y, X>;
}

pub type LinLinLin = TwoDInterp<Lin, Lin, Lin>;
pub type LinLogLin = TwoDInterp<Lin, Log, Lin>;
pub type LinLinLog = TwoDInterp<Lin, Lin, Log>;
pub type LinLogLog = TwoDInterp<Lin, Log, Log>;
pub type LogLinLin = TwoDInterp<Log, Lin, Lin>;
pub type LogLogLin = TwoDInterp<Log, Log, Lin>;
pub type LogLinLog = TwoDInterp<Log, Lin, Log>;
pub type LogLogLog = TwoDInterp<Log, Log, Log>;
pub type LinLogCosLin = TwoDInterp<Lin, LogCos, Lin>;
pub type LinNudgedLogCosLin = TwoDInterp<Lin, NudgedLogCos, Lin>;
pub type LinLogCosLog = TwoDInterp<Lin, LogCos, Log>;
pub type LinNudgedLogCosLog = TwoDInterp<Lin, NudgedLogCos, Log>;
pub type LogLogCosLin = TwoDInterp<Log, LogCos, Lin>;
pub type LogNudgedLogCosLin = TwoDInterp<Log, NudgedLogCos, Lin>;
pub type LogLogCosLog = TwoDInterp<Log, LogCos, Log>;
pub type LogNudgedLogCosLog = TwoDInterp<Log, NudgedLogCos, Log>;
