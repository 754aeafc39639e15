use crate::solver::core::traits::Settings;
use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solver settings.
///
/// Build with [`DefaultSettingsBuilder`], which checks values on `build`,
/// or start from `DefaultSettings::default()`.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    // ---- iteration limits and output ----
    /// Iteration limit
    #[builder(default = "200")]
    pub max_iter: u32,

    /// Wall clock limit in seconds, covering setup and solve
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    /// Print a banner, the settings, and one line per iteration
    #[builder(default = "true")]
    pub verbose: bool,

    /// Fraction of the distance to the boundary taken by each combined step
    #[builder(default = "(0.99).as_T()")]
    pub max_step_fraction: T,

    // ---- termination ----
    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_abs: T,

    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_rel: T,

    /// Primal and dual residual tolerance, relative to the data norms
    #[builder(default = "(1e-8).as_T()")]
    pub tol_feas: T,

    #[builder(default = "(1e-8).as_T()")]
    pub tol_infeas_abs: T,

    #[builder(default = "(1e-8).as_T()")]
    pub tol_infeas_rel: T,

    /// κ/τ below which a solution may be declared optimal
    #[builder(default = "(1e-6).as_T()")]
    pub tol_ktratio: T,

    /// Steps shorter than this end the solve
    #[builder(default = "(1e-4).as_T()")]
    pub min_terminate_step_length: T,

    // ---- Ruiz equilibration ----
    #[builder(default = "true")]
    pub equilibrate_enable: bool,

    #[builder(default = "10")]
    pub equilibrate_max_iter: u32,

    /// Bounds on the per-row and per-column scaling factors
    #[builder(default = "(1e-4).as_T()")]
    pub equilibrate_min_scaling: T,

    #[builder(default = "(1e+4).as_T()")]
    pub equilibrate_max_scaling: T,

    // ---- KKT regularization and refinement ----
    /// Add a fixed ±ϵ to the KKT diagonal before factoring
    #[builder(default = "true")]
    pub static_regularization_enable: bool,

    #[builder(default = "(1e-8).as_T()")]
    pub static_regularization_constant: T,

    /// Part of the static shift proportional to the largest diagonal entry
    #[builder(default = "T::epsilon()*T::epsilon()")]
    pub static_regularization_proportional: T,

    /// Replace pivots of the wrong sign or tiny size during factorization
    #[builder(default = "true")]
    pub dynamic_regularization_enable: bool,

    #[builder(default = "(1e-13).as_T()")]
    pub dynamic_regularization_eps: T,

    #[builder(default = "(2e-7).as_T()")]
    pub dynamic_regularization_delta: T,

    #[builder(default = "true")]
    pub iterative_refinement_enable: bool,

    #[builder(default = "(1e-13).as_T()")]
    pub iterative_refinement_reltol: T,

    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_abstol: T,

    #[builder(default = "10")]
    pub iterative_refinement_max_iter: u32,

    /// Refinement stops once an update improves the error by less than this factor
    #[builder(default = "(5.0).as_T()")]
    pub iterative_refinement_stop_ratio: T,

    // ---- presolve and postsolve ----
    /// Remove fixed variables and redundant or empty rows before solving
    #[builder(default = "true")]
    pub presolve_enable: bool,

    /// Violation a row must exceed before presolve calls it infeasible
    #[builder(default = "(1e-9).as_T()")]
    pub presolve_feas_tol: T,

    /// Relative distance within which a solution is moved onto its bound
    #[builder(default = "(1e-8).as_T()")]
    pub bound_snap_tol: T,

    /// Re-solve an optimal solution on its guessed active set, keeping
    /// the result where it is feasible
    #[builder(default = "true")]
    pub polish_enable: bool,

    /// Densest constraint matrix accepted, as nnz/(m*n).  1.0 accepts all.
    #[builder(default = "1.0")]
    pub max_sparse_density: f64,

    /// Rows of the KKT matrix denser than this multiple of sqrt(dim)
    /// are ordered last by AMD
    #[builder(default = "1.5")]
    pub amd_dense_scale: f64,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        match DefaultSettingsBuilder::<T>::default().build() {
            Ok(settings) => settings,
            Err(_) => unreachable!(),
        }
    }
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Check every field.  The builder does this on `build`; settings
    /// assembled directly are checked when a solver is created.
    pub fn validate(&self) -> Result<(), SettingsError> {
        FieldChecks {
            max_step_fraction: Some(self.max_step_fraction),
            tolerances: [
                Some(self.tol_gap_abs),
                Some(self.tol_gap_rel),
                Some(self.tol_feas),
                Some(self.tol_infeas_abs),
                Some(self.tol_infeas_rel),
                Some(self.tol_ktratio),
            ],
            presolve: [Some(self.presolve_feas_tol), Some(self.bound_snap_tol)],
            time_limit: Some(self.time_limit),
            density: Some(self.max_sparse_density),
            scaling: Some((self.equilibrate_min_scaling, self.equilibrate_max_scaling)),
        }
        .run()
    }
}

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// Check whichever fields have been set
    pub fn validate(&self) -> Result<(), SettingsError> {
        FieldChecks {
            max_step_fraction: self.max_step_fraction,
            tolerances: [
                self.tol_gap_abs,
                self.tol_gap_rel,
                self.tol_feas,
                self.tol_infeas_abs,
                self.tol_infeas_rel,
                self.tol_ktratio,
            ],
            presolve: [self.presolve_feas_tol, self.bound_snap_tol],
            time_limit: self.time_limit,
            density: self.max_sparse_density,
            scaling: self.equilibrate_min_scaling.zip(self.equilibrate_max_scaling),
        }
        .run()
    }

    /// Set `tol_gap_abs`, `tol_gap_rel` and `tol_feas` at once
    pub fn tolerance(&mut self, tol: T) -> &mut Self {
        self.tol_gap_abs(tol).tol_gap_rel(tol).tol_feas(tol)
    }
}

const TOLERANCE_FIELDS: [&str; 6] = [
    "tol_gap_abs",
    "tol_gap_rel",
    "tol_feas",
    "tol_infeas_abs",
    "tol_infeas_rel",
    "tol_ktratio",
];

const PRESOLVE_FIELDS: [&str; 2] = ["presolve_feas_tol", "bound_snap_tol"];

// Fields subject to range checks.  None is skipped.
struct FieldChecks<T> {
    max_step_fraction: Option<T>,
    tolerances: [Option<T>; 6],
    presolve: [Option<T>; 2],
    time_limit: Option<f64>,
    density: Option<f64>,
    scaling: Option<(T, T)>,
}

impl<T: FloatT> FieldChecks<T> {
    fn run(&self) -> Result<(), SettingsError> {
        // comparisons are written so that NaN fails them
        let require = |ok: bool, field: &'static str| {
            ok.then_some(()).ok_or(SettingsError::BadField(field))
        };

        if let Some(v) = self.max_step_fraction {
            require(v > T::zero() && v <= T::one(), "max_step_fraction")?;
        }
        for (v, field) in self.tolerances.iter().zip(TOLERANCE_FIELDS) {
            if let Some(v) = *v {
                require(v > T::zero(), field)?;
            }
        }
        for (v, field) in self.presolve.iter().zip(PRESOLVE_FIELDS) {
            if let Some(v) = *v {
                require(v >= T::zero(), field)?;
            }
        }
        if let Some(v) = self.time_limit {
            require(v >= 0.0, "time_limit")?;
        }
        if let Some(v) = self.density {
            require(v > 0.0 && v <= 1.0, "max_sparse_density")?;
        }
        if let Some((lo, hi)) = self.scaling {
            require(lo > T::zero() && lo <= hi, "equilibrate_min_scaling")?;
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    DefaultSettingsBuilder::<f64>::default().build().unwrap();

    // tolerance shortcut sets all three tolerances
    let settings = DefaultSettingsBuilder::<f64>::default()
        .tolerance(1e-6)
        .max_iter(50)
        .build()
        .unwrap();
    assert_eq!(settings.tol_gap_abs, 1e-6);
    assert_eq!(settings.tol_gap_rel, 1e-6);
    assert_eq!(settings.tol_feas, 1e-6);
    assert_eq!(settings.max_iter, 50);

    // fail on bad values through the builder
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_step_fraction(1.5)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .tol_feas(-1.)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_sparse_density(0.)
        .build()
        .is_err());

    // directly construct a bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        tol_gap_abs: f64::NAN,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadField("tol_gap_abs"))
    );

    let settings = DefaultSettings::<f64> {
        equilibrate_min_scaling: 10.,
        equilibrate_max_scaling: 1.,
        ..DefaultSettings::default()
    };
    assert!(settings.validate().is_err());
}
