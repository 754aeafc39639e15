use super::*;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::core::{
    cones::{CompositeCone, Cone, SupportedConeAsTag, SupportedConeTag},
    traits::InfoPrint,
};
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

const RULE_WIDTH: usize = 93;

// iteration log columns, as (title, width)
const COLUMNS: [(&str, usize); 9] = [
    ("iter", 8),
    ("pcost", 13),
    ("dcost", 12),
    ("gap", 10),
    ("pres", 10),
    ("dres", 10),
    ("k/t", 10),
    (" μ", 9),
    ("step", 10),
];

impl<T> InfoPrint<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;

        if let Some(stats) = &data.presolve {
            writeln!(
                out,
                "\npresolve: removed {} variables, {} constraints",
                stats.removed_variables, stats.removed_constraints
            )?;
        }

        writeln!(out, "\nproblem:")?;
        for (label, value) in [
            ("variables", data.n),
            ("constraints", data.m),
            ("nnz(P)", data.P.nnz()),
            ("nnz(A)", data.A.nnz()),
            ("cones (total)", cones.len()),
        ] {
            writeln!(out, "  {label:<13} = {value}")?;
        }
        for tag in [SupportedConeTag::ZeroCone, SupportedConeTag::NonnegativeCone] {
            print_cone_dims(out, cones, tag)?;
        }
        writeln!(out)?;

        print_settings(out, settings)
    }

    fn print_status_header(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;

        for (title, width) in COLUMNS {
            write!(out, "{title:<width$}")?;
        }
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        out.flush()
    }

    fn print_status(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let m = &self.measures;
        let out = &mut self.stream;

        write!(out, "{:>3}  ", self.iterations)?;
        write!(out, "{}  ", exp_fmt(format!("{:+8.4e}", m.cost_primal)))?;
        write!(out, "{}  ", exp_fmt(format!("{:+8.4e}", m.cost_dual)))?;
        for v in [
            T::min(m.gap_abs, m.gap_rel),
            m.res_primal,
            m.res_dual,
            self.ktratio,
            self.μ,
        ] {
            write!(out, "{}  ", exp_fmt(format!("{:6.2e}", v)))?;
        }

        // no step has been taken at iteration zero
        if self.iterations > 0 {
            writeln!(out, "{}  ", exp_fmt(format!("{:>.2e}", self.step_length)))
        } else {
            writeln!(out, " ------   ")
        }
    }

    fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        let out = &mut self.stream;

        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;
        out.flush()
    }

    fn print_target(&mut self) -> &mut dyn std::io::Write {
        &mut self.stream
    }
}

fn print_settings<T: FloatT>(
    out: &mut PrintTarget,
    set: &DefaultSettings<T>,
) -> std::io::Result<()> {
    let on_off = |v: bool| if v { "on" } else { "off" };
    let time_limit = if set.time_limit.is_infinite() {
        "Inf".to_string()
    } else {
        format!("{:?}", set.time_limit)
    };

    writeln!(out, "settings:")?;
    writeln!(
        out,
        "  linear algebra: direct / qdldl, precision: {} bit",
        8 * std::mem::size_of::<T>()
    )?;
    writeln!(
        out,
        "  max iter = {}, time limit = {},  max step = {:.3}",
        set.max_iter, time_limit, set.max_step_fraction
    )?;
    writeln!(
        out,
        "  tol_feas = {:.1e}, tol_gap_abs = {:.1e}, tol_gap_rel = {:.1e},",
        set.tol_feas, set.tol_gap_abs, set.tol_gap_rel
    )?;
    writeln!(
        out,
        "  static reg : {}, ϵ1 = {:.1e}, ϵ2 = {:.1e}",
        on_off(set.static_regularization_enable),
        set.static_regularization_constant,
        set.static_regularization_proportional,
    )?;
    writeln!(
        out,
        "  dynamic reg: {}, ϵ = {:.1e}, δ = {:.1e}",
        on_off(set.dynamic_regularization_enable),
        set.dynamic_regularization_eps,
        set.dynamic_regularization_delta
    )?;
    writeln!(
        out,
        "  iter refine: {}, reltol = {:.1e}, abstol = {:.1e},",
        on_off(set.iterative_refinement_enable),
        set.iterative_refinement_reltol,
        set.iterative_refinement_abstol
    )?;
    writeln!(
        out,
        "               max iter = {}, stop ratio = {:.1}",
        set.iterative_refinement_max_iter, set.iterative_refinement_stop_ratio
    )?;
    writeln!(
        out,
        "  equilibrate: {}, min_scale = {:.1e}, max_scale = {:.1e}",
        on_off(set.equilibrate_enable),
        set.equilibrate_min_scaling,
        set.equilibrate_max_scaling
    )?;
    writeln!(out, "               max iter = {}", set.equilibrate_max_iter)?;
    writeln!(
        out,
        "  presolve   : {}, feas tol = {:.1e}, bound snap = {:.1e}",
        on_off(set.presolve_enable),
        set.presolve_feas_tol,
        set.bound_snap_tol
    )?;
    writeln!(out, "  polish     : {}", on_off(set.polish_enable))?;
    writeln!(out)
}

// One line per cone type present, as in
//     :        Zero = 1,  numel = 3
//     : Nonnegative = 6,  numel = (1,1,2,1,...,4)
fn print_cone_dims<T: FloatT>(
    out: &mut PrintTarget,
    cones: &CompositeCone<T>,
    tag: SupportedConeTag,
) -> std::io::Result<()> {
    const MAX_LISTED: usize = 5;

    let dims: Vec<usize> = cones
        .iter()
        .filter(|cone| cone.as_tag() == tag)
        .map(|cone| cone.numel())
        .collect();

    let Some(&last) = dims.last() else {
        return Ok(());
    };

    let name = tag.as_str().trim_end_matches("Cone");
    write!(out, "    : {name:>11} = {}, ", dims.len())?;

    if dims.len() == 1 {
        writeln!(out, " numel = {last}")
    } else {
        let shown = if dims.len() <= MAX_LISTED {
            &dims[..dims.len() - 1]
        } else {
            &dims[..MAX_LISTED - 1]
        };
        let elided = if dims.len() > MAX_LISTED { "...," } else { "" };
        let listed: Vec<String> = shown.iter().map(|d| d.to_string()).collect();
        writeln!(out, " numel = ({},{elided}{last})", listed.join(","))
    }
}

// Rust's LowerExp prints "1.5e0" and "2.5e-3".   Pad the exponent
// to a sign and at least two digits, as in "1.5e+00" and "2.5e-03".
fn exp_fmt(s: String) -> String {
    let Some(e) = s.find('e') else {
        return s;
    };
    let (mantissa, exp) = s.split_at(e + 1);
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("+", exp),
    };
    format!("{mantissa}{sign}{digits:0>2}")
}

#[test]
fn test_exp_fmt() {
    assert_eq!(exp_fmt(format!("{:+8.4e}", 1.5f64)), "+1.5000e+00");
    assert_eq!(exp_fmt(format!("{:6.2e}", 2.5e-3f64)), "2.50e-03");
    assert_eq!(exp_fmt(format!("{:6.2e}", 1.0e12f64)), "1.00e+12");
    assert_eq!(exp_fmt(format!("{:6.2e}", 1.0e-120f64)), "1.00e-120");
    assert_eq!(exp_fmt("inf".to_string()), "inf");
    // non-finite values keep their padding so the columns line up
    assert_eq!(exp_fmt(format!("{:6.2e}", f64::NAN)), "   NaN");
    assert_eq!(exp_fmt(format!("{:6.2e}", f64::INFINITY)), "   inf");
}
