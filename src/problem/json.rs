#![allow(non_snake_case)]

use super::{ConstraintSense, ObjectiveSense, QPProblem};
use crate::{algebra::*, solver::DefaultSettings};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// Problem data as supplied by the user, plus optional settings.
// Infinite values are not representable in JSON and are written
// as the largest finite value of the same sign.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub direction: ObjectiveSense,
    pub A: CscMatrix<T>,
    pub sense: Vec<ConstraintSense>,
    pub b: Vec<T>,
    pub c: Vec<T>,
    pub Q: CscMatrix<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
    pub settings: Option<DefaultSettings<T>>,
}

impl<T> QPProblem<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the problem, and optionally a set of settings, to `file` as JSON
    pub fn save_to_file(
        &self,
        file: &mut File,
        settings: Option<&DefaultSettings<T>>,
    ) -> Result<(), io::Error> {
        let mut json_data = JsonProblemData {
            direction: self.direction(),
            A: self.A().clone(),
            sense: self.sense().to_vec(),
            b: self.b().to_vec(),
            c: self.c().to_vec(),
            Q: self.Q().clone(),
            l: self.l().to_vec(),
            u: self.u().to_vec(),
            settings: settings.cloned(),
        };

        for v in [&mut json_data.b, &mut json_data.l, &mut json_data.u] {
            sanitize_values(v);
        }
        if let Some(settings) = json_data.settings.as_mut() {
            sanitize_settings(settings);
        }

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Read a problem written by [`save_to_file`](Self::save_to_file).
    ///
    /// The problem is validated exactly as by [`build`](Self::build).
    pub fn load_from_file(
        file: &mut File,
    ) -> Result<(Self, Option<DefaultSettings<T>>), io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        for v in [&mut json_data.b, &mut json_data.l, &mut json_data.u] {
            desanitize_values(v);
        }
        if let Some(settings) = json_data.settings.as_mut() {
            desanitize_settings(settings);
        }

        let problem = Self::build(
            json_data.direction,
            &json_data.A,
            &json_data.sense,
            &json_data.b,
            &json_data.c,
            &json_data.Q,
            &json_data.l,
            &json_data.u,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok((problem, json_data.settings))
    }
}

fn sanitize_values<T: FloatT>(v: &mut [T]) {
    v.scalarop(|x| {
        if x == T::infinity() {
            T::max_value()
        } else if x == T::neg_infinity() {
            T::min_value()
        } else {
            x
        }
    });
}

fn desanitize_values<T: FloatT>(v: &mut [T]) {
    v.scalarop(|x| {
        if x == T::max_value() {
            T::infinity()
        } else if x == T::min_value() {
            T::neg_infinity()
        } else {
            x
        }
    });
}

fn sanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_io() {
    use crate::solver::DefaultSettingsBuilder;
    use std::io::{Seek, SeekFrom};

    let inf = f64::INFINITY;
    let A = CscMatrix::from(&[[1., 1.]]);
    let Q = CscMatrix::from(&[[2., 0.], [0., 2.]]);
    let problem = QPProblem::build(
        ObjectiveSense::Maximize,
        &A,
        &[ConstraintSense::LessEqual],
        &[inf],
        &[1., -1.],
        &Q,
        &[-inf, 0.],
        &[1., inf],
    )
    .unwrap();

    let settings = DefaultSettingsBuilder::default().build().unwrap();

    let mut file = tempfile::tempfile().unwrap();
    problem.save_to_file(&mut file, Some(&settings)).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let (problem2, settings2) = QPProblem::<f64>::load_from_file(&mut file).unwrap();

    assert_eq!(problem, problem2);
    let settings2 = settings2.unwrap();
    assert_eq!(settings2.time_limit, f64::INFINITY);
    assert_eq!(settings2.max_iter, settings.max_iter);
}
