//! Constraint-system files.
//!
//! A constraint system is stored as JSON lines. The first line is a header
//! object under the `"r1cs"` key, every further non-empty line is one
//! constraint `{"A": [[var, coeff], ...], "B": [...], "C": [...]}`. The
//! assignment lives next to it in `<file>.in` with `"inputs"` (public) and
//! `"witnesses"` (private) arrays, either as one object or as JSON lines whose
//! arrays are concatenated.

use crate::ligero::errors::{LigeroError, LigeroResult};
use crate::ligero::field_utils::LigeroField;
use crate::snarks::r1cs::{LinearCombination, R1cs, R1csConstraint, Variable, Witness};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct R1csHeader {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub field_characteristic: Option<String>,
    #[serde(default)]
    pub extension_degree: Option<u32>,
    /// Number of public inputs.
    pub instances: usize,
    /// Number of private inputs.
    pub witnesses: usize,
    pub constraints: usize,
}

impl R1csHeader {
    /// `1 + instances + witnesses`: the leading slot is the constant one.
    pub fn num_variables(&self) -> usize {
        1 + self.instances + self.witnesses
    }

    fn check_field<F: LigeroField>(&self) -> LigeroResult<()> {
        if let Some(characteristic) = &self.field_characteristic {
            if characteristic.trim() != F::characteristic() {
                return Err(LigeroError::format_error(&format!(
                    "constraint system is over characteristic {characteristic}, not {}",
                    F::NAME
                )));
            }
        }
        if let Some(degree) = self.extension_degree {
            if degree != F::EXTENSION_DEGREE {
                return Err(LigeroError::format_error(&format!(
                    "extension degree {degree} does not match {} (degree {})",
                    F::NAME,
                    F::EXTENSION_DEGREE
                )));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct HeaderLine {
    r1cs: R1csHeader,
}

/// A coefficient is written either as a JSON number or as a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coefficient {
    Number(serde_json::Number),
    Text(String),
}

impl Coefficient {
    fn to_field<F: LigeroField>(&self) -> Option<F> {
        match self {
            Coefficient::Number(number) => F::parse_decimal(&number.to_string()),
            Coefficient::Text(text) => F::parse_decimal(text.trim()),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintLine {
    #[serde(rename = "A")]
    a: Vec<(Variable, Coefficient)>,
    #[serde(rename = "B")]
    b: Vec<(Variable, Coefficient)>,
    #[serde(rename = "C")]
    c: Vec<(Variable, Coefficient)>,
}

fn linear_combination<F: LigeroField>(
    terms: &[(Variable, Coefficient)],
    line: usize,
) -> LigeroResult<LinearCombination<F>> {
    let mut lc = LinearCombination::new();
    for (variable, coefficient) in terms {
        let value = coefficient.to_field::<F>().ok_or_else(|| {
            LigeroError::format_error(&format!(
                "line {line}: coefficient of variable {variable} is not a {} element",
                F::NAME
            ))
        })?;
        lc.add_term(*variable, value);
    }
    Ok(lc)
}

/// Reads a JSON-lines constraint system.
pub fn parse_r1cs<F: LigeroField, B: BufRead>(reader: B) -> LigeroResult<R1cs<F>> {
    let mut lines = reader.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let parsed: HeaderLine = serde_json::from_str(&line)
                    .map_err(|err| LigeroError::format_error(&format!("header: {err}")))?;
                break parsed.r1cs;
            }
            None => return Err(LigeroError::format_error("empty constraint system file")),
        }
    };
    header.check_field::<F>()?;
    debug!(
        instances = header.instances,
        witnesses = header.witnesses,
        constraints = header.constraints,
        "Read constraint system header"
    );

    let mut constraints = Vec::with_capacity(header.constraints);
    for (index, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = index + 1;
        let parsed: ConstraintLine = serde_json::from_str(&line)
            .map_err(|err| LigeroError::format_error(&format!("line {number}: {err}")))?;
        constraints.push(R1csConstraint::new(
            linear_combination(&parsed.a, number)?,
            linear_combination(&parsed.b, number)?,
            linear_combination(&parsed.c, number)?,
        ));
    }
    if constraints.len() != header.constraints {
        return Err(LigeroError::format_error(&format!(
            "header announces {} constraints, file has {}",
            header.constraints,
            constraints.len()
        )));
    }

    R1cs::new(header.num_variables(), header.instances, constraints)
        .map_err(|err| LigeroError::format_error(&err.to_string()))
}

pub fn load_r1cs<F: LigeroField>(path: &Path) -> LigeroResult<R1cs<F>> {
    let file = File::open(path).map_err(|err| {
        LigeroError::format_error(&format!("cannot open {}: {err}", path.display()))
    })?;
    let r1cs = parse_r1cs(BufReader::new(file))?;
    info!(
        path = %path.display(),
        field = F::NAME,
        variables = r1cs.num_variables(),
        constraints = r1cs.num_constraints(),
        "Loaded constraint system"
    );
    Ok(r1cs)
}

#[derive(Deserialize)]
struct InputsLine {
    #[serde(default)]
    inputs: Vec<Coefficient>,
    #[serde(default)]
    witnesses: Vec<Coefficient>,
}

fn field_values<F: LigeroField>(values: &[Coefficient], what: &str) -> LigeroResult<Vec<F>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            value.to_field::<F>().ok_or_else(|| {
                LigeroError::format_error(&format!("{what}[{i}] is not a {} element", F::NAME))
            })
        })
        .collect()
}

/// Reads an assignment; a single object and JSON lines are both accepted.
pub fn parse_inputs<F: LigeroField>(text: &str) -> LigeroResult<Witness<F>> {
    let mut public = Vec::new();
    let mut private = Vec::new();
    let mut seen = 0usize;
    for line in serde_json::Deserializer::from_str(text).into_iter::<InputsLine>() {
        let line = line.map_err(|err| LigeroError::format_error(&format!("inputs: {err}")))?;
        public.extend(field_values::<F>(&line.inputs, "inputs")?);
        private.extend(field_values::<F>(&line.witnesses, "witnesses")?);
        seen += 1;
    }
    if seen == 0 {
        return Err(LigeroError::format_error("inputs file is empty"));
    }
    Ok(Witness::new(public, private))
}

pub fn load_inputs<F: LigeroField>(path: &Path) -> LigeroResult<Witness<F>> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        LigeroError::format_error(&format!("cannot read {}: {err}", path.display()))
    })?;
    parse_inputs(&text)
}

/// `<r1cs_path>.in`
pub fn default_inputs_path(r1cs_path: &Path) -> PathBuf {
    let mut name = r1cs_path.as_os_str().to_os_string();
    name.push(".in");
    PathBuf::from(name)
}

/// Loads a constraint system together with its assignment and checks that
/// the assignment has the announced shape.
pub fn load_instance<F: LigeroField>(
    r1cs_path: &Path,
    inputs_path: Option<&Path>,
) -> LigeroResult<(R1cs<F>, Witness<F>)> {
    let r1cs = load_r1cs::<F>(r1cs_path)?;
    let inputs_path = inputs_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_inputs_path(r1cs_path));
    let witness = load_inputs::<F>(&inputs_path)?;
    witness
        .validate(&r1cs)
        .map_err(|err| LigeroError::format_error(&err.to_string()))?;
    Ok((r1cs, witness))
}
