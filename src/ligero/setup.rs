use super::domain::{DomainType, EvaluationDomain};
use super::encoding::ReedSolomonCode;
use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

pub const MAX_SECURITY_LEVEL: usize = 512;
/// Largest accepted blow-up exponent.
pub const MAX_RS_EXTRA_DIMENSIONS: usize = 32;
pub const BLINDING_ROWS_PER_REPETITION: usize = 6;

/// How many low-degree-test repetitions are run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LdtReducerSoundnessType {
    /// Repetitions from the analytic bound `(n / |F|)^r`.
    Proven,
    /// One repetition per `log2 |F|` bits of security.
    Heuristic,
}

/// User-facing protocol parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigeroParameters {
    pub security_level: usize,
    pub height_width_ratio: f64,
    pub rs_extra_dimensions: usize,
    pub make_zk: bool,
    pub domain_type: DomainType,
    pub ldt_reducer_soundness_type: LdtReducerSoundnessType,
}

impl Default for LigeroParameters {
    fn default() -> Self {
        Self {
            security_level: 128,
            height_width_ratio: 0.001,
            rs_extra_dimensions: 2,
            make_zk: true,
            domain_type: DomainType::MultiplicativeCoset,
            ldt_reducer_soundness_type: LdtReducerSoundnessType::Proven,
        }
    }
}

impl LigeroParameters {
    pub fn with_security_level(mut self, security_level: usize) -> Self {
        self.security_level = security_level;
        self
    }

    pub fn with_height_width_ratio(mut self, ratio: f64) -> Self {
        self.height_width_ratio = ratio;
        self
    }

    pub fn with_rs_extra_dimensions(mut self, extra: usize) -> Self {
        self.rs_extra_dimensions = extra;
        self
    }

    pub fn with_zk(mut self, make_zk: bool) -> Self {
        self.make_zk = make_zk;
        self
    }

    pub fn with_domain_type(mut self, domain_type: DomainType) -> Self {
        self.domain_type = domain_type;
        self
    }

    pub fn with_ldt_reducer_soundness_type(mut self, kind: LdtReducerSoundnessType) -> Self {
        self.ldt_reducer_soundness_type = kind;
        self
    }

    /// Field-independent checks.
    pub fn validate(&self) -> LigeroResult<()> {
        if self.security_level == 0 {
            return Err(LigeroError::invalid_parameters("security_level must be >= 1"));
        }
        if self.security_level > MAX_SECURITY_LEVEL {
            return Err(LigeroError::invalid_parameters(&format!(
                "security_level must be <= {MAX_SECURITY_LEVEL}"
            )));
        }
        let ratio = self.height_width_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(LigeroError::invalid_parameters(
                "height_width_ratio must lie in the open interval (0, 1)",
            ));
        }
        // Check polynomials have degree 2s - 2, so a single doubling leaves
        // them no distance from a forged response.
        if self.rs_extra_dimensions < 2 {
            return Err(LigeroError::invalid_parameters(
                "rs_extra_dimensions must be >= 2",
            ));
        }
        if self.rs_extra_dimensions > MAX_RS_EXTRA_DIMENSIONS {
            return Err(LigeroError::invalid_parameters(&format!(
                "rs_extra_dimensions must be <= {MAX_RS_EXTRA_DIMENSIONS}"
            )));
        }
        Ok(())
    }

    /// Stable encoding absorbed into the transcript.
    pub fn transcript_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(27);
        out.extend_from_slice(&(self.security_level as u64).to_le_bytes());
        out.extend_from_slice(&self.height_width_ratio.to_bits().to_le_bytes());
        out.extend_from_slice(&(self.rs_extra_dimensions as u64).to_le_bytes());
        out.push(self.make_zk as u8);
        out.push(match self.domain_type {
            DomainType::MultiplicativeCoset => 0,
            DomainType::AffineSubspace => 1,
        });
        out.push(match self.ldt_reducer_soundness_type {
            LdtReducerSoundnessType::Proven => 0,
            LdtReducerSoundnessType::Heuristic => 1,
        });
        out
    }
}

impl fmt::Display for LigeroParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ligero Parameters:")?;
        writeln!(f, "  - Security level: {} bits", self.security_level)?;
        writeln!(f, "  - Height/width ratio: {}", self.height_width_ratio)?;
        writeln!(f, "  - RS extra dimensions: {}", self.rs_extra_dimensions)?;
        writeln!(f, "  - Zero knowledge: {}", self.make_zk)?;
        writeln!(f, "  - Domain type: {:?}", self.domain_type)?;
        write!(
            f,
            "  - LDT reducer soundness: {:?}",
            self.ldt_reducer_soundness_type
        )
    }
}

/// Which check a blinding row masks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlindingSlot {
    LincheckA = 0,
    LincheckB = 1,
    LincheckC = 2,
    InputCheck = 3,
    Quadcheck = 4,
    Ldt = 5,
}

impl BlindingSlot {
    pub const ALL: [BlindingSlot; BLINDING_ROWS_PER_REPETITION] = [
        BlindingSlot::LincheckA,
        BlindingSlot::LincheckB,
        BlindingSlot::LincheckC,
        BlindingSlot::InputCheck,
        BlindingSlot::Quadcheck,
        BlindingSlot::Ldt,
    ];
}

/// Row indices inside the committed matrix: witness rows, then the `Az`,
/// `Bz`, `Cz` rows, then (zero knowledge only) the blinding rows of each
/// repetition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowLayout {
    pub witness_rows: usize,
    pub constraint_rows: usize,
    pub repetitions: usize,
    pub zk: bool,
}

impl RowLayout {
    pub fn witness(&self, j: usize) -> usize {
        j
    }

    pub fn x(&self, i: usize) -> usize {
        self.witness_rows + i
    }

    pub fn y(&self, i: usize) -> usize {
        self.witness_rows + self.constraint_rows + i
    }

    pub fn w(&self, i: usize) -> usize {
        self.witness_rows + 2 * self.constraint_rows + i
    }

    pub fn base_rows(&self) -> usize {
        self.witness_rows + 3 * self.constraint_rows
    }

    pub fn blinding(&self, repetition: usize, slot: BlindingSlot) -> Option<usize> {
        if !self.zk {
            return None;
        }
        Some(self.base_rows() + repetition * BLINDING_ROWS_PER_REPETITION + slot as usize)
    }

    pub fn total_rows(&self) -> usize {
        if self.zk {
            self.base_rows() + self.repetitions * BLINDING_ROWS_PER_REPETITION
        } else {
            self.base_rows()
        }
    }

    /// Length of the LDT combination vector: every base row plus the
    /// repetition's LDT mask.
    pub fn ldt_combination_len(&self) -> usize {
        self.base_rows() + usize::from(self.zk)
    }
}

/// Parameters resolved against a concrete field and constraint-system shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ProtocolConfig {
    pub parameters: LigeroParameters,
    pub num_variables: usize,
    pub num_public_inputs: usize,
    pub num_constraints: usize,
    /// Message symbols per row (`k`).
    pub message_width: usize,
    pub systematic_log_size: usize,
    pub codeword_log_size: usize,
    /// Random symbols appended to each row under zero knowledge.
    pub zk_padding: usize,
    pub query_count: usize,
    pub repetitions: usize,
    pub rate: f64,
    pub relative_distance: f64,
    pub layout: RowLayout,
}

impl ProtocolConfig {
    pub fn derive<F: LigeroField>(
        parameters: &LigeroParameters,
        num_variables: usize,
        num_public_inputs: usize,
        num_constraints: usize,
    ) -> LigeroResult<Self> {
        parameters.validate()?;
        if !parameters.domain_type.supported_by::<F>() {
            return Err(LigeroError::invalid_parameters(&format!(
                "{:?} domains are not available over {}",
                parameters.domain_type,
                F::NAME
            )));
        }

        let extra = parameters.rs_extra_dimensions;
        let lambda = parameters.security_level as f64;
        // Blinding rows reach degree 2s - 1 under zero knowledge.
        let rate_exponent = if parameters.make_zk { extra - 1 } else { extra };
        let rate = 0.5f64.powi(rate_exponent as i32);
        let relative_distance = match parameters.ldt_reducer_soundness_type {
            LdtReducerSoundnessType::Proven => (1.0 - rate) / 3.0,
            LdtReducerSoundnessType::Heuristic => 1.0 - rate.sqrt(),
        };
        let bits_per_query = -(1.0 - relative_distance).log2();
        let ldt_queries = (lambda / bits_per_query).ceil() as usize;
        // Responses of degree < 2s - 1 agree with a forgery on fewer than
        // 2^(1 - extra) of the codeword points.
        let check_queries = ceil_div(parameters.security_level, extra - 1);
        let query_count = ldt_queries.max(check_queries).max(1);

        let cells = num_variables.max(num_constraints).max(1);
        let target_width = ((cells as f64 / parameters.height_width_ratio).sqrt().ceil() as usize)
            .clamp(1, cells);
        let zk_padding = if parameters.make_zk { query_count } else { 0 };
        let systematic_size = (target_width + zk_padding).next_power_of_two().max(2);
        let message_width = systematic_size - zk_padding;
        let systematic_log_size = systematic_size.trailing_zeros() as usize;
        let codeword_log_size = systematic_log_size.checked_add(extra).ok_or_else(|| {
            LigeroError::invalid_parameters("codeword size overflows the platform word")
        })?;

        match parameters.domain_type {
            DomainType::MultiplicativeCoset => {
                if codeword_log_size > F::TWO_ADICITY as usize {
                    return Err(LigeroError::invalid_parameters(&format!(
                        "codeword domain of size 2^{} exceeds the 2-adicity {} of {}",
                        codeword_log_size,
                        F::TWO_ADICITY,
                        F::NAME
                    )));
                }
            }
            DomainType::AffineSubspace => {
                if codeword_log_size + 1 > F::EXTENSION_DEGREE as usize {
                    return Err(LigeroError::invalid_parameters(&format!(
                        "codeword domain of dimension {} does not fit GF(2^{})",
                        codeword_log_size,
                        F::EXTENSION_DEGREE
                    )));
                }
            }
        }

        let repetitions = match parameters.ldt_reducer_soundness_type {
            LdtReducerSoundnessType::Proven => {
                let field_bits = F::FIELD_BITS as usize;
                if field_bits <= codeword_log_size {
                    return Err(LigeroError::invalid_parameters(
                        "field too small for the proven LDT reducer bound",
                    ));
                }
                ceil_div(parameters.security_level, field_bits - codeword_log_size)
            }
            LdtReducerSoundnessType::Heuristic => {
                ceil_div(parameters.security_level, F::FIELD_BITS as usize)
            }
        };

        let layout = RowLayout {
            witness_rows: ceil_div(num_variables, message_width),
            constraint_rows: ceil_div(num_constraints, message_width),
            repetitions,
            zk: parameters.make_zk,
        };

        Ok(Self {
            parameters: parameters.clone(),
            num_variables,
            num_public_inputs,
            num_constraints,
            message_width,
            systematic_log_size,
            codeword_log_size,
            zk_padding,
            query_count,
            repetitions,
            rate,
            relative_distance,
            layout,
        })
    }

    pub fn systematic_size(&self) -> usize {
        1 << self.systematic_log_size
    }

    pub fn codeword_size(&self) -> usize {
        1 << self.codeword_log_size
    }

    /// Coefficient bound of linear-check responses (degree `< 2s - 1`).
    pub fn linear_response_len(&self) -> usize {
        2 * self.systematic_size() - 1
    }

    /// Coefficient bound of the quadratic-check quotient.
    pub fn quotient_len(&self) -> usize {
        self.systematic_size() - 1
    }

    pub fn ldt_response_len(&self) -> usize {
        self.systematic_size()
    }
}

fn ceil_div(value: usize, divisor: usize) -> usize {
    (value + divisor - 1) / divisor
}

/// Everything prover and verifier share for one statement shape. Built once
/// and passed by reference.
#[derive(Debug)]
pub struct ProtocolSetup<F: LigeroField> {
    config: ProtocolConfig,
    code: ReedSolomonCode<F>,
}

impl<F: LigeroField> ProtocolSetup<F> {
    pub fn new(
        parameters: &LigeroParameters,
        num_variables: usize,
        num_public_inputs: usize,
        num_constraints: usize,
    ) -> LigeroResult<Self> {
        let config =
            ProtocolConfig::derive::<F>(parameters, num_variables, num_public_inputs, num_constraints)?;
        let (systematic, codeword) = build_domains::<F>(&config)?;
        let code = ReedSolomonCode::new(systematic, codeword, config.message_width)?;

        info!(
            field = F::NAME,
            k = config.message_width,
            s = config.systematic_size(),
            n = config.codeword_size(),
            queries = config.query_count,
            repetitions = config.repetitions,
            rows = config.layout.total_rows(),
            "Ligero setup derived"
        );
        debug!(
            rate = config.rate,
            distance = config.relative_distance,
            zk_padding = config.zk_padding,
            "Ligero code parameters"
        );
        Ok(Self { config, code })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn parameters(&self) -> &LigeroParameters {
        &self.config.parameters
    }

    pub fn layout(&self) -> &RowLayout {
        &self.config.layout
    }

    pub fn code(&self) -> &ReedSolomonCode<F> {
        &self.code
    }

    pub fn systematic_domain(&self) -> &EvaluationDomain<F> {
        self.code.systematic_domain()
    }

    pub fn codeword_domain(&self) -> &EvaluationDomain<F> {
        self.code.codeword_domain()
    }
}

fn build_domains<F: LigeroField>(
    config: &ProtocolConfig,
) -> LigeroResult<(EvaluationDomain<F>, EvaluationDomain<F>)> {
    let log_s = config.systematic_log_size;
    let log_n = config.codeword_log_size;
    match config.parameters.domain_type {
        DomainType::MultiplicativeCoset => {
            let offset = F::multiplicative_generator()
                .ok_or_else(|| LigeroError::domain_error("field has no multiplicative generator"))?;
            Ok((
                EvaluationDomain::new_coset(log_s, F::one())?,
                EvaluationDomain::new_coset(log_n, offset)?,
            ))
        }
        DomainType::AffineSubspace => {
            let basis = F::subspace_basis(log_n + 1)
                .ok_or_else(|| LigeroError::domain_error("field has no subspace basis"))?;
            Ok((
                EvaluationDomain::new_subspace(&basis[..log_s], F::zero())?,
                EvaluationDomain::new_subspace(&basis[..log_n], basis[log_n])?,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_gf64::Gf64;
    use crate::ligero::field_goldilocks::Goldilocks;
    use ark_bn254::Fr;

    #[test]
    fn test_default_matches_driver_values() {
        let params = LigeroParameters::default();
        assert_eq!(params.security_level, 128);
        assert_eq!(params.height_width_ratio, 0.001);
        assert_eq!(params.rs_extra_dimensions, 2);
        assert!(params.make_zk);
        assert_eq!(params.domain_type, DomainType::MultiplicativeCoset);
        assert_eq!(
            params.ldt_reducer_soundness_type,
            LdtReducerSoundnessType::Proven
        );
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_ratios_rejected() {
        for ratio in [0.0, 1.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = LigeroParameters::default()
                .with_height_width_ratio(ratio)
                .validate()
                .unwrap_err();
            assert!(matches!(err, LigeroError::InvalidParameters { .. }));
        }
    }

    #[test]
    fn test_security_level_bounds() {
        assert!(LigeroParameters::default().with_security_level(0).validate().is_err());
        assert!(LigeroParameters::default().with_security_level(513).validate().is_err());
        assert!(LigeroParameters::default().with_security_level(1).validate().is_ok());
    }

    #[test]
    fn test_extra_dimension_bounds() {
        for zk in [true, false] {
            let params = LigeroParameters::default().with_zk(zk);
            for extra in [0, 1, MAX_RS_EXTRA_DIMENSIONS + 1, usize::MAX] {
                let params = params.clone().with_rs_extra_dimensions(extra);
                assert!(params.validate().is_err(), "extra {extra}");
                let err = ProtocolConfig::derive::<Goldilocks>(&params, 100, 1, 90).unwrap_err();
                assert!(matches!(err, LigeroError::InvalidParameters { .. }));
                let err = ProtocolSetup::<Goldilocks>::new(&params, 100, 1, 90).unwrap_err();
                assert!(matches!(err, LigeroError::InvalidParameters { .. }));
            }
            assert!(params.clone().with_rs_extra_dimensions(2).validate().is_ok());
            assert!(params
                .with_rs_extra_dimensions(MAX_RS_EXTRA_DIMENSIONS)
                .validate()
                .is_ok());
        }
    }

    #[test]
    fn test_queries_cover_linear_check_distance() {
        for kind in [LdtReducerSoundnessType::Proven, LdtReducerSoundnessType::Heuristic] {
            for zk in [true, false] {
                for extra in 2..=5 {
                    let params = LigeroParameters::default()
                        .with_security_level(100)
                        .with_zk(zk)
                        .with_rs_extra_dimensions(extra)
                        .with_ldt_reducer_soundness_type(kind);
                    let config = ProtocolConfig::derive::<Goldilocks>(&params, 64, 1, 64).unwrap();
                    // each query catches a forged response with odds >= 1 - 2^(1 - extra)
                    assert!(config.query_count * (extra - 1) >= 100, "{params:?}");
                }
            }
        }
    }

    #[test]
    fn test_config_shape() {
        let params = LigeroParameters::default().with_height_width_ratio(0.25);
        let config = ProtocolConfig::derive::<Goldilocks>(&params, 100, 1, 90).unwrap();
        // rho = 1/2, delta = 1/6
        assert_eq!(config.query_count, 487);
        // width target ceil(sqrt(100 / 0.25)) = 20, padded by the queries
        assert_eq!(config.systematic_size(), 512);
        assert_eq!(config.message_width, 512 - 487);
        assert_eq!(config.codeword_size(), 2048);
        assert_eq!(config.layout.witness_rows, 4);
        assert_eq!(config.layout.constraint_rows, 4);
        // 128 / (63 - 11)
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.layout.total_rows(), 16 + 3 * 6);
        assert_eq!(config.layout.blinding(2, BlindingSlot::Ldt), Some(16 + 12 + 5));
    }

    #[test]
    fn test_config_without_zk() {
        let params = LigeroParameters::default()
            .with_zk(false)
            .with_security_level(40)
            .with_height_width_ratio(0.25);
        let config = ProtocolConfig::derive::<Goldilocks>(&params, 100, 1, 90).unwrap();
        assert_eq!(config.zk_padding, 0);
        // width target ceil(sqrt(400)) = 20
        assert_eq!(config.message_width, 32);
        assert_eq!(config.layout.witness_rows, 4);
        assert_eq!(config.layout.total_rows(), 4 + 3 * 3);
        assert_eq!(config.layout.blinding(0, BlindingSlot::LincheckA), None);
    }

    #[test]
    fn test_heuristic_uses_fewer_repetitions() {
        let proven = LigeroParameters::default().with_security_level(128);
        let heuristic = proven
            .clone()
            .with_ldt_reducer_soundness_type(LdtReducerSoundnessType::Heuristic);
        let a = ProtocolConfig::derive::<Goldilocks>(&proven, 50, 1, 50).unwrap();
        let b = ProtocolConfig::derive::<Goldilocks>(&heuristic, 50, 1, 50).unwrap();
        assert!(b.repetitions <= a.repetitions);
        assert!(b.query_count < a.query_count);
        let bn = ProtocolConfig::derive::<Fr>(&proven, 50, 1, 50).unwrap();
        assert_eq!(bn.repetitions, 1);
    }

    #[test]
    fn test_domain_support_is_checked_per_field() {
        let coset = LigeroParameters::default();
        assert!(ProtocolConfig::derive::<Gf64>(&coset, 4, 1, 4).is_err());
        let subspace = coset.with_domain_type(DomainType::AffineSubspace);
        assert!(ProtocolConfig::derive::<Gf64>(&subspace, 4, 1, 4).is_ok());
        assert!(ProtocolConfig::derive::<Goldilocks>(&subspace, 4, 1, 4).is_err());
    }

    #[test]
    fn test_setup_builds_disjoint_domains() {
        let params = LigeroParameters::default()
            .with_zk(false)
            .with_security_level(20)
            .with_domain_type(DomainType::AffineSubspace);
        let setup = ProtocolSetup::<Gf64>::new(&params, 10, 1, 8).unwrap();
        let s = setup.systematic_domain();
        let l = setup.codeword_domain();
        assert_eq!(l.size(), 4 * s.size());
        for x in s.elements() {
            assert!(!l.contains(*x));
        }
    }
}
