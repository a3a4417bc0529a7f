//! Ligero verifier as an explicit state machine.
//!
//! ```text
//! Init → CommitmentsReceived → ChallengeIssued → QueriesIssued
//!      → OpeningsReceived → LdtChecking → Decision
//! ```
//!
//! A rejected proof is a normal outcome ([`Verdict::Reject`]); errors are
//! reserved for misuse, such as messages that arrive out of order.

use super::challenges::{
    absorb_commitment, absorb_responses, bind_statement, draw_query_positions,
    draw_repetition_challenges, RepetitionChallenges, TRANSCRIPT_LABEL,
};
use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;
use super::ldt::check_combination_at;
use super::lincheck::{LinearCheck, LinearFamily};
use super::merkle::Digest32;
use super::oracle::{ColumnOpening, Oracle};
use super::polynomial::evaluate;
use super::proof::{LigeroProof, RepetitionResponse};
use super::prover::check_shape;
use super::rowcheck::quadratic_combination_at;
use super::setup::{BlindingSlot, ProtocolSetup};
use super::transcript::{ChallengeSource, Transcript};
use crate::snarks::r1cs::R1cs;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The proof was produced under different parameters.
    ParameterMismatch,
    MalformedResponse,
    MalformedOpening,
    InvalidAuthenticationPath,
    LdtMismatch,
    LinearSumMismatch,
    LinearCheckMismatch,
    QuadraticCheckMismatch,
    /// Opened positions differ from the issued queries.
    QuerySetMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::ParameterMismatch => "proof parameters differ from the verifier's",
            RejectReason::MalformedResponse => "response has the wrong shape or degree",
            RejectReason::MalformedOpening => "opened column has the wrong number of rows",
            RejectReason::InvalidAuthenticationPath => "column opening does not match the commitment",
            RejectReason::LdtMismatch => "combined codeword disagrees with the opened columns",
            RejectReason::LinearSumMismatch => "linear check does not sum to the expected value",
            RejectReason::LinearCheckMismatch => "linear check disagrees with the opened columns",
            RejectReason::QuadraticCheckMismatch => {
                "quadratic check disagrees with the opened columns"
            }
            RejectReason::QuerySetMismatch => "opened positions differ from the queried ones",
        };
        f.write_str(text)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerifierState {
    Init,
    CommitmentsReceived,
    ChallengeIssued,
    QueriesIssued,
    OpeningsReceived,
    LdtChecking,
    Decision(Verdict),
}

/// Per-query data shared by all repetitions.
struct QueryPoint<F: LigeroField> {
    point: F,
    lagrange: Vec<F>,
    vanishing: F,
}

pub struct LigeroVerifier<'a, F: LigeroField, O: Oracle<F>, C: ChallengeSource> {
    setup: &'a ProtocolSetup<F>,
    oracle: &'a O,
    r1cs: &'a R1cs<F>,
    public_input: Vec<F>,
    source: C,
    state: VerifierState,
    commitment: Digest32,
    challenges: Vec<RepetitionChallenges<F>>,
    responses: Vec<RepetitionResponse<F>>,
    positions: Vec<usize>,
}

impl<'a, F, O, C> LigeroVerifier<'a, F, O, C>
where
    F: LigeroField,
    O: Oracle<F>,
    C: ChallengeSource,
{
    /// Binds the statement into `source` and waits for the commitment.
    pub fn new(
        setup: &'a ProtocolSetup<F>,
        oracle: &'a O,
        r1cs: &'a R1cs<F>,
        public_input: &[F],
        mut source: C,
    ) -> LigeroResult<Self> {
        check_shape(setup, r1cs)?;
        if public_input.len() != r1cs.num_public_inputs() {
            return Err(LigeroError::invalid_parameters(&format!(
                "expected {} public inputs, got {}",
                r1cs.num_public_inputs(),
                public_input.len()
            )));
        }
        bind_statement(&mut source, &r1cs.digest(), public_input, setup.parameters());
        Ok(Self {
            setup,
            oracle,
            r1cs,
            public_input: public_input.to_vec(),
            source,
            state: VerifierState::Init,
            commitment: [0u8; 32],
            challenges: Vec::new(),
            responses: Vec::new(),
            positions: Vec::new(),
        })
    }

    pub fn state(&self) -> VerifierState {
        self.state
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self.state {
            VerifierState::Decision(verdict) => Some(verdict),
            _ => None,
        }
    }

    fn expect_state(&self, expected: VerifierState, phase: &str) -> LigeroResult<()> {
        if let VerifierState::Decision(_) = self.state {
            return Err(LigeroError::protocol_error(
                phase,
                "verifier has already reached a decision",
            ));
        }
        if self.state != expected {
            return Err(LigeroError::protocol_error(
                phase,
                &format!("message not expected in state {:?}", self.state),
            ));
        }
        Ok(())
    }

    pub fn receive_commitment(&mut self, root: Digest32) -> LigeroResult<()> {
        self.expect_state(VerifierState::Init, "commitment")?;
        absorb_commitment(&mut self.source, &root);
        self.commitment = root;
        self.state = VerifierState::CommitmentsReceived;
        Ok(())
    }

    /// Draws the challenges of every repetition.
    pub fn issue_challenges(&mut self) -> LigeroResult<Vec<RepetitionChallenges<F>>> {
        self.expect_state(VerifierState::CommitmentsReceived, "challenges")?;
        self.challenges = draw_repetition_challenges(&mut self.source, self.setup.config());
        self.state = VerifierState::ChallengeIssued;
        Ok(self.challenges.clone())
    }

    /// Absorbs the responses and returns the query positions.
    pub fn receive_responses(
        &mut self,
        responses: Vec<RepetitionResponse<F>>,
    ) -> LigeroResult<Vec<usize>> {
        self.expect_state(VerifierState::ChallengeIssued, "responses")?;
        absorb_responses(&mut self.source, &responses);
        self.responses = responses;
        self.positions = draw_query_positions(&mut self.source, self.setup.config());
        self.state = VerifierState::QueriesIssued;
        Ok(self.positions.clone())
    }

    /// Runs every check and moves to the terminal state.
    pub fn receive_openings(&mut self, openings: &[ColumnOpening<F>]) -> LigeroResult<Verdict> {
        self.expect_state(VerifierState::QueriesIssued, "openings")?;
        self.state = VerifierState::OpeningsReceived;
        let verdict = match self.check_openings(openings)? {
            Some(reason) => Verdict::Reject(reason),
            None => {
                self.state = VerifierState::LdtChecking;
                match self.check_responses(openings)? {
                    Some(reason) => Verdict::Reject(reason),
                    None => Verdict::Accept,
                }
            }
        };
        match verdict {
            Verdict::Accept => info!("Ligero proof accepted"),
            Verdict::Reject(reason) => info!(%reason, "Ligero proof rejected"),
        }
        self.state = VerifierState::Decision(verdict);
        Ok(verdict)
    }

    /// Shapes, query set, authentication paths and the combined codeword.
    fn check_openings(&self, openings: &[ColumnOpening<F>]) -> LigeroResult<Option<RejectReason>> {
        let config = self.setup.config();
        if !self.responses_well_formed() {
            return Ok(Some(RejectReason::MalformedResponse));
        }
        if openings.len() != self.positions.len()
            || openings
                .iter()
                .zip(&self.positions)
                .any(|(opening, position)| opening.position != *position)
        {
            return Ok(Some(RejectReason::QuerySetMismatch));
        }
        let total_rows = config.layout.total_rows();
        if openings.iter().any(|o| o.values.len() != total_rows) {
            return Ok(Some(RejectReason::MalformedOpening));
        }
        let root = self.commitment;
        let oracle = self.oracle;
        if !openings
            .par_iter()
            .all(|opening| oracle.verify_opening(&root, opening))
        {
            return Ok(Some(RejectReason::InvalidAuthenticationPath));
        }
        debug!(openings = openings.len(), "Column openings authenticated");

        let layout = self.setup.layout();
        let domain = self.setup.codeword_domain();
        for (repetition, (challenge, response)) in
            self.challenges.iter().zip(&self.responses).enumerate()
        {
            let mask = layout.blinding(repetition, BlindingSlot::Ldt);
            let consistent = openings.par_iter().all(|opening| {
                check_combination_at(
                    layout,
                    &response.ldt_combination,
                    &challenge.ldt,
                    domain.element(opening.position),
                    &opening.values,
                    mask,
                )
            });
            if !consistent {
                return Ok(Some(RejectReason::LdtMismatch));
            }
        }
        Ok(None)
    }

    fn responses_well_formed(&self) -> bool {
        let config = self.setup.config();
        self.responses.len() == config.repetitions
            && self.responses.iter().all(|response| {
                response.linear_a.len() <= config.linear_response_len()
                    && response.linear_b.len() <= config.linear_response_len()
                    && response.linear_c.len() <= config.linear_response_len()
                    && response.input.len() <= config.linear_response_len()
                    && response.quadratic_quotient.len() <= config.quotient_len()
                    && response.ldt_combination.len() <= config.ldt_response_len()
            })
    }

    /// Linear sums over `S`, then linear and quadratic consistency at every
    /// queried point.
    fn check_responses(&self, openings: &[ColumnOpening<F>]) -> LigeroResult<Option<RejectReason>> {
        let systematic = self.setup.systematic_domain();
        let codeword = self.setup.codeword_domain();
        let points = openings
            .par_iter()
            .map(|opening| -> LigeroResult<QueryPoint<F>> {
                let point = codeword.element(opening.position);
                Ok(QueryPoint {
                    point,
                    lagrange: systematic.lagrange_coefficients(point)?,
                    vanishing: systematic.evaluate_vanishing(point),
                })
            })
            .collect::<LigeroResult<Vec<_>>>()?;

        let context = RepetitionContext {
            setup: self.setup,
            r1cs: self.r1cs,
            public_input: &self.public_input,
            openings,
            points: &points,
        };
        let outcomes = self
            .challenges
            .par_iter()
            .zip(self.responses.par_iter())
            .enumerate()
            .map(|(repetition, (challenge, response))| {
                context.check_repetition(repetition, challenge, response)
            })
            .collect::<LigeroResult<Vec<_>>>()?;
        Ok(outcomes.into_iter().flatten().next())
    }
}

/// Borrowed inputs of the per-repetition checks.
struct RepetitionContext<'c, F: LigeroField> {
    setup: &'c ProtocolSetup<F>,
    r1cs: &'c R1cs<F>,
    public_input: &'c [F],
    openings: &'c [ColumnOpening<F>],
    points: &'c [QueryPoint<F>],
}

impl<'c, F: LigeroField> RepetitionContext<'c, F> {
    fn check_repetition(
        &self,
        repetition: usize,
        challenges: &RepetitionChallenges<F>,
        response: &RepetitionResponse<F>,
    ) -> LigeroResult<Option<RejectReason>> {
        let setup = self.setup;
        let layout = setup.layout();
        let checks: Vec<(LinearCheck<F>, &[F])> = LinearFamily::ALL
            .iter()
            .map(|family| {
                let check =
                    LinearCheck::new(setup, *family, self.r1cs, challenges, self.public_input);
                let polynomial: &[F] = match family {
                    LinearFamily::A => &response.linear_a,
                    LinearFamily::B => &response.linear_b,
                    LinearFamily::C => &response.linear_c,
                    LinearFamily::PublicInput => &response.input,
                };
                (check, polynomial)
            })
            .collect();

        for (check, polynomial) in &checks {
            if setup.systematic_domain().sum_over(polynomial)? != check.expected_sum() {
                debug!(repetition, family = ?check.family(), "Linear sum mismatch");
                return Ok(Some(RejectReason::LinearSumMismatch));
            }
        }

        for (opening, query) in self.openings.iter().zip(self.points) {
            for (check, polynomial) in &checks {
                let mask = layout.blinding(repetition, check.family().blinding_slot());
                let expected = check.evaluate_at(&query.lagrange, &opening.values, mask);
                if evaluate(polynomial, query.point) != expected {
                    debug!(
                        repetition,
                        position = opening.position,
                        family = ?check.family(),
                        "Linear check mismatch"
                    );
                    return Ok(Some(RejectReason::LinearCheckMismatch));
                }
            }
            let mask = layout.blinding(repetition, BlindingSlot::Quadcheck);
            let expected =
                quadratic_combination_at(layout, &challenges.quadratic, &opening.values, mask);
            if query.vanishing * evaluate(&response.quadratic_quotient, query.point) != expected {
                debug!(repetition, position = opening.position, "Quadratic check mismatch");
                return Ok(Some(RejectReason::QuadraticCheckMismatch));
            }
        }
        Ok(None)
    }
}

/// Checks a non-interactive proof by replaying its Fiat–Shamir transcript.
pub fn verify_proof<F, O>(
    setup: &ProtocolSetup<F>,
    oracle: &O,
    r1cs: &R1cs<F>,
    public_input: &[F],
    proof: &LigeroProof<F>,
) -> LigeroResult<Verdict>
where
    F: LigeroField,
    O: Oracle<F>,
{
    if proof.parameters != *setup.parameters() {
        info!(reason = %RejectReason::ParameterMismatch, "Ligero proof rejected");
        return Ok(Verdict::Reject(RejectReason::ParameterMismatch));
    }
    let transcript = Transcript::new(TRANSCRIPT_LABEL);
    let mut verifier = LigeroVerifier::new(setup, oracle, r1cs, public_input, transcript)?;
    verifier.receive_commitment(proof.commitment)?;
    verifier.issue_challenges()?;
    verifier.receive_responses(proof.repetitions.clone())?;
    verifier.receive_openings(&proof.openings)
}
