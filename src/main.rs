use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use ark_bn254::Fr;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ligero_r1cs::ligero::{
    DomainType, Gf64, Goldilocks, LdtReducerSoundnessType, LigeroField, LigeroParameters,
    LigeroProof, Verdict,
};
use ligero_r1cs::snarks::{
    default_inputs_path, ligero_prove, ligero_setup, ligero_verify_with, load_inputs,
    load_instance, load_r1cs,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ligero")]
#[command(about = "Prove and verify R1CS satisfiability with a Ligero-style IOP")]
struct Cli {
    /// Field the constraint system is defined over
    #[arg(long, value_enum, default_value_t = FieldKind::Goldilocks, global = true)]
    field: FieldKind,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FieldKind {
    Goldilocks,
    Bn254,
    Gf64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProofFormat {
    Bincode,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DomainArg {
    Coset,
    Subspace,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReducerArg {
    Proven,
    Heuristic,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the assignment against the constraint system without proving
    Check {
        /// Constraint system in JSON-lines format
        r1cs: PathBuf,
        /// Assignment file (defaults to `<r1cs>.in`)
        #[arg(short, long)]
        inputs: Option<PathBuf>,
    },
    /// Produce a proof, then verify it
    Prove {
        r1cs: PathBuf,
        #[arg(short, long)]
        inputs: Option<PathBuf>,
        /// Where to write the proof
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ProofFormat::Bincode)]
        format: ProofFormat,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Verify a proof against the public inputs
    Verify {
        r1cs: PathBuf,
        /// Proof file written by `prove`
        proof: PathBuf,
        /// File holding the public inputs (defaults to `<r1cs>.in`)
        #[arg(short, long)]
        inputs: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ProofFormat::Bincode)]
        format: ProofFormat,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Args, Debug)]
struct ParamArgs {
    /// JSON parameter file; individual flags override its values
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long)]
    security_level: Option<usize>,
    #[arg(long)]
    height_width_ratio: Option<f64>,
    #[arg(long)]
    rs_extra_dimensions: Option<usize>,
    /// Disable zero knowledge
    #[arg(long)]
    no_zk: bool,
    #[arg(long, value_enum)]
    domain: Option<DomainArg>,
    #[arg(long, value_enum)]
    ldt_reducer: Option<ReducerArg>,
}

impl ParamArgs {
    fn resolve(&self, field: FieldKind) -> Result<LigeroParameters> {
        let mut params = match &self.params {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading parameters from {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing parameters in {}", path.display()))?
            }
            // Binary fields have no multiplicative cosets of two-power order.
            None if field == FieldKind::Gf64 => {
                LigeroParameters::default().with_domain_type(DomainType::AffineSubspace)
            }
            None => LigeroParameters::default(),
        };
        if let Some(level) = self.security_level {
            params = params.with_security_level(level);
        }
        if let Some(ratio) = self.height_width_ratio {
            params = params.with_height_width_ratio(ratio);
        }
        if let Some(extra) = self.rs_extra_dimensions {
            params = params.with_rs_extra_dimensions(extra);
        }
        if self.no_zk {
            params = params.with_zk(false);
        }
        if let Some(domain) = self.domain {
            params = params.with_domain_type(match domain {
                DomainArg::Coset => DomainType::MultiplicativeCoset,
                DomainArg::Subspace => DomainType::AffineSubspace,
            });
        }
        if let Some(reducer) = self.ldt_reducer {
            params = params.with_ldt_reducer_soundness_type(match reducer {
                ReducerArg::Proven => LdtReducerSoundnessType::Proven,
                ReducerArg::Heuristic => LdtReducerSoundnessType::Heuristic,
            });
        }
        params.validate()?;
        Ok(params)
    }
}

fn write_proof<F: LigeroField>(
    proof: &LigeroProof<F>,
    path: &Path,
    format: ProofFormat,
) -> Result<()> {
    let bytes = match format {
        ProofFormat::Bincode => proof.to_bytes()?,
        ProofFormat::Json => proof.to_json()?.into_bytes(),
    };
    fs::write(path, &bytes).with_context(|| format!("writing proof to {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Proof written");
    Ok(())
}

fn read_proof<F: LigeroField>(path: &Path, format: ProofFormat) -> Result<LigeroProof<F>> {
    let bytes = fs::read(path).with_context(|| format!("reading proof from {}", path.display()))?;
    let proof = match format {
        ProofFormat::Bincode => LigeroProof::from_bytes(&bytes)?,
        ProofFormat::Json => LigeroProof::from_json(std::str::from_utf8(&bytes)?)?,
    };
    Ok(proof)
}

fn report(verdict: &Verdict) -> ExitCode {
    match verdict {
        Verdict::Accept => {
            println!("PASS");
            ExitCode::SUCCESS
        }
        Verdict::Reject(reason) => {
            warn!(%reason, "Proof rejected");
            println!("verification FAILED");
            ExitCode::FAILURE
        }
    }
}

fn run<F: LigeroField>(command: Commands, field: FieldKind) -> Result<ExitCode> {
    match command {
        Commands::Check { r1cs, inputs } => {
            let (system, witness) = load_instance::<F>(&r1cs, inputs.as_deref())?;
            match system.enforce_satisfied(&witness.assignment()) {
                Ok(()) => {
                    println!(
                        "satisfied: {} constraints over {} variables",
                        system.num_constraints(),
                        system.num_variables()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("{err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Prove {
            r1cs,
            inputs,
            output,
            format,
            params,
        } => {
            let params = params.resolve(field)?;
            let (system, witness) = load_instance::<F>(&r1cs, inputs.as_deref())?;
            let setup = ligero_setup(&system, &params)?;
            info!(field = F::NAME, config = ?setup.config(), "Proving");

            let proof = ligero_prove(&system, &witness, &params)?;
            println!("proof size: {} bytes", proof.size_in_bytes()?);
            if let Some(path) = output {
                write_proof(&proof, &path, format)?;
            }
            let verdict = ligero_verify_with(&system, &witness.public, &proof, &params)?;
            Ok(report(&verdict))
        }
        Commands::Verify {
            r1cs,
            proof,
            inputs,
            format,
            params,
        } => {
            let params = params.resolve(field)?;
            let system = load_r1cs::<F>(&r1cs)?;
            let inputs_path = inputs.unwrap_or_else(|| default_inputs_path(&r1cs));
            let public = load_inputs::<F>(&inputs_path)?.public;
            if public.len() != system.num_public_inputs() {
                bail!(
                    "{} holds {} public inputs, the constraint system expects {}",
                    inputs_path.display(),
                    public.len(),
                    system.num_public_inputs()
                );
            }
            let proof = read_proof::<F>(&proof, format)?;
            let verdict = ligero_verify_with(&system, &public, &proof, &params)?;
            Ok(report(&verdict))
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.field {
        FieldKind::Goldilocks => run::<Goldilocks>(cli.command, cli.field),
        FieldKind::Bn254 => run::<Fr>(cli.command, cli.field),
        FieldKind::Gf64 => run::<Gf64>(cli.command, cli.field),
    }
}
