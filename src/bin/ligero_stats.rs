use std::{env, time::Duration, time::Instant};

use ligero_r1cs::ligero::{
    Goldilocks, LdtReducerSoundnessType, LigeroField, LigeroParameters, LigeroProof,
};
use ligero_r1cs::snarks::{
    ligero_prove, ligero_setup, ligero_verify, LinearCombination, R1cs, R1csConstraint, Witness,
};

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{:.2} ms", duration.as_secs_f64() * 1_000.0)
    } else {
        format!("{:.3} s", duration.as_secs_f64())
    }
}

fn parse_args() -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let security = args
        .next()
        .map(|value| value.parse::<usize>())
        .transpose()?
        .unwrap_or(128);
    let constraints = args
        .next()
        .map(|value| value.parse::<usize>())
        .transpose()?
        .unwrap_or(1 << 12);
    Ok((security, constraints))
}

/// Product chain `z_{i+1} = z_i * (z_i + 1)` ending in the public output.
fn synthetic_instance(
    constraints: usize,
) -> Result<(R1cs<Goldilocks>, Witness<Goldilocks>), Box<dyn std::error::Error>> {
    let one = Goldilocks::one();
    let mut values = vec![Goldilocks::from_u64(2)];
    let mut rows = Vec::with_capacity(constraints);
    for i in 0..constraints {
        let current = 2 + i;
        let prev = values[i];
        values.push(prev * (prev + one));
        let target = if i + 1 == constraints { 1 } else { current + 1 };
        rows.push(R1csConstraint::new(
            LinearCombination::from_terms([(current, one)]),
            LinearCombination::from_terms([(current, one), (0, one)]),
            LinearCombination::from_terms([(target, one)]),
        ));
    }
    let output = values.pop().ok_or("empty chain")?;
    let r1cs = R1cs::new(2 + values.len(), 1, rows)?;
    Ok((r1cs, Witness::new(vec![output], values)))
}

fn report(
    label: &str,
    r1cs: &R1cs<Goldilocks>,
    witness: &Witness<Goldilocks>,
    params: &LigeroParameters,
) -> Result<(), Box<dyn std::error::Error>> {
    let setup = ligero_setup(r1cs, params)?;
    let config = setup.config();

    let prove_start = Instant::now();
    let proof: LigeroProof<Goldilocks> = ligero_prove(r1cs, witness, params)?;
    let prove_time = prove_start.elapsed();

    let verify_start = Instant::now();
    let accepted = ligero_verify(r1cs, &witness.public, &proof, params)?;
    let verify_time = verify_start.elapsed();

    println!("\n--- {label} ---");
    println!(
        "  rows x width:         {} x {}",
        config.layout.total_rows(),
        config.message_width
    );
    println!(
        "  |S| / |L|:            {} / {}",
        config.systematic_size(),
        config.codeword_size()
    );
    println!("  queries:              {}", config.query_count);
    println!("  repetitions:          {}", config.repetitions);
    println!("  prove time:           {}", format_duration(prove_time));
    println!("  verify time:          {}", format_duration(verify_time));
    println!("  proof size (B):       {:>10}", proof.size_in_bytes()?);
    println!(
        "  verification result:  {}",
        if accepted { "success" } else { "failure" }
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (security_level, constraints) = parse_args()?;
    if constraints == 0 {
        return Err("need at least one constraint".into());
    }

    println!("=== Ligero R1CS Stats ===\n");
    println!(
        "field: {}   security level: {}-bit   constraints: {}",
        Goldilocks::NAME,
        security_level,
        constraints
    );

    let (r1cs, witness) = synthetic_instance(constraints)?;
    println!("  variables:            {}", r1cs.num_variables());

    let base = LigeroParameters::default().with_security_level(security_level);
    report("zero knowledge, proven reducer", &r1cs, &witness, &base)?;
    report("no zero knowledge", &r1cs, &witness, &base.clone().with_zk(false))?;
    report(
        "zero knowledge, heuristic reducer",
        &r1cs,
        &witness,
        &base.with_ldt_reducer_soundness_type(LdtReducerSoundnessType::Heuristic),
    )?;
    Ok(())
}
