use ark_bn254::Fr;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ligero_r1cs::ligero::{Goldilocks, LigeroField, LigeroParameters};
use ligero_r1cs::snarks::{
    ligero_prove, ligero_prove_with, ligero_verify, LinearCombination, R1cs, R1csConstraint,
    Witness,
};
use rand::{rngs::StdRng, SeedableRng};

/// Each step squares the previous value and adds the seed.
fn squaring_chain<F: LigeroField>(constraints: usize) -> (R1cs<F>, Witness<F>) {
    let seed = F::from_u64(3);
    let mut values = vec![seed];
    let mut rows = Vec::with_capacity(constraints);
    for i in 0..constraints {
        let current = 2 + i;
        let next = current + 1;
        let prev = values[i];
        values.push(prev * prev + seed);
        let input = LinearCombination::from_terms([(current, F::one())]);
        let output = LinearCombination::from_terms([(next, F::one()), (2, -F::one())]);
        rows.push(R1csConstraint::new(input.clone(), input, output));
    }
    let last = values[constraints];
    let r1cs = R1cs::new(3 + constraints, 1, rows).unwrap();
    (r1cs, Witness::new(vec![last], values))
}

fn bench_prove(c: &mut Criterion) {
    let params = LigeroParameters::default();
    let mut group = c.benchmark_group("ligero_prove");
    group.sample_size(10);
    for size in [256usize, 1024, 4096] {
        let (r1cs, witness) = squaring_chain::<Goldilocks>(size);
        group.bench_with_input(BenchmarkId::new("goldilocks", size), &size, |b, _| {
            b.iter(|| black_box(ligero_prove(&r1cs, &witness, &params)).unwrap())
        });
    }
    let (r1cs, witness) = squaring_chain::<Fr>(1024);
    group.bench_function("bn254/1024", |b| {
        b.iter(|| black_box(ligero_prove(&r1cs, &witness, &params)).unwrap())
    });
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let params = LigeroParameters::default();
    let mut group = c.benchmark_group("ligero_verify");
    group.sample_size(10);
    for size in [256usize, 1024, 4096] {
        let (r1cs, witness) = squaring_chain::<Goldilocks>(size);
        let mut rng = StdRng::seed_from_u64(size as u64);
        let proof = ligero_prove_with(&r1cs, &witness, &params, &mut rng).unwrap();
        group.bench_with_input(BenchmarkId::new("goldilocks", size), &size, |b, _| {
            b.iter(|| {
                assert!(black_box(ligero_verify(&r1cs, &witness.public, &proof, &params)).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prove, bench_verify);
criterion_main!(benches);
