//! End-to-end solver benchmarks on the reference puzzles.
//!
//! # Running
//!
//! ```sh
//! cargo bench --bench solver
//! ```

use std::hint;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use gridlace_core::{Alphabet, Geometry};
use gridlace_solver::{
    ConstraintGrid, PuzzleSolver,
    testing::fixtures::{self, Fixture},
};

fn grid_9x9(fixture: &Fixture) -> ConstraintGrid {
    ConstraintGrid::from_givens(
        Geometry::square(9).unwrap(),
        Alphabet::for_size(9).unwrap(),
        fixture.givens,
    )
    .unwrap()
}

fn bench_construction_propagation(c: &mut Criterion) {
    c.bench_function("construct_easy_9x9", |b| {
        b.iter(|| hint::black_box(grid_9x9(&fixtures::EASY_9X9)));
    });
    c.bench_function("construct_hard_9x9", |b| {
        b.iter(|| hint::black_box(grid_9x9(&fixtures::HARD_9X9)));
    });
}

fn bench_solve_hard_9x9(c: &mut Criterion) {
    let grid = grid_9x9(&fixtures::HARD_9X9);
    let solver = PuzzleSolver::new();

    c.bench_function("solve_hard_9x9", |b| {
        b.iter_batched(
            || grid.clone(),
            |grid| hint::black_box(solver.solve(grid).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_solve_12x12(c: &mut Criterion) {
    let grid = ConstraintGrid::from_givens(
        Geometry::rectangular(3, 4).unwrap(),
        Alphabet::for_size(12).unwrap(),
        fixtures::TWELVE_3X4.givens,
    )
    .unwrap();
    let solver = PuzzleSolver::new();

    c.bench_function("solve_12x12_3x4", |b| {
        b.iter_batched(
            || grid.clone(),
            |grid| hint::black_box(solver.solve(grid).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_construction_propagation,
    bench_solve_hard_9x9,
    bench_solve_12x12,
);
criterion_main!(benches);
