use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use maze_search::algorithms::strategy::Strategy;
use maze_search::algorithms::tree_search::TreeSearch;
use maze_search::problems::grid::Direction;
use maze_search::problems::grid::Grid;
use maze_search::problems::grid::GridCost;
use maze_search::problems::grid::GridManhattanDistance;
use maze_search::problems::grid::GridProblem;
use maze_search::problems::grid::GridState;

/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

type Search = TreeSearch<GridManhattanDistance, GridProblem, Grid, GridState, Direction, GridCost>;

fn search(problem: GridProblem, strategy: Strategy) -> Option<usize> {
    Search::new(problem, strategy).solve().map(|s| s.depth())
}

fn compare_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Wilson maze search");

    for (rows, cols) in [(16, 16), (64, 64), (128, 32)] {
        for seed in 0..3u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = Grid::wilson(rows, cols, &mut rng);
            let objective = GridState::new_from_usize(rows - 1, cols - 1).unwrap();
            let problem = GridProblem::new(grid, GridState::new(0, 0), objective);

            for strategy in Strategy::ALL {
                let instance_name = format!("{rows}x{cols}:{seed}");
                let mut stopwatch = Stopwatch::new_started();
                let mut probe = Search::new(problem.clone(), strategy);
                let solution = probe.solve();
                stopwatch.stop();
                let elapsed = stopwatch.elapsed();
                if elapsed > MAX_INSTANCE_TIME {
                    log::warn!(
                        "Skipping {instance_name} as it takes too long with {strategy} ({})",
                        human_duration(&elapsed)
                    );
                    continue;
                }
                println!(
                    "{strategy} on {instance_name}: depth {:?}, {}",
                    solution.map(|s| s.depth()),
                    probe.stats()
                );

                group.bench_with_input(
                    BenchmarkId::new(strategy.to_string(), &instance_name),
                    &problem,
                    |b, p| b.iter(|| search(p.clone(), strategy)),
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, compare_strategies);
criterion_main!(benches);
