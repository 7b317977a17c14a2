use std::error::Error;
use std::path::PathBuf;

use anstream::print;
use anstream::println;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use hrsw::Stopwatch;
use human_duration::human_duration;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing_subscriber::EnvFilter;

use maze_search::algorithms::strategy::Strategy;
use maze_search::algorithms::tree_search::DEPTH_LIMIT;
use maze_search::algorithms::tree_search::TreeSearch;
use maze_search::data_structures::d_ary_heap::DAryHeap;
use maze_search::data_structures::frontier::Frontier;
use maze_search::data_structures::sorted_frontier::SortedFrontier;
use maze_search::problem::ConstantHeuristic;
use maze_search::problem::ObjectiveHeuristic;
use maze_search::problem::Problem;
use maze_search::problems::grid::Direction;
use maze_search::problems::grid::Grid;
use maze_search::problems::grid::GridCost;
use maze_search::problems::grid::GridManhattanDistance;
use maze_search::problems::grid::GridProblem;
use maze_search::problems::grid::GridState;
use maze_search::search::FrontierNode;
use maze_search::space::Space;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Generates mazes and searches paths through them.
#[derive(Parser, Debug)]
#[clap(long_version = maze_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generates a random maze.
    Generate(GenerateArgs),
    /// Draws a maze file.
    Render(RenderArgs),
    /// Searches a path through a maze.
    Solve(SolveArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, env = "MAZE_ROWS", value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,
    #[arg(long, env = "MAZE_COLS", value_parser = clap::value_parser!(u32).range(1..))]
    cols: u32,
    /// Makes generation reproducible.
    #[arg(long, env = "MAZE_SEED")]
    seed: Option<u64>,
    /// Where to save the maze as JSON.
    #[arg(short, long, env = "MAZE_OUTPUT")]
    output: Option<PathBuf>,
    #[arg(long, env = "MAZE_IMAGE")]
    image: Option<PathBuf>,
    /// Prints the maze with ASCII art.
    #[arg(long)]
    print: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    maze: PathBuf,
    #[arg(long, env = "MAZE_IMAGE")]
    image: Option<PathBuf>,
    #[arg(long)]
    print: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum HeuristicKind {
    Constant,
    Manhattan,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FrontierKind {
    Heap,
    Sorted,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Problem file with the initial and objective states, and a maze path.
    #[arg(conflicts_with = "maze", required_unless_present = "maze")]
    problem: Option<PathBuf>,

    #[arg(long, requires_all = ["from", "to"])]
    maze: Option<PathBuf>,
    #[arg(long, requires = "maze")]
    from: Option<GridState>,
    #[arg(long, requires = "maze")]
    to: Option<GridState>,

    /// One of breadth-first, depth-first, uniform-cost, greedy or a-star.
    #[arg(short, long, env = "MAZE_STRATEGY", default_value_t = Strategy::BreadthFirst)]
    strategy: Strategy,
    #[arg(long, env = "MAZE_HEURISTIC", value_enum, default_value_t = HeuristicKind::Manhattan)]
    heuristic: HeuristicKind,
    #[arg(long, env = "MAZE_DEPTH_LIMIT", default_value_t = DEPTH_LIMIT)]
    depth_limit: usize,
    #[arg(long, value_enum, default_value_t = FrontierKind::Heap)]
    frontier: FrontierKind,

    /// Draws the maze highlighting the solution.
    #[arg(long, env = "MAZE_IMAGE")]
    image: Option<PathBuf>,
    #[arg(long)]
    stats: bool,
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = (args.rows as usize, args.cols as usize);

    let mut stopwatch = Stopwatch::new_started();
    let grid = match args.seed {
        Some(seed) => Grid::wilson(rows, cols, &mut ChaCha8Rng::seed_from_u64(seed)),
        None => Grid::generate(rows, cols),
    };
    stopwatch.stop();
    log::info!(
        "Generated a {rows}x{cols} maze in {}",
        human_duration(&stopwatch.elapsed())
    );

    if args.print || (args.output.is_none() && args.image.is_none()) {
        println!("{grid}");
    }
    if let Some(output) = &args.output {
        grid.save_json(output)?;
        println!("Saved maze to {:?}", output.yellow());
    }
    if let Some(image) = &args.image {
        grid.save_image(image, &[])?;
        println!("Saved image to {:?}", image.yellow());
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let grid = Grid::load_json(&args.maze)?;
    if args.print || args.image.is_none() {
        println!("{grid}");
    }
    if let Some(image) = &args.image {
        grid.save_image(image, &[])?;
        println!("Saved image to {:?}", image.yellow());
    }
    Ok(())
}

fn solve<H, F>(problem: GridProblem, args: &SolveArgs) -> Result<(), Box<dyn Error>>
where
    H: ObjectiveHeuristic<Grid, GridState, Direction, GridCost>,
    F: Frontier<FrontierNode<GridState>>,
{
    println!("{} {problem}", "Solving".green());
    let mut search =
        TreeSearch::<H, GridProblem, Grid, GridState, Direction, GridCost, F>::new(
            problem,
            args.strategy,
        )
        .with_depth_limit(args.depth_limit);

    let mut stopwatch = Stopwatch::new_started();
    let solution = search.solve();
    stopwatch.stop();
    let elapsed = human_duration(&stopwatch.elapsed());

    let Some(solution) = solution else {
        println!("{} ({} in {elapsed})", "No solution".red(), args.strategy);
        if args.stats {
            search.write_stats(std::io::stdout().lock())?;
        }
        return Ok(());
    };

    print!("{solution}");
    let path = solution.path();
    debug_assert!(search.problem().space().valid_path(&path));
    println!(
        "{} depth {}, cost {} ({} in {elapsed})",
        "Solution".green(),
        solution.depth().bold(),
        solution.cost().bold(),
        args.strategy
    );
    println!("{path}");
    if args.stats {
        search.write_stats(std::io::stdout().lock())?;
    }

    if let Some(image) = &args.image {
        let states: Vec<GridState> = solution.nodes().iter().map(|n| *n.state()).collect();
        search.problem().grid().save_image(image, &states)?;
        println!("Saved image to {:?}", image.yellow());
    }
    Ok(())
}

fn load_problem(args: &SolveArgs) -> Result<GridProblem, Box<dyn Error>> {
    if let Some(problem) = &args.problem {
        return Ok(GridProblem::load(problem)?);
    }
    match (&args.maze, args.from, args.to) {
        (Some(maze), Some(from), Some(to)) => {
            let grid = Grid::load_json(maze)?;
            Ok(GridProblem::new(grid, from, to))
        }
        _ => Err("Either a problem file or --maze, --from and --to are needed".into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    cli.color.write_global();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Render(args) => render(args),
        Command::Solve(args) => {
            let problem = load_problem(&args)?;
            if !problem.space().valid(problem.initial()) {
                log::warn!("Initial state {} is outside the maze", problem.initial());
            }
            if args.strategy.is_informed() && matches!(args.heuristic, HeuristicKind::Constant) {
                log::warn!("{} gets no guidance from a constant heuristic", args.strategy);
            }
            match (args.heuristic, args.frontier) {
                (HeuristicKind::Constant, FrontierKind::Heap) => {
                    solve::<ConstantHeuristic, DAryHeap<FrontierNode<GridState>>>(problem, &args)
                }
                (HeuristicKind::Constant, FrontierKind::Sorted) => {
                    solve::<ConstantHeuristic, SortedFrontier<FrontierNode<GridState>>>(problem, &args)
                }
                (HeuristicKind::Manhattan, FrontierKind::Heap) => {
                    solve::<GridManhattanDistance, DAryHeap<FrontierNode<GridState>>>(problem, &args)
                }
                (HeuristicKind::Manhattan, FrontierKind::Sorted) => {
                    solve::<GridManhattanDistance, SortedFrontier<FrontierNode<GridState>>>(problem, &args)
                }
            }
        }
    }
}
