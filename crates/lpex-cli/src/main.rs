use std::fmt::Display;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lpex_exercises::Exercise;
use lpex_solver::{
    BoundaryLine, ConstraintViolation, FeasibilityGrid, Point, Program, Solution, SolveOptions, Solver,
    Variable, boundary_line, feasible_vertices, sample_feasible_region,
};
use serde::Serialize;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "lpex")]
#[command(about = "Solve and explore textbook linear programs", long_about = None)]
struct Cli {
    /// Output format (pretty, json)
    #[arg(short, long, global = true, default_value = "pretty", value_parser = ["pretty", "json"])]
    format: String,
    /// Log lowering and backend calls
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercise catalogue
    List,
    /// Solve an exercise and print the optimum
    Solve {
        /// Exercise key, as printed by `list`
        exercise: String,
        /// Give up after this many milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Also list the constraints that are tight at the optimum
        #[arg(short, long)]
        binding: bool,
    },
    /// Sample the feasible region over the exercise's plot window
    Sample {
        exercise: String,
        /// Points per axis
        #[arg(short, long, default_value_t = 21)]
        resolution: usize,
        /// Reject grid points with fractional values for integer variables
        #[arg(long)]
        integral: bool,
    },
    /// Print the corners of a two-variable feasible region
    Vertices { exercise: String },
    /// Check a point against an exercise's constraints
    Check {
        exercise: String,
        /// Variable assignments, e.g. x1=15 x2=30
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let json = cli.format == "json";

    match cli.command {
        Commands::List => list(json),
        Commands::Solve {
            exercise,
            time_limit_ms,
            binding,
        } => {
            let (exercise, program) = load(&exercise);
            let mut options = SolveOptions::new();
            if let Some(ms) = time_limit_ms {
                options = options.with_time_limit(Duration::from_millis(ms));
            }
            let solution = or_exit("Solve error", Solver::new().with_options(options).solve(&program));
            print_solution(exercise, &program, &solution, binding, json);
        }
        Commands::Sample {
            exercise,
            resolution,
            integral,
        } => {
            let (exercise, program) = load(&exercise);
            let spec = or_exit("Sample error", exercise.sample_spec(&program, resolution)).respect_integrality(integral);
            let grid = or_exit("Sample error", sample_feasible_region(&program, &spec));
            debug!(
                exercise = exercise.key,
                cells = grid.len() as u64,
                feasible = grid.feasible_count() as u64,
                "Sampled region"
            );
            print_grid(exercise, &grid, json);
        }
        Commands::Vertices { exercise } => {
            let (exercise, program) = load(&exercise);
            print_vertices(exercise, &program, json);
        }
        Commands::Check { exercise, values } => {
            let (exercise, program) = load(&exercise);
            let point = parse_point(&program, &values);
            print_check(exercise, &program, &point, json);
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Logging disabled: {}", e);
    }
}

fn or_exit<T, E: Display>(context: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}: {}", context, e);
            std::process::exit(1);
        }
    }
}

fn load(key: &str) -> (&'static Exercise, Program) {
    let Some(exercise) = lpex_exercises::find(key) else {
        eprintln!("Unknown exercise '{}' (see `lpex list`)", key);
        std::process::exit(1);
    };
    let program = or_exit("Model error", exercise.program());
    (exercise, program)
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", or_exit("Encoding error", serde_json::to_string_pretty(value)));
}

fn list(json: bool) {
    let catalog = lpex_exercises::catalog();
    if json {
        print_json(&catalog);
        return;
    }
    for exercise in catalog {
        let axes: Vec<_> = exercise.window.iter().map(|w| w.variable).collect();
        println!("{:20} {} [{}]", exercise.key, exercise.title, axes.join(", "));
    }
}

#[derive(Serialize)]
struct SolveReport<'a> {
    exercise: &'a str,
    #[serde(flatten)]
    solution: &'a Solution,
    #[serde(skip_serializing_if = "Option::is_none")]
    binding_constraints: Option<Vec<String>>,
}

fn print_solution(exercise: &Exercise, program: &Program, solution: &Solution, binding: bool, json: bool) {
    let binding_constraints = match (&solution.values, binding) {
        (Some(values), true) => Some(or_exit("Model error", program.binding_constraints(values))),
        _ => None,
    };

    if json {
        print_json(&SolveReport {
            exercise: exercise.key,
            solution,
            binding_constraints,
        });
        return;
    }

    println!("Exercise: {}", exercise.title);
    if let Some(objective) = program.objective() {
        println!("Objective: {} {}", objective.sense, objective.expression);
    }
    println!();
    print!("{}", solution);

    if let Some(names) = binding_constraints {
        println!();
        println!("Binding constraints:");
        for name in names {
            println!("  - {}", name);
        }
    }
}

#[derive(Serialize)]
struct SampleReport<'a> {
    exercise: &'a str,
    shape: Vec<usize>,
    feasible_count: usize,
    #[serde(flatten)]
    grid: &'a FeasibilityGrid,
}

fn print_grid(exercise: &Exercise, grid: &FeasibilityGrid, json: bool) {
    if json {
        print_json(&SampleReport {
            exercise: exercise.key,
            shape: grid.shape(),
            feasible_count: grid.feasible_count(),
            grid,
        });
        return;
    }

    let names: Vec<_> = grid.axes().iter().map(|a| a.name.as_str()).collect();
    println!("Exercise: {}", exercise.title);
    println!("Axes: {}", names.join(" x "));
    println!("Feasible: {} of {} points", grid.feasible_count(), grid.len());
    for name in grid.relaxed_integer_axes() {
        println!("Note: integer variable '{}' sampled as continuous", name);
    }
    println!();

    if let [x_axis, y_axis] = grid.axes() {
        // first axis runs left to right, second bottom to top
        for j in (0..y_axis.values.len()).rev() {
            let row: String = (0..x_axis.values.len())
                .map(|i| if grid.get(&[i, j]) == Some(true) { '#' } else { '.' })
                .collect();
            println!("{:>10.2} {}", y_axis.values[j], row);
        }
        if let (Some(first), Some(last)) = (x_axis.values.first(), x_axis.values.last()) {
            println!("{:>10} {} .. {}", "", first, last);
        }
    } else {
        for point in grid.feasible_points() {
            let coords: Vec<_> = point.iter().map(|v| format!("{:.2}", v)).collect();
            println!("  ({})", coords.join(", "));
        }
    }
}

#[derive(Serialize)]
struct VertexReport<'a> {
    exercise: &'a str,
    axes: [&'a str; 2],
    vertices: Vec<(f64, f64)>,
    boundaries: Vec<(String, BoundaryLine)>,
}

fn print_vertices(exercise: &Exercise, program: &Program, json: bool) {
    let [x_window, y_window] = exercise.window else {
        eprintln!("Exercise '{}' has {} axes; vertices need exactly 2", exercise.key, exercise.window.len());
        std::process::exit(1);
    };
    let (x, y) = (lookup(program, x_window.variable), lookup(program, y_window.variable));

    let fixed = Point::new();
    let vertices = or_exit("Region error", feasible_vertices(program, x, y, &fixed));
    let mut boundaries = Vec::new();
    for constraint in program.constraints() {
        let line = or_exit("Region error", boundary_line(constraint, x, y, &fixed));
        boundaries.push((constraint.name().to_string(), line));
    }

    if json {
        print_json(&VertexReport {
            exercise: exercise.key,
            axes: [x.name(), y.name()],
            vertices,
            boundaries,
        });
        return;
    }

    println!("Exercise: {}", exercise.title);
    println!();
    println!("Boundaries:");
    for (name, line) in &boundaries {
        println!("  {:20} {}*{} + {}*{} = {}", name, line.a, x.name(), line.b, y.name(), line.c);
    }
    println!();
    println!("Vertices ({}, {}):", x.name(), y.name());
    if vertices.is_empty() {
        println!("  none, the region is empty");
    }
    for (vx, vy) in vertices {
        println!("  ({:.4}, {:.4})", vx, vy);
    }
}

fn lookup<'a>(program: &'a Program, name: &str) -> &'a Variable {
    match program.variable(name) {
        Some(v) => v,
        None => {
            eprintln!("Model error: variable '{}' is not declared", name);
            std::process::exit(1);
        }
    }
}

fn parse_point(program: &Program, assignments: &[String]) -> Point {
    let mut point = Point::new();
    for assignment in assignments {
        let Some((name, value)) = assignment.split_once('=') else {
            eprintln!("Expected name=value, got '{}'", assignment);
            std::process::exit(1);
        };
        let Some(variable) = program.variable(name.trim()) else {
            eprintln!("Unknown variable '{}' in exercise '{}'", name.trim(), program.name());
            std::process::exit(1);
        };
        let value: f64 = or_exit("Invalid value", value.trim().parse());
        point.insert(variable, value);
    }
    point
}

#[derive(Serialize)]
struct CheckReport<'a> {
    exercise: &'a str,
    feasible: bool,
    objective_value: f64,
    violations: Vec<ConstraintViolation>,
    binding_constraints: Vec<String>,
}

fn print_check(exercise: &Exercise, program: &Program, point: &Point, json: bool) {
    let violations = or_exit("Model error", program.violations(point));
    let binding_constraints = or_exit("Model error", program.binding_constraints(point));
    let objective_value = match program.objective() {
        Some(objective) => or_exit("Model error", objective.expression.evaluate(point)),
        None => 0.0,
    };
    let feasible = program.is_feasible(point);

    if json {
        print_json(&CheckReport {
            exercise: exercise.key,
            feasible,
            objective_value,
            violations,
            binding_constraints,
        });
        return;
    }

    println!("Exercise: {}", exercise.title);
    println!("Objective: {:.4}", objective_value);
    println!("Feasible: {}", if feasible { "yes" } else { "no" });
    if !violations.is_empty() {
        println!();
        println!("Violations:");
        for v in &violations {
            println!("  - {}", v.description);
        }
    }
    if !binding_constraints.is_empty() {
        println!();
        println!("Binding constraints:");
        for name in &binding_constraints {
            println!("  - {}", name);
        }
    }
}
