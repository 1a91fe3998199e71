use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use lpex_solver::{
    Bounds, ModelError, Program, SampleError, SampleSpec, SolveError, SolveOptions, SolveStatus, Solver, VarKind,
    sample_feasible_region, solve,
};

fn production() -> Program {
    let mut program = Program::new("production");
    let x1 = program.continuous("x1").unwrap();
    let x2 = program.continuous("x2").unwrap();
    program.maximize(1000.0 * &x1 + 1800.0 * &x2).unwrap();
    program.le("time", 20.0 * &x1 + 30.0 * &x2, 1200.0).unwrap();
    program.le("demand_p1", &x1, 40.0).unwrap();
    program.le("demand_p2", &x2, 30.0).unwrap();
    program
}

fn buses(kind: VarKind) -> Program {
    let mut program = Program::new("buses");
    let large = program.add_variable("large", Bounds::default(), kind).unwrap();
    let small = program.add_variable("small", Bounds::default(), kind).unwrap();
    program.minimize(190.0 * &large + 140.0 * &small).unwrap();
    program.ge("capacity", 60.0 * &large + 40.0 * &small, 600.0).unwrap();
    program.le("max_large", &large, 8.0).unwrap();
    program.le("max_small", &small, 12.0).unwrap();
    program.le("drivers", &large + &small, 13.0).unwrap();
    program
}

#[test]
fn production_plan() {
    let program = production();
    let solution = solve(&program).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_relative_eq!(solution.value_of("x1").unwrap(), 15.0, epsilon = 1e-6);
    assert_relative_eq!(solution.value_of("x2").unwrap(), 30.0, epsilon = 1e-6);
    assert_relative_eq!(solution.objective_value.unwrap(), 69000.0, epsilon = 1e-6);
}

#[test]
fn bus_fleet_integer_optimum() {
    let program = buses(VarKind::Integer);
    let solution = solve(&program).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_eq!(solution.value_of("large"), Some(8.0));
    assert_eq!(solution.value_of("small"), Some(3.0));
    assert_relative_eq!(solution.objective_value.unwrap(), 1940.0, epsilon = 1e-6);
}

#[test]
fn bus_fleet_relaxation_bounds_integer_optimum() {
    let integer = solve(&buses(VarKind::Integer)).unwrap();
    let relaxed = solve(&buses(VarKind::Continuous)).unwrap();

    assert_eq!(relaxed.status, SolveStatus::Optimal);
    // minimizing: the relaxation can only be cheaper or equal
    assert!(relaxed.objective_value.unwrap() <= integer.objective_value.unwrap() + 1e-6);
}

#[test]
fn contradictory_rows_are_infeasible() {
    let mut program = Program::new("contradiction");
    let x = program.continuous("x").unwrap();
    program.maximize(&x).unwrap();
    program.le("at_most_one", &x, 1.0).unwrap();
    program.ge("at_least_five", &x, 5.0).unwrap();

    let solution = solve(&program).unwrap();

    assert_eq!(solution.status, SolveStatus::Infeasible);
    assert!(solution.values.is_none());
    assert!(solution.objective_value.is_none());
}

#[test]
fn contradictory_rows_without_objective_are_infeasible() {
    let mut program = Program::new("contradiction");
    let x = program.continuous("x").unwrap();
    program.le("at_most_one", &x, 1.0).unwrap();
    program.ge("at_least_two", &x, 2.0).unwrap();

    assert_eq!(solve(&program).unwrap().status, SolveStatus::Infeasible);
}

#[test]
fn unbounded_direction() {
    let mut program = Program::new("unbounded");
    let x = program.continuous("x").unwrap();
    let y = program.continuous("y").unwrap();
    program.maximize(&x + &y).unwrap();
    program.ge("floor", &x - &y, 1.0).unwrap();

    assert_eq!(solve(&program).unwrap().status, SolveStatus::Unbounded);
}

#[test]
fn no_constraints_lands_on_tightest_bound() {
    let mut program = Program::new("box");
    let x = program.add_variable("x", Bounds::new(2.0, 7.0), VarKind::Continuous).unwrap();
    let y = program.add_variable("y", Bounds::new(-3.0, 5.0), VarKind::Continuous).unwrap();
    program.maximize(&x - 2.0 * &y).unwrap();

    let solution = solve(&program).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_eq!(solution.value(&x), Some(7.0));
    assert_eq!(solution.value(&y), Some(-3.0));
    assert_eq!(solution.objective_value, Some(13.0));
}

#[test]
fn sampler_marks_cells() {
    let mut program = Program::new("grid");
    let x = program.continuous("x").unwrap();
    let y = program.continuous("y").unwrap();
    program.le("sum", &x + &y, 6.0).unwrap();
    program.le("x_max", &x, 4.0).unwrap();
    program.le("y_max", &y, 4.0).unwrap();

    let spec = SampleSpec::new(7).axis(&x, 0.0, 6.0).axis(&y, 0.0, 6.0);
    let grid = sample_feasible_region(&program, &spec).unwrap();

    assert_eq!(grid.shape(), vec![7, 7]);
    assert_eq!(grid.get(&[5, 5]), Some(false));
    assert_eq!(grid.get(&[2, 2]), Some(true));
    assert_eq!(grid.get(&[4, 2]), Some(true));
    assert_eq!(grid.get(&[4, 3]), Some(false));
}

#[test]
fn solving_twice_gives_the_same_solution() {
    let program = buses(VarKind::Integer);
    assert_eq!(solve(&program).unwrap(), solve(&program).unwrap());
}

#[test]
fn optimum_is_feasible_and_matches_objective() {
    for program in [production(), buses(VarKind::Integer), buses(VarKind::Continuous)] {
        let solution = solve(&program).unwrap();
        let values = solution.values.as_ref().unwrap();

        assert!(program.is_feasible(values), "{}", program.name());
        for constraint in program.constraints() {
            assert!(constraint.is_satisfied(values), "{} violates {}", program.name(), constraint.name());
        }
        let objective = program.objective().unwrap().expression.evaluate(values).unwrap();
        assert_relative_eq!(objective, solution.objective_value.unwrap(), epsilon = 1e-9);
    }
}

#[test]
fn generous_time_limit_still_solves() {
    let program = production();
    let solver = Solver::new().with_options(SolveOptions::new().with_time_limit(Duration::from_secs(30)));

    let solution = solver.solve(&program).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_relative_eq!(solution.objective_value.unwrap(), 69000.0, epsilon = 1e-6);
}

#[test]
fn shared_program_across_threads() {
    let program = production();
    let solver = Solver::new();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| solver.solve(&program))).collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    for solution in &results {
        assert_eq!(solution, &results[0]);
    }
}

#[test]
fn variables_do_not_cross_programs() {
    let mut first = Program::new("first");
    let x = first.continuous("x").unwrap();
    let mut second = Program::new("second");
    second.continuous("x").unwrap();

    let err = second.le("borrowed", &x, 1.0).unwrap_err();

    assert_eq!(err, ModelError::UnknownVariable { name: "x".to_string() });
    assert_eq!(second.num_constraints(), 0);
}

#[test]
fn integer_optimum_beyond_backend_range_is_an_error() {
    let mut program = Program::new("large_integer");
    let n = program.integer("n").unwrap();
    program.maximize(&n).unwrap();
    program.le("cap", &n, 5e9).unwrap();

    assert!(matches!(solve(&program), Err(SolveError::Backend { .. })));
}

#[test]
fn oversized_sampling_grid_is_an_error() {
    let mut program = Program::new("grid");
    let x = program.continuous("x").unwrap();
    let y = program.continuous("y").unwrap();
    let z = program.continuous("z").unwrap();

    let spec = SampleSpec::new(1 << 22).axis(&x, 0.0, 1.0).axis(&y, 0.0, 1.0).axis(&z, 0.0, 1.0);
    assert!(matches!(
        sample_feasible_region(&program, &spec),
        Err(SampleError::GridTooLarge { axes: 3, .. })
    ));
}
