//! # Path Planner Benchmark

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion};

use auton_lib::auto::{
    loc::Pose,
    map::{Cell, FieldBounds, OccupancyGrid},
    nav::{PathPlanner, PathPlannerParams},
    path::{Path, Waypoint},
    traj::{InterpMode, TrajGenerator},
};

fn path_planner_benchmark(c: &mut Criterion) {
    // ---- Build a field with a few walls ----

    let mut grid = OccupancyGrid::new(49, 49, FieldBounds::default()).unwrap();

    // Staggered walls force the search around both ends
    for x in 0..40 {
        grid.set_occupied(Cell::new(x, 12), true);
        grid.set_occupied(Cell::new(x + 9, 36), true);
    }
    for y in 14..34 {
        grid.set_occupied(Cell::new(24, y), true);
    }

    let planner = PathPlanner::new(Rc::new(grid), PathPlannerParams::default());

    let start = Pose::from_deg(3.0, 3.0, 0.0);
    let goal = Pose::from_deg(141.0, 141.0, 90.0);

    c.bench_function("PathPlanner::search", |b| {
        b.iter(|| planner.search(Cell::new(1, 1), Cell::new(47, 47)).unwrap())
    });

    c.bench_function("PathPlanner::find_path", |b| {
        b.iter(|| planner.find_path(&start, &goal).unwrap())
    });

    // ---- Trajectory generation ----

    let path = Path::new(vec![
        Waypoint::new(12.0, 24.0, 0.0),
        Waypoint::new(60.0, 24.0, 0.0).with_tangents(0.0, 18.0),
        Waypoint::new(108.0, 48.0, 90.0).with_tangents(24.0, 0.0),
        Waypoint::new(108.0, 120.0, 90.0),
        Waypoint::new(24.0, 120.0, 180.0),
    ]);

    let spline = TrajGenerator::with_mode(InterpMode::Spline);
    let linear = TrajGenerator::with_mode(InterpMode::Linear);

    c.bench_function("TrajGenerator::generate::spline", |b| {
        b.iter(|| spline.generate(&path))
    });
    c.bench_function("TrajGenerator::generate::linear", |b| {
        b.iter(|| linear.generate(&path))
    });
}

criterion_group!(benches, path_planner_benchmark);
criterion_main!(benches);
