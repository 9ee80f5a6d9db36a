use serde::Serialize;
use spot_assign::{min_cost_matching, permutation_matching, total_cost, Point};
use tracing_subscriber::EnvFilter;

const ASSIGNMENT_SIZE: usize = 20;
const DISTANCE_RANGE: f64 = 20.;
const N: usize = 100;

fn random_points(prefix: &str) -> Vec<Point> {
    let coords = nalgebra::DMatrix::<f64>::new_random(ASSIGNMENT_SIZE, 2) * DISTANCE_RANGE;
    (0..ASSIGNMENT_SIZE)
        .map(|i| {
            Point::new(
                format!("{prefix}{}", i + 1),
                coords[(i, 0)] as i32,
                coords[(i, 1)] as i32,
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct Summary {
    trials: usize,
    assignment_size: usize,
    offline_total: f64,
    online_total: f64,
    worst_ratio: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut offline_cost = 0.;
    let mut online_cost = 0.;
    let mut worst_ratio: f64 = 1.;
    for _ in 0..N {
        let servers = random_points("x");
        let requests = random_points("y");
        let offline = total_cost(&min_cost_matching(&servers, &requests)?);
        let online = total_cost(&permutation_matching(&servers, &requests)?);
        offline_cost += offline;
        online_cost += online;
        if offline > 0. {
            worst_ratio = worst_ratio.max(online / offline);
        }
    }

    let summary = Summary {
        trials: N,
        assignment_size: ASSIGNMENT_SIZE,
        offline_total: offline_cost,
        online_total: online_cost,
        worst_ratio,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
