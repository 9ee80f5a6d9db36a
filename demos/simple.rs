use spot_assign::{
    bottleneck_matching, max_cost, min_cost_matching, permutation_matching, total_cost, Point,
};
use tracing_subscriber::EnvFilter;

fn main() -> spot_assign::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let servers = vec![
        Point::new("x1", 0, 0),
        Point::new("x2", 3, 0),
        Point::new("x3", 7, 0),
    ];
    let requests = vec![
        Point::new("y1", 2, 0),
        Point::new("y2", 4, 0),
        Point::new("y3", 8, 0),
    ];

    let offline = min_cost_matching(&servers, &requests)?;
    let online = permutation_matching(&servers, &requests)?;
    let bottleneck = bottleneck_matching(&servers, &requests)?;

    let strategies = [
        ("min cost", &offline),
        ("permutation", &online),
        ("bottleneck", &bottleneck),
    ];
    for (name, pairs) in strategies {
        println!(
            "{name}: total {:.3}, max {:.3}",
            total_cost(pairs),
            max_cost(pairs)
        );
        for pair in pairs {
            println!("  {pair}");
        }
    }
    Ok(())
}
