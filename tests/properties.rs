use proptest::prelude::*;
use spot_assign::{
    bottleneck_matching, max_cost, min_cost_matching, permutation_matching, total_cost,
    IncrementalMatcher, Pair, Point,
};

fn to_points(prefix: &str, coords: &[(i32, i32)]) -> Vec<Point> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Point::new(format!("{prefix}{}", i + 1), x, y))
        .collect()
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                extend(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}

/// (minimum total, minimum maximum) over every perfect matching.
fn brute_force(servers: &[Point], requests: &[Point]) -> (f64, f64) {
    let mut best_total = f64::INFINITY;
    let mut best_max = f64::INFINITY;
    for perm in permutations(servers.len()) {
        let costs: Vec<f64> = perm
            .iter()
            .enumerate()
            .map(|(i, &j)| servers[i].distance(&requests[j]))
            .collect();
        best_total = best_total.min(costs.iter().sum());
        best_max = best_max.min(costs.iter().copied().fold(0., f64::max));
    }
    (best_total, best_max)
}

fn assert_valid(pairs: &[Pair], n: usize) {
    assert_eq!(pairs.len(), n);
    let mut servers: Vec<&str> = pairs.iter().map(|p| p.server.id.as_str()).collect();
    let mut requests: Vec<&str> = pairs.iter().map(|p| p.request.id.as_str()).collect();
    servers.sort_unstable();
    servers.dedup();
    requests.sort_unstable();
    requests.dedup();
    assert_eq!(servers.len(), n, "server used twice");
    assert_eq!(requests.len(), n, "request used twice");
    for pair in pairs {
        assert!((pair.cost - pair.server.distance(&pair.request)).abs() < 1e-9);
    }
}

fn instance(max: usize) -> impl Strategy<Value = (Vec<(i32, i32)>, Vec<(i32, i32)>)> {
    (1..=max).prop_flat_map(|n| {
        (
            proptest::collection::vec((0..20i32, 0..20i32), n),
            proptest::collection::vec((0..20i32, 0..20i32), n),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn min_cost_is_optimal((xs, ys) in instance(6)) {
        let servers = to_points("x", &xs);
        let requests = to_points("y", &ys);
        let pairs = min_cost_matching(&servers, &requests).unwrap();
        assert_valid(&pairs, servers.len());
        let (best, _) = brute_force(&servers, &requests);
        prop_assert!((total_cost(&pairs) - best).abs() < 1e-6,
            "solver {} vs brute force {}", total_cost(&pairs), best);
    }

    #[test]
    fn bottleneck_is_optimal((xs, ys) in instance(6)) {
        let servers = to_points("x", &xs);
        let requests = to_points("y", &ys);
        let pairs = bottleneck_matching(&servers, &requests).unwrap();
        assert_valid(&pairs, servers.len());
        let (_, best) = brute_force(&servers, &requests);
        prop_assert!((max_cost(&pairs) - best).abs() < 1e-9,
            "solver {} vs brute force {}", max_cost(&pairs), best);
    }

    #[test]
    fn online_commitments_are_stable((xs, ys) in instance(6)) {
        let servers = to_points("x", &xs);
        let requests = to_points("y", &ys);
        let mut matcher = IncrementalMatcher::new(&servers).unwrap();
        let mut history: Vec<Pair> = Vec::new();
        for request in &requests {
            let pair = matcher.arrive(request.clone()).unwrap();
            prop_assert_eq!(&matcher.commitments()[..history.len()], &history[..]);
            history.push(pair);
        }
        assert_valid(&history, servers.len());

        let (best, _) = brute_force(&servers, &requests);
        prop_assert!(total_cost(&history) >= best - 1e-6);
        prop_assert_eq!(history, permutation_matching(&servers, &requests).unwrap());
    }

    #[test]
    fn online_with_spare_servers(
        (xs, ys) in instance(5),
        extra in proptest::collection::vec((0..20i32, 0..20i32), 1..3)
    ) {
        let mut xs = xs;
        xs.extend(extra);
        let servers = to_points("x", &xs);
        let requests = to_points("y", &ys);
        let pairs = permutation_matching(&servers, &requests).unwrap();
        assert_eq!(pairs.len(), requests.len());
        let mut used: Vec<&str> = pairs.iter().map(|p| p.server.id.as_str()).collect();
        used.sort_unstable();
        used.dedup();
        prop_assert_eq!(used.len(), requests.len());
    }
}
