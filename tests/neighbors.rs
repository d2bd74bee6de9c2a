use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rivergraph::geometry::Point2;
use rivergraph::mesh::NeighborGraph;
use rivergraph::operations::triangulation::Triangulation;

fn random_points(n: usize, seed: u64) -> Vec<Point2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point2::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect()
}

#[test]
fn neighbors_are_short_triangulation_edges() {
    let points = random_points(800, 12);
    let t = Triangulation::new(&points).unwrap();
    let graph = NeighborGraph::build(&points, &t, 0.1);
    assert_eq!(graph.len(), points.len());
    assert!(graph.is_symmetric());

    let edges: Vec<(usize, usize)> = t.undirected_edges().collect();
    for p in 0..points.len() {
        let ns = graph.neighbors(p);
        for (k, &q) in ns.iter().enumerate() {
            assert_ne!(p, q);
            assert!(!ns[..k].contains(&q), "duplicate neighbor {q} of {p}");
            assert!(points[p].distance_to(&points[q]) <= 0.1);
            assert!(edges.contains(&(p, q)) || edges.contains(&(q, p)));
        }
    }
}

#[test]
fn threshold_counts_match_triangulation() {
    let points = random_points(300, 1);
    let t = Triangulation::new(&points).unwrap();
    let expected = t
        .undirected_edges()
        .filter(|&(p, q)| points[p].distance_to(&points[q]) <= 0.08)
        .count();
    let graph = NeighborGraph::build(&points, &t, 0.08);
    assert_eq!(graph.edge_count(), expected);
}

#[test]
fn zero_threshold_isolates_every_point() {
    let points = random_points(50, 6);
    let t = Triangulation::new(&points).unwrap();
    let graph = NeighborGraph::build(&points, &t, 0.0);
    assert_eq!(graph.edge_count(), 0);
    assert!((0..points.len()).all(|i| graph.degree(i) == 0));
}
