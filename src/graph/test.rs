use approx::assert_relative_eq;
use geo::Point;

use crate::geo::Bounds;
use crate::graph::{
    Edge, Graph, Node, Restrictions, RoadClass, RoutingError, VehicleKind, VehicleProfile,
};

fn node(id: i64, lon: f64, lat: f64) -> Node {
    Node::new(id, id * 100, Point::new(lon, lat))
}

fn edge(id: i64, from: i64, to: i64, distance: f64, travel_time: f64) -> Edge {
    Edge {
        id,
        from,
        to,
        distance,
        travel_time,
        restrictions: Restrictions::unrestricted(),
        road_class: RoadClass::Primary,
        osm_way_id: id,
    }
}

/// A diamond: 1 -> 2 -> 4 is fast, 1 -> 3 -> 4 is slow but short.
fn diamond() -> Graph {
    let nodes = vec![
        node(1, -77.00, 38.90),
        node(2, -77.00, 38.91),
        node(3, -77.01, 38.90),
        node(4, -77.01, 38.91),
    ];

    let edges = vec![
        edge(10, 1, 2, 1_500.0, 60.0),
        edge(11, 2, 4, 1_500.0, 60.0),
        edge(12, 1, 3, 1_000.0, 90.0),
        edge(13, 3, 4, 1_000.0, 90.0),
    ];

    Graph::new(nodes, edges)
}

#[test_log::test]
fn shortest_path_prefers_travel_time() {
    let graph = diamond();
    let path = graph
        .shortest_path(1, 4, &VehicleProfile::truck())
        .expect("route exists");

    assert_eq!(path.nodes, vec![1, 2, 4]);
    assert_relative_eq!(path.travel_time, 120.0);
    assert_relative_eq!(path.distance, 3_000.0);
}

#[test_log::test]
fn shortest_path_ties_break_on_distance() {
    // Both branches cost 120s; the lower branch is shorter.
    let nodes = vec![
        node(1, 0.0, 0.0),
        node(2, 0.1, 0.0),
        node(3, 0.0, 0.1),
        node(4, 0.1, 0.1),
    ];

    let edges = vec![
        edge(10, 1, 2, 2_000.0, 60.0),
        edge(11, 2, 4, 2_000.0, 60.0),
        edge(12, 1, 3, 1_500.0, 60.0),
        edge(13, 3, 4, 1_500.0, 60.0),
    ];

    let graph = Graph::new(nodes, edges);
    let path = graph
        .shortest_path(1, 4, &VehicleProfile::truck())
        .expect("route exists");

    assert_eq!(path.nodes, vec![1, 3, 4]);
    assert_relative_eq!(path.distance, 3_000.0);
}

#[test_log::test]
fn truck_banned_edge_forces_detour() {
    let mut edges = vec![
        edge(10, 1, 2, 1_500.0, 60.0),
        edge(11, 2, 4, 1_500.0, 60.0),
        edge(12, 1, 3, 1_000.0, 90.0),
        edge(13, 3, 4, 1_000.0, 90.0),
    ];
    edges[0].restrictions.truck_allowed = false;

    let nodes = vec![
        node(1, -77.00, 38.90),
        node(2, -77.00, 38.91),
        node(3, -77.01, 38.90),
        node(4, -77.01, 38.91),
    ];
    let graph = Graph::new(nodes, edges);

    // Trucks detour over the slow branch; cars keep the fast one.
    let truck = graph
        .shortest_path(1, 4, &VehicleProfile::truck())
        .expect("detour exists");
    assert_eq!(truck.nodes, vec![1, 3, 4]);

    let car = graph
        .shortest_path(1, 4, &VehicleProfile::car())
        .expect("route exists");
    assert_eq!(car.nodes, vec![1, 2, 4]);
}

#[test_log::test]
fn dimension_limits_exclude_edges() {
    let mut graph_edges = vec![edge(10, 1, 2, 1_000.0, 60.0)];
    graph_edges[0].restrictions.max_height = 3.5;
    graph_edges[0].restrictions.max_weight = 10_000.0;

    let graph = Graph::new(vec![node(1, 0.0, 0.0), node(2, 0.1, 0.0)], graph_edges);

    let tall = VehicleProfile {
        kind: VehicleKind::Truck,
        height: 4.1,
        weight: 0.0,
    };
    assert!(matches!(
        graph.shortest_path(1, 2, &tall),
        Err(RoutingError::NoLegalRoute)
    ));

    let heavy = VehicleProfile {
        kind: VehicleKind::Truck,
        height: 0.0,
        weight: 36_000.0,
    };
    assert!(matches!(
        graph.shortest_path(1, 2, &heavy),
        Err(RoutingError::NoLegalRoute)
    ));

    // Unspecified dimensions are exempt from the check.
    let fits = graph
        .shortest_path(1, 2, &VehicleProfile::truck())
        .expect("route exists");
    assert_relative_eq!(fits.distance, 1_000.0);
}

#[test_log::test]
fn unknown_nodes_are_reported() {
    let graph = diamond();

    assert!(matches!(
        graph.shortest_path(99, 4, &VehicleProfile::truck()),
        Err(RoutingError::NodeNotFound(99))
    ));
    assert!(matches!(
        graph.shortest_path(1, 99, &VehicleProfile::truck()),
        Err(RoutingError::NodeNotFound(99))
    ));
}

#[test_log::test]
fn nearest_node_is_minimal() {
    let graph = diamond();
    let query = Point::new(-77.001, 38.902);

    let nearest = graph.nearest_node(query).expect("graph is non-empty");

    // No other stored node is strictly closer (euclidean in degree space,
    // matching the index metric).
    let brute = graph
        .nodes()
        .min_by(|a, b| {
            let da = (a.position.x() - query.x()).powi(2) + (a.position.y() - query.y()).powi(2);
            let db = (b.position.x() - query.x()).powi(2) + (b.position.y() - query.y()).powi(2);
            da.total_cmp(&db)
        })
        .unwrap();

    assert_eq!(nearest.id, brute.id);
}

#[test_log::test]
fn nodes_within_bounds_property() {
    let graph = diamond();
    let bounds = Bounds::new(38.905, -77.005, 38.915, -76.995);

    let inside: Vec<_> = graph.nodes_within(&bounds).collect();

    assert!(!inside.is_empty());
    for node in &inside {
        assert!(bounds.contains(node.position));
    }

    // Node 1 lies south of the box.
    assert!(inside.iter().all(|node| node.id != 1));
}

#[test_log::test]
fn merge_region_replaces_inside_and_keeps_outside() {
    let graph = diamond();

    // The update region covers the northern pair (2 and 4).
    let bounds = Bounds::new(38.905, -77.02, 38.915, -76.99);
    let fresh = Graph::new(
        vec![node(2, -77.0005, 38.9101), node(4, -77.01, 38.91)],
        vec![edge(20, 2, 4, 900.0, 45.0)],
    );

    let merged = graph.merge_region(bounds, &fresh);

    // Southern nodes carried over, northern nodes replaced.
    assert_eq!(merged.size(), 4);
    let moved = merged.node(2).expect("node 2 survives");
    assert_relative_eq!(moved.position.x(), -77.0005);

    // Edges originating inside the region come from the fresh load only.
    let out_of_2: Vec<_> = merged.outgoing_edges(2).collect();
    assert_eq!(out_of_2.len(), 1);
    assert_eq!(out_of_2[0].id, 20);

    // Edges originating outside the region survive.
    assert!(merged.outgoing_edges(1).count() == 2);
}

#[test_log::test]
fn with_restrictions_rewrites_named_edges() {
    let graph = diamond();

    let banned = Restrictions {
        max_height: 0.0,
        max_weight: 0.0,
        truck_allowed: false,
    };
    let next = graph.with_restrictions(&[10], banned);

    // The snapshot under rewrite is untouched.
    assert!(graph.edges().iter().all(|e| e.restrictions.truck_allowed));

    let rewritten = next.edges().iter().find(|e| e.id == 10).unwrap();
    assert!(!rewritten.restrictions.truck_allowed);
    assert!(next
        .edges()
        .iter()
        .filter(|e| e.id != 10)
        .all(|e| e.restrictions.truck_allowed));
}

#[test_log::test]
fn vehicle_profile_defaults_to_truck() {
    assert_eq!(VehicleProfile::parse("").kind, VehicleKind::Truck);
    assert_eq!(VehicleProfile::parse("truck").kind, VehicleKind::Truck);
    assert_eq!(VehicleProfile::parse("car").kind, VehicleKind::Car);
    assert_eq!(VehicleProfile::parse("hovercraft").kind, VehicleKind::Truck);
}
