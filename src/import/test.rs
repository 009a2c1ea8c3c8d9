use approx::assert_relative_eq;
use rustc_hash::FxHashMap;

use crate::graph::RoadClass;
use crate::import::importer::build_edge_records;
use crate::import::speed::{SpeedModel, TruckSpeeds};
use crate::import::tags::WayInfo;

fn classify(tags: &[(&str, &str)]) -> Option<WayInfo> {
    WayInfo::classify(tags.iter().copied())
}

#[test_log::test]
fn driveable_classes_are_retained() {
    let info = classify(&[("highway", "motorway")]).expect("driveable");
    assert_eq!(info.class, RoadClass::Motorway);
    assert!(!info.one_way);
    assert!(info.restrictions.truck_allowed);

    assert!(classify(&[("highway", "residential")]).is_some());
    assert!(classify(&[("highway", "tertiary_link")]).is_some());
}

#[test_log::test]
fn non_roads_are_rejected() {
    assert!(classify(&[("highway", "footway")]).is_none());
    assert!(classify(&[("highway", "cycleway")]).is_none());
    assert!(classify(&[("waterway", "river")]).is_none());
    assert!(classify(&[]).is_none());
}

#[test_log::test]
fn oneway_markers() {
    assert!(classify(&[("highway", "primary"), ("oneway", "yes")]).unwrap().one_way);
    assert!(classify(&[("highway", "primary"), ("oneway", "true")]).unwrap().one_way);
    assert!(classify(&[("highway", "primary"), ("oneway", "1")]).unwrap().one_way);
    assert!(!classify(&[("highway", "primary"), ("oneway", "no")]).unwrap().one_way);
}

#[test_log::test]
fn restrictions_from_tags() {
    let info = classify(&[
        ("highway", "secondary"),
        ("maxheight", "4.2"),
        ("maxweight", "7.5"),
        ("hgv", "no"),
    ])
    .expect("driveable");

    assert_relative_eq!(info.restrictions.max_height, 4.2);
    // Tonnes convert to kilograms.
    assert_relative_eq!(info.restrictions.max_weight, 7_500.0);
    assert!(!info.restrictions.truck_allowed);
}

#[test_log::test]
fn untagged_ways_are_unrestricted() {
    let info = classify(&[("highway", "trunk")]).expect("driveable");

    assert_relative_eq!(info.restrictions.max_height, 0.0);
    assert_relative_eq!(info.restrictions.max_weight, 0.0);
    assert!(info.restrictions.truck_allowed);
}

#[test_log::test]
fn speed_model_prefers_posted_limit() {
    let model = TruckSpeeds;

    assert_relative_eq!(model.speed_kmh(RoadClass::Motorway, Some(100.0)), 100.0);
    assert_relative_eq!(model.speed_kmh(RoadClass::Motorway, None), 80.0);
    assert_relative_eq!(model.speed_kmh(RoadClass::Residential, None), 25.0);
}

#[test_log::test]
fn travel_time_is_monotonic_in_distance() {
    let model = TruckSpeeds;

    let short = model.travel_time(1_000.0, RoadClass::Primary, None);
    let long = model.travel_time(2_000.0, RoadClass::Primary, None);

    assert!(long > short);
    // 1km at 60km/h is a minute.
    assert_relative_eq!(short, 60.0, max_relative = 1e-9);
}

fn coords(entries: &[(i64, f64, f64)]) -> FxHashMap<i64, (f64, f64)> {
    entries.iter().map(|(id, lon, lat)| (*id, (*lon, *lat))).collect()
}

#[test_log::test]
fn two_way_ways_yield_twinned_edges() {
    let info = classify(&[("highway", "primary")]).unwrap();
    let coordinates = coords(&[(1, -77.00, 38.90), (2, -77.01, 38.90), (3, -77.02, 38.90)]);

    let mut out = Vec::new();
    build_edge_records(7, &info, &[1, 2, 3], &coordinates, &TruckSpeeds, &mut out);

    // Two segments, each with its reverse twin.
    assert_eq!(out.len(), 4);

    let forward = &out[0];
    let reverse = &out[1];
    assert_eq!((forward.from_osm_id, forward.to_osm_id), (1, 2));
    assert_eq!((reverse.from_osm_id, reverse.to_osm_id), (2, 1));
    assert_relative_eq!(forward.distance, reverse.distance);
    assert_relative_eq!(forward.travel_time, reverse.travel_time);
    assert_eq!(forward.road_type, "primary");
    assert!(out.iter().all(|e| e.osm_way_id == 7));
}

#[test_log::test]
fn one_way_ways_yield_forward_only() {
    let info = classify(&[("highway", "primary"), ("oneway", "yes")]).unwrap();
    let coordinates = coords(&[(1, -77.00, 38.90), (2, -77.01, 38.90)]);

    let mut out = Vec::new();
    build_edge_records(7, &info, &[1, 2], &coordinates, &TruckSpeeds, &mut out);

    assert_eq!(out.len(), 1);
    assert_eq!((out[0].from_osm_id, out[0].to_osm_id), (1, 2));
}

#[test_log::test]
fn segments_with_uncached_endpoints_are_dropped() {
    let info = classify(&[("highway", "primary")]).unwrap();
    // Node 3 never had its coordinates cached.
    let coordinates = coords(&[(1, -77.00, 38.90), (2, -77.01, 38.90)]);

    let mut out = Vec::new();
    build_edge_records(7, &info, &[1, 2, 3], &coordinates, &TruckSpeeds, &mut out);

    // Only the 1->2 pair materializes.
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|e| e.from_osm_id != 3 && e.to_osm_id != 3));
}
