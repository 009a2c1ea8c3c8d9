use approx::assert_relative_eq;
use geo::Point;

use crate::geo::{haversine_distance, meters_to_miles, Bounds};

#[test_log::test]
fn haversine_known_pairs() {
    // LAX -> SFO, great-circle distance ~543 km.
    let lax = Point::new(-118.4085, 33.9416);
    let sfo = Point::new(-122.3790, 37.6213);

    let distance = haversine_distance(lax, sfo);
    assert_relative_eq!(distance, 543_000.0, max_relative = 0.01);

    // Zero distance for identical points.
    assert_relative_eq!(haversine_distance(lax, lax), 0.0);
}

#[test_log::test]
fn haversine_is_symmetric() {
    let a = Point::new(-77.0234, 38.9126);
    let b = Point::new(-77.0345, 38.9177);

    assert_relative_eq!(haversine_distance(a, b), haversine_distance(b, a));
}

#[test_log::test]
fn bounds_normalize_corners() {
    let bounds = Bounds::new(42.0, -114.0, 32.0, -125.0);

    assert_eq!(bounds.min_lat, 32.0);
    assert_eq!(bounds.max_lat, 42.0);
    assert_eq!(bounds.min_lon, -125.0);
    assert_eq!(bounds.max_lon, -114.0);

    assert!(bounds.contains(Point::new(-120.0, 36.0)));
    assert!(!bounds.contains(Point::new(-100.0, 36.0)));
}

#[test_log::test]
fn bounds_parse_region_flag() {
    let bounds: Bounds = "32.0,-125.0,42.0,-114.0".parse().expect("valid region");
    assert_eq!(bounds, Bounds::new(32.0, -125.0, 42.0, -114.0));

    assert!("32.0,-125.0,42.0".parse::<Bounds>().is_err());
    assert!("a,b,c,d".parse::<Bounds>().is_err());
    assert!("95.0,-125.0,42.0,-114.0".parse::<Bounds>().is_err());
}

#[test_log::test]
fn miles_conversion() {
    assert_relative_eq!(meters_to_miles(1_609.344), 1.0);
}
