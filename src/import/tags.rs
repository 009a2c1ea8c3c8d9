use std::str::FromStr;

use crate::graph::{Restrictions, RoadClass};

/// The routing-relevant attributes of a driveable way, distilled from
/// its tag set.
#[derive(Debug, Clone, PartialEq)]
pub struct WayInfo {
    pub class: RoadClass,
    pub one_way: bool,
    pub restrictions: Restrictions,
    /// Posted limit in km/h, when tagged.
    pub posted_speed_kmh: Option<f64>,
}

impl WayInfo {
    /// Classifies a way from its tags. `None` when the way is not a
    /// driveable road (footpaths, waterways, service alleys and every
    /// other class outside [`RoadClass`]).
    pub fn classify<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Option<WayInfo> {
        let mut highway = None;
        let mut one_way = false;
        let mut restrictions = Restrictions::unrestricted();
        let mut posted = None;

        for (key, value) in tags {
            match key {
                "highway" => highway = RoadClass::from_str(value).ok(),
                "oneway" => one_way = matches!(value, "yes" | "true" | "1"),
                "maxheight" => {
                    if let Some(height) = leading_number(value) {
                        restrictions.max_height = height;
                    }
                }
                "maxweight" => {
                    // Tagged in tonnes; stored in kilograms.
                    if let Some(weight) = leading_number(value) {
                        restrictions.max_weight = weight * 1_000.0;
                    }
                }
                "hgv" => {
                    if value == "no" {
                        restrictions.truck_allowed = false;
                    }
                }
                "maxspeed" => posted = parse_speed(value),
                _ => {}
            }
        }

        highway.map(|class| WayInfo {
            class,
            one_way,
            restrictions,
            posted_speed_kmh: posted,
        })
    }

    pub fn from_way(way: &osmpbf::Way) -> Option<WayInfo> {
        WayInfo::classify(way.tags())
    }
}

/// A posted speed limit normalized to km/h. Bare numbers are km/h by
/// map convention; an `mph` suffix converts.
fn parse_speed(value: &str) -> Option<f64> {
    let speed = leading_number(value).filter(|v| *v > 0.0)?;

    if value.trim_end().ends_with("mph") {
        Some(speed * 1.609344)
    } else {
        Some(speed)
    }
}

/// The leading numeric component of a tag value, tolerating unit
/// suffixes such as `"4.2 m"` or `"55 mph"`.
fn leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(trimmed.len());

    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn leading_number_tolerates_units() {
        assert_eq!(leading_number("4.2"), Some(4.2));
        assert_eq!(leading_number("4.2 m"), Some(4.2));
        assert_eq!(leading_number("  7.5"), Some(7.5));
        assert_eq!(leading_number("none"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn speed_normalizes_mph() {
        assert_eq!(parse_speed("50"), Some(50.0));
        assert_eq!(parse_speed("55 mph"), Some(55.0 * 1.609344));
        assert_eq!(parse_speed("walk"), None);
        assert_eq!(parse_speed("0"), None);
    }
}
