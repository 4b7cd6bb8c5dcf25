use super::{RegionError, RegionModel, ZoneGraphConfig, ZoneId};
use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use serde::Deserialize;
use std::cmp::Reverse;
use uom::si::f64::{Length, Time};
use uom::si::length::kilometer;
use uom::si::time::second;

/// one observed trip between an ordered pair of zones, used to build the
/// mean-path table of a [`ZoneGraph`].
#[derive(Clone, Copy, Debug)]
pub struct OdSample {
    pub origin: ZoneId,
    pub destination: ZoneId,
    pub distance_km: f64,
    pub time_s: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PairCost {
    distance_km: f64,
    time_s: f64,
}

const UNREACHABLE: PairCost = PairCost {
    distance_km: f64::INFINITY,
    time_s: f64::INFINITY,
};

/// city map over integer zone ids with a frozen mean `(distance, time)`
/// entry for every ordered pair of retained zones.
///
/// Construction computes the mean of the observed samples for each sampled
/// pair; pairs with no samples are filled once by running Dijkstra from
/// every source over the sampled edges (distance as weight) and summing the
/// per-edge distance and time along the reconstructed path. Pairs that
/// remain unreachable are marked infinite, and zones with no finite route
/// to any other zone are dropped along with their incoming entries.
pub struct ZoneGraph {
    pairs: IndexMap<ZoneId, IndexMap<ZoneId, PairCost>>,
}

impl ZoneGraph {
    /// builds the frozen pair table from observed trip samples.
    ///
    /// # Arguments
    ///
    /// * `samples` - observed `(origin, destination, distance, time)` trips;
    ///   multiple samples of the same ordered pair are averaged
    pub fn from_samples(samples: &[OdSample]) -> Result<ZoneGraph, RegionError> {
        if samples.is_empty() {
            return Err(RegionError::DatasetError(String::from(
                "region dataset contains no trip samples",
            )));
        }
        for s in samples.iter() {
            if s.distance_km < 0.0
                || s.time_s < 0.0
                || !s.distance_km.is_finite()
                || !s.time_s.is_finite()
            {
                return Err(RegionError::DatasetError(format!(
                    "negative or non-finite sample for pair ({}, {})",
                    s.origin, s.destination
                )));
            }
        }

        let zones: Vec<ZoneId> = samples
            .iter()
            .flat_map(|s| [s.origin, s.destination])
            .unique()
            .sorted()
            .collect_vec();

        // mean of the observed samples per ordered pair. self pairs are
        // pinned to zero regardless of what the data says.
        let mut sums: IndexMap<(ZoneId, ZoneId), (f64, f64, usize)> = IndexMap::new();
        for s in samples.iter() {
            let entry = sums.entry((s.origin, s.destination)).or_insert((0.0, 0.0, 0));
            entry.0 += s.distance_km;
            entry.1 += s.time_s;
            entry.2 += 1;
        }
        let mut sampled: IndexMap<ZoneId, IndexMap<ZoneId, PairCost>> = IndexMap::new();
        for ((o, d), (dist_sum, time_sum, n)) in sums.into_iter() {
            if o == d {
                continue;
            }
            sampled.entry(o).or_default().insert(
                d,
                PairCost {
                    distance_km: dist_sum / n as f64,
                    time_s: time_sum / n as f64,
                },
            );
        }

        // fill unsampled pairs by shortest path over the sampled edges
        let mut pairs: IndexMap<ZoneId, IndexMap<ZoneId, PairCost>> = IndexMap::new();
        for origin in zones.iter() {
            let out = sampled.get(origin);
            let has_missing = zones
                .iter()
                .any(|z| z != origin && !out.map(|o| o.contains_key(z)).unwrap_or(false));
            let routed = if has_missing {
                Some(shortest_paths(&sampled, *origin))
            } else {
                None
            };

            let mut row: IndexMap<ZoneId, PairCost> = IndexMap::new();
            for destination in zones.iter() {
                let cost = if destination == origin {
                    PairCost {
                        distance_km: 0.0,
                        time_s: 0.0,
                    }
                } else if let Some(direct) = out.and_then(|o| o.get(destination)) {
                    *direct
                } else {
                    match routed.as_ref() {
                        Some(prev) => reconstruct(&sampled, prev, *origin, *destination),
                        None => UNREACHABLE,
                    }
                };
                row.insert(*destination, cost);
            }
            pairs.insert(*origin, row);
        }

        // drop zones that cannot reach any other zone, then remove the
        // entries pointing at them
        let dropped = pairs
            .iter()
            .filter(|(origin, row)| {
                row.iter()
                    .all(|(d, c)| *d == **origin || !c.distance_km.is_finite())
            })
            .map(|(origin, _)| *origin)
            .collect_vec();
        for zone in dropped.iter() {
            log::warn!("dropping zone {} with no finite route to any other zone", zone);
            pairs.shift_remove(zone);
        }
        for (_, row) in pairs.iter_mut() {
            row.retain(|destination, _| !dropped.contains(destination));
        }

        if pairs.is_empty() {
            return Err(RegionError::DatasetError(String::from(
                "all zones were dropped as unreachable",
            )));
        }

        Ok(ZoneGraph { pairs })
    }

    pub fn n_zones(&self) -> usize {
        self.pairs.len()
    }
}

impl RegionModel for ZoneGraph {
    fn distance(
        &self,
        origin: &ZoneId,
        destination: &ZoneId,
    ) -> Result<(Length, Time), RegionError> {
        let row = self
            .pairs
            .get(origin)
            .ok_or(RegionError::ZoneNotFound(*origin))?;
        let cost = row
            .get(destination)
            .ok_or(RegionError::ZoneNotFound(*destination))?;
        Ok((
            Length::new::<kilometer>(cost.distance_km),
            Time::new::<second>(cost.time_s),
        ))
    }

    fn zones(&self) -> Vec<ZoneId> {
        self.pairs.keys().copied().collect_vec()
    }

    fn contains(&self, zone: &ZoneId) -> bool {
        self.pairs.contains_key(zone)
    }
}

/// row shape of a zone pair CSV file. repeated `(origin, destination)`
/// rows are treated as independent samples of the same pair.
#[derive(Debug, Deserialize)]
struct ZonePairRow {
    origin: u64,
    destination: u64,
    distance_km: f64,
    time_s: f64,
}

impl TryFrom<&ZoneGraphConfig> for ZoneGraph {
    type Error = RegionError;

    fn try_from(config: &ZoneGraphConfig) -> Result<Self, Self::Error> {
        let mut reader = csv::Reader::from_path(&config.input_file)?;
        let mut samples: Vec<OdSample> = vec![];
        for row in reader.deserialize() {
            let row: ZonePairRow = row?;
            samples.push(OdSample {
                origin: ZoneId(row.origin),
                destination: ZoneId(row.destination),
                distance_km: row.distance_km,
                time_s: row.time_s,
            });
        }
        let graph = ZoneGraph::from_samples(&samples)?;
        log::info!(
            "loaded region with {} zones from {:?}",
            graph.n_zones(),
            config.input_file
        );
        Ok(graph)
    }
}

/// Dijkstra from `source` over the sampled edges, distance as weight.
/// returns the predecessor tree for path reconstruction. priorities carry
/// the zone id as a tie-breaker so equal-distance frontiers pop in a
/// stable order.
fn shortest_paths(
    sampled: &IndexMap<ZoneId, IndexMap<ZoneId, PairCost>>,
    source: ZoneId,
) -> IndexMap<ZoneId, ZoneId> {
    let mut dist: IndexMap<ZoneId, f64> = IndexMap::new();
    let mut prev: IndexMap<ZoneId, ZoneId> = IndexMap::new();
    let mut frontier: PriorityQueue<ZoneId, Reverse<(OrderedFloat<f64>, u64)>> =
        PriorityQueue::new();

    dist.insert(source, 0.0);
    frontier.push(source, Reverse((OrderedFloat(0.0), source.0)));

    while let Some((u, Reverse((OrderedFloat(du), _)))) = frontier.pop() {
        if du > *dist.get(&u).unwrap_or(&f64::INFINITY) {
            continue;
        }
        if let Some(out) = sampled.get(&u) {
            for (v, cost) in out.iter() {
                let alt = du + cost.distance_km;
                if alt < *dist.get(v).unwrap_or(&f64::INFINITY) {
                    dist.insert(*v, alt);
                    prev.insert(*v, u);
                    frontier.push_increase(*v, Reverse((OrderedFloat(alt), v.0)));
                }
            }
        }
    }
    prev
}

/// walks the predecessor tree from `destination` back to `origin`, summing
/// the per-edge distance and time of the reconstructed path.
fn reconstruct(
    sampled: &IndexMap<ZoneId, IndexMap<ZoneId, PairCost>>,
    prev: &IndexMap<ZoneId, ZoneId>,
    origin: ZoneId,
    destination: ZoneId,
) -> PairCost {
    let mut distance_km = 0.0;
    let mut time_s = 0.0;
    let mut current = destination;
    while current != origin {
        let parent = match prev.get(&current) {
            Some(p) => *p,
            None => return UNREACHABLE,
        };
        match sampled.get(&parent).and_then(|row| row.get(&current)) {
            Some(edge) => {
                distance_km += edge.distance_km;
                time_s += edge.time_s;
            }
            None => return UNREACHABLE,
        }
        current = parent;
    }
    PairCost { distance_km, time_s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample(origin: u64, destination: u64, distance_km: f64, time_s: f64) -> OdSample {
        OdSample {
            origin: ZoneId(origin),
            destination: ZoneId(destination),
            distance_km,
            time_s,
        }
    }

    fn km_s(pair: (Length, Time)) -> (f64, f64) {
        (pair.0.get::<kilometer>(), pair.1.get::<second>())
    }

    #[test]
    fn test_mean_of_repeated_samples() {
        let graph = ZoneGraph::from_samples(&[
            sample(1, 2, 2.0, 300.0),
            sample(1, 2, 4.0, 500.0),
            sample(2, 1, 2.5, 350.0),
        ])
        .unwrap();
        assert_eq!(km_s(graph.distance(&ZoneId(1), &ZoneId(2)).unwrap()), (3.0, 400.0));
        assert_eq!(km_s(graph.distance(&ZoneId(2), &ZoneId(1)).unwrap()), (2.5, 350.0));
    }

    #[test]
    fn test_self_pair_is_zero() {
        let graph =
            ZoneGraph::from_samples(&[sample(1, 2, 2.0, 300.0), sample(2, 1, 2.0, 300.0)]).unwrap();
        assert_eq!(km_s(graph.distance(&ZoneId(1), &ZoneId(1)).unwrap()), (0.0, 0.0));
    }

    #[test]
    fn test_unsampled_pair_filled_by_shortest_path() {
        // 1 -> 2 -> 3 sampled; 1 -> 3 must be the sum along the path
        let graph = ZoneGraph::from_samples(&[
            sample(1, 2, 3.0, 400.0),
            sample(2, 3, 5.0, 600.0),
            sample(3, 1, 1.0, 100.0),
        ])
        .unwrap();
        assert_eq!(km_s(graph.distance(&ZoneId(1), &ZoneId(3)).unwrap()), (8.0, 1000.0));
        assert_eq!(km_s(graph.distance(&ZoneId(3), &ZoneId(2)).unwrap()), (4.0, 500.0));
    }

    #[test]
    fn test_zone_without_outgoing_routes_is_dropped() {
        let graph = ZoneGraph::from_samples(&[
            sample(1, 2, 3.0, 400.0),
            sample(2, 1, 2.0, 250.0),
            sample(2, 9, 7.0, 800.0),
        ])
        .unwrap();
        assert_eq!(graph.n_zones(), 2);
        assert!(!graph.contains(&ZoneId(9)));
        assert!(matches!(
            graph.distance(&ZoneId(2), &ZoneId(9)),
            Err(RegionError::ZoneNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        let graph =
            ZoneGraph::from_samples(&[sample(1, 2, 2.0, 300.0), sample(2, 1, 2.0, 300.0)]).unwrap();
        assert!(matches!(
            graph.distance(&ZoneId(42), &ZoneId(1)),
            Err(RegionError::ZoneNotFound(ZoneId(42)))
        ));
    }

    #[test]
    fn test_load_from_csv() {
        let filepath = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("model")
            .join("region")
            .join("test")
            .join("zone_pairs.csv");
        let config = ZoneGraphConfig {
            input_file: filepath,
        };
        let graph = ZoneGraph::try_from(&config).unwrap();
        assert_eq!(graph.zones(), vec![ZoneId(1), ZoneId(2), ZoneId(3)]);
        assert_eq!(km_s(graph.distance(&ZoneId(1), &ZoneId(2)).unwrap()), (3.0, 400.0));
        assert_eq!(km_s(graph.distance(&ZoneId(1), &ZoneId(3)).unwrap()), (8.0, 1000.0));
    }
}
