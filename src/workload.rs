//! Workload files: one aircraft per line.
//!
//! Each record holds three integers: class code, seconds since the previous
//! arrival, and seconds spent on the runway.
//!
//! ```text
//! # class gap runway_time
//! 0 0 3
//! 1 1 2
//! 2 4 1
//! ```
//!
//! Comment lines (`#`) and blank lines are skipped. Each of the three fields
//! is read as an optionally signed run of digits; whatever follows the third
//! number is ignored, so `0 1 2s` is a valid record while `0 1s 2` is not.
//! Lines that do not yield three integers are skipped. Fuel reserves are drawn per aircraft from the configured
//! range when the workload is built.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use qtty::{Quantity, Second};
use rand::Rng;
use tracing::debug;

use crate::config::RunwayConfig;
use crate::error::WorkloadError;
use crate::types::AircraftClass;

/// One parsed workload line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightRecord {
    pub class: AircraftClass,
    pub arrival_gap: Quantity<Second>,
    pub runway_time: Quantity<Second>,
}

impl FlightRecord {
    /// Parses one line, returning `None` for comments, blanks and
    /// malformed records.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (class, rest) = scan_int(line)?;
        let (gap, rest) = scan_int(rest)?;
        let (runway_time, _) = scan_int(rest)?;
        if gap < 0 || runway_time < 0 {
            return None;
        }

        Some(Self {
            class: AircraftClass::from_code(class),
            arrival_gap: Quantity::new(gap as f64),
            runway_time: Quantity::new(runway_time as f64),
        })
    }
}

/// Reads one leading integer after optional whitespace, returning it and the
/// unread tail.
fn scan_int(input: &str) -> Option<(i64, &str)> {
    let s = input.trim_start();
    let sign = usize::from(s.starts_with(|c| c == '+' || c == '-'));
    let digits = s[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, tail) = s.split_at(sign + digits);
    Some((number.parse().ok()?, tail))
}

/// A workload record with its identifier and fuel reserve assigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPlan {
    pub id: usize,
    pub class: AircraftClass,
    pub arrival_gap: Quantity<Second>,
    pub runway_time: Quantity<Second>,
    pub fuel_reserve: Quantity<Second>,
}

/// Reads records from `reader`, stopping after `max` of them.
pub fn read_records<R: BufRead>(reader: R, max: usize) -> Result<Vec<FlightRecord>, WorkloadError> {
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        if records.len() >= max {
            break;
        }
        let line = line?;
        match FlightRecord::parse_line(&line) {
            Some(record) => records.push(record),
            None if !line.trim().is_empty() && !line.trim_start().starts_with('#') => {
                debug!(target: "runway.workload", line = lineno + 1, "skipping malformed record");
            }
            None => {}
        }
    }
    Ok(records)
}

/// The aircraft of one simulation run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workload {
    flights: Vec<FlightPlan>,
}

impl Workload {
    /// Numbers the records and draws a fuel reserve for each.
    pub fn from_records<R: Rng>(
        records: Vec<FlightRecord>,
        config: &RunwayConfig,
        rng: &mut R,
    ) -> Result<Self, WorkloadError> {
        if records.is_empty() {
            return Err(WorkloadError::Empty);
        }
        if records.len() > config.max_aircraft {
            return Err(WorkloadError::TooMany {
                count: records.len(),
                max: config.max_aircraft,
            });
        }

        let (lo, hi) = config.fuel_reserve_range;
        let flights = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| FlightPlan {
                id,
                class: record.class,
                arrival_gap: record.arrival_gap,
                runway_time: record.runway_time,
                fuel_reserve: Quantity::new(rng.gen_range(lo..=hi) as f64),
            })
            .collect();

        Ok(Self { flights })
    }

    /// Opens and parses a workload file.
    pub fn load<P: AsRef<Path>, R: Rng>(
        path: P,
        config: &RunwayConfig,
        rng: &mut R,
    ) -> Result<Self, WorkloadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| WorkloadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let records = read_records(BufReader::new(file), config.max_aircraft)?;
        Self::from_records(records, config, rng)
    }

    pub fn flights(&self) -> &[FlightPlan] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn records(text: &str) -> Vec<FlightRecord> {
        read_records(Cursor::new(text), 1000).unwrap()
    }

    #[test]
    fn parses_three_integer_records() {
        let r = FlightRecord::parse_line("1 2 3").unwrap();
        assert_eq!(r.class, AircraftClass::Cargo);
        assert_eq!(r.arrival_gap.value(), 2.0);
        assert_eq!(r.runway_time.value(), 3.0);
    }

    #[test]
    fn skips_comments_blanks_and_garbage() {
        let text = "# header\n\n0 0 1\n   \nnot a record\n1 2\n2 1 1 trailing\r\n";
        let rs = records(text);
        assert_eq!(rs.len(), 2);
        assert_eq!(rs[0].class, AircraftClass::Commercial);
        assert_eq!(rs[1].class, AircraftClass::Emergency);
    }

    #[test]
    fn trailing_text_after_third_number_is_ignored() {
        let r = FlightRecord::parse_line("0 1 2abc").unwrap();
        assert_eq!(r.class, AircraftClass::Commercial);
        assert_eq!(r.runway_time.value(), 2.0);

        let r = FlightRecord::parse_line("1 +4 3.5").unwrap();
        assert_eq!(r.arrival_gap.value(), 4.0);
        assert_eq!(r.runway_time.value(), 3.0);
    }

    #[test]
    fn suffix_inside_a_leading_field_rejects_the_line() {
        assert!(FlightRecord::parse_line("2abc 3 4").is_none());
        assert!(FlightRecord::parse_line("0 1s 2").is_none());
        assert!(FlightRecord::parse_line("- 1 2").is_none());
    }

    #[test]
    fn negative_durations_are_malformed() {
        assert!(FlightRecord::parse_line("0 -1 2").is_none());
        assert!(FlightRecord::parse_line("0 1 -2").is_none());
    }

    #[test]
    fn unknown_class_codes_become_emergencies() {
        let r = FlightRecord::parse_line("9 0 1").unwrap();
        assert_eq!(r.class, AircraftClass::Emergency);
    }

    #[test]
    fn reading_stops_at_max() {
        let text = "0 0 1\n0 0 1\n0 0 1\n";
        let rs = read_records(Cursor::new(text), 2).unwrap();
        assert_eq!(rs.len(), 2);
    }

    #[test]
    fn empty_workload_is_an_error() {
        let cfg = RunwayConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let err = Workload::from_records(records("# nothing\n"), &cfg, &mut rng).unwrap_err();
        assert!(matches!(err, WorkloadError::Empty));
    }

    #[test]
    fn too_many_aircraft_is_an_error() {
        let cfg = RunwayConfig {
            max_aircraft: 1,
            ..RunwayConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = Workload::from_records(records("0 0 1\n1 0 1\n"), &cfg, &mut rng).unwrap_err();
        assert!(matches!(err, WorkloadError::TooMany { count: 2, max: 1 }));
    }

    #[test]
    fn fuel_reserves_fall_in_range_and_ids_are_sequential() {
        let cfg = RunwayConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let text = "0 0 1\n".repeat(50);
        let workload = Workload::from_records(records(&text), &cfg, &mut rng).unwrap();

        assert_eq!(workload.len(), 50);
        for (i, flight) in workload.flights().iter().enumerate() {
            assert_eq!(flight.id, i);
            let fuel = flight.fuel_reserve.value();
            assert!((20.0..=60.0).contains(&fuel), "fuel {fuel} out of range");
        }
    }

    #[test]
    fn same_seed_same_fuel() {
        let cfg = RunwayConfig::default();
        let text = "0 0 1\n1 0 1\n2 0 1\n";
        let a = Workload::from_records(records(text), &cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Workload::from_records(records(text), &cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_file_reports_open_error() {
        let cfg = RunwayConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let err = Workload::load("/nonexistent/runway/workload.txt", &cfg, &mut rng).unwrap_err();
        assert!(matches!(err, WorkloadError::Open { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
