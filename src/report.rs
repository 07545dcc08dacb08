//! Summary statistics over completion times, and CSV export.

use std::io;

use average::Variance;
use serde::Serialize;

use crate::experiment::ExperimentResult;

/// Mean and spread of one workload size's completion times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub workload_size: usize,
    pub processes: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl Summary {
    /// Summarize raw completion times. An empty slice gives NaN for both
    /// statistics.
    pub fn from_times(workload_size: usize, times: &[f64]) -> Self {
        let (mean, std_dev) = if times.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            let v: Variance = times.iter().copied().collect();
            (v.mean(), v.population_variance().sqrt())
        };
        Summary {
            workload_size,
            processes: times.len(),
            mean,
            std_dev,
        }
    }
}

pub fn summarize(result: &ExperimentResult) -> Summary {
    Summary::from_times(result.workload_size, &result.completion_times)
}

/// Write one row per summary, with a header.
pub fn write_csv<W: io::Write>(writer: W, summaries: &[Summary]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::VirtualTime;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_population_statistics() {
        let s = Summary::from_times(4, &[2.0, 4.0, 4.0, 6.0]);
        assert_eq!(s.processes, 4);
        assert!(close(s.mean, 4.0));
        // population variance is 2, not the sample variance 8/3
        assert!(close(s.std_dev, 2.0_f64.sqrt()));
    }

    #[test]
    fn test_single_sample_has_zero_spread() {
        let s = Summary::from_times(1, &[7.0]);
        assert!(close(s.mean, 7.0));
        assert!(close(s.std_dev, 0.0));
    }

    #[test]
    fn test_empty_is_nan() {
        let s = Summary::from_times(0, &[]);
        assert!(s.mean.is_nan() && s.std_dev.is_nan());
    }

    #[test]
    fn test_summarize_result() {
        let result = ExperimentResult {
            workload_size: 3,
            completion_times: vec![1.0, 2.0, 3.0],
            end_time: VirtualTime::ZERO,
            events_processed: 0,
        };
        let s = summarize(&result);
        assert_eq!(s.workload_size, 3);
        assert!(close(s.mean, 2.0));
    }

    #[test]
    fn test_csv_layout() {
        let rows = vec![
            Summary::from_times(2, &[1.0, 3.0]),
            Summary::from_times(1, &[5.0]),
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "workload_size,processes,mean,std_dev",
                "2,2,2.0,1.0",
                "1,1,5.0,0.0",
            ]
        );
    }
}
