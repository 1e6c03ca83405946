use metrics::{counter, gauge};

use crate::reducer::EstimateReport;

pub fn record_report(report: &EstimateReport) {
    gauge!("reducer.estimate", report.estimate);
    gauge!("reducer.elapsed_seconds", report.elapsed.as_secs_f64());
    gauge!("reducer.workers", report.workers as f64);
    gauge!("reducer.subdivisions", report.subdivisions as f64);
    counter!("reducer.empty_ranges", report.empty_ranges() as u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{integrand::Square, params::IntegrationParams, partition::WorkerCount, Reducer};

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        let params = IntegrationParams::new(0.0, 1.0, 2).unwrap();
        let report = Reducer::default()
            .run(&params, WorkerCount::new(4).unwrap(), &Square)
            .unwrap();
        assert_eq!(report.empty_ranges(), 3);
        record_report(&report);
    }
}
