//! Collects per-unit outputs as they complete and emits them in ascending order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bitmap::PartBitmap;

/// Internal invariant violation while aggregating results. Unreachable when
/// the coordinator keeps its state machine invariants.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ConsistencyError(pub String);

/// Identifier the store returned for one uploaded part.
///
/// Serializes in the shape S3's CompleteMultipartUpload expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartResult {
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
    /// ETag as returned by the store, quotes included.
    #[serde(rename = "ETag")]
    pub etag: String,
}

/// Body for the finalize call: every part, ascending by part number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedMultipartUpload {
    #[serde(rename = "Parts")]
    pub parts: Vec<PartResult>,
}

/// Holds at most one output per unit 1..=N.
#[derive(Debug)]
pub struct Aggregator<T> {
    slots: Vec<Option<T>>,
    done: PartBitmap,
}

impl<T> Aggregator<T> {
    pub fn new(unit_count: u32) -> Self {
        Self {
            slots: (0..unit_count).map(|_| None).collect(),
            done: PartBitmap::new(unit_count),
        }
    }

    /// Record the output for `unit`. A second output for the same unit, or a
    /// unit outside 1..=N, is a consistency error.
    pub fn record(&mut self, unit: u32, output: T) -> Result<(), ConsistencyError> {
        if unit == 0 || unit > self.done.len() {
            return Err(ConsistencyError(format!(
                "result for unit {} outside 1..={}",
                unit,
                self.done.len()
            )));
        }
        if !self.done.set_completed(unit) {
            return Err(ConsistencyError(format!("duplicate result for unit {}", unit)));
        }
        self.slots[(unit - 1) as usize] = Some(output);
        Ok(())
    }

    pub fn completed(&self) -> u32 {
        self.done.count_completed()
    }

    pub fn is_complete(&self) -> bool {
        self.done.all_completed()
    }

    /// Emit every output in ascending unit order. Fails if any unit is missing.
    pub fn finish(self) -> Result<Vec<T>, ConsistencyError> {
        if !self.done.all_completed() {
            return Err(ConsistencyError(format!(
                "missing results for unit(s) {:?}",
                self.done.missing()
            )));
        }
        let expected = self.slots.len();
        let out: Vec<T> = self.slots.into_iter().flatten().collect();
        if out.len() != expected {
            return Err(ConsistencyError(format!(
                "collected {} result(s), expected {}",
                out.len(),
                expected
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_results_emit_ascending() {
        let mut agg = Aggregator::new(4);
        agg.record(3, "c").unwrap();
        agg.record(1, "a").unwrap();
        agg.record(4, "d").unwrap();
        assert!(!agg.is_complete());
        agg.record(2, "b").unwrap();
        assert_eq!(agg.finish().unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn duplicate_result_is_consistency_error() {
        let mut agg = Aggregator::new(2);
        agg.record(1, 10).unwrap();
        assert!(agg.record(1, 11).is_err());
        assert!(agg.record(3, 12).is_err());
        assert_eq!(agg.completed(), 1);
    }

    #[test]
    fn finish_with_missing_unit_fails() {
        let mut agg = Aggregator::new(3);
        agg.record(1, ()).unwrap();
        agg.record(3, ()).unwrap();
        let err = agg.finish().unwrap_err();
        assert!(err.0.contains("[2]"), "{}", err);
    }

    #[test]
    fn finalize_body_uses_s3_field_names() {
        let body = CompletedMultipartUpload {
            parts: vec![PartResult {
                part_number: 1,
                etag: "\"abc\"".to_string(),
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"Parts":[{"PartNumber":1,"ETag":"\"abc\""}]}"#);
    }
}
