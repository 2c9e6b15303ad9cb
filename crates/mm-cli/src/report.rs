use std::time::Duration;

use serde::Serialize;

/// Timing summary the wrapper emits on success, as text or JSON.
#[derive(Debug, Serialize)]
pub struct TimingReport {
    pub rows: usize,
    pub inner: usize,
    pub cols: usize,
    pub tile_width: usize,
    pub elapsed_ms: f64,
    pub backend: String,
}

impl TimingReport {
    pub fn new(
        rows: usize,
        inner: usize,
        cols: usize,
        tile_width: usize,
        elapsed: Duration,
        backend: &str,
    ) -> Self {
        TimingReport {
            rows,
            inner,
            cols,
            tile_width,
            elapsed_ms: elapsed.as_secs_f64() * 1e3,
            backend: backend.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_carries_all_fields() {
        let report = TimingReport::new(
            32,
            48,
            16,
            16,
            Duration::from_millis(12),
            "tiled",
        );
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["rows"], 32);
        assert_eq!(value["inner"], 48);
        assert_eq!(value["cols"], 16);
        assert_eq!(value["tile_width"], 16);
        assert_eq!(value["backend"], "tiled");
        assert!((value["elapsed_ms"].as_f64().unwrap() - 12.0).abs() < 1e-9);
    }
}
