//! Fixed-capacity peak recorder and its text dump.
//!
//! Dump layout, one token per line:
//!
//! ```text
//! START_DATA_CAPTURE
//! 600
//! 545
//! END_DATA_CAPTURE
//! ```

use std::fmt;
use std::io::Write;
use std::path::Path;

use sorter_config::{DUMP_BEGIN, DUMP_END};

/// Upper bound on the up-front allocation; larger buffers grow as peaks arrive.
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug, Clone)]
pub struct CalibrationRecorder {
    capacity: usize,
    values: Vec<i32>,
}

impl CalibrationRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: Vec::with_capacity(capacity.min(PREALLOC_LIMIT)),
        }
    }

    /// Append a peak. Returns `false` (and stores nothing) once full.
    pub fn record(&mut self, peak: i32) -> bool {
        if self.is_full() {
            return false;
        }
        self.values.push(peak);
        true
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded values in capture order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn write_dump<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        write!(w, "{self}")?;
        w.flush()
    }

    pub fn dump_string(&self) -> String {
        self.to_string()
    }

    /// Persist the dump atomically.
    pub fn save_dump(&self, path: &Path) -> std::io::Result<()> {
        crate::atomic::write_atomic(path, self.dump_string().as_bytes())
    }
}

/// Renders the delimited dump.
impl fmt::Display for CalibrationRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{DUMP_BEGIN}")?;
        for v in &self.values {
            writeln!(f, "{v}")?;
        }
        writeln!(f, "{DUMP_END}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_capacity() {
        let mut r = CalibrationRecorder::new(3);
        assert!(r.record(600));
        assert!(r.record(300));
        assert!(r.record(545));
        assert!(r.is_full());
        assert!(!r.record(999));
        assert_eq!(r.values(), &[600, 300, 545]);
    }

    #[test]
    fn dump_format() {
        let mut r = CalibrationRecorder::new(3);
        for v in [600, 300, 545] {
            r.record(v);
        }
        assert_eq!(
            r.dump_string(),
            "START_DATA_CAPTURE\n600\n300\n545\nEND_DATA_CAPTURE\n"
        );
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut r = CalibrationRecorder::new(usize::MAX);
        assert_eq!(r.capacity(), usize::MAX);
        assert!(r.record(600));
        assert!(!r.is_full());
        assert_eq!(r.values(), &[600]);
    }

    #[test]
    fn written_dump_matches_display() {
        let mut r = CalibrationRecorder::new(2);
        r.record(531);
        r.record(562);
        let mut buf = Vec::new();
        r.write_dump(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), r.to_string());
    }

    #[test]
    fn empty_dump_has_sentinels_only() {
        let r = CalibrationRecorder::new(0);
        assert!(r.is_full());
        assert_eq!(r.dump_string(), "START_DATA_CAPTURE\nEND_DATA_CAPTURE\n");
    }

    #[test]
    fn saved_dump_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peaks.txt");
        let mut r = CalibrationRecorder::new(2);
        r.record(531);
        r.record(562);
        r.save_dump(&path).unwrap();
        assert_eq!(sorter_config::load_peak_dump(&path).unwrap(), vec![531, 562]);
        assert!(!path.with_extension("new").exists());
    }
}
