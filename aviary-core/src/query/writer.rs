//! Query output.
//!
//! Plain mode writes one line per object with its field values separated by
//! `;`. Formatted mode numbers each object and writes one `key: value` line
//! per field:
//!
//! ```text
//! plain:       LIS;900
//!              OPO;300
//!
//! formatted:   --- 1 ---
//!              name: LIS
//!              median: 900
//!
//!              --- 2 ---
//!              name: OPO
//!              median: 300
//! ```

use core::fmt::{self, Write};

/// Collects the output of one query instance.
#[derive(Debug, Clone, Default)]
pub struct QueryWriter {
    formatted: bool,
    out: String,
    objects: usize,
    fields: usize,
}

impl QueryWriter {
    /// Creates an empty writer.
    pub fn new(formatted: bool) -> Self {
        Self {
            formatted,
            ..Self::default()
        }
    }

    /// Whether this writer is in formatted mode.
    #[inline]
    pub fn is_formatted(&self) -> bool {
        self.formatted
    }

    /// Number of objects written so far.
    #[inline]
    pub fn objects(&self) -> usize {
        self.objects
    }

    /// Starts a new object.
    pub fn begin_object(&mut self) {
        if self.objects > 0 {
            self.out.push('\n');
        }
        self.objects += 1;
        self.fields = 0;
        if self.formatted {
            let _ = writeln!(self.out, "--- {} ---", self.objects);
        }
    }

    /// Writes one field of the current object.
    pub fn field(&mut self, key: &str, value: impl fmt::Display) {
        if self.formatted {
            let _ = writeln!(self.out, "{key}: {value}");
        } else {
            if self.fields > 0 {
                self.out.push(';');
            }
            let _ = write!(self.out, "{value}");
        }
        self.fields += 1;
    }

    /// Returns the text written.
    pub fn finish(mut self) -> String {
        if !self.formatted && self.objects > 0 {
            self.out.push('\n');
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airports(formatted: bool) -> String {
        let mut w = QueryWriter::new(formatted);
        for (name, median) in [("LIS", 900), ("OPO", 300)] {
            w.begin_object();
            w.field("name", name);
            w.field("median", median);
        }
        w.finish()
    }

    #[test]
    fn plain() {
        assert_eq!(airports(false), "LIS;900\nOPO;300\n");
    }

    #[test]
    fn formatted() {
        assert_eq!(
            airports(true),
            "--- 1 ---\nname: LIS\nmedian: 900\n\n--- 2 ---\nname: OPO\nmedian: 300\n"
        );
    }

    #[test]
    fn nothing_written() {
        assert_eq!(QueryWriter::new(false).finish(), "");
        assert_eq!(QueryWriter::new(true).finish(), "");
    }
}
