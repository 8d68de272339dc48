//! Streaming record parser.
//!
//! Reads a stream one record at a time into a single reused buffer, so memory
//! use is bounded by the longest record rather than by the file. Each record
//! goes through the grammar's `before` hook, its field grammar and its `after`
//! hook, in that order.
//!
//! ## Failure Classes
//!
//! - A record that is not valid UTF-8, has the wrong number of fields or has
//!   a field its callback refuses is *rejected*: the `after` hook sees the
//!   [`Rejection`] and parsing continues with the next record
//! - An I/O error, or an error returned by the `after` hook, aborts the parse
//! - `ControlFlow::Break` from either hook stops the parse cleanly

use core::ops::ControlFlow;
use std::io::BufRead;

use aviary_types::{ParseError, Rejection};

use super::grammar::RecordGrammar;

/// Counters for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Records seen, header excluded.
    pub records: usize,
    /// Records every field callback accepted.
    pub accepted: usize,
    /// Records that were rejected.
    pub rejected: usize,
    /// Whether a hook asked to stop before the end of the input.
    pub stopped: bool,
}

/// Drives a [`RecordGrammar`] over a byte stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser;

impl RecordParser {
    /// Parses every record of `reader` into `state`.
    ///
    /// An empty record is still a record: it has one empty field and goes
    /// through the field grammar like any other. When the record delimiter
    /// is `\n`, a trailing `\r` is stripped before the fields are split, but
    /// the `after` hook receives the record with it so rejections can be
    /// echoed byte for byte.
    pub fn parse<R, S>(
        mut reader: R,
        grammar: &RecordGrammar<S>,
        state: &mut S,
    ) -> Result<ParseSummary, ParseError>
    where
        R: BufRead,
    {
        let mut summary = ParseSummary::default();
        let mut buf = Vec::with_capacity(256);
        let mut header_pending = grammar.skip_header;

        loop {
            buf.clear();
            if reader.read_until(grammar.delimiter, &mut buf)? == 0 {
                break;
            }
            let raw = strip_delimiter(&buf, grammar.delimiter);

            if header_pending {
                header_pending = false;
                continue;
            }

            summary.records += 1;
            let outcome = match core::str::from_utf8(strip_cr(raw, grammar.delimiter)) {
                Ok(record) => {
                    if let Some(before) = grammar.before {
                        if before(state, record).is_break() {
                            summary.stopped = true;
                            break;
                        }
                    }
                    grammar.fields.parse(state, record)
                }
                Err(_) => Err(Rejection::Encoding),
            };

            if outcome.is_ok() {
                summary.accepted += 1;
            } else {
                summary.rejected += 1;
            }

            if let ControlFlow::Break(()) = (grammar.after)(state, raw, outcome)? {
                summary.stopped = true;
                break;
            }
        }

        Ok(summary)
    }
}

#[inline]
fn strip_delimiter(buf: &[u8], delimiter: u8) -> &[u8] {
    buf.strip_suffix(&[delimiter]).unwrap_or(buf)
}

#[inline]
fn strip_cr(record: &[u8], delimiter: u8) -> &[u8] {
    if delimiter == b'\n' {
        record.strip_suffix(b"\r").unwrap_or(record)
    } else {
        record
    }
}
