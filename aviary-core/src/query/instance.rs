//! Query lines.
//!
//! A line names the query type, optionally followed by `F` for formatted
//! output, then its arguments separated by spaces. Double quotes group an
//! argument that contains spaces:
//!
//! ```text
//! 9 J
//! 9F "João M"
//! 1 Book0000000001
//! ```

use aviary_types::QueryError;

use super::{QueryArgs, QueryRegistry};

/// One parsed query line.
#[derive(Debug, Clone)]
pub struct QueryInstance {
    query: u8,
    formatted: bool,
    args: Box<dyn QueryArgs>,
}

impl QueryInstance {
    /// Parses `line` against the query types in `registry`.
    pub fn parse(line: &str, registry: &QueryRegistry) -> Result<Self, QueryError> {
        let mut tokens = split_arguments(line)?.into_iter();
        let head = tokens.next().ok_or(QueryError::Empty)?;
        let (query, formatted) = parse_type(head)?;

        let query_type = registry.get(query).ok_or(QueryError::UnknownType(query))?;
        let rest: Vec<&str> = tokens.collect();
        let args = query_type
            .parse_boxed(&rest)
            .map_err(|source| QueryError::Arguments { query, source })?;

        Ok(Self {
            query,
            formatted,
            args,
        })
    }

    /// Identifier of the query type.
    #[inline]
    pub fn query_type(&self) -> u8 {
        self.query
    }

    /// Whether the output is in formatted mode.
    #[inline]
    pub fn is_formatted(&self) -> bool {
        self.formatted
    }

    /// The parsed arguments.
    #[inline]
    pub fn arguments(&self) -> &dyn QueryArgs {
        &*self.args
    }
}

fn parse_type(token: &str) -> Result<(u8, bool), QueryError> {
    let (digits, formatted) = match token.strip_suffix('F') {
        Some(digits) => (digits, true),
        None => (token, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QueryError::MalformedType(token.to_owned()));
    }
    let query = digits
        .parse()
        .map_err(|_| QueryError::MalformedType(token.to_owned()))?;
    Ok((query, formatted))
}

/// Splits a query line on spaces, keeping double-quoted runs together.
///
/// Quotes are removed. An empty quoted argument (`""`) is kept.
pub fn split_arguments(line: &str) -> Result<Vec<&str>, QueryError> {
    let mut out = Vec::new();
    let mut rest = line.trim_end_matches(['\n', '\r']);

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').ok_or(QueryError::UnterminatedQuote)?;
            out.push(&quoted[..end]);
            rest = &quoted[end + 1..];
        } else {
            let end = rest.find(' ').unwrap_or(rest.len());
            out.push(&rest[..end]);
            rest = &rest[end..];
        }
    }
    Ok(out)
}
