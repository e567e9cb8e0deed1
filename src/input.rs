// User input validation
// Everything the view layer hands us as text is checked here before any trace exists

use thiserror::Error;

/// Invalid user-supplied value. Recovered locally: the operation is refused and
/// no trace or session is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a valid number (got {0:?})")]
    NotANumber(String),

    #[error("Index {index} out of bounds. Valid range: 0 to {max}")]
    IndexOutOfBounds { index: i64, max: usize },

    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("{what} is full ({max} elements)")]
    Full { what: &'static str, max: usize },

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Vertex {0} does not exist in the graph")]
    UnknownVertex(String),

    #[error("Please enter a vertex label")]
    MissingVertex,

    #[error("Value {0} already exists in the tree")]
    DuplicateValue(i64),

    #[error("Value {0} does not exist in the tree")]
    MissingValue(i64),

    #[error("Cannot insert {value}: the tree is limited to {max} levels")]
    TooDeep { value: i64, max: usize },

    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfGrid {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("A {rows}x{cols} grid needs {expected} cells, got {nodes}")]
    GridShape {
        rows: usize,
        cols: usize,
        expected: usize,
        nodes: usize,
    },

    #[error("Cell ({row}, {col}) is not available: {reason}")]
    CellUnavailable {
        row: usize,
        col: usize,
        reason: &'static str,
    },

    #[error("Edge weight must be at least 1")]
    ZeroWeight,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type InputResult<T> = Result<T, InputError>;

/// Parse a whole integer the way the value fields accept it (surrounding whitespace allowed)
pub fn parse_value(raw: &str) -> InputResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InputError::NotANumber(raw.to_string()))
}

/// Parse a comma-separated list of integers, e.g. `"5, 3, 8"`
pub fn parse_values(raw: &str) -> InputResult<Vec<i64>> {
    if raw.trim().is_empty() {
        return Err(InputError::Empty("Value list"));
    }

    raw.split(',').map(parse_value).collect()
}

/// Check `index` against an inclusive upper bound and convert it
pub fn check_index(index: i64, max: usize) -> InputResult<usize> {
    if index < 0 || index as u64 > max as u64 {
        return Err(InputError::IndexOutOfBounds { index, max });
    }
    Ok(index as usize)
}

/// Normalise a vertex label (trimmed, upper-cased, non-empty)
pub fn parse_vertex(raw: &str) -> InputResult<String> {
    let label = raw.trim().to_uppercase();
    if label.is_empty() {
        return Err(InputError::MissingVertex);
    }
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 42 ").unwrap(), 42);
        assert_eq!(parse_value("-7").unwrap(), -7);
        assert_eq!(
            parse_value("abc").unwrap_err(),
            InputError::NotANumber("abc".to_string())
        );
        assert!(parse_value("").is_err());
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values("5, 3,8").unwrap(), vec![5, 3, 8]);
        assert!(parse_values("5, x").is_err());
        assert_eq!(parse_values("  ").unwrap_err(), InputError::Empty("Value list"));
    }

    #[test]
    fn test_index_bounds() {
        assert_eq!(check_index(0, 3).unwrap(), 0);
        assert_eq!(check_index(3, 3).unwrap(), 3);
        assert_eq!(
            check_index(4, 3).unwrap_err(),
            InputError::IndexOutOfBounds { index: 4, max: 3 }
        );
        assert!(check_index(-1, 3).is_err());
    }

    #[test]
    fn test_parse_vertex() {
        assert_eq!(parse_vertex(" a ").unwrap(), "A");
        assert_eq!(parse_vertex("").unwrap_err(), InputError::MissingVertex);
    }

    #[test]
    fn test_error_messages() {
        let err = InputError::IndexOutOfBounds { index: 9, max: 4 };
        assert_eq!(err.to_string(), "Index 9 out of bounds. Valid range: 0 to 4");
    }
}
