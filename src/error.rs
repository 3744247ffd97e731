/// Errors raised by matrix, tensor, layer and loss operations.
///
/// Every operation validates its operands before touching the receiver, so an
/// `Err` always leaves the receiver exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NnError {
    /// Operand shapes do not conform to the operation's contract.
    #[error("shape error in {op}: {detail}")]
    Shape { op: &'static str, detail: String },

    /// Element counts or multiplication dimensions are incompatible.
    #[error("dimension error in {op}: {detail}")]
    Dimension { op: &'static str, detail: String },

    /// A row, column or batch index lies outside the valid range.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    Index { index: Vec<usize>, shape: Vec<usize> },

    /// A constructor or operation parameter is outside its allowed range.
    #[error("invalid value for {param}: {detail}")]
    Value { param: &'static str, detail: String },
}

pub type Result<T> = std::result::Result<T, NnError>;

impl NnError {
    pub(crate) fn shape(op: &'static str, detail: impl Into<String>) -> Self {
        NnError::Shape { op, detail: detail.into() }
    }

    pub(crate) fn dimension(op: &'static str, detail: impl Into<String>) -> Self {
        NnError::Dimension { op, detail: detail.into() }
    }

    pub(crate) fn value(param: &'static str, detail: impl Into<String>) -> Self {
        NnError::Value { param, detail: detail.into() }
    }
}

/// Wraps an `NnError` found while loading a document into an `io::Error`, so the
/// JSON helpers keep a single `std::io::Result` signature.
pub(crate) fn into_io(e: NnError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let e = NnError::shape("add", "[2, 2] vs [3, 3]");
        assert_eq!(e.to_string(), "shape error in add: [2, 2] vs [3, 3]");

        let e = NnError::Index { index: vec![4, 0], shape: vec![2, 2] };
        assert_eq!(e.to_string(), "index [4, 0] out of bounds for shape [2, 2]");
    }

    #[test]
    fn io_wrapping_keeps_message() {
        let io = into_io(NnError::value("p", "1.5 is outside [0, 1]"));
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
        assert!(io.to_string().contains("1.5 is outside [0, 1]"));
    }
}
