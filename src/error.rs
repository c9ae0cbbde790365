//! Error types for the arithmetic coding core.

use thiserror::Error;

/// Error variants for bit stream and coder operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A read was requested past the end of the available data.
    #[error("end of stream")]
    EndOfStream,

    /// A symbol outside the model's alphabet was passed to the encoder.
    #[error("symbol {symbol} outside alphabet of {alphabet} symbols")]
    InvalidSymbol {
        /// The offending symbol.
        symbol: usize,
        /// The size of the model's alphabet.
        alphabet: usize,
    },

    /// An operation was performed on a finished stream, or a decode target
    /// fell outside the model's cumulative table (the model was never
    /// synchronized with the encoder's update history).
    #[error("invalid state")]
    InvalidState,

    /// The model's total frequency exceeds the representable precision
    /// without a rescale having triggered. Always an invariant violation,
    /// never a recoverable runtime condition.
    #[error("frequency total {total} exceeds precision limit")]
    PrecisionOverflow {
        /// The over-large total.
        total: u32,
    },
}

/// A specialized Result type for coding operations.
pub type Result<T> = std::result::Result<T, Error>;
