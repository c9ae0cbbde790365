//! # Adaptive Arithmetic Coding
//!
//! *Bit-exact entropy coding with an adaptive frequency model.*
//!
//! ## Intuition First
//!
//! Think of the message as a single number between 0 and 1. Every symbol
//! narrows the interval that number must lie in, and the width assigned to
//! each symbol is proportional to its probability: likely symbols barely
//! shrink the interval (cheap), unlikely ones shrink it a lot (expensive).
//! When encoding ends, any number inside the final interval identifies the
//! whole message, and writing that number takes about as many bits as the
//! message's information content.
//!
//! The catch is doing this with fixed-width integers instead of unbounded
//! fractions. The interval is held in 32-bit `low`/`high` registers; as the
//! interval narrows, its settled top bits are shifted out to the output and
//! the registers are rescaled (*renormalization*). Intervals that straddle
//! the midpoint cannot settle a bit yet, so the straddle count is carried as
//! *pending* bits and resolved retroactively once a definite bit appears.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon            Entropy as the fundamental limit
//! 1952  Huffman            Optimal prefix codes, whole-bit granularity
//! 1976  Rissanen / Pasco   Arithmetic coding: fractional-bit granularity
//! 1987  Witten-Neal-Cleary CACM paper: the practical integer implementation
//! 1990s JPEG / JBIG        Binary arithmetic coders in image standards
//! 2003  H.264 CABAC        Context-adaptive binary arithmetic coding
//! ```
//!
//! The implementation here follows the Witten, Neal, and Cleary
//! construction: "Arithmetic Coding for Data Compression", Communications
//! of the ACM, 30(6), 1987.
//!
//! ## Mathematical Formulation
//!
//! Given cumulative frequencies $C(s)$ and a total $T$, each symbol $s$
//! maps the current interval $[\ell, h]$ of width $r = h - \ell + 1$ to
//!
//! ```text
//! h' = l + r * C(s+1) / T - 1
//! l' = l + r * C(s)   / T
//! ```
//!
//! The decoder inverts this by locating the symbol whose cumulative range
//! contains the scaled code value $((c - \ell + 1) T - 1) / r$, then applies
//! the identical narrowing and renormalization. Encoder and decoder stay in
//! lock-step purely through the bit sequence and the shared model-update
//! order; there is no other synchronization channel.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(\log K)$ per decoded symbol for the cumulative-table
//!   search, $O(K)$ per model update in the worst case (rescale).
//! - **Space**: $O(K)$ for the frequency model; the coder state itself is a
//!   handful of registers.
//!
//! ## Failure Modes
//!
//! 1. **Desynchronization**: if the decoder's model ever diverges from the
//!    encoder's update sequence, decoding silently produces garbage. The
//!    bit stream carries no redundancy that could detect this; the caller's
//!    protocol must prevent it.
//! 2. **Precision**: the model total must stay below a fixed bound or the
//!    interval arithmetic loses symbols. The model's rescale mechanism
//!    enforces the bound; exceeding it is reported as a fatal error.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **bitstream**: MSB-first bit-level reader/writer over pluggable byte
//!   sinks and sources.
//! - **model**: adaptive cumulative-frequency table with count rescaling.
//! - **coder**: the encoder/decoder pair over 32-bit range registers.
//!
//! The decoder has no end-of-sequence marker: callers must convey the
//! symbol count out of band and stop requesting symbols at that count.
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., and Cleary, J. G. (1987). "Arithmetic
//!   Coding for Data Compression." Communications of the ACM, 30(6).
//! - Moffat, A., Neal, R. M., and Witten, I. H. (1998). "Arithmetic Coding
//!   Revisited." ACM Transactions on Information Systems, 16(3).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod coder;
pub mod error;
pub mod model;

pub use bitstream::{ByteSink, ByteSource, InputBitStream, OutputBitStream};
pub use coder::{ArithmeticDecoder, ArithmeticEncoder, CODE_BITS};
pub use error::{Error, Result};
pub use model::{FrequencyModel, DEFAULT_RESCALE_LIMIT, FREQ_BITS, MAX_TOTAL_FREQ};
