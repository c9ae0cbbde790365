//! Adaptive arithmetic encoder and decoder.
//!
//! The register arithmetic follows the Witten–Neal–Cleary construction: a
//! coding interval `[low, high]` held in 32-bit registers, narrowed by each
//! symbol's cumulative-frequency range and renormalized with the classic
//! three-case test (lower half, upper half, middle straddle). The encoder
//! and decoder run the identical arithmetic; the only state they share is
//! the frequency model the caller feeds to both in the same order.

use crate::bitstream::{ByteSink, ByteSource, InputBitStream, OutputBitStream};
use crate::error::{Error, Result};
use crate::model::{FrequencyModel, MAX_TOTAL_FREQ};

/// Width of the coding registers in bits.
pub const CODE_BITS: u32 = 32;

const MAX_CODE: u32 = u32::MAX;
const FIRST_QUARTER: u32 = 1 << (CODE_BITS - 2);
const HALF: u32 = 2 * FIRST_QUARTER;
const THIRD_QUARTER: u32 = 3 * FIRST_QUARTER;

/// How many zero bits the decoder may synthesize past end-of-input before
/// reporting a genuine `EndOfStream`. The encoder's `finish` emits only the
/// bits needed to disambiguate the final interval, so a conforming decoder
/// legitimately shifts in up to this many bits beyond the physical stream.
const MAX_TAIL_BITS: u32 = CODE_BITS - 2;

/// Arithmetic encoder writing to an [`OutputBitStream`].
pub struct ArithmeticEncoder<S: ByteSink> {
    out: OutputBitStream<S>,
    low: u32,
    high: u32,
    /// Bits deferred by middle-straddle renormalizations, emitted (inverted)
    /// after the next definite bit. Instance state so that independent
    /// encoders never interfere.
    pending: u32,
    symbols: u64,
    finished: bool,
}

impl<S: ByteSink> ArithmeticEncoder<S> {
    /// Create an encoder that emits its bits to `out`.
    pub fn new(out: OutputBitStream<S>) -> Self {
        Self {
            out,
            low: 0,
            high: MAX_CODE,
            pending: 0,
            symbols: 0,
            finished: false,
        }
    }

    /// Encode one symbol against `model`, then apply `model.update` so the
    /// decoder can replay the same adaptation.
    ///
    /// # Errors
    /// [`Error::InvalidSymbol`] for a symbol outside the model's alphabet,
    /// [`Error::InvalidState`] after `finish`, and
    /// [`Error::PrecisionOverflow`] if the model total has escaped its
    /// rescale bound.
    pub fn encode(&mut self, symbol: usize, model: &mut FrequencyModel) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidState);
        }
        if symbol >= model.num_symbols() {
            return Err(Error::InvalidSymbol {
                symbol,
                alphabet: model.num_symbols(),
            });
        }
        let total = model.total_freq();
        if total > MAX_TOTAL_FREQ {
            return Err(Error::PrecisionOverflow { total });
        }

        let total = u64::from(total);
        let cum_low = u64::from(model.cumulative_freq(symbol));
        let cum_high = cum_low + u64::from(model.count(symbol));
        let range = u64::from(self.high) - u64::from(self.low) + 1;
        self.high = self.low + (range * cum_high / total - 1) as u32;
        self.low += (range * cum_low / total) as u32;

        self.renormalize()?;
        model.update(symbol);
        self.symbols += 1;
        Ok(())
    }

    fn renormalize(&mut self) -> Result<()> {
        loop {
            if self.high < HALF {
                self.emit(0)?;
            } else if self.low >= HALF {
                self.emit(1)?;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.pending += 1;
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
        Ok(())
    }

    /// Emit a definite bit followed by any deferred complementary bits.
    fn emit(&mut self, bit: u8) -> Result<()> {
        self.out.write_bit(bit)?;
        while self.pending > 0 {
            self.out.write_bit(bit ^ 1)?;
            self.pending -= 1;
        }
        Ok(())
    }

    /// Flush the final interval: two disambiguating bits plus any deferred
    /// run, then finish the underlying bit stream. Must be called exactly
    /// once; a second call fails with [`Error::InvalidState`].
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidState);
        }
        self.pending += 1;
        if self.low < FIRST_QUARTER {
            self.emit(0)?;
        } else {
            self.emit(1)?;
        }
        self.out.finish()?;
        self.finished = true;
        Ok(())
    }

    /// Number of symbols encoded so far.
    pub fn symbols_encoded(&self) -> u64 {
        self.symbols
    }

    /// Number of output bits generated so far, bits awaiting carry
    /// resolution included.
    pub fn bits_written(&self) -> u64 {
        self.out.bits_processed() + u64::from(self.pending)
    }

    /// Consume the encoder and return the underlying byte sink.
    pub fn into_sink(self) -> S {
        self.out.into_sink()
    }
}

/// Arithmetic decoder reading from an [`InputBitStream`].
///
/// The decoder carries no end-of-sequence marker: the caller must know how
/// many symbols were encoded and stop requesting symbols at that count.
pub struct ArithmeticDecoder<S: ByteSource> {
    input: InputBitStream<S>,
    low: u32,
    high: u32,
    /// The bits consumed so far, interpreted as a point in the interval.
    code: u32,
    /// Zero bits synthesized past end-of-input so far.
    tail_bits: u32,
    primed: bool,
    symbols: u64,
}

impl<S: ByteSource> ArithmeticDecoder<S> {
    /// Create a decoder that reads its bits from `input`. No bits are read
    /// until the first `decode` call.
    pub fn new(input: InputBitStream<S>) -> Self {
        Self {
            input,
            low: 0,
            high: MAX_CODE,
            code: 0,
            tail_bits: 0,
            primed: false,
            symbols: 0,
        }
    }

    /// Decode one symbol against `model`, then apply `model.update` exactly
    /// as the encoder did.
    ///
    /// # Errors
    /// [`Error::EndOfStream`] once more bits are needed than the stream plus
    /// the synthesized-zero allowance can supply,
    /// [`Error::InvalidState`] if the decode target falls outside the
    /// model's cumulative table (the model is out of sync with the encoder),
    /// and [`Error::PrecisionOverflow`] if the model total has escaped its
    /// rescale bound.
    pub fn decode(&mut self, model: &mut FrequencyModel) -> Result<usize> {
        if !self.primed {
            self.prime()?;
        }
        let total = model.total_freq();
        if total > MAX_TOTAL_FREQ {
            return Err(Error::PrecisionOverflow { total });
        }

        let total = u64::from(total);
        let range = u64::from(self.high) - u64::from(self.low) + 1;
        let target = ((u64::from(self.code) - u64::from(self.low) + 1) * total - 1) / range;
        let symbol = model
            .symbol_for_cumulative(target as u32)
            .ok_or(Error::InvalidState)?;

        let cum_low = u64::from(model.cumulative_freq(symbol));
        let cum_high = cum_low + u64::from(model.count(symbol));
        self.high = self.low + (range * cum_high / total - 1) as u32;
        self.low += (range * cum_low / total) as u32;

        self.renormalize()?;
        model.update(symbol);
        self.symbols += 1;
        Ok(symbol)
    }

    fn prime(&mut self) -> Result<()> {
        for _ in 0..CODE_BITS {
            self.code = (self.code << 1) | self.pull_bit()?;
        }
        self.primed = true;
        Ok(())
    }

    fn renormalize(&mut self) -> Result<()> {
        loop {
            if self.high < HALF {
                // Top bit already determined; just shift.
            } else if self.low >= HALF {
                self.low -= HALF;
                self.high -= HALF;
                self.code -= HALF;
            } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
                self.low -= FIRST_QUARTER;
                self.high -= FIRST_QUARTER;
                self.code -= FIRST_QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | self.pull_bit()?;
        }
        Ok(())
    }

    /// Pull one bit into the code register, substituting zeros for up to
    /// `MAX_TAIL_BITS` bits past the end of the input.
    fn pull_bit(&mut self) -> Result<u32> {
        match self.input.read_bit() {
            Ok(bit) => Ok(u32::from(bit)),
            Err(Error::EndOfStream) => {
                self.tail_bits += 1;
                if self.tail_bits > MAX_TAIL_BITS {
                    Err(Error::EndOfStream)
                } else {
                    Ok(0)
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Number of symbols decoded so far.
    pub fn symbols_decoded(&self) -> u64 {
        self.symbols
    }

    /// Number of input bits consumed so far (synthesized tail bits
    /// excluded).
    pub fn bits_read(&self) -> u64 {
        self.input.bits_processed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_all(symbols: &[usize], model: &mut FrequencyModel) -> Vec<u8> {
        let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        for &s in symbols {
            encoder.encode(s, model).unwrap();
        }
        encoder.finish().unwrap();
        encoder.into_sink()
    }

    fn decode_all(bytes: &[u8], count: usize, model: &mut FrequencyModel) -> Vec<usize> {
        let mut decoder = ArithmeticDecoder::new(InputBitStream::from_slice(bytes));
        (0..count).map(|_| decoder.decode(model).unwrap()).collect()
    }

    #[test]
    fn test_aabc_roundtrip() {
        // Alphabet {A, B, C} as {0, 1, 2}, equal initial counts, increment 1.
        let input = vec![0usize, 0, 1, 2];
        let bytes = encode_all(&input, &mut FrequencyModel::new(3));
        let output = decode_all(&bytes, 4, &mut FrequencyModel::new(3));
        assert_eq!(input, output);
    }

    #[test]
    fn test_empty_sequence() {
        let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        assert_eq!(encoder.symbols_encoded(), 0);
        encoder.finish().unwrap();
        let bytes = encoder.into_sink();
        // Two disambiguating bits, zero-padded to one byte.
        assert_eq!(bytes.len(), 1);

        // Decoding zero symbols from it succeeds trivially.
        let decoder = ArithmeticDecoder::new(InputBitStream::from_slice(&bytes));
        assert_eq!(decoder.symbols_decoded(), 0);
    }

    #[test]
    fn test_single_symbol_alphabet() {
        let input = vec![0usize; 100];
        let bytes = encode_all(&input, &mut FrequencyModel::new(1));
        // Near-zero-information output: nothing but the final flush.
        assert_eq!(bytes.len(), 1);
        let output = decode_all(&bytes, 100, &mut FrequencyModel::new(1));
        assert_eq!(input, output);
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        let mut model = FrequencyModel::new(3);
        let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        assert_eq!(
            encoder.encode(3, &mut model),
            Err(Error::InvalidSymbol {
                symbol: 3,
                alphabet: 3
            })
        );
    }

    #[test]
    fn test_encode_after_finish_fails() {
        let mut model = FrequencyModel::new(2);
        let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        encoder.finish().unwrap();
        assert_eq!(encoder.encode(0, &mut model), Err(Error::InvalidState));
        assert_eq!(encoder.finish(), Err(Error::InvalidState));
    }

    #[test]
    fn test_decode_exhausted_input_fails() {
        let mut model = FrequencyModel::new(2);
        let mut decoder = ArithmeticDecoder::new(InputBitStream::from_slice(&[]));
        assert_eq!(decoder.decode(&mut model), Err(Error::EndOfStream));
    }

    #[test]
    fn test_decode_past_symbol_count_eventually_fails() {
        let mut enc_model = FrequencyModel::new(4);
        let input: Vec<usize> = (0..32).map(|i| i % 4).collect();
        let bytes = encode_all(&input, &mut enc_model);

        let mut dec_model = FrequencyModel::new(4);
        let mut decoder = ArithmeticDecoder::new(InputBitStream::from_slice(&bytes));
        for &expected in &input {
            assert_eq!(decoder.decode(&mut dec_model).unwrap(), expected);
        }
        // Past the real count the decoder runs off the end of the stream;
        // it must fail within the tail-bit allowance rather than loop.
        let mut failed = false;
        for _ in 0..CODE_BITS {
            if decoder.decode(&mut dec_model).is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed);
    }

    #[test]
    fn test_frozen_model_roundtrip() {
        let mut enc_model = FrequencyModel::with_counts(&[10, 3, 1]).unwrap();
        enc_model.set_adaptive(false);
        let input = vec![0usize, 0, 0, 1, 0, 2, 0, 1, 0, 0];
        let bytes = encode_all(&input, &mut enc_model);

        let mut dec_model = FrequencyModel::with_counts(&[10, 3, 1]).unwrap();
        dec_model.set_adaptive(false);
        let output = decode_all(&bytes, input.len(), &mut dec_model);
        assert_eq!(input, output);
    }

    #[test]
    fn test_skewed_model_compresses() {
        // 1000 copies of the dominant symbol should land well under one
        // byte per symbol once the model has adapted.
        let input = vec![0usize; 1000];
        let bytes = encode_all(&input, &mut FrequencyModel::new(2));
        assert!(bytes.len() < 100);
        let output = decode_all(&bytes, 1000, &mut FrequencyModel::new(2));
        assert_eq!(input, output);
    }

    #[test]
    fn test_independent_encoders_do_not_interfere() {
        // Two encoders with interleaved encode calls must produce the same
        // output as two run back to back; pending-bit state is per instance.
        let input_a = vec![0usize, 1, 0, 1, 1, 0];
        let input_b = vec![1usize, 1, 0, 0, 0, 1];

        let mut model_a = FrequencyModel::new(2);
        let mut model_b = FrequencyModel::new(2);
        let mut enc_a = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        let mut enc_b = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        for (&a, &b) in input_a.iter().zip(&input_b) {
            enc_a.encode(a, &mut model_a).unwrap();
            enc_b.encode(b, &mut model_b).unwrap();
        }
        enc_a.finish().unwrap();
        enc_b.finish().unwrap();

        assert_eq!(
            enc_a.into_sink(),
            encode_all(&input_a, &mut FrequencyModel::new(2))
        );
        assert_eq!(
            enc_b.into_sink(),
            encode_all(&input_b, &mut FrequencyModel::new(2))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_adaptive_roundtrip(
            num_symbols in 1usize..12,
            seed in prop::collection::vec(any::<u8>(), 0..300),
        ) {
            let input: Vec<usize> = seed.iter().map(|&b| b as usize % num_symbols).collect();

            let bytes = encode_all(&input, &mut FrequencyModel::new(num_symbols));
            let output = decode_all(&bytes, input.len(), &mut FrequencyModel::new(num_symbols));
            prop_assert_eq!(input, output);
        }

        #[test]
        fn prop_roundtrip_with_increment_and_limit(
            seed in prop::collection::vec(0usize..3, 0..200),
            increment in 1u32..8,
            limit in 16u32..128,
        ) {
            let make_model = || {
                FrequencyModel::new(3)
                    .with_increment(increment)
                    .with_rescale_limit(limit)
            };
            let bytes = encode_all(&seed, &mut make_model());
            let output = decode_all(&bytes, seed.len(), &mut make_model());
            prop_assert_eq!(seed, output);
        }
    }
}
