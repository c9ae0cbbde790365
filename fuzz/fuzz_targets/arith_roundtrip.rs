#![no_main]
use arith::{
    ArithmeticDecoder, ArithmeticEncoder, FrequencyModel, InputBitStream, OutputBitStream,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8)| {
    let (seed, alphabet) = data;
    let num_symbols = (alphabet % 16) as usize + 1;
    let input: Vec<usize> = seed.iter().map(|&b| b as usize % num_symbols).collect();

    let mut enc_model = FrequencyModel::new(num_symbols);
    let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
    for &s in &input {
        encoder.encode(s, &mut enc_model).unwrap();
    }
    encoder.finish().unwrap();
    let bytes = encoder.into_sink();

    let mut dec_model = FrequencyModel::new(num_symbols);
    let mut decoder = ArithmeticDecoder::new(InputBitStream::from_slice(&bytes));
    for &expected in &input {
        assert_eq!(decoder.decode(&mut dec_model).unwrap(), expected);
    }
});
