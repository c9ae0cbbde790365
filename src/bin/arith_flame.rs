use arith::{
    ArithmeticDecoder, ArithmeticEncoder, FrequencyModel, InputBitStream, OutputBitStream,
};

fn main() {
    let input: Vec<usize> = (0..10000)
        .map(|i| if i % 7 == 0 { i % 5 } else { 0 })
        .collect();

    for _ in 0..1000 {
        let mut model = FrequencyModel::new(5);
        let mut encoder = ArithmeticEncoder::new(OutputBitStream::new(Vec::new()));
        for &s in &input {
            encoder.encode(s, &mut model).unwrap();
        }
        encoder.finish().unwrap();
        let bytes = encoder.into_sink();

        let mut model = FrequencyModel::new(5);
        let mut decoder = ArithmeticDecoder::new(InputBitStream::from_slice(&bytes));
        for &expected in &input {
            assert_eq!(decoder.decode(&mut model).unwrap(), expected);
        }
    }
}
