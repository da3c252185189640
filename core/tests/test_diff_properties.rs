// Property checks for the XOR stream and the engine:
// * output[i] == a[i] ^ b[i], zero-extended to the longer input
// * swapping inputs does not change the bytes
// * a file diffed against itself is NoDifference
// * chunk size does not affect the result

#[cfg(test)]
mod diff_property_tests {
    use std::fs;
    use std::io::Cursor;

    use proptest::prelude::*;

    use filediff_core::diff::{xor_stream, DiffConfig, DiffEngine, DifferenceArtifact, InputFile};

    fn reference_xor(a: &[u8], b: &[u8]) -> Vec<u8> {
        let len = a.len().max(b.len());
        (0..len)
            .map(|i| a.get(i).copied().unwrap_or(0) ^ b.get(i).copied().unwrap_or(0))
            .collect()
    }

    fn run_stream(a: &[u8], b: &[u8], chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        xor_stream(&mut Cursor::new(a), &mut Cursor::new(b), &mut out, chunk).unwrap();
        out
    }

    proptest! {
        #[test]
        fn stream_matches_bytewise_xor(
            a in proptest::collection::vec(any::<u8>(), 0..600),
            b in proptest::collection::vec(any::<u8>(), 0..600),
            chunk in 1usize..128,
        ) {
            prop_assert_eq!(run_stream(&a, &b, chunk), reference_xor(&a, &b));
        }

        #[test]
        fn stream_is_commutative(
            a in proptest::collection::vec(any::<u8>(), 0..300),
            b in proptest::collection::vec(any::<u8>(), 0..300),
        ) {
            prop_assert_eq!(run_stream(&a, &b, 17), run_stream(&b, &a, 17));
        }

        #[test]
        fn counters_agree_with_output(
            a in proptest::collection::vec(any::<u8>(), 0..300),
            b in proptest::collection::vec(any::<u8>(), 0..300),
        ) {
            let mut out = Vec::new();
            let c = xor_stream(&mut Cursor::new(&a), &mut Cursor::new(&b), &mut out, 32).unwrap();
            prop_assert_eq!(c.bytes_written as usize, out.len());
            prop_assert_eq!(c.bytes_differing as usize, out.iter().filter(|&&x| x != 0).count());
            prop_assert_eq!(c.bytes_compared() as usize, a.len() + b.len());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn file_against_itself_is_no_difference(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("same.bin");
            fs::write(&path, &data).unwrap();
            let input = InputFile::open(&path).unwrap();
            let engine = DiffEngine::new(dir.path().join("out"), DiffConfig { chunk_size: 64, ..DiffConfig::default() });

            prop_assert_eq!(engine.diff(&input, &input).unwrap(), DifferenceArtifact::NoDifference);
        }

        #[test]
        fn engine_artifact_matches_reference(
            a in proptest::collection::vec(any::<u8>(), 1..1024),
            b in proptest::collection::vec(any::<u8>(), 1..1024),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let pa = dir.path().join("a.bin");
            let pb = dir.path().join("b.bin");
            fs::write(&pa, &a).unwrap();
            fs::write(&pb, &b).unwrap();
            let engine = DiffEngine::new(dir.path().join("out"), DiffConfig { chunk_size: 100, ..DiffConfig::default() });

            let expected = reference_xor(&a, &b);
            let artifact = engine.diff(&InputFile::open(&pa).unwrap(), &InputFile::open(&pb).unwrap()).unwrap();
            match artifact {
                DifferenceArtifact::NoDifference => prop_assert!(expected.iter().all(|&x| x == 0)),
                DifferenceArtifact::Produced { path, byte_len } => {
                    prop_assert_eq!(byte_len as usize, expected.len());
                    prop_assert_eq!(fs::read(path).unwrap(), expected);
                }
            }
        }
    }
}
