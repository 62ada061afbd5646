#![no_main]

//! Builds a `TextChain` and a `Text` side by side from arbitrary edits and
//! checks both against a plain byte vector.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use peekstream::{Text, TextBuffer, TextChain, utf8};

#[derive(Debug, Arbitrary)]
enum Edit {
    Append(u32),
    AppendBytes(Vec<u8>),
    Concat { bytes: Vec<u8>, capacity: u8 },
    Substring { start: u16, count: u8 },
}

fuzz_target!(|input: (u8, Vec<Edit>)| {
    let (capacity, edits) = input;
    let mut chain = TextChain::with_capacity(usize::from(capacity));
    let mut text = Text::new();
    let mut model: Vec<u8> = Vec::new();

    for edit in edits {
        match edit {
            Edit::Append(cp) => {
                chain.append(cp);
                text = text.append(cp);
                model.extend_from_slice(utf8::encode(cp).as_bytes());
            }
            Edit::AppendBytes(bytes) => {
                chain.append_bytes(&bytes);
                text = text.append_bytes(&bytes);
                model.extend_from_slice(&bytes);
            }
            Edit::Concat { bytes, capacity } => {
                let mut other = TextChain::with_capacity(usize::from(capacity));
                other.append_bytes(&bytes);
                chain.concat(other);
                text = text.concat(&Text::wrap(&bytes));
                model.extend_from_slice(&bytes);
            }
            Edit::Substring { start, count } => {
                let (start, count) = (usize::from(start), usize::from(count));
                let sub = chain.substring(start, count);
                assert_eq!(sub.len(), count);
                assert_eq!(sub, text.substring(start, count));
                for i in 0..count {
                    let expected = model.get(start + i).copied().unwrap_or(0);
                    assert_eq!(sub.char_at(i), expected);
                }
            }
        }

        assert_eq!(chain.len(), model.len());
        assert_eq!(chain.to_vec(), model);
        assert_eq!(text.as_bytes(), model.as_slice());
        assert_eq!(chain, text);
        assert_eq!(chain.decode(), text.decode());

        let blocks = chain.block_lengths();
        if let Some((_, init)) = blocks.split_last() {
            assert!(init.iter().all(|&(used, cap)| used == cap));
        }
    }
});
