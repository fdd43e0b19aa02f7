#![no_main]
use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use jsonsieve::{EACH, Error, ErrorSource, Lexer, ParserOptions, Token, path};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

#[derive(Debug, Arbitrary)]
struct Case<'a> {
    max_depth: Option<u8>,
    unicode_whitespace: bool,
    /// Top-level keys bound to string variables.
    keys: Vec<String>,
    doc: &'a [u8],
}

fn decoder(case: &Case<'_>) {
    let options = ParserOptions {
        allow_unicode_whitespace: case.unicode_whitespace,
        max_depth: case.max_depth.map(usize::from),
        ..ParserOptions::default()
    };

    let mut keys: Vec<&String> = Vec::new();
    for key in &case.keys {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut strings = vec![None::<String>; keys.len()];
    let mut seen_keys = BTreeSet::new();
    let mut lexer = Lexer::from_slice_with_options(case.doc, options);
    let mut session = lexer.session();
    for (key, slot) in keys.iter().zip(strings.iter_mut()) {
        session
            .bind_callback(path![key.as_str()], move |value| {
                // The last occurrence of a duplicated key wins, as in serde_json.
                *slot = match value.peek()? {
                    Token::String => Some(value.decode()?),
                    _ => None,
                };
                Ok(())
            })
            .unwrap();
    }
    session
        .bind_callback(path![EACH], |value| {
            seen_keys.insert(value.key().unwrap_or_default().to_owned());
            Ok(())
        })
        .unwrap();
    let result = session.run().and_then(|()| lexer.finish().map_err(Error::from));

    // serde_json does not know about the relaxed whitespace option.
    if case.unicode_whitespace {
        return;
    }
    let Ok(Value::Object(expected)) = serde_json::from_slice::<Value>(case.doc) else {
        return;
    };

    match result {
        Ok(()) => {}
        Err(Error::Decode(e)) if matches!(e.kind(), ErrorSource::DepthLimitExceeded(_)) => return,
        Err(e) => panic!("serde_json accepted the document, the decoder failed: {e}"),
    }

    for (key, slot) in keys.iter().zip(&strings) {
        match expected.get(key.as_str()) {
            // Bound keys are dispatched to their own callback, not the wildcard.
            Some(Value::String(s)) => assert_eq!(slot.as_deref(), Some(s.as_str()), "key {key:?}"),
            Some(_) => assert_eq!(*slot, None, "key {key:?}"),
            None => {}
        }
    }
    let unbound: BTreeSet<&String> = expected
        .keys()
        .filter(|k| !case.keys.contains(k))
        .collect();
    assert_eq!(seen_keys.iter().collect::<BTreeSet<_>>(), unbound);
}

fuzz_target!(|case: Case<'_>| decoder(&case));
