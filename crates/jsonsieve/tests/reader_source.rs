#![expect(missing_docs)]

use std::io::{self, BufRead, BufReader, Cursor, Read};

use jsonsieve::{EACH, Error, ErrorSource, Lexer, ParserOptions, SourceError, path};

#[test]
fn decodes_from_a_buffered_reader() {
    let doc = format!(
        r#"{{"padding":[{}],"id":"reader","values":[1,2,3]}}"#,
        vec!["{\"x\":[0,1,2]}"; 500].join(",")
    );
    // A tiny buffer forces many refills, including inside tokens.
    let mut lexer = Lexer::from_reader(BufReader::with_capacity(7, doc.as_bytes()));
    let mut id = String::new();
    let mut sum = 0u64;

    let mut session = lexer.session();
    session.bind_variable(path!["id"], &mut id).unwrap();
    session
        .bind_callback(path!["values", EACH], |v| {
            sum += v.decode::<u64>()?;
            Ok(())
        })
        .unwrap();
    session.run().unwrap();
    lexer.finish().unwrap();

    assert_eq!(id, "reader");
    assert_eq!(sum, 6);
}

#[test]
fn json_lines_from_a_reader() {
    let input = "{\"n\":1}\n{\"n\":2,\"skip\":[{}]}\n\n{\"n\":3}\n";
    let options = ParserOptions {
        allow_multiple_json_values: true,
        ..ParserOptions::default()
    };
    let mut lexer = Lexer::from_reader_with_options(Cursor::new(input), options);
    let mut total = 0u32;
    while !lexer.at_end().unwrap() {
        let mut n = 0u32;
        let mut session = lexer.session();
        session.bind_variable(path!["n"], &mut n).unwrap();
        session.run().unwrap();
        total += n;
    }
    assert_eq!(total, 6);
    assert_eq!(lexer.position().0, 5);
}

/// Yields its bytes, then fails.
struct Failing<'a> {
    data: &'a [u8],
}

impl Read for Failing<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::other("connection reset"));
        }
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn reader_failures_surface_as_source_errors() {
    let reader = BufReader::new(Failing {
        data: br#"{"a":[1,2"#,
    });
    let mut lexer = Lexer::from_reader(reader);
    let mut session = lexer.session();
    session.bind_callback(path!["a", EACH], |v| v.skip().map_err(Into::into)).unwrap();

    let Error::Decode(err) = session.run().unwrap_err() else {
        panic!("expected a decode error");
    };
    assert_eq!(
        *err.kind(),
        ErrorSource::Source(SourceError("connection reset".into()))
    );
    assert_eq!((err.line, err.column), (1, 10));
}

#[test]
fn reader_is_returned_positioned_after_the_value() {
    let options = ParserOptions {
        allow_multiple_json_values: true,
        ..ParserOptions::default()
    };
    let mut lexer = Lexer::from_reader_with_options(Cursor::new(&b"{\"a\":1}tail"[..]), options);
    lexer.session().run().unwrap();
    // The lexer has not looked past the closing brace.
    let mut source = lexer.into_source().into_inner();
    let mut rest = String::new();
    source.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "tail");
    assert!(source.fill_buf().unwrap().is_empty());
}
