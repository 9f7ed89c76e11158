//! Footer key/value metadata and its literal form
//!
//! A rewrite must carry the source file's footer key/value block (the `geo`
//! entry of a GeoParquet file, among others) into the output verbatim. The
//! block travels to the worker as a literal of the form
//! `{ 'key': 'value', 'other': 'it''s' }`, quotes escaped SQL-style.

use std::fs::File;
use std::path::Path;

use datafusion::parquet::file::reader::{FileReader, SerializedFileReader};

use crate::error::{CompressError, MetadataPart, Result};

/// Ordered byte-string key/value pairs from a parquet footer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl FileMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping insertion order
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Translate into the literal handed to the rewrite worker.
    ///
    /// Every key and value is decoded as UTF-8; an invalid sequence is an
    /// error rather than a lossy replacement.
    pub fn to_kv_literal(&self) -> Result<String> {
        let mut pairs = Vec::with_capacity(self.entries.len());

        for (index, (key, value)) in self.entries.iter().enumerate() {
            let key = decode(key, index, MetadataPart::Key)?;
            let value = decode(value, index, MetadataPart::Value)?;
            pairs.push(format!(
                "'{}': '{}'",
                escape_single_quotes(&key),
                escape_single_quotes(&value)
            ));
        }

        Ok(format!("{{ {} }}", pairs.join(", ")))
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> FromIterator<(K, V)> for FileMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = FileMetadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

fn decode(bytes: &[u8], index: usize, part: MetadataPart) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|source| CompressError::MetadataDecode {
        index,
        part,
        source,
    })
}

/// Double every single quote so the text can sit inside a quoted literal
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "''")
}

/// Parse a literal produced by [`FileMetadata::to_kv_literal`] back into pairs
pub fn parse_kv_literal(literal: &str) -> Result<Vec<(String, String)>> {
    let mut parser = LiteralParser {
        chars: literal.chars().peekable(),
    };

    parser.skip_whitespace();
    parser.expect('{')?;
    parser.skip_whitespace();

    let mut pairs = Vec::new();
    if parser.eat('}') {
        parser.expect_end()?;
        return Ok(pairs);
    }

    loop {
        let key = parser.quoted()?;
        parser.skip_whitespace();
        parser.expect(':')?;
        parser.skip_whitespace();
        let value = parser.quoted()?;
        pairs.push((key, value));

        parser.skip_whitespace();
        if parser.eat(',') {
            parser.skip_whitespace();
            continue;
        }
        parser.expect('}')?;
        parser.expect_end()?;
        return Ok(pairs);
    }
}

struct LiteralParser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl LiteralParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if_eq(&expected).is_some()
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(CompressError::MetadataLiteral(format!(
                "expected '{expected}', found '{c}'"
            ))),
            None => Err(CompressError::MetadataLiteral(format!(
                "expected '{expected}', found end of input"
            ))),
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.chars.next() {
            None => Ok(()),
            Some(c) => Err(CompressError::MetadataLiteral(format!(
                "unexpected trailing '{c}'"
            ))),
        }
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect('\'')?;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some('\'') => {
                    if self.eat('\'') {
                        out.push('\'');
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => {
                    return Err(CompressError::MetadataLiteral(
                        "unterminated quoted string".to_string(),
                    ));
                }
            }
        }
    }
}

/// Row count and key/value block read from a parquet footer
#[derive(Debug, Clone)]
pub struct FooterSummary {
    pub num_rows: i64,
    pub metadata: FileMetadata,
}

/// Read the footer of a parquet file without touching its row groups
pub fn read_footer(path: &Path) -> Result<FooterSummary> {
    let file = File::open(path).map_err(|e| CompressError::io("Failed to open input", path, e))?;
    let reader = SerializedFileReader::new(file)?;
    let file_metadata = reader.metadata().file_metadata();

    let metadata: FileMetadata = file_metadata
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .map(|kv| {
                    (
                        kv.key.clone().into_bytes(),
                        kv.value.clone().unwrap_or_default().into_bytes(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    log::debug!(
        "Read footer of {}: {} rows, {} metadata entries",
        path.display(),
        file_metadata.num_rows(),
        metadata.len()
    );

    Ok(FooterSummary {
        num_rows: file_metadata.num_rows(),
        metadata,
    })
}
