// src/ons/split.rs

use crate::fetch::Encoding;
use anyhow::Result;
use std::io::BufRead;

/// Lines after the blank separator that carry the copyright banner.
pub const BANNER_LINES: usize = 2;

/// An ONS CSV export cut at its first blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    /// Header row and data rows, line endings preserved.
    pub data: String,
    /// Everything after the banner, verbatim. Empty when the file has no
    /// blank line.
    pub meta: String,
}

/// Split a CSV export into its data region and metadata block.
///
/// Lines go to the data region until the first line that is blank after
/// trimming; the next [`BANNER_LINES`] lines are dropped and the rest of the
/// input is the metadata block. Each part is decoded as UTF-8, falling back
/// to Latin-1 (what the ONS site serves) when it is not valid UTF-8.
pub fn split_sections<R: BufRead>(mut reader: R) -> Result<Sections> {
    let mut data = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            // no separator: the whole input is data
            return Ok(Sections {
                data: decode(data),
                meta: String::new(),
            });
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            break;
        }
        data.extend_from_slice(&line);
    }

    for _ in 0..BANNER_LINES {
        line.clear();
        reader.read_until(b'\n', &mut line)?;
    }
    let mut meta = Vec::new();
    reader.read_to_end(&mut meta)?;

    Ok(Sections {
        data: decode(data),
        meta: decode(meta),
    })
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => match Encoding::Latin1.decode(e.into_bytes()) {
            Ok(text) => text,
            Err(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn splits_at_first_blank_line_and_drops_banner() -> Result<()> {
        let text = ",A\n\"2000\",1\n\n\u{a9} Crown Copyright\n\nA,\"Series\"\n,k='v'\n";
        let sections = split_sections(Cursor::new(text))?;
        assert_eq!(sections.data, ",A\n\"2000\",1\n");
        assert_eq!(sections.meta, "A,\"Series\"\n,k='v'\n");
        Ok(())
    }

    #[test]
    fn whitespace_only_line_counts_as_blank() -> Result<()> {
        let sections = split_sections(Cursor::new(",A\r\n1,2\r\n  \r\nbanner\r\n\r\nmeta\r\n"))?;
        assert_eq!(sections.data, ",A\r\n1,2\r\n");
        assert_eq!(sections.meta, "meta\r\n");
        Ok(())
    }

    #[test]
    fn no_blank_line_means_no_metadata() -> Result<()> {
        let sections = split_sections(Cursor::new(",A\n1,2"))?;
        assert_eq!(sections.data, ",A\n1,2");
        assert!(sections.meta.is_empty());
        Ok(())
    }

    #[test]
    fn latin1_banner_does_not_fail() -> Result<()> {
        let mut bytes = b",A\n1,2\n\n".to_vec();
        bytes.extend_from_slice(&[0xa9]);
        bytes.extend_from_slice(b" Crown Copyright\n\nA,\"S\"\n");
        let sections = split_sections(Cursor::new(bytes))?;
        assert_eq!(sections.meta, "A,\"S\"\n");
        Ok(())
    }

    #[test]
    fn latin1_metadata_keeps_pound_sign() -> Result<()> {
        let mut bytes = b",ABCD\n\"2000\",1\n\nbanner\n\nABCD,\"GDP ".to_vec();
        bytes.push(0xa3);
        bytes.extend_from_slice(b"m\"\n");
        let sections = split_sections(Cursor::new(bytes))?;
        assert_eq!(sections.data, ",ABCD\n\"2000\",1\n");
        assert_eq!(sections.meta, "ABCD,\"GDP \u{a3}m\"\n");
        Ok(())
    }

    #[test]
    fn utf8_text_is_not_reinterpreted() -> Result<()> {
        let sections = split_sections(Cursor::new(",A\n1,2\n\nb\n\nA,\"GDP \u{a3}m\"\n"))?;
        assert_eq!(sections.meta, "A,\"GDP \u{a3}m\"\n");
        Ok(())
    }
}
