use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::constants::MEMORY_SIZE;
use crate::error::LoadError;

/// Marks the rest of a line as a comment
const COMMENT: char = '#';

/// Parses a program image: one base-2 byte per line, `#` starts a comment, and lines
/// with nothing before the comment are skipped.
///
/// The whole image is parsed before anything is returned, so a malformed line rejects
/// the program rather than loading part of it.
pub fn parse(reader: &mut dyn BufRead) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: "<reader>".into(),
            source,
        })?;
        let text = line.split(COMMENT).next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        let byte = u8::from_str_radix(text, 2).map_err(|_| LoadError::MalformedInstruction {
            line: index + 1,
            text: text.to_string(),
        })?;
        program.push(byte);
    }

    if program.len() > MEMORY_SIZE {
        return Err(LoadError::ProgramTooLarge {
            len: program.len(),
            max: MEMORY_SIZE,
        });
    }
    Ok(program)
}

/// Opens and parses the program image at `path`
pub fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::ProgramNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse(&mut BufReader::new(file)).map_err(|err| match err {
        LoadError::Io { source, .. } => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}
