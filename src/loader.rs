//! Tab-separated file ingestion.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::buffer::BufferManager;
use crate::common::{JoinError, Result};
use crate::storage::{Relation, RelationWriter};
use crate::tuple::Tuple;

/// Loads a tab-separated file into a new disk-resident relation.
///
/// Every record is appended `scale` times.
pub fn load_relation(
    path: impl AsRef<Path>,
    scale: usize,
    manager: &mut BufferManager,
) -> Result<Relation> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let relation = read_relation(BufReader::new(file), scale, manager)?;
    info!(
        "loaded {} into {} blocks (scale {})",
        path.display(),
        relation.block_count(),
        scale
    );
    Ok(relation)
}

const DELIMITER: char = '\t';
const QUOTE: char = '"';

/// Reads tab-separated records from `reader` into a new disk-resident relation.
///
/// One record per line, fields separated by `\t`. Whitespace around a field
/// is dropped. A field may be wrapped in double quotes, in which case it can
/// hold tabs and line breaks, and `""` stands for one quote character.
/// Empty lines are skipped.
pub fn read_relation<R: BufRead>(
    reader: R,
    scale: usize,
    manager: &mut BufferManager,
) -> Result<Relation> {
    if scale == 0 {
        return Err(JoinError::InvalidConfig(
            "scale factor must be at least 1".into(),
        ));
    }

    let mut writer = RelationWriter::open(Relation::on_disk());
    let mut lines = reader.lines().enumerate();
    while let Some((index, line)) = lines.next() {
        let line_number = index + 1;
        let mut text = read_line(line, line_number)?;
        if text.is_empty() {
            continue;
        }

        let fields = loop {
            match split_record(&text) {
                Ok(Record::Complete(fields)) => break fields,
                Ok(Record::OpenQuote) => {
                    let (index, line) = lines.next().ok_or_else(|| JoinError::Parse {
                        line: line_number,
                        message: "unterminated quoted field".into(),
                    })?;
                    text.push('\n');
                    text.push_str(&read_line(line, index + 1)?);
                }
                Err(message) => {
                    return Err(JoinError::Parse {
                        line: line_number,
                        message,
                    })
                }
            }
        };

        let tuple = Tuple::from(fields);
        for _ in 0..scale {
            writer.append(manager, tuple.clone())?;
        }
    }
    writer.close(manager)
}

fn read_line(line: std::io::Result<String>, line_number: usize) -> Result<String> {
    let mut line = line.map_err(|e| JoinError::Parse {
        line: line_number,
        message: e.to_string(),
    })?;
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Outcome of splitting the text of one record
enum Record {
    Complete(Vec<String>),
    /// A quoted field runs past the end of the text
    OpenQuote,
}

fn is_padding(c: char) -> bool {
    c != DELIMITER && c.is_whitespace()
}

fn split_record(text: &str) -> std::result::Result<Record, String> {
    let mut fields = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while chars.next_if(|c| is_padding(*c)).is_some() {}

        if chars.next_if_eq(&QUOTE).is_none() {
            let mut field = String::new();
            let mut last = true;
            for c in chars.by_ref() {
                if c == DELIMITER {
                    last = false;
                    break;
                }
                field.push(c);
            }
            fields.push(field.trim_end_matches(is_padding).to_string());
            if last {
                return Ok(Record::Complete(fields));
            }
            continue;
        }

        let mut field = String::new();
        loop {
            match chars.next() {
                Some(QUOTE) if chars.next_if_eq(&QUOTE).is_some() => field.push(QUOTE),
                Some(QUOTE) => break,
                Some(c) => field.push(c),
                None => return Ok(Record::OpenQuote),
            }
        }
        fields.push(field);

        while chars.next_if(|c| is_padding(*c)).is_some() {}
        match chars.next() {
            None => return Ok(Record::Complete(fields)),
            Some(DELIMITER) => {}
            Some(c) => {
                return Err(format!(
                    "unexpected {:?} between closing quote and delimiter",
                    c
                ))
            }
        }
    }
}
