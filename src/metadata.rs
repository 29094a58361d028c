//! Dataset metadata input: from a JSON file or typed in interactively.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde_json::Value;

use crate::entity::{value_kind, EntityBuilder, Field};
use crate::error::PublishError;

/// Reads a metadata document. The file must hold a single JSON object,
/// which is later sent unmodified as the dataset-creation body.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or its
/// top-level value is not an object.
pub fn load_metadata(path: &Path) -> Result<Value, PublishError> {
    let file = File::open(path).map_err(PublishError::Io)?;
    let reader = BufReader::new(file);

    let value: Value =
        serde_json::from_reader(reader).map_err(|source| PublishError::MetadataParse {
            path: path.to_path_buf(),
            source,
        })?;

    if !value.is_object() {
        return Err(PublishError::NotAnObject {
            found: value_kind(&value),
        });
    }
    Ok(value)
}

/// Prompts for a collection id (unless one is given) and for metadata
/// entries as `key=value` lines, ending at an empty line or end of input.
///
/// Values are parsed as JSON when possible (`size=3`, `open=true`,
/// `tags=["a","b"]`) and kept as plain text otherwise.
pub fn prompt_for_metadata<R, W>(
    input: &mut R,
    output: &mut W,
    collection_id: Option<&str>,
) -> Result<(String, Value), PublishError>
where
    R: BufRead,
    W: Write,
{
    let collection_id = match collection_id {
        Some(id) => id.to_string(),
        None => {
            write!(output, "Collection id: ")?;
            output.flush()?;
            let line = read_line(input)?.unwrap_or_default();
            if line.is_empty() {
                return Err(PublishError::precondition(
                    "a collection id is required to create a dataset",
                ));
            }
            line
        }
    };

    writeln!(output, "Enter metadata as key=value, one per line; finish with an empty line.")?;

    let mut builder = EntityBuilder::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            break;
        };
        if line.is_empty() {
            break;
        }

        let Some((key, raw_value)) = line.split_once('=') else {
            writeln!(output, "Ignoring '{line}': expected key=value")?;
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            writeln!(output, "Ignoring '{line}': empty key")?;
            continue;
        }

        builder = builder.field(key, parse_value(raw_value.trim()));
    }

    Ok((collection_id, builder.build()?.to_value()))
}

fn parse_value(raw: &str) -> Field {
    serde_json::from_str::<Value>(raw)
        .map(Field::from)
        .unwrap_or_else(|_| Field::from(raw))
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, PublishError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
