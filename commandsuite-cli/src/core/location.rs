use anyhow::{anyhow, Result};
use commandsuite::{Position, Range};
use std::path::PathBuf;

/// A position inside a file given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file_path: PathBuf,
    pub position: Position,
}

/// Parse location strings in the format "file:line:column" or "file:line".
///
/// The numbers are taken from the right so drive letters survive.
pub fn parse_location(location_str: &str) -> Result<Location> {
    let parts: Vec<&str> = location_str.rsplitn(3, ':').collect();

    match parts.as_slice() {
        [column, line, file] if column.parse::<usize>().is_ok() => Ok(Location {
            file_path: PathBuf::from(file),
            position: Position::new(parse_number(line, "line")?, parse_number(column, "column")?),
        }),
        [line, rest @ ..] if !rest.is_empty() && line.parse::<usize>().is_ok() => {
            // file:line format
            let file = location_str
                .rsplit_once(':')
                .map(|(file, _)| file)
                .unwrap_or_default();
            Ok(Location {
                file_path: PathBuf::from(file),
                position: Position::new(parse_number(line, "line")?, 1),
            })
        }
        _ => Err(anyhow!(
            "Invalid location format: '{}'. Expected 'file:line' or 'file:line:column'",
            location_str
        )),
    }
}

/// Parse a selection in the format "line:column-line:column"
pub fn parse_selection(selection_str: &str) -> Result<Range> {
    let (start, end) = selection_str.split_once('-').ok_or_else(|| {
        anyhow!(
            "Invalid selection format: '{}'. Expected 'line:column-line:column'",
            selection_str
        )
    })?;
    let start = parse_position(start)?;
    let end = parse_position(end)?;
    if end < start {
        return Err(anyhow!("Selection end {} is before its start {}", end, start));
    }

    Ok(Range { start, end })
}

fn parse_position(position_str: &str) -> Result<Position> {
    let (line, column) = position_str
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid position: '{}'. Expected 'line:column'", position_str))?;
    Ok(Position::new(
        parse_number(line, "line")?,
        parse_number(column, "column")?,
    ))
}

fn parse_number(value: &str, what: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(anyhow!("Invalid {} number: {} (numbering starts at 1)", what, value)),
        Ok(n) => Ok(n),
        Err(_) => Err(anyhow!("Invalid {} number: {}", what, value)),
    }
}
