//! Argument parsing and command execution.

use std::io::Write;

use record_store::{AdditionalInfo, Persisted, Record, RecordStore};
use serde_json::{Value, json};
use tracing::debug;

use crate::Error;

pub const USAGE: &str = "\
Modes:
  demo                            - Add two sample contacts and search for John (default)
  add <phone> <name> [key=value]  - Add a contact
  remove <id>                     - Remove contacts with this id
  find <query>                    - Search phone numbers and names
  list                            - Print every contact";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Demo,
    Add {
        phone_number: String,
        name: String,
        info: AdditionalInfo,
    },
    Remove {
        id: String,
    },
    Find {
        query: String,
    },
    List,
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Self, Error> {
        let mode = args.first().map(String::as_str).unwrap_or("demo");
        let rest = args.get(1..).unwrap_or_default();

        match (mode, rest) {
            ("demo", []) => Ok(Command::Demo),
            ("add", [phone_number, name, info @ ..]) => Ok(Command::Add {
                phone_number: phone_number.clone(),
                name: name.clone(),
                info: parse_info(info)?,
            }),
            ("remove", [id]) => Ok(Command::Remove { id: id.clone() }),
            ("find", [query]) => Ok(Command::Find {
                query: query.clone(),
            }),
            ("list", []) => Ok(Command::List),
            ("demo" | "add" | "remove" | "find" | "list", _) => {
                Err(Error::Usage(format!("wrong arguments for {}", mode)))
            }
            _ => Err(Error::Usage(format!("unknown mode: {}", mode))),
        }
    }
}

/// Parses `key=value` pairs. Values that are valid JSON keep their type,
/// anything else is taken as a string.
pub fn parse_info(pairs: &[String]) -> Result<AdditionalInfo, Error> {
    let mut info = AdditionalInfo::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| Error::InvalidInfo(pair.clone()))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        info.insert(key.to_string(), value);
    }
    Ok(info)
}

/// Runs `command` against `store`, writing results to `out`.
///
/// A mutation whose save failed is printed first and then reported as an
/// error.
pub async fn run<W: Write>(
    store: &RecordStore,
    command: Command,
    out: &mut W,
) -> Result<(), Error> {
    debug!(?command, location = %store.location(), "running command");

    match command {
        Command::Demo => {
            let samples = [
                ("+6281234567890", "John Doe", "mobile"),
                ("+622187654321", "Jane Smith", "office"),
            ];
            for (phone_number, name, kind) in samples {
                let mut info = AdditionalInfo::new();
                info.insert("type".to_string(), json!(kind));
                let added = store.add(phone_number, name, Some(info)).await?;
                let record = report_added(added, out)?.into_value();
                debug!(id = %record.id, "added sample contact");
            }

            writeln!(out, "Search results:")?;
            print_records(&store.find("John"), out)?;
        }
        Command::Add {
            phone_number,
            name,
            info,
        } => {
            let added = store.add(phone_number, name, Some(info)).await?;
            report_added(added, out)?.into_result()?;
        }
        Command::Remove { id } => {
            let removed = store.remove(&id).await;
            writeln!(out, "removed {} record(s)", removed.value)?;
            removed.into_result()?;
        }
        Command::Find { query } => print_records(&store.find(&query), out)?,
        Command::List => print_records(&store.records(), out)?,
    }

    Ok(())
}

fn report_added<W: Write>(
    added: Persisted<Record>,
    out: &mut W,
) -> Result<Persisted<Record>, Error> {
    writeln!(out, "{}", serde_json::to_string_pretty(&added.value)?)?;
    if let Some(e) = added.outcome.error() {
        writeln!(out, "warning: not saved: {}", e)?;
    }
    Ok(added)
}

fn print_records<W: Write>(records: &[Record], out: &mut W) -> Result<(), Error> {
    writeln!(out, "{}", serde_json::to_string_pretty(records)?)?;
    Ok(())
}
