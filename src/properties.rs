//! `server.properties` document model.
//!
//! The file is a `KEY=VALUE`-per-line text resource. A parsed document keeps
//! every original line in order, classified as either an entry or an ignored
//! line (blank, `#` comment, or no `=` at all), so that a write can patch
//! single entries and leave the rest alone.
//!
//! Reading follows the panel's historical rules exactly:
//!
//! - the key is the text before the first `=` and may be empty (`=5`);
//! - the value is the text between the first and a second `=`; anything
//!   after a second `=` is not part of the value;
//! - duplicate keys are all reported, in file order.

use serde::{Deserialize, Serialize};

/// Name of the properties file inside a server's file store.
pub const PROPERTIES_FILE: &str = "server.properties";

/// One `key=value` pair as read from the file.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub key: String,
    pub value: String,
}

impl PropertyRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// How lines that are not entries are treated when a document is written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Only entry lines are written back; comments and blank lines are
    /// dropped. This is what panels built on the original endpoint expect.
    #[default]
    Compact,
    /// Every line is written back; only patched entries change.
    Preserve,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Line {
    Ignored(String),
    Entry {
        key: String,
        value: String,
        /// Line as stored, without the `\n` separator.
        raw: String,
        /// Set once `set` rewrote this entry.
        patched: bool,
    },
}

/// An ordered view over the lines of one properties file.
///
/// Built fresh from file content for every call and dropped afterwards.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertiesDocument {
    lines: Vec<Line>,
}

impl PropertiesDocument {
    /// Splits `content` on `\n` and classifies each line.
    pub fn parse(content: &str) -> Self {
        let lines = content.split('\n').map(classify).collect();
        Self { lines }
    }

    /// Entries in file order, duplicates included.
    pub fn records(&self) -> Vec<PropertyRecord> {
        self.lines.iter()
            .filter_map(|line| match line {
                Line::Entry { key, value, .. } => Some(PropertyRecord::new(key.as_str(), value.as_str())),
                Line::Ignored(_) => None,
            })
            .collect()
    }

    /// Last value stored for `key`, mirroring how a caller that folds the
    /// records into a map would see it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Replaces the value of every entry named `key`. Returns how many
    /// entries matched; a miss changes nothing and appends nothing.
    pub fn set(&mut self, key: &str, new_value: &str) -> usize {
        let mut matched = 0;
        for line in &mut self.lines {
            if let Line::Entry { key: k, value, patched, .. } = line {
                if k == key {
                    *value = new_value.to_owned();
                    *patched = true;
                    matched += 1;
                }
            }
        }
        matched
    }

    /// Renders the document as file content, lines joined with `\n`.
    ///
    /// Untouched lines are reproduced byte for byte. A patched entry is
    /// written as `key=value`, keeping a `\r` line ending if it had one.
    pub fn serialize(&self, policy: WritePolicy) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match line {
                Line::Ignored(raw) => {
                    if policy == WritePolicy::Preserve {
                        out.push(raw.clone());
                    }
                }
                Line::Entry { raw, patched: false, .. } => out.push(raw.clone()),
                Line::Entry { key, value, raw, patched: true } => {
                    let cr = if raw.ends_with('\r') { "\r" } else { "" };
                    out.push(format!("{key}={value}{cr}"));
                }
            }
        }
        out.join("\n")
    }
}

fn classify(raw: &str) -> Line {
    let text = raw.strip_suffix('\r').unwrap_or(raw);
    if text.is_empty() || text.starts_with('#') {
        return Line::Ignored(raw.to_owned());
    }
    let mut parts = text.split('=');
    let key = parts.next().unwrap_or_default();
    match parts.next() {
        Some(value) => Line::Entry {
            key: key.to_owned(),
            value: value.to_owned(),
            raw: raw.to_owned(),
            patched: false,
        },
        None => Line::Ignored(raw.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(doc: &PropertiesDocument) -> Vec<(String, String)> {
        doc.records().into_iter().map(|r| (r.key, r.value)).collect()
    }

    #[test]
    fn skips_comments_blanks_and_lines_without_separator() {
        let doc = PropertiesDocument::parse("a=1\n#comment\n\nb=2");
        assert_eq!(keys(&doc), vec![("a".into(), "1".into()), ("b".into(), "2".into())]);

        let doc = PropertiesDocument::parse("c\n=5\nmotd=");
        assert_eq!(keys(&doc), vec![("".into(), "5".into()), ("motd".into(), "".into())]);
    }

    #[test]
    fn value_stops_at_a_second_separator() {
        let doc = PropertiesDocument::parse("motd=a=b");
        assert_eq!(doc.records(), vec![PropertyRecord::new("motd", "a")]);
    }

    #[test]
    fn duplicate_keys_are_reported_and_last_one_wins_on_lookup() {
        let doc = PropertiesDocument::parse("pvp=true\npvp=false");
        assert_eq!(doc.records().len(), 2);
        assert_eq!(doc.get("pvp"), Some("false"));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn compact_write_drops_ignored_lines() {
        let mut doc = PropertiesDocument::parse("a=1\n#c\nb=2");
        assert_eq!(doc.set("b", "9"), 1);
        assert_eq!(doc.serialize(WritePolicy::Compact), "a=1\nb=9");
    }

    #[test]
    fn preserve_write_keeps_everything_but_the_patched_entry() {
        let content = "#Minecraft server properties\n\nmotd=x=y\nmax-players=20\n";
        let mut doc = PropertiesDocument::parse(content);
        assert_eq!(doc.serialize(WritePolicy::Preserve), content);

        doc.set("max-players", "40");
        assert_eq!(
            doc.serialize(WritePolicy::Preserve),
            "#Minecraft server properties\n\nmotd=x=y\nmax-players=40\n",
        );
    }

    #[test]
    fn patched_entry_drops_trailing_fragments() {
        let mut doc = PropertiesDocument::parse("motd=a=b\nlevel-name=world");
        doc.set("motd", "hello");
        assert_eq!(doc.serialize(WritePolicy::Compact), "motd=hello\nlevel-name=world");
    }

    #[test]
    fn missing_key_is_a_no_op() {
        let mut doc = PropertiesDocument::parse("a=1\nb=2");
        assert_eq!(doc.set("c", "3"), 0);
        assert_eq!(doc.serialize(WritePolicy::Compact), "a=1\nb=2");
    }

    #[test]
    fn every_duplicate_is_patched() {
        let mut doc = PropertiesDocument::parse("pvp=true\nx=1\npvp=true");
        assert_eq!(doc.set("pvp", "false"), 2);
        assert_eq!(doc.serialize(WritePolicy::Compact), "pvp=false\nx=1\npvp=false");
    }

    #[test]
    fn crlf_endings_stay_out_of_values() {
        let mut doc = PropertiesDocument::parse("a=1\r\nb=2\r\n");
        assert_eq!(doc.get("a"), Some("1"));
        doc.set("a", "5");
        assert_eq!(doc.serialize(WritePolicy::Preserve), "a=5\r\nb=2\r\n");
    }
}
