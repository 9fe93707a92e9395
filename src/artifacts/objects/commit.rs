//! Commit object
//!
//! Commits are immutable snapshots. They contain:
//! - Parent commit ID(s): none for a root, one for a regular commit, two for a merge
//! - Author and committer information
//! - The complete file manifest (path -> blob id)
//! - The commit message
//!
//! ## Format
//!
//! Every field is tagged and free-form values are length-prefixed, so the record can be
//! decoded without scanning for separators:
//!
//! ```text
//! commit <size>\0
//! parent <parent-id>
//! author <name> <<email>> <timestamp> <timezone>
//! committer <name> <<email>> <timestamp> <timezone>
//! manifest <count>
//! <blob-id> <path-len> <path>
//! message <message-len>
//! <message>
//! ```

use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::{BufRead, Read, Write};

const AUTHOR_NAME_VAR: &str = "MGIT_AUTHOR_NAME";
const AUTHOR_EMAIL_VAR: &str = "MGIT_AUTHOR_EMAIL";
const AUTHOR_DATE_VAR: &str = "MGIT_AUTHOR_DATE";

/// Author or committer information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// String in format "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load author information from environment variables
    ///
    /// Reads MGIT_AUTHOR_NAME, MGIT_AUTHOR_EMAIL, and optionally MGIT_AUTHOR_DATE.
    /// Returns `None` unless both name and email are set.
    pub fn load_from_env() -> Option<Self> {
        let name = std::env::var(AUTHOR_NAME_VAR).ok()?;
        let email = std::env::var(AUTHOR_EMAIL_VAR).ok()?;
        let timestamp = std::env::var(AUTHOR_DATE_VAR).ok().and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Some(Author::new_with_timestamp(name, email, ts)),
            None => Some(Author::new(name, email)),
        }
    }

    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::corrupt("author line", format!("{reason}: {value}"));

        // Format: "name <email> timestamp timezone"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(invalid("missing fields"));
        }

        let offset = parse_offset(parts[0]).ok_or_else(|| invalid("invalid timezone"))?;
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| invalid("invalid timestamp"))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| invalid("missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| invalid("missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| invalid("timestamp out of range"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if zone.len() != 5 {
        return None;
    }

    let sign = match &zone[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours = zone[1..3].parse::<i32>().ok()?;
    let minutes = zone[3..5].parse::<i32>().ok()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Slim representation of a commit
///
/// Contains only what ancestry searches need.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    /// Parents in stored order, first parent first
    pub parents: Vec<ObjectId>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for a root commit, two for a merge commit)
    parents: Vec<ObjectId>,
    author: Author,
    committer: Author,
    manifest: Manifest,
    message: String,
}

impl Commit {
    /// Create a new commit; the author doubles as committer
    pub fn new(
        parents: Vec<ObjectId>,
        manifest: Manifest,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            author: author.clone(),
            committer: author,
            manifest,
            message,
        }
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, followed by history walks
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.author.timestamp()
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
        }
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut parents = Vec::new();
        let mut line = read_line(&mut reader)?;

        while let Some(parent_oid) = line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid)?);
            line = read_line(&mut reader)?;
        }

        let author = line
            .strip_prefix("author ")
            .ok_or_else(|| Error::corrupt("commit", "missing author line"))?;
        let author = Author::try_from(author)?;

        let committer = read_line(&mut reader)?;
        let committer = committer
            .strip_prefix("committer ")
            .ok_or_else(|| Error::corrupt("commit", "missing committer line"))?;
        let committer = Author::try_from(committer)?;

        let manifest_line = read_line(&mut reader)?;
        let count = tagged_length(&manifest_line, "manifest ")?;

        let mut manifest = Manifest::new();
        for _ in 0..count {
            let oid = ObjectId::try_parse(read_field(&mut reader, b' ')?)?;
            let path_len = read_field(&mut reader, b' ')?
                .parse::<usize>()
                .map_err(|_| Error::corrupt("commit", "invalid manifest path length"))?;
            let path = String::from_utf8(read_exact(&mut reader, path_len)?)
                .map_err(|_| Error::corrupt("commit", "manifest path is not utf-8"))?;

            if read_exact(&mut reader, 1)? != b"\n" {
                return Err(Error::corrupt("commit", "unterminated manifest entry"));
            }

            manifest.insert(path, oid);
        }

        let message_line = read_line(&mut reader)?;
        let message_len = tagged_length(&message_line, "message ")?;
        let message = String::from_utf8(read_exact(&mut reader, message_len)?)
            .map_err(|_| Error::corrupt("commit", "message is not utf-8"))?;

        Ok(Commit {
            parents,
            author,
            committer,
            manifest,
            message,
        })
    }
}

fn read_line(reader: &mut impl BufRead) -> Result<String> {
    let line = read_field(reader, b'\n')?;
    Ok(line)
}

fn read_field(reader: &mut impl BufRead, delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    reader
        .read_until(delimiter, &mut buffer)
        .map_err(|e| Error::corrupt("commit", e.to_string()))?;

    if buffer.pop() != Some(delimiter) {
        return Err(Error::corrupt("commit", "unexpected end of record"));
    }

    String::from_utf8(buffer).map_err(|_| Error::corrupt("commit", "field is not utf-8"))
}

fn read_exact(reader: &mut impl Read, len: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0; len];
    reader
        .read_exact(&mut buffer)
        .map_err(|_| Error::corrupt("commit", "unexpected end of record"))?;
    Ok(buffer)
}

fn tagged_length(line: &str, tag: &str) -> Result<usize> {
    line.strip_prefix(tag)
        .and_then(|len| len.parse::<usize>().ok())
        .ok_or_else(|| Error::corrupt("commit", format!("expected '{}<n>', got '{line}'", tag)))
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        for (path, oid) in self.manifest.iter() {
            lines.push(format!("{oid} {path}"));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }

    fn payload(&self) -> Result<Bytes> {
        let mut content = Vec::new();

        for parent in &self.parents {
            writeln!(content, "parent {parent}")?;
        }
        writeln!(content, "author {}", self.author.display())?;
        writeln!(content, "committer {}", self.committer.display())?;
        writeln!(content, "manifest {}", self.manifest.len())?;
        for (path, oid) in self.manifest.iter() {
            writeln!(content, "{oid} {} {path}", path.len())?;
        }
        writeln!(content, "message {}", self.message.len())?;
        content.write_all(self.message.as_bytes())?;

        Ok(Bytes::from(content))
    }
}
