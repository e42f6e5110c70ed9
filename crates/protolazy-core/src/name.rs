//! # Logical Module Names and Name/Path Translation
//!
//! A logical module name is the dotted identifier a host uses to request a
//! generated module, e.g. `a.b.Msg_pb2`. The final segment carries a
//! synthetic *kind suffix* that distinguishes the message module of a schema
//! (`_pb2`) from its service module (`_pb2_grpc`).
//!
//! ## Translation Directions
//!
//! [`NameTranslator`] owns three transforms, and they deliberately do not
//! share separator rules:
//!
//! | Function | Input | Splits on | Joins with |
//! |---|---|---|---|
//! | [`NameTranslator::name_to_path`] | logical name | `.` | OS path separator |
//! | [`NameTranslator::path_to_name`] | schema source path | OS path components | `.` |
//! | [`NameTranslator::generated_file_to_name`] | compiler output path | `/` only | `.` |
//!
//! Generated-file paths come from the compiler, which always emits
//! forward slashes regardless of the host OS. Source paths come from the
//! caller and follow the host OS. Collapsing the two rules breaks lookups of
//! nested packages on platforms whose separator is not `/`.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// File extension of source schema files.
pub const SCHEMA_EXTENSION: &str = "proto";

/// Suffix of message module names.
pub const MESSAGES_SUFFIX: &str = "_pb2";

/// Suffix of service module names.
pub const SERVICES_SUFFIX: &str = "_pb2_grpc";

/// Separator between logical name segments.
const NAME_SEPARATOR: char = '.';

/// Separator used in compiler-emitted generated-file paths.
const GENERATED_PATH_SEPARATOR: char = '/';

// ---------------------------------------------------------------------------
// ModuleKind
// ---------------------------------------------------------------------------

/// The two kinds of generated module a schema file produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Message and enum types (`<base>_pb2`).
    Messages,
    /// Service stubs (`<base>_pb2_grpc`).
    Services,
}

impl ModuleKind {
    /// Both kinds, in the order their finders are installed.
    pub const ALL: [ModuleKind; 2] = [ModuleKind::Messages, ModuleKind::Services];

    /// The suffix appended to the schema base name for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Messages => MESSAGES_SUFFIX,
            Self::Services => SERVICES_SUFFIX,
        }
    }

    /// Returns the kind identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Services => "services",
        }
    }

    /// A translator for this kind's suffix.
    pub fn translator(&self) -> NameTranslator {
        NameTranslator::new(self.suffix())
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LogicalModuleName
// ---------------------------------------------------------------------------

/// A validated dotted module name.
///
/// Non-empty, with no empty segments. Immutable after construction; used
/// as the compilation cache key and as the host registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LogicalModuleName(String);

impl LogicalModuleName {
    /// Validate and wrap a dotted module name.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty(name));
        }
        if name.split(NAME_SEPARATOR).any(str::is_empty) {
            return Err(NameError::EmptySegment(name));
        }
        Ok(Self(name))
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dotted segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(NAME_SEPARATOR)
    }

    /// The final segment (schema base name plus kind suffix).
    pub fn last_segment(&self) -> &str {
        self.0
            .rsplit(NAME_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// The dotted prefix, if the name has more than one segment.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind(NAME_SEPARATOR).map(|idx| &self.0[..idx])
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for LogicalModuleName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for LogicalModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LogicalModuleName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for LogicalModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LogicalModuleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LogicalModuleName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LogicalModuleName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// NameTranslator
// ---------------------------------------------------------------------------

/// Maps logical module names to schema paths and back for one kind suffix.
///
/// Pure string transforms, no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTranslator {
    suffix: String,
}

impl NameTranslator {
    /// Create a translator for an arbitrary suffix.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// The kind suffix this translator strips and appends.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Derive the relative schema path for a logical module name.
    ///
    /// `a.b.Msg_pb2` becomes `a/b/Msg.proto` (with the host's separator).
    ///
    /// # Errors
    ///
    /// Fails if the name has an empty segment, if its final segment does not
    /// end with this translator's suffix, if nothing remains once the
    /// suffix is stripped, or if a segment is not a plain file name
    /// (`/tmp/x/Evil_pb2`, `a\b.Msg_pb2`), so the path stays under its root.
    pub fn name_to_path(&self, name: &str) -> Result<PathBuf, NameError> {
        let name = LogicalModuleName::new(name)?;
        let last = name.last_segment();
        let base = last
            .strip_suffix(self.suffix.as_str())
            .ok_or_else(|| NameError::MissingSuffix {
                name: name.to_string(),
                suffix: self.suffix.clone(),
            })?;
        if base.is_empty() {
            return Err(NameError::EmptyBase(name.to_string()));
        }

        let mut path = PathBuf::new();
        if let Some(parent) = name.parent() {
            for segment in parent.split(NAME_SEPARATOR) {
                plain_segment(&name, segment)?;
                path.push(segment);
            }
        }
        plain_segment(&name, base)?;
        path.push(format!("{base}.{SCHEMA_EXTENSION}"));
        Ok(path)
    }

    /// Derive the logical module name for a relative schema source path.
    ///
    /// `a/b/Msg.proto` becomes `a.b.Msg_pb2` for the messages suffix. The
    /// path is split into OS path components; `.` components are ignored.
    ///
    /// # Errors
    ///
    /// Fails for absolute paths, paths containing `..`, non-UTF-8 paths,
    /// and paths with no file component.
    pub fn path_to_name(&self, path: &Path) -> Result<LogicalModuleName, NameError> {
        let display = path.display().to_string();
        let mut segments: Vec<&str> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| NameError::NonUtf8Path(display.clone()))?;
                    segments.push(part);
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(NameError::NotRelative(display));
                }
            }
        }

        let last = segments.pop().ok_or_else(|| NameError::Empty(display.clone()))?;
        let base = strip_extension(last);
        segments.push(base);

        let mut name = segments.join(".");
        name.push_str(&self.suffix);
        LogicalModuleName::new(name)
    }

    /// Derive the logical module name of a compiler-generated file.
    ///
    /// `a/b/Dep_pb2.py` becomes `a.b.Dep_pb2`. Splits on `/` only, whatever
    /// the host OS, and appends no suffix: generated file names already
    /// carry one.
    pub fn generated_file_to_name(path: &str) -> Result<LogicalModuleName, NameError> {
        let mut segments: Vec<&str> = path.split(GENERATED_PATH_SEPARATOR).collect();
        let last = match segments.pop() {
            Some(last) if !last.is_empty() => last,
            _ => return Err(NameError::Empty(path.to_string())),
        };
        segments.push(strip_extension(last));
        LogicalModuleName::new(segments.join("."))
    }
}

/// A segment must be exactly one normal path component with no separator
/// of any platform.
fn plain_segment(name: &LogicalModuleName, segment: &str) -> Result<(), NameError> {
    let mut components = Path::new(segment).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single_normal && !segment.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(NameError::SegmentNotPlain {
            name: name.to_string(),
            segment: segment.to_string(),
        })
    }
}

/// Strip the final extension from a file name.
///
/// Leading dots are part of the stem, so `.hidden` keeps its name.
fn strip_extension(file_name: &str) -> &str {
    let stem = file_name.trim_start_matches('.');
    let leading = file_name.len() - stem.len();
    match stem.rfind('.') {
        Some(idx) => &file_name[..leading + idx],
        None => file_name,
    }
}
