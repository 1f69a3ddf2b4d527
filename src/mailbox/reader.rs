//! mbox archive reading.
//!
//! [`MailboxArchive::open`] performs the existence and readability checks up
//! front, then [`MailboxArchive::messages`] streams the archive one message at
//! a time. The mbox framing (`From ` separator lines) is handled by
//! `mail-parser`; every message is then scanned for top-level structural
//! defects so the body extractor can skip it without attempting a MIME parse.

use mail_parser::mailbox::mbox::MessageIterator;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};

/// A structural problem found in a message's top-level framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    /// The header block starts with a folded (whitespace-prefixed) line.
    FirstHeaderLineIsContinuation,
    /// A line inside the header block is neither a header nor a continuation.
    MissingHeaderBodySeparator,
    /// `multipart/*` content type without a `boundary` parameter.
    MultipartWithoutBoundary,
    /// The declared boundary never opens a body part.
    StartBoundaryNotFound(String),
    /// The declared boundary is never closed.
    CloseBoundaryNotFound(String),
    /// The archive could not be read at this message.
    ReadError(String),
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defect::FirstHeaderLineIsContinuation => {
                write!(f, "first header line is a continuation")
            }
            Defect::MissingHeaderBodySeparator => write!(f, "missing header/body separator"),
            Defect::MultipartWithoutBoundary => write!(f, "multipart message without boundary"),
            Defect::StartBoundaryNotFound(b) => write!(f, "start boundary {b:?} not found"),
            Defect::CloseBoundaryNotFound(b) => write!(f, "close boundary {b:?} not found"),
            Defect::ReadError(e) => write!(f, "read error: {e}"),
        }
    }
}

/// One message of the archive, as framed by the mbox separator lines.
#[derive(Debug, Clone)]
pub struct ArchiveMessage {
    /// Position in the archive, counting from 0.
    pub key: usize,
    /// Unfolded top-level headers in order of appearance.
    pub headers: Vec<(String, String)>,
    /// The complete RFC 5322 message.
    pub raw: Vec<u8>,
    /// Structural defects; empty for a well-formed message.
    pub defects: Vec<Defect>,
}

impl ArchiveMessage {
    /// Scan raw message bytes for headers and structural defects.
    pub fn from_raw(key: usize, raw: Vec<u8>) -> Self {
        let text = String::from_utf8_lossy(&raw);
        let block = scan_header_block(&text);
        let mut defects = block.defects;
        defects.extend(multipart_defects(&block.headers, block.body));
        let headers = block.headers;
        Self {
            key,
            headers,
            raw,
            defects,
        }
    }

    fn unreadable(key: usize, reason: String) -> Self {
        Self {
            key,
            headers: Vec::new(),
            raw: Vec::new(),
            defects: vec![Defect::ReadError(reason)],
        }
    }

    /// First value of the named header; names compare case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An mbox file that passed the existence and readability checks.
#[derive(Debug)]
pub struct MailboxArchive {
    path: PathBuf,
}

impl MailboxArchive {
    /// Check that `path` names a readable regular file.
    ///
    /// The check runs before any reading so that a typo in the path is
    /// reported as such instead of surfacing as an empty archive.
    ///
    /// # Errors
    ///
    /// - [`Error::MailboxNotFound`] if the path is missing or not a file
    /// - [`Error::MailboxUnreadable`] if the file cannot be opened for reading
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(Error::MailboxNotFound(path.to_path_buf())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::MailboxNotFound(path.to_path_buf()));
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(Error::MailboxUnreadable(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }
        File::open(path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => Error::MailboxUnreadable(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        info!("Opened mailbox archive");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate the archive from the start.
    ///
    /// Each call opens a fresh handle, so the archive can be walked any
    /// number of times. The handle is released as soon as the iterator is
    /// exhausted.
    pub fn messages(&self) -> Result<Messages> {
        let file = File::open(&self.path)?;
        Ok(Messages {
            inner: Some(MessageIterator::new(BufReader::new(file))),
            next_key: 0,
        })
    }
}

/// Lazy iterator over the messages of a [`MailboxArchive`].
pub struct Messages {
    inner: Option<MessageIterator<BufReader<File>>>,
    next_key: usize,
}

impl Messages {
    fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!(messages = self.next_key, "Mailbox archive closed");
        }
    }
}

impl Iterator for Messages {
    type Item = ArchiveMessage;

    fn next(&mut self) -> Option<ArchiveMessage> {
        let next = self.inner.as_mut()?.next();
        let key = self.next_key;
        match next {
            Some(Ok(message)) => {
                self.next_key += 1;
                Some(ArchiveMessage::from_raw(key, message.contents().to_vec()))
            }
            Some(Err(err)) => {
                // a failed read leaves the stream position unknown; stop here
                self.next_key += 1;
                self.close();
                Some(ArchiveMessage::unreadable(key, format!("{err:?}")))
            }
            None => {
                self.close();
                None
            }
        }
    }
}

struct HeaderBlock<'a> {
    headers: Vec<(String, String)>,
    body: &'a str,
    defects: Vec<Defect>,
}

/// Split a message into unfolded headers and body.
///
/// The header block ends at the first empty line. A line that is neither a
/// `name: value` header nor a continuation also ends it, and is kept as the
/// first line of the body.
fn scan_header_block(text: &str) -> HeaderBlock<'_> {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut defects = Vec::new();
    let mut body_start = text.len();
    let mut offset = 0;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let content = line.trim_end_matches(['\r', '\n']);
        if content.is_empty() {
            body_start = offset + line.len();
            break;
        }
        if content.starts_with([' ', '\t']) {
            match headers.last_mut() {
                Some((_, value)) => value.push_str(content),
                None if index == 0 => defects.push(Defect::FirstHeaderLineIsContinuation),
                None => {}
            }
        } else if let Some((name, value)) = split_header(content) {
            headers.push((name.to_string(), value.to_string()));
        } else {
            defects.push(Defect::MissingHeaderBodySeparator);
            body_start = offset;
            break;
        }
        offset += line.len();
    }

    for (_, value) in headers.iter_mut() {
        *value = value.trim().to_string();
    }

    HeaderBlock {
        headers,
        body: &text[body_start..],
        defects,
    }
}

/// `name: value`, where the name is printable ASCII without spaces or colons.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let valid = !name.is_empty() && name.bytes().all(|b| (b'!'..=b'~').contains(&b));
    valid.then_some((name, value))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Value of a `;`-separated parameter of a structured header, unquoted.
fn header_param<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .split(';')
        .skip(1)
        .find_map(|param| {
            let (key, val) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| val.trim().trim_matches('"'))
        })
        .filter(|v| !v.is_empty())
}

fn multipart_defects(headers: &[(String, String)], body: &str) -> Vec<Defect> {
    let Some(content_type) = find_header(headers, "content-type") else {
        return Vec::new();
    };
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if !mime.to_ascii_lowercase().starts_with("multipart/") {
        return Vec::new();
    }
    let Some(boundary) = header_param(content_type, "boundary") else {
        return vec![Defect::MultipartWithoutBoundary];
    };

    let delimiter = format!("--{boundary}");
    let close = format!("--{boundary}--");
    let mut opened = false;
    let mut closed = false;
    for line in body.lines().map(str::trim_end) {
        if line == close {
            closed = true;
        } else if line == delimiter {
            opened = true;
        }
    }

    if !opened {
        vec![Defect::StartBoundaryNotFound(boundary.to_string())]
    } else if !closed {
        vec![Defect::CloseBoundaryNotFound(boundary.to_string())]
    } else {
        Vec::new()
    }
}
