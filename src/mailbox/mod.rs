//! Reading digest messages out of an mbox archive.
//!
//! # Submodules
//!
//! - [`reader`]: opens the archive and frames it into messages, flagging structural defects
//! - [`body`]: finds and decodes each message's HTML part and reads its `Date` and `Message-ID`
//! - [`date`]: lenient RFC 2822 date parsing and `MMDDYYYY` formatting

pub mod body;
pub mod date;
pub mod reader;

pub use body::{MailboxSummary, extract_bodies};
pub use reader::MailboxArchive;
