//! Commit payloads: the header lines plus the message.

mod commit_user;
#[allow(clippy::module_inception)]
mod commit;

pub use commit::*;
pub use commit_user::*;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Keys of the commit header lines.
pub const TREE_STR: &str = "tree";
pub const PARENT_STR: &str = "parent";
pub const AUTHOR_STR: &str = "author";
pub const COMMITTER_STR: &str = "committer";
/// `+0200`, `-0530`
const TIMEZONE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[offset_hour sign:mandatory][offset_minute]");
