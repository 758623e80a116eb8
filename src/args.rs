use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Contains the commands passed to the program
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// A list of subcommands the program can perform
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates a new repository
    Init {
        /// Directory to create the repository in, the current one if not given
        directory: Option<PathBuf>,
    },

    /// Shows the content of an object
    CatFile {
        /// Hash of the object to pretty-print
        #[arg(short = 'p', value_name = "HASH")]
        hash: String,
    },

    /// Computes the hash of a file as a blob object
    HashObject {
        /// Also write the blob to the object store
        #[arg(short = 'w')]
        write: bool,
        /// File to hash
        path: OsString,
    },

    /// Lists the entries of a tree object
    LsTree {
        /// Only show entry names
        #[arg(long)]
        name_only: bool,
        /// Hash of the tree
        hash: String,
    },

    /// Creates tree objects from the current directory
    WriteTree,

    /// Creates a commit object pointing to a tree
    CommitTree {
        /// Hash of the tree the commit points to
        tree: String,
        /// Hash of the parent commit
        #[arg(short = 'p')]
        parent: Option<String>,
        /// Commit message
        #[arg(short = 'm', required = true)]
        message: String,
    },

    /// Clones a repository served over HTTP into a new directory
    Clone {
        /// Address of the remote repository
        url: String,
        /// Directory to clone into
        directory: PathBuf,
    },
}
