use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VerseDeck - lyric and scripture slide composer
#[derive(Parser, Debug)]
#[command(name = "versedeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a session file and print its slides
    Inspect {
        /// Session JSON file
        session: PathBuf,
    },

    /// Print the largest font size at which text fits
    Fit {
        /// One argument per line; several lines are fitted as a stanza
        #[arg(required = true)]
        lines: Vec<String>,

        /// Available width (defaults to the padded canvas width)
        #[arg(long)]
        width: Option<f64>,

        /// Available height for stanzas (defaults to the padded canvas height)
        #[arg(long)]
        height: Option<f64>,

        /// Font family (defaults to the configured family)
        #[arg(long)]
        family: Option<String>,

        /// Use approximate widths instead of shaping with real fonts
        #[arg(long)]
        approximate: bool,
    },

    /// Lay out a verse list, one slide per verse
    Psalms {
        /// JSON array of {verse, telugu, english}
        verses: PathBuf,

        /// Presentation name stored in the session
        #[arg(long, default_value = "")]
        name: String,

        /// Write the session here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Upload a session's slides to the backend
    Push {
        /// Session JSON file; updated in place with the new sync state
        session: PathBuf,

        /// Directory holding one `<slide-id>.png` per slide
        #[arg(long, value_name = "DIR")]
        images: PathBuf,

        /// Backend base URL
        #[arg(long, env = "VERSEDECK_API")]
        api: Option<String>,

        /// Register the presentation before uploading
        #[arg(long)]
        create: bool,
    },

    /// Keep a session file as the local draft
    Save {
        /// Session JSON file
        session: PathBuf,
    },

    /// Show the local draft, optionally writing it out
    Resume {
        /// Export the draft to this file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Delete the local draft
    Discard,
}
