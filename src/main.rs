#![allow(dead_code)]

use anyhow::Result;
use areas::repository::Repository;
use clap::{Parser, Subcommand};

mod areas;
mod artifacts;
mod commands;
mod error;

#[derive(Parser)]
#[command(
    name = "wyag",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A minimal, inspection-oriented content-addressed version control store",
    long_about = "An on-disk-compatible reimplementation of a content-addressed \
    version control object store: object database, reference layer, and revision \
    resolver, driven by a small set of plumbing commands.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to initialize (default: current directory)")]
        path: Option<String>,
    },
    #[command(name = "cat-file", about = "Print an object's payload or kind")]
    CatFile {
        #[arg(short = 't', long = "type", help = "Print the object's kind instead of its payload")]
        show_type: bool,
        #[arg(index = 1, help = "Object kind (blob, tree, commit, tag), or the object itself with -t")]
        kind_or_object: String,
        #[arg(index = 2, help = "The object to inspect")]
        object: Option<String>,
    },
    #[command(name = "hash-object", about = "Compute (and optionally store) an object id for a file")]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', long = "type", help = "Kind to claim for the file's content")]
        kind: Option<String>,
        #[arg(index = 1, help = "The file to hash")]
        file: String,
    },
    #[command(name = "log", about = "Emit a graphviz digraph of commit ancestry")]
    Log {
        #[arg(index = 1, help = "The commit to start from")]
        commit: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(short = 'r', long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, help = "The tree-ish to list")]
        tree_ish: String,
    },
    #[command(name = "checkout", about = "Materialize a commit or tree into a directory")]
    Checkout {
        #[arg(index = 1, help = "The commit or tree to materialize")]
        target: String,
        #[arg(index = 2, help = "Destination directory (must be absent or empty)")]
        dest: String,
    },
    #[command(name = "show-ref", about = "List every reference with its resolved id")]
    ShowRef,
    #[command(name = "tag", about = "List tags, or create a lightweight or annotated tag")]
    Tag {
        #[arg(short = 'a', long, help = "Create an annotated tag")]
        annotate: bool,
        #[arg(short = 'm', long, help = "Message for an annotated tag")]
        message: Option<String>,
        #[arg(index = 1, help = "Name of the tag to create")]
        name: Option<String>,
        #[arg(index = 2, help = "Object to tag (default: HEAD)")]
        object: Option<String>,
    },
    #[command(name = "branch", about = "List branches, or create one at a startpoint")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, help = "Startpoint for the new branch (default: HEAD)")]
        startpoint: Option<String>,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to an object id")]
    RevParse {
        #[arg(long = "wyag-type", help = "Follow to this object kind")]
        kind: Option<String>,
        #[arg(index = 1, help = "The revision to resolve")]
        name: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => commands::init::run(path.as_deref())?,
        Commands::CatFile { show_type, kind_or_object, object } => {
            let repo = open_repository()?;
            if *show_type {
                commands::cat_file::run(&repo, None, true, kind_or_object)?
            } else {
                let object = object
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("cat-file <type> <object> requires both arguments"))?;
                commands::cat_file::run(&repo, Some(kind_or_object.as_str()), false, object)?
            }
        }
        Commands::HashObject { write, kind, file } => {
            let repo = open_repository()?;
            commands::hash_object::run(&repo, *write, kind.as_deref(), std::path::Path::new(file))?
        }
        Commands::Log { commit } => {
            let repo = open_repository()?;
            commands::log::run(&repo, commit)?
        }
        Commands::LsTree { recursive, tree_ish } => {
            let repo = open_repository()?;
            commands::ls_tree::run(&repo, *recursive, tree_ish)?
        }
        Commands::Checkout { target, dest } => {
            let repo = open_repository()?;
            commands::checkout::run(&repo, target, std::path::Path::new(dest))?
        }
        Commands::ShowRef => {
            let repo = open_repository()?;
            commands::show_ref::run(&repo)?
        }
        Commands::Tag { annotate, message, name, object } => {
            let repo = open_repository()?;
            commands::tag::run(&repo, *annotate, name.as_deref(), object.as_deref(), message.clone())?
        }
        Commands::Branch { name, startpoint } => {
            let repo = open_repository()?;
            commands::branch::run(&repo, name.as_deref(), startpoint.as_deref())?
        }
        Commands::RevParse { kind, name } => {
            let repo = open_repository()?;
            commands::rev_parse::run(&repo, kind.as_deref(), name)?
        }
    }

    Ok(())
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::discover(&pwd, Box::new(std::io::stdout()))
}
