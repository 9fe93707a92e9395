use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use mgit::areas::config::Config;
use mgit::areas::repository::Repository;
use mgit::commands::porcelain::log::LogOptions;
use mgit::commands::porcelain::merge::{MergeOptions, MergeOutcome};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "MGIT_LOG";

#[derive(Parser)]
#[command(
    name = "mgit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A minimal content-addressed version-control engine",
    long_about = "mgit stores file snapshots as content-addressed objects, \
    tracks history through commits and branches, \
    and reconciles diverged branches with three-way merges.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "rm", about = "Stage the removal of tracked files")]
    Rm {
        #[arg(long, help = "Keep the files in the working copy")]
        cached: bool,
        #[arg(index = 1, required = true, help = "Files or directories to remove")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message. \
        While a merge is in progress the message may be omitted to use the recorded merge message."
    )]
    Commit {
        #[arg(short, long, default_value = "", help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Give the output in a stable, short format")]
        porcelain: bool,
    },
    #[command(
        name = "diff",
        about = "Show line changes",
        long_about = "Without arguments, shows working changes against the staged content. \
        With one path, compares it against HEAD; with two, compares the two files."
    )]
    Diff {
        #[arg(long, help = "Show staged changes against HEAD instead")]
        cached: bool,
        #[arg(index = 1, num_args = 0..=2, help = "One file to compare with HEAD, or two files")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "log", about = "Show the first-parent commit history")]
    Log {
        #[arg(index = 1, help = "Revision to start from (defaults to HEAD)")]
        revision: Option<String>,
        #[arg(long, help = "Show each commit on a single line")]
        oneline: bool,
        #[arg(long, help = "Abbreviate commit ids")]
        abbrev_commit: bool,
    },
    #[command(
        name = "branch",
        about = "List or create branches",
        long_about = "Without a name, lists the branches and marks the current one. \
        With a name, creates a branch at the start revision, or at HEAD."
    )]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, requires = "name", help = "Revision the branch starts at")]
        start: Option<String>,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or detach HEAD at a commit",
        long_about = "This command updates the working copy to the target revision. \
        A branch name keeps HEAD attached to the branch; any other revision detaches it."
    )]
    Checkout {
        #[arg(index = 1, help = "Branch name or revision")]
        target: String,
    },
    #[command(name = "merge", about = "Merge another branch into the current one")]
    Merge {
        #[arg(index = 1, required_unless_present = "abort", help = "Branch or revision to merge")]
        target: Option<String>,
        #[arg(short, long, help = "Message of the merge commit")]
        message: Option<String>,
        #[arg(long, help = "Merge histories that share no commit against an empty base")]
        allow_unrelated_histories: bool,
        #[arg(long, conflicts_with = "target", help = "Abandon the unfinished merge")]
        abort: bool,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the id (or an unambiguous prefix) of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object id to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command hashes a file as a blob and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_repository(cwd: &Path) -> Result<Repository> {
    let repository = Repository::discover(cwd)?;

    Ok(repository.with_writer(Box::new(std::io::stdout())))
}

/// Paths on the command line are relative to the current directory
fn absolutize(cwd: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|path| cwd.join(path)).collect()
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?
        .canonicalize()
        .context("cannot resolve the current directory")?;

    match cli.command {
        Commands::Init { path } => {
            let path = path.map(|path| cwd.join(path)).unwrap_or_else(|| cwd.clone());
            let repository = Repository::init(&path, Config::default())?
                .with_writer(Box::new(std::io::stdout()));

            repository.report_initialized()?;
        }
        Commands::Add { paths } => {
            let repository = open_repository(&cwd)?;
            repository.stage(&absolutize(&cwd, &paths))?;
        }
        Commands::Rm { cached, paths } => {
            let repository = open_repository(&cwd)?;
            repository.remove(&absolutize(&cwd, &paths), cached)?;
        }
        Commands::Commit { message } => {
            open_repository(&cwd)?.commit(&message)?;
        }
        Commands::Status { porcelain } => {
            open_repository(&cwd)?.status(porcelain)?;
        }
        Commands::Diff { cached, paths } => {
            let repository = open_repository(&cwd)?;
            let paths = absolutize(&cwd, &paths);

            match paths.as_slice() {
                [] => repository.diff(cached)?,
                [path] => {
                    let label = repository.workspace().normalize(path)?;
                    let edits = repository.diff_head(path)?;
                    repository.print_diff(&label, &label, &edits)?;
                }
                [a, b, ..] => {
                    let a_label = repository.workspace().normalize(a)?;
                    let b_label = repository.workspace().normalize(b)?;
                    let edits = repository.diff_files(a, b)?;
                    repository.print_diff(&a_label, &b_label, &edits)?;
                }
            }
        }
        Commands::Log {
            revision,
            oneline,
            abbrev_commit,
        } => {
            let opts = LogOptions {
                oneline,
                abbrev_commit,
            };
            open_repository(&cwd)?.log(revision.as_deref(), &opts)?;
        }
        Commands::Branch { name, start } => {
            let repository = open_repository(&cwd)?;
            match name {
                Some(name) => {
                    repository.create_branch(&name, start.as_deref())?;
                }
                None => repository.list_branches()?,
            }
        }
        Commands::Checkout { target } => {
            open_repository(&cwd)?.checkout(&target)?;
        }
        Commands::Merge {
            target,
            message,
            allow_unrelated_histories,
            abort,
        } => {
            let repository = open_repository(&cwd)?;

            if abort {
                repository.abort_merge()?;
                return Ok(ExitCode::SUCCESS);
            }

            let target = target.context("a merge target is required")?;
            let options = MergeOptions {
                message,
                allow_unrelated_histories,
            };

            if let MergeOutcome::Conflicts(_) = repository.merge(&target, &options)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CatFile { sha } => {
            open_repository(&cwd)?.cat_file(&sha)?;
        }
        Commands::HashObject { write, file } => {
            open_repository(&cwd)?.hash_object(&cwd.join(file), write)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    init_tracing();
    colored::control::set_override(std::io::stdout().is_terminal());

    run(Cli::parse())
}
