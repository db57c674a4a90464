use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use colored::Colorize;
use resilient_patcher::diff::diff_lines;
use resilient_patcher::persist::CommitResult;
use resilient_patcher::{
    generate_search_replace_diff_lines, load_from_path, validate_creating_for_multi_edit,
    validate_multi_edit, validate_single_edit, DiffLine, DiffLineKind, EditOperation, ErrorReason,
    FilePlan, FileSnapshot, Matcher, PatchError, SearchMatch, WorkspaceGuard,
};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RESILIENT_PATCHER_LOG";
const WORKSPACE_ENV: &str = "RESILIENT_PATCHER_WORKSPACE";

#[derive(Parser)]
#[command(name = "resilient-patcher")]
#[command(about = "Search/replace editing that tolerates imperfect search text", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate search text in a file and report which strategy found it
    Find {
        file: PathBuf,

        search: String,

        /// Report every match instead of the first
        #[arg(short, long)]
        all: bool,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply one edit, or a JSON list of edits, to a single file
    #[command(group(ArgGroup::new("source").required(true).args(["old", "edits"])))]
    Edit {
        file: PathBuf,

        /// Text to replace (empty inserts at the start of the file)
        #[arg(long, requires = "new")]
        old: Option<String>,

        /// Replacement text
        #[arg(long, requires = "old")]
        new: Option<String>,

        /// Replace every occurrence instead of requiring exactly one
        #[arg(long, requires = "old")]
        replace_all: bool,

        /// JSON file with an `edits` array (`-` reads stdin)
        #[arg(long, conflicts_with_all = ["old", "new", "replace_all"])]
        edits: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a line diff of the change
        #[arg(short, long)]
        diff: bool,
    },

    /// Apply a TOML edit plan to a workspace
    Apply {
        /// Edit plan to apply
        #[arg(short, long)]
        plan: PathBuf,

        /// Workspace root (defaults to $RESILIENT_PATCHER_WORKSPACE, then the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a line diff of each change
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Find {
            file,
            search,
            all,
            json,
        } => cmd_find(&file, &search, all, json),

        Commands::Edit {
            file,
            old,
            new,
            replace_all,
            edits,
            dry_run,
            diff,
        } => {
            let request = match (old, new, edits) {
                (Some(old), Some(new), None) => EditRequest::single(old, new, replace_all)?,
                (None, None, Some(edits)) => EditRequest::from_json_file(&edits)?,
                _ => anyhow::bail!("either --old/--new or --edits is required"),
            };
            cmd_edit(&file, request, dry_run, diff)
        }

        Commands::Apply {
            plan,
            workspace,
            dry_run,
            diff,
        } => cmd_apply(&plan, workspace, dry_run, diff),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve workspace path
///
/// Priority order:
/// 1. Explicit --workspace flag
/// 2. RESILIENT_PATCHER_WORKSPACE environment variable
/// 3. Current directory
fn resolve_workspace(cli_workspace: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_workspace {
        return path
            .canonicalize()
            .with_context(|| format!("workspace not found: {}", path.display()));
    }

    if let Ok(env_path) = env::var(WORKSPACE_ENV) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: {} is set but path doesn't exist: {}",
                WORKSPACE_ENV, env_path
            )
            .yellow()
        );
    }

    Ok(env::current_dir()?.canonicalize()?)
}

/// 1-based line and column (in chars) of a byte offset.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let prefix = &content[..offset];
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map_or(0, |idx| idx + 1);
    let column = prefix[line_start..].chars().count() + 1;
    (line, column)
}

#[derive(Serialize)]
struct MatchReport<'a> {
    #[serde(flatten)]
    search_match: SearchMatch,
    line: usize,
    column: usize,
    text: &'a str,
}

fn cmd_find(file: &Path, search: &str, all: bool, json: bool) -> Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let matcher = Matcher::default();

    let matches: Vec<SearchMatch> = if all {
        matcher.find_matches(&content, search)
    } else {
        matcher.find_match(&content, search).into_iter().collect()
    };

    let reports: Vec<MatchReport<'_>> = matches
        .iter()
        .map(|search_match| {
            let (line, column) = line_column(&content, search_match.start_index);
            MatchReport {
                search_match: *search_match,
                line,
                column,
                text: search_match.matched_text(&content).unwrap_or_default(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        eprintln!("{} No match in {}", "✗".red(), file.display());
    } else {
        for report in &reports {
            let first_line = report.text.lines().next().unwrap_or_default();
            println!(
                "{}:{}:{} [{}] {}",
                file.display(),
                report.line,
                report.column,
                report.search_match.strategy_name.to_string().cyan(),
                first_line
            );
        }
    }

    if reports.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Edits requested on the command line.
enum EditRequest {
    Single(EditOperation),
    Multi(Vec<EditOperation>),
}

impl EditRequest {
    fn single(old: String, new: String, replace_all: bool) -> Result<Self> {
        let edit = validate_single_edit(
            Some(&Value::String(old)),
            Some(&Value::String(new)),
            Some(&Value::Bool(replace_all)),
            None,
        )?;
        Ok(EditRequest::Single(edit))
    }

    fn from_json_file(path: &Path) -> Result<Self> {
        let raw = if path == Path::new("-") {
            io::read_to_string(io::stdin()).context("failed to read edits from stdin")?
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read edits from {}", path.display()))?
        };
        let args: Value = serde_json::from_str(&raw).context("edits are not valid JSON")?;
        Ok(EditRequest::Multi(validate_multi_edit(&args)?.edits))
    }

    fn edits(&self) -> &[EditOperation] {
        match self {
            EditRequest::Single(edit) => std::slice::from_ref(edit),
            EditRequest::Multi(edits) => edits,
        }
    }

    fn execute(&self, matcher: &Matcher, content: &str) -> Result<String, PatchError> {
        match self {
            EditRequest::Single(edit) => matcher.execute_find_and_replace(
                content,
                &edit.old_string,
                &edit.new_string,
                edit.replace_all,
                None,
            ),
            EditRequest::Multi(edits) => matcher.execute_multi_find_and_replace(content, edits),
        }
    }

    /// Preview limited to the matched region when one edit touches one place.
    fn preview(&self, matcher: &Matcher, before: &str, after: &str) -> Vec<DiffLine> {
        if let EditRequest::Single(edit) = self {
            if !edit.replace_all {
                if let Some(found) = matcher.find_match(before, &edit.old_string) {
                    return generate_search_replace_diff_lines(before, &found, &edit.new_string)
                        .collect();
                }
            }
        }
        whole_file_diff(before, after)
    }
}

fn cmd_edit(file: &Path, request: EditRequest, dry_run: bool, show_diff: bool) -> Result<()> {
    let creating = validate_creating_for_multi_edit(request.edits())?;
    let snapshot = if creating {
        FileSnapshot::read_or_missing(file)?
    } else {
        FileSnapshot::read(file)?
    };

    let matcher = Matcher::default();
    let after = match request.execute(&matcher, snapshot.content()) {
        Ok(after) => after,
        Err(error) => {
            eprintln!("{} {}: {}", "✗".red(), file.display(), error);
            explain_failure(&error);
            std::process::exit(1);
        }
    };

    if show_diff {
        display_diff(file, request.preview(&matcher, snapshot.content(), &after));
    }

    if dry_run {
        let action = if snapshot.is_missing() { "Would create" } else { "Would edit" };
        println!("{} {} {}", "✓".green(), action, file.display());
        return Ok(());
    }

    match snapshot.commit(&after)? {
        CommitResult::Written { path, bytes } => {
            let action = if snapshot.is_missing() { "Created" } else { "Edited" };
            println!("{} {} {} ({} bytes)", "✓".green(), action, path.display(), bytes)
        }
        CommitResult::Unchanged { path } => {
            println!("{} Unchanged {}", "⊙".yellow(), path.display())
        }
    }
    Ok(())
}

/// What happened to one file of an edit plan.
struct FileOutcome {
    path: PathBuf,
    before: String,
    after: String,
    created: bool,
    written: bool,
}

fn apply_file(
    file: &FilePlan,
    base: &Path,
    guard: &WorkspaceGuard,
    matcher: &Matcher,
    dry_run: bool,
) -> Result<FileOutcome> {
    let target = guard.resolve_target(base.join(&file.path))?;
    let snapshot = if file.is_creating() {
        FileSnapshot::read_or_missing(&target)?
    } else {
        FileSnapshot::read(&target)?
    };

    let after = matcher.execute_multi_find_and_replace(snapshot.content(), &file.edits)?;

    let written = if dry_run {
        false
    } else {
        guard.revalidate(&target)?;
        matches!(snapshot.commit(&after)?, CommitResult::Written { .. })
    };

    Ok(FileOutcome {
        path: target,
        before: snapshot.content().to_string(),
        after,
        created: snapshot.is_missing(),
        written,
    })
}

fn cmd_apply(
    plan_path: &Path,
    workspace: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let plan = load_from_path(plan_path)?;
    let guard = WorkspaceGuard::new(&workspace)?;
    let matcher = Matcher::new(plan.matcher.clone());

    let base = if plan.meta.workspace_relative {
        workspace.clone()
    } else {
        plan_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .canonicalize()?
    };

    println!("Workspace: {}", workspace.display());
    if !plan.meta.name.is_empty() {
        println!("Plan: {}", plan.meta.name);
    }
    if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }
    println!();

    let mut total_applied = 0;
    let mut total_unchanged = 0;
    let mut total_failed = 0;

    for file in &plan.files {
        match apply_file(file, &base, &guard, &matcher, dry_run) {
            Ok(outcome) => {
                let unchanged = if dry_run {
                    outcome.before == outcome.after && !outcome.created
                } else {
                    !outcome.written
                };
                if unchanged {
                    println!("{} {}: Unchanged", "⊙".yellow(), file.path);
                    total_unchanged += 1;
                    continue;
                }

                let action = match (dry_run, outcome.created) {
                    (true, true) => "Would create",
                    (true, false) => "Would edit",
                    (false, true) => "Created",
                    (false, false) => "Edited",
                };
                println!(
                    "{} {}: {} ({} edits)",
                    "✓".green(),
                    file.path,
                    action,
                    file.edits.len()
                );
                total_applied += 1;

                if show_diff {
                    display_diff(&outcome.path, whole_file_diff(&outcome.before, &outcome.after));
                }
            }
            Err(error) => {
                eprintln!("{} {}: Failed - {}", "✗".red(), file.path, error);
                if let Some(patch_error) = error.downcast_ref::<PatchError>() {
                    explain_failure(patch_error);
                }
                total_failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!("  {} unchanged", format!("{}", total_unchanged).yellow());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn explain_failure(error: &PatchError) {
    match error.root_reason() {
        ErrorReason::OldStringNotFound => {
            eprintln!("  {}", "CONFLICT: old_string matched no locations".red());
            eprintln!("  Possible causes:");
            eprintln!("    - The text was already edited");
            eprintln!("    - old_string was written from stale file contents");
        }
        ErrorReason::MultipleOccurrences => {
            eprintln!("  {}", "CONFLICT: old_string matched several locations".red());
            eprintln!("  Action: add surrounding context, or set replace_all");
        }
        ErrorReason::ApproximateReplaceAll => {
            eprintln!("  {}", "CONFLICT: old_string only matched approximately".red());
            eprintln!("  Action: copy old_string from the file, or drop replace_all");
        }
        _ => {}
    }
}

fn whole_file_diff(before: &str, after: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = before.lines().collect();
    let new_lines: Vec<&str> = after.lines().collect();
    diff_lines(&old_lines, &new_lines).collect()
}

/// Helper: Show a line diff between original and edited content
fn display_diff(file: &Path, lines: Vec<DiffLine>) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    for DiffLine { kind, line } in lines {
        let rendered = match kind {
            DiffLineKind::Old => format!("-{}", line).red(),
            DiffLineKind::New => format!("+{}", line).green(),
            DiffLineKind::Same => format!(" {}", line).normal(),
        };
        println!("{}", rendered);
    }
}
