//! The `sigillum release` subcommands.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use sigillum_intoto::ResourceDescriptor;
use sigillum_intoto::digest::document_descriptor;
use sigillum_release::Policy;
use tracing::info;

use crate::discover;
use crate::validator::PolicyPackageValidator;

/// Arguments for `sigillum release`.
#[derive(Args)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommand,
}

/// Release policy subcommands.
#[derive(Subcommand)]
pub enum ReleaseCommand {
    /// Validate an organization policy and a directory of project policies.
    Validate(ValidateArgs),
}

/// Arguments for `sigillum release validate`.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the organization policy JSON file.
    pub org: PathBuf,

    /// Directory of project policy JSON files (searched recursively).
    pub projects: PathBuf,

    /// Print the policy evidence (URI and SHA-256 of every file) as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute a release subcommand.
pub fn execute(args: ReleaseArgs) -> Result<()> {
    match args.command {
        ReleaseCommand::Validate(args) => validate(&args),
    }
}

fn validate(args: &ValidateArgs) -> Result<()> {
    let org = File::open(&args.org)
        .wrap_err_with(|| format!("failed to open organization policy {}", args.org.display()))?;
    let files = discover::project_files(&args.projects, &args.org)?;
    info!(count = files.len(), dir = %args.projects.display(), "found project policies");

    // Files are opened lazily, one at a time, as the policy consumes them.
    let policy = Policy::from_readers(
        org,
        files.iter().map(File::open),
        Some(&PolicyPackageValidator),
    )
    .wrap_err("policy validation failed")?;

    if args.json {
        let evidence = policy_evidence(&args.org, &files)?;
        println!("{}", serde_json::to_string_pretty(&evidence)?);
    } else {
        println!(
            "Validated organization policy ({} roots) and {} project policies",
            policy.organization().roots().count(),
            policy.project_count()
        );
    }
    Ok(())
}

/// Describe every policy file by path and SHA-256, keyed the way release
/// attestations record policy evidence.
fn policy_evidence(org: &Path, projects: &[PathBuf]) -> Result<BTreeMap<String, ResourceDescriptor>> {
    let mut evidence = BTreeMap::new();
    evidence.insert("org".to_owned(), describe(org)?);
    for path in projects {
        let desc = describe(path)?;
        evidence.insert(format!("project:{}", desc.uri), desc);
    }
    Ok(evidence)
}

fn describe(path: &Path) -> Result<ResourceDescriptor> {
    let contents =
        std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(document_descriptor(path.display().to_string(), &contents))
}
