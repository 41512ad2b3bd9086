use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::{BString, ByteSlice};
use clap::Args;
use git_hash::ObjectId;
use git_config::types::PushDefault;
use git_protocol::local::{LocalPeer, PushOutcome, PushUpdate};
use git_protocol::remote::RemoteConfig;
use git_ref::{RefName, RefStore};
use git_transport::{GitUrl, Scheme};

use crate::Cli;
use super::open_repo;

#[derive(Args)]
pub struct PushArgs {
    /// Force push
    #[arg(short, long)]
    force: bool,

    /// Force push with lease (safer force push)
    #[arg(long)]
    force_with_lease: bool,

    /// Delete remote branches
    #[arg(short, long)]
    delete: bool,

    /// Push tags
    #[arg(long)]
    tags: bool,

    /// Set upstream tracking
    #[arg(short = 'u', long = "set-upstream")]
    set_upstream: bool,

    /// Dry run
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,

    /// Push all branches
    #[arg(long)]
    all: bool,

    /// Mirror all refs
    #[arg(long)]
    mirror: bool,

    /// Remote name
    remote: Option<String>,

    /// Refspecs to push
    refspec: Vec<String>,
}

pub fn run(args: &PushArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let stderr = io::stderr();
    let mut err = stderr.lock();

    // Resolve remote name
    let remote_name = if let Some(ref name) = args.remote {
        name.clone()
    } else if let Ok(Some(branch)) = repo.current_branch() {
        let key = format!("branch.{}.remote", branch);
        repo.config().get_string(&key)?
            .unwrap_or_else(|| "origin".to_string())
    } else {
        "origin".to_string()
    };

    let remote_config = RemoteConfig::from_config(repo.config(), &remote_name)?
        .ok_or_else(|| anyhow::anyhow!("fatal: '{}' does not appear to be a git repository", remote_name))?;

    let push_url_str = remote_config.push_url();
    let url = GitUrl::parse(push_url_str)?;

    if !matches!(url.scheme, Scheme::Local | Scheme::File) {
        bail!(
            "fatal: pushing to '{}' is not supported (only local/file remotes can be pushed to)",
            push_url_str
        );
    }

    let peer = LocalPeer::open(std::path::Path::new(&url.path))?;
    let advertised_refs = peer.list_refs()?;

    let updates = resolve_push_updates(&repo, args, &advertised_refs)?;

    if updates.is_empty() {
        writeln!(err, "Everything up-to-date")?;
        return Ok(0);
    }

    if args.dry_run {
        for update in &updates {
            writeln!(
                err,
                "Would push {} -> {}",
                update.new_oid.map(|o| o.to_hex()).unwrap_or_else(|| "(delete)".to_string()),
                update.name.as_str(),
            )?;
        }
        return Ok(0);
    }

    let results = git_protocol::local::push_local(&repo, &peer, &updates)?;

    let mut all_ok = true;
    if !args.verbose {
        writeln!(err, "To {}", push_url_str)?;
    }
    for result in &results {
        match &result.outcome {
            PushOutcome::New => {
                writeln!(err, " * [new branch]      -> {}", result.name.as_str())?;
            }
            PushOutcome::FastForward | PushOutcome::Forced => {
                writeln!(err, "   {}             -> {}", remote_name, result.name.as_str())?;
            }
            PushOutcome::Deleted => {
                writeln!(err, " - [deleted]         -> {}", result.name.as_str())?;
            }
            PushOutcome::Rejected(reason) => {
                all_ok = false;
                writeln!(err, " ! [rejected]        {} ({})", result.name.as_str(), reason)?;
            }
        }
    }

    if args.set_upstream {
        if let Ok(Some(branch)) = repo.current_branch() {
            set_upstream_config(&repo, &branch, &remote_name)?;
            writeln!(err, "branch '{}' set up to track '{}/{}'.", branch, remote_name, branch)?;
        }
    }

    if all_ok {
        Ok(0)
    } else {
        bail!("failed to push some refs to '{}'", push_url_str);
    }
}

fn resolve_push_updates(
    repo: &git_repository::Repository,
    args: &PushArgs,
    advertised_refs: &[(ObjectId, BString)],
) -> Result<Vec<PushUpdate>> {
    let mut updates = Vec::new();

    if !args.refspec.is_empty() {
        for spec in &args.refspec {
            if args.delete || spec.starts_with(':') {
                let remote_ref = spec.trim_start_matches(':');
                let remote_full = full_ref_name(remote_ref);
                updates.push(PushUpdate {
                    name: RefName::new(BString::from(remote_full))?,
                    new_oid: None,
                    force: args.force,
                    expected_old_oid: None,
                });
            } else if let Some((src, dst)) = spec.split_once(':') {
                let local_ref = full_ref_name(src);
                let remote_ref = full_ref_name(dst);
                let oid = resolve_ref_oid(repo, &local_ref)?;
                updates.push(PushUpdate {
                    name: RefName::new(BString::from(remote_ref))?,
                    new_oid: Some(oid),
                    force: args.force,
                    expected_old_oid: if args.force_with_lease {
                        Some(find_remote_oid(advertised_refs, &local_ref).unwrap_or(ObjectId::NULL_SHA1))
                    } else {
                        None
                    },
                });
            } else {
                let refname = full_ref_name(spec);
                let oid = resolve_ref_oid(repo, &refname)?;
                updates.push(PushUpdate {
                    name: RefName::new(BString::from(refname))?,
                    new_oid: Some(oid),
                    force: args.force,
                    expected_old_oid: None,
                });
            }
        }
    } else if args.all || args.mirror {
        if let Ok(iter) = repo.refs().iter(Some("refs/heads/")) {
            for r in iter.flatten() {
                if let Some(oid) = r.target_oid() {
                    updates.push(PushUpdate {
                        name: RefName::new(r.name().as_str())?,
                        new_oid: Some(oid),
                        force: args.force,
                        expected_old_oid: None,
                    });
                }
            }
        }
    } else {
        let push_default = repo.config().get_string("push.default")?
            .and_then(|v| PushDefault::from_config(&v).ok())
            .unwrap_or(PushDefault::Simple);

        match push_default {
            PushDefault::Nothing => {
                bail!("fatal: No configured push destination.\nSpecify the remote and refspec.");
            }
            PushDefault::Current => {
                if let Some(branch) = repo.current_branch()? {
                    let refname = format!("refs/heads/{}", branch);
                    let oid = resolve_ref_oid(repo, &refname)?;
                    updates.push(PushUpdate {
                        name: RefName::new(BString::from(refname))?,
                        new_oid: Some(oid),
                        force: args.force,
                        expected_old_oid: None,
                    });
                }
            }
            PushDefault::Upstream | PushDefault::Simple => {
                if let Some(branch) = repo.current_branch()? {
                    let local_ref = format!("refs/heads/{}", branch);
                    let remote_ref = if push_default == PushDefault::Simple {
                        local_ref.clone()
                    } else {
                        let merge_key = format!("branch.{}.merge", branch);
                        repo.config().get_string(&merge_key)?
                            .unwrap_or_else(|| local_ref.clone())
                    };
                    let oid = resolve_ref_oid(repo, &local_ref)?;
                    updates.push(PushUpdate {
                        name: RefName::new(BString::from(remote_ref))?,
                        new_oid: Some(oid),
                        force: args.force,
                        expected_old_oid: None,
                    });
                }
            }
            PushDefault::Matching => {
                if let Ok(iter) = repo.refs().iter(Some("refs/heads/")) {
                    for r in iter.flatten() {
                        let name = r.name().as_str().to_string();
                        if find_remote_oid(advertised_refs, &name).is_some() {
                            if let Some(oid) = r.target_oid() {
                                updates.push(PushUpdate {
                                    name: RefName::new(BString::from(name))?,
                                    new_oid: Some(oid),
                                    force: args.force,
                                    expected_old_oid: None,
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    if args.tags {
        if let Ok(iter) = repo.refs().iter(Some("refs/tags/")) {
            for r in iter.flatten() {
                if let Some(oid) = r.target_oid() {
                    let name = r.name().as_str().to_string();
                    if find_remote_oid(advertised_refs, &name).is_none() {
                        updates.push(PushUpdate {
                            name: RefName::new(BString::from(name))?,
                            new_oid: Some(oid),
                            force: false,
                            expected_old_oid: None,
                        });
                    }
                }
            }
        }
    }

    Ok(updates)
}

fn full_ref_name(short: &str) -> String {
    if short.starts_with("refs/") {
        short.to_string()
    } else {
        format!("refs/heads/{}", short)
    }
}

fn resolve_ref_oid(repo: &git_repository::Repository, refname: &str) -> Result<ObjectId> {
    let name = RefName::new(BString::from(refname))?;
    repo.refs().resolve_to_oid(&name)?
        .ok_or_else(|| anyhow::anyhow!("src refspec {} does not match any", refname))
}

fn find_remote_oid(advertised_refs: &[(ObjectId, BString)], refname: &str) -> Option<ObjectId> {
    advertised_refs.iter()
        .find(|(_, name)| name.to_str_lossy() == refname)
        .map(|(oid, _)| *oid)
}

fn set_upstream_config(repo: &git_repository::Repository, branch: &str, remote: &str) -> Result<()> {
    let config_path = repo.git_dir().join("config");
    let mut content = std::fs::read_to_string(&config_path).unwrap_or_default();

    let section = format!("[branch \"{}\"]", branch);
    if !content.contains(&section) {
        content.push_str(&format!(
            "\n{}\n\tremote = {}\n\tmerge = refs/heads/{}\n",
            section, remote, branch
        ));
    }
    std::fs::write(&config_path, content)?;
    Ok(())
}
