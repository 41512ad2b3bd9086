pub mod add;
pub mod branch;
pub mod cat_file;
pub mod check_ref_format;
pub mod checkout;
pub mod cherry_pick;
pub mod clone;
pub mod commit;
pub mod commit_tree;
pub mod config;
pub mod count_objects;
pub mod diff;
pub mod fetch;
pub mod for_each_ref;
pub mod fsck;
pub mod gc;
pub mod hash_object;
pub mod index_pack;
pub mod init;
pub mod log;
pub mod ls_files;
pub mod ls_remote;
pub mod ls_tree;
pub mod merge;
pub mod merge_base;
pub mod mktag;
pub mod mktree;
pub mod mv;
pub mod pack_objects;
pub mod prune;
pub mod pull;
pub mod push;
pub mod read_tree;
pub mod rebase;
pub mod reflog;
pub mod remote;
pub mod reset;
pub mod restore;
pub mod rev_list;
pub mod rev_parse;
pub mod revert;
pub mod rm;
pub mod show;
pub mod show_ref;
pub mod stash;
pub mod status;
pub mod switch;
pub mod symbolic_ref;
pub mod tag;
pub mod update_index;
pub mod update_ref;
pub mod verify_commit;
pub mod verify_tag;
pub mod write_tree;

use anyhow::Result;
use clap::Subcommand;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Provide content or type and size information for repository objects
    CatFile(cat_file::CatFileArgs),
    /// Compute object ID and optionally create a blob from a file
    HashObject(hash_object::HashObjectArgs),
    /// Pick out and massage parameters
    RevParse(rev_parse::RevParseArgs),
    /// Update the object name stored in a ref safely
    UpdateRef(update_ref::UpdateRefArgs),
    /// Output information on each ref
    ForEachRef(for_each_ref::ForEachRefArgs),
    /// List references in a local repository
    ShowRef(show_ref::ShowRefArgs),
    /// Read, modify and delete symbolic refs
    SymbolicRef(symbolic_ref::SymbolicRefArgs),
    /// Show information about files in the index and the working tree
    LsFiles(ls_files::LsFilesArgs),
    /// List the contents of a tree object
    LsTree(ls_tree::LsTreeArgs),
    /// Register file contents in the working tree to the index
    UpdateIndex(update_index::UpdateIndexArgs),
    /// Build a tree-object from ls-tree formatted text
    Mktree(mktree::MktreeArgs),
    /// Creates a tag object with extra validation
    Mktag(mktag::MktagArgs),
    /// Read tree information into the index
    ReadTree(read_tree::ReadTreeArgs),
    /// Record changes to the repository
    Commit(commit::CommitArgs),
    /// Create a new commit object
    CommitTree(commit_tree::CommitTreeArgs),
    /// Ensure that a reference name is well formed
    CheckRefFormat(check_ref_format::CheckRefFormatArgs),
    /// Create a tree object from the current index
    WriteTree(write_tree::WriteTreeArgs),
    /// Create an empty Git repository or reinitialize an existing one
    Init(init::InitArgs),
    /// Clone a repository into a new directory
    Clone(clone::CloneArgs),
    /// Get and set repository options
    Config(config::ConfigArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Remove files from the working tree and from the index
    Rm(rm::RmArgs),
    /// Move or rename a file, a directory, or a symlink
    Mv(mv::MvArgs),
    /// Show the working tree status
    Status(status::StatusArgs),
    /// Restore working tree files
    Restore(restore::RestoreArgs),
    /// List, create, or delete branches
    Branch(branch::BranchArgs),
    /// Switch branches
    Switch(switch::SwitchArgs),
    /// Switch branches or restore working tree files
    Checkout(checkout::CheckoutArgs),
    /// Join two or more development histories together
    Merge(merge::MergeArgs),
    /// Find as good common ancestors as possible for a merge
    MergeBase(merge_base::MergeBaseArgs),
    /// Manage set of tracked repositories
    Remote(remote::RemoteArgs),
    /// Download objects and refs from another repository
    Fetch(fetch::FetchArgs),
    /// List references in a remote repository
    LsRemote(ls_remote::LsRemoteArgs),
    /// Fetch from and integrate with another repository or a local branch
    Pull(pull::PullArgs),
    /// Update remote refs along with associated objects
    Push(push::PushArgs),
    /// Reset current HEAD to the specified state
    Reset(reset::ResetArgs),
    /// Create, list, delete or verify a tag object
    Tag(tag::TagArgs),
    /// Stash the changes in a dirty working directory
    Stash(stash::StashArgs),
    /// Reapply commits on top of another base tip
    Rebase(rebase::RebaseArgs),
    /// Show commit logs
    Log(log::LogArgs),
    /// Lists commit objects in reverse chronological order
    RevList(rev_list::RevListArgs),
    /// Show various types of objects
    Show(show::ShowArgs),
    /// Show changes between commits, commit and working tree, etc
    Diff(diff::DiffArgs),
    /// Apply the changes introduced by some existing commits
    CherryPick(cherry_pick::CherryPickArgs),
    /// Revert some existing commits
    Revert(revert::RevertArgs),
    /// Manage reflog information
    Reflog(reflog::ReflogArgs),
    /// Cleanup unnecessary files and optimize the local repository
    Gc(gc::GcArgs),
    /// Prune all unreachable objects from the object database
    Prune(prune::PruneArgs),
    /// Verifies the connectivity and validity of the objects in the database
    Fsck(fsck::FsckArgs),
    /// Count unpacked number of objects and their disk consumption
    CountObjects(count_objects::CountObjectsArgs),
    /// Create a packed archive of objects
    PackObjects(pack_objects::PackObjectsArgs),
    /// Build pack index file for an existing packed archive
    IndexPack(index_pack::IndexPackArgs),
    /// Verify GPG signature of commits
    VerifyCommit(verify_commit::VerifyCommitArgs),
    /// Verify GPG signature of tags
    VerifyTag(verify_tag::VerifyTagArgs),
}

impl Commands {
    /// Get the command name as used in config keys (e.g., "log", "diff").
    pub fn command_name(&self) -> &str {
        match self {
            Commands::CatFile(_) => "cat-file",
            Commands::HashObject(_) => "hash-object",
            Commands::RevParse(_) => "rev-parse",
            Commands::UpdateRef(_) => "update-ref",
            Commands::ForEachRef(_) => "for-each-ref",
            Commands::ShowRef(_) => "show-ref",
            Commands::SymbolicRef(_) => "symbolic-ref",
            Commands::LsFiles(_) => "ls-files",
            Commands::LsTree(_) => "ls-tree",
            Commands::UpdateIndex(_) => "update-index",
            Commands::Mktree(_) => "mktree",
            Commands::Mktag(_) => "mktag",
            Commands::ReadTree(_) => "read-tree",
            Commands::Commit(_) => "commit",
            Commands::CommitTree(_) => "commit-tree",
            Commands::CheckRefFormat(_) => "check-ref-format",
            Commands::WriteTree(_) => "write-tree",
            Commands::Init(_) => "init",
            Commands::Clone(_) => "clone",
            Commands::Config(_) => "config",
            Commands::Add(_) => "add",
            Commands::Rm(_) => "rm",
            Commands::Mv(_) => "mv",
            Commands::Status(_) => "status",
            Commands::Restore(_) => "restore",
            Commands::Branch(_) => "branch",
            Commands::Switch(_) => "switch",
            Commands::Checkout(_) => "checkout",
            Commands::Merge(_) => "merge",
            Commands::MergeBase(_) => "merge-base",
            Commands::Remote(_) => "remote",
            Commands::Fetch(_) => "fetch",
            Commands::LsRemote(_) => "ls-remote",
            Commands::Pull(_) => "pull",
            Commands::Push(_) => "push",
            Commands::Reset(_) => "reset",
            Commands::Tag(_) => "tag",
            Commands::Stash(_) => "stash",
            Commands::Rebase(_) => "rebase",
            Commands::Log(_) => "log",
            Commands::RevList(_) => "rev-list",
            Commands::Show(_) => "show",
            Commands::Diff(_) => "diff",
            Commands::CherryPick(_) => "cherry-pick",
            Commands::Revert(_) => "revert",
            Commands::Reflog(_) => "reflog",
            Commands::Gc(_) => "gc",
            Commands::Prune(_) => "prune",
            Commands::Fsck(_) => "fsck",
            Commands::CountObjects(_) => "count-objects",
            Commands::PackObjects(_) => "pack-objects",
            Commands::IndexPack(_) => "index-pack",
            Commands::VerifyCommit(_) => "verify-commit",
            Commands::VerifyTag(_) => "verify-tag",
        }
    }
}

/// Open a repository, respecting --git-dir override.
pub fn open_repo(cli: &Cli) -> Result<git_repository::Repository> {
    let repo = if let Some(ref git_dir) = cli.git_dir {
        git_repository::Repository::open(git_dir)?
    } else {
        git_repository::Repository::discover(".")?
    };
    Ok(repo)
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::CatFile(args) => cat_file::run(args, &cli),
        Commands::HashObject(args) => hash_object::run(args, &cli),
        Commands::RevParse(args) => rev_parse::run(args, &cli),
        Commands::UpdateRef(args) => update_ref::run(args, &cli),
        Commands::ForEachRef(args) => for_each_ref::run(args, &cli),
        Commands::ShowRef(args) => show_ref::run(args, &cli),
        Commands::SymbolicRef(args) => symbolic_ref::run(args, &cli),
        Commands::LsFiles(args) => ls_files::run(args, &cli),
        Commands::LsTree(args) => ls_tree::run(args, &cli),
        Commands::UpdateIndex(args) => update_index::run(args, &cli),
        Commands::Mktree(args) => mktree::run(args, &cli),
        Commands::Mktag(args) => mktag::run(args, &cli),
        Commands::ReadTree(args) => read_tree::run(args, &cli),
        Commands::Commit(args) => commit::run(args, &cli),
        Commands::CommitTree(args) => commit_tree::run(args, &cli),
        Commands::CheckRefFormat(args) => check_ref_format::run(args),
        Commands::WriteTree(args) => write_tree::run(args, &cli),
        Commands::Init(args) => init::run(args, &cli),
        Commands::Clone(args) => clone::run(args, &cli),
        Commands::Config(args) => config::run(args, &cli),
        Commands::Add(args) => add::run(args, &cli),
        Commands::Rm(args) => rm::run(args, &cli),
        Commands::Mv(args) => mv::run(args, &cli),
        Commands::Status(args) => status::run(args, &cli),
        Commands::Restore(args) => restore::run(args, &cli),
        Commands::Branch(args) => branch::run(args, &cli),
        Commands::Switch(args) => switch::run(args, &cli),
        Commands::Checkout(args) => checkout::run(args, &cli),
        Commands::Merge(args) => merge::run(args, &cli),
        Commands::MergeBase(args) => merge_base::run(args, &cli),
        Commands::Remote(args) => remote::run(args, &cli),
        Commands::Fetch(args) => fetch::run(args, &cli),
        Commands::LsRemote(args) => ls_remote::run(args, &cli),
        Commands::Pull(args) => pull::run(args, &cli),
        Commands::Push(args) => push::run(args, &cli),
        Commands::Reset(args) => reset::run(args, &cli),
        Commands::Tag(args) => tag::run(args, &cli),
        Commands::Stash(args) => stash::run(args, &cli),
        Commands::Rebase(args) => rebase::run(args, &cli),
        Commands::Log(args) => log::run(args, &cli),
        Commands::RevList(args) => rev_list::run(args, &cli),
        Commands::Show(args) => show::run(args, &cli),
        Commands::Diff(args) => diff::run(args, &cli),
        Commands::CherryPick(args) => cherry_pick::run(args, &cli),
        Commands::Revert(args) => revert::run(args, &cli),
        Commands::Reflog(args) => reflog::run(args, &cli),
        Commands::Gc(args) => gc::run(args, &cli),
        Commands::Prune(args) => prune::run(args, &cli),
        Commands::Fsck(args) => fsck::run(args, &cli),
        Commands::CountObjects(args) => count_objects::run(args, &cli),
        Commands::PackObjects(args) => pack_objects::run(args, &cli),
        Commands::IndexPack(args) => index_pack::run(args, &cli),
        Commands::VerifyCommit(args) => verify_commit::run(args, &cli),
        Commands::VerifyTag(args) => verify_tag::run(args, &cli),
    }
}
