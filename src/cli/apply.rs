use clap::Parser;

/// Arguments for the apply command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Apply a node:\n    bw apply web1\n\n\
                  Ask before fixing each item:\n    bw apply web1 -i\n\n\
                  Show what would be fixed:\n    bw apply webservers --dry-run")]
pub struct ApplyArgs {
    /// Node or group name
    pub target: String,

    /// Ask before fixing each item
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Report what would be fixed without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Node or group name
    pub target: String,
}
