use clap::Parser;

/// Arguments for the nodes command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all nodes:\n    bw nodes\n\n\
                  Show the groups of each node:\n    bw nodes --groups")]
pub struct NodesArgs {
    /// Show the groups of each node
    #[arg(long)]
    pub groups: bool,
}

/// Arguments for the groups command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all groups:\n    bw groups\n\n\
                  Show the members of each group:\n    bw groups --nodes")]
pub struct GroupsArgs {
    /// Show the member nodes of each group
    #[arg(long)]
    pub nodes: bool,
}
