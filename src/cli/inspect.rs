use clap::Parser;

/// Arguments for the metadata command
#[derive(Parser, Debug)]
pub struct MetadataArgs {
    /// Node name
    pub node: String,
}

/// Arguments for the items command
#[derive(Parser, Debug)]
pub struct ItemsArgs {
    /// Node name
    pub node: String,
}

/// Arguments for the hash command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Hash all items of a node:\n    bw hash web1\n\n\
                  Hash a single item:\n    bw hash web1 pkg_apt:nginx")]
pub struct HashArgs {
    /// Node name
    pub node: String,

    /// Item id (e.g. pkg_apt:nginx); hashes all items when omitted
    pub item: Option<String>,
}
