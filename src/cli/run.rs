use clap::Parser;

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Run on one node:\n    bw run web1 'uptime'\n\n\
                  Run on every node of a group:\n    bw run webservers 'systemctl is-active nginx'")]
pub struct RunArgs {
    /// Node or group name
    pub target: String,

    /// Shell command to run
    pub command: String,
}
