//! Version command implementation

use crate::error::Result;
use crate::items::ITEM_SECTIONS;

/// Run version command
pub fn run() -> Result<()> {
    println!("bw {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Item types: {}", ITEM_SECTIONS.join(", "));
    println!("Profile: {}", build_profile());
    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "release" }
}
