pub mod cat;
pub mod config;
pub mod cp;
pub mod exists;
pub mod ls;
pub mod put;
pub mod rm;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Print a resource to stdout
    Cat(cat::CatArgs),
    /// Write stdin or a local file to a resource
    Put(put::PutArgs),
    /// Report whether a resource exists
    Exists(exists::ExistsArgs),
    /// Delete a resource
    Rm(rm::RmArgs),
    /// List resources under a prefix
    Ls(ls::LsArgs),
    /// Copy one resource to another, across backends
    Cp(cp::CpArgs),
    /// Create or show the backend configuration
    Config(config::ConfigArgs),
}
