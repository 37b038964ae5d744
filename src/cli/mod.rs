use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "aliawan")]
#[command(about = "Unofficial Alibaba Cloud CLI wrapper for everyday operator tasks")]
#[command(long_about = "Aliawan automates two operator workflows: rotating a machine image used by \
                       auto-scaling configurations (the new image takes over the old image's name) \
                       and registering an instance as a backend server in an SLB VServer group.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rotate a machine image: rewrite scaling configurations, swap names, optionally delete the old image
    Images {
        /// Name of the image being replaced; the new image takes this name over
        #[arg(long = "oldname", help = "Old image name")]
        oldname: Option<String>,
        /// Name the replacement image currently carries
        #[arg(long = "newname", help = "New image name")]
        newname: Option<String>,
        /// Delete the superseded image after the rename swap
        #[arg(long = "deleteold", help = "Delete the old image once it is replaced")]
        deleteold: bool,
    },
    /// Register an instance as a backend server in an SLB VServer group
    Slb {
        /// VServer group to register the backend in
        #[arg(long = "vgroupname", help = "VServer group name")]
        vgroupname: Option<String>,
        /// Instance to register; defaults to the instance this runs on
        #[arg(long = "instanceid", help = "Instance ID to be added to the VServer group")]
        instanceid: Option<String>,
        /// Backend port; falls back to slb.default_port from configuration
        #[arg(long = "slbport", help = "Backend port to register")]
        slbport: Option<String>,
    },
}

pub fn show_usage() {
    println!("☁️  Aliawan - another unofficial alicloud CLI, for simplifying your tasks");
    println!();
    println!("Workflows:");
    println!("  🔁 aliawan images --oldname app-v1 --newname app-v2 [--deleteold]");
    println!("       Rotate a machine image: every scaling configuration that used the");
    println!("       old image is re-pointed at the new one, then the new image takes");
    println!("       over the old image's name.");
    println!();
    println!("  🎯 aliawan slb --vgroupname web --slbport 80 [--instanceid i-...]");
    println!("       Register an instance as a backend server in a VServer group.");
    println!();
    println!("💡 Run 'aliawan <command> --help' for all flags.");
}
