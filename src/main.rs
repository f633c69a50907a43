// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use clap::{Args, Parser, Subcommand};
use nopackage::commands::info::InfoCommand;
use nopackage::commands::install::InstallCommand;
use nopackage::commands::list::ListCommand;
use nopackage::commands::remove::RemoveCommand;
use nopackage::config::new_nopackage_config;
use nopackage::error::{Result, format_error_chain, get_exit_code};
use nopackage::install::InstallRequest;
use nopackage::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nopackage")]
#[command(
    author,
    version,
    about = "Install package-less programs with a desktop shortcut",
    long_about = None
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InstallArgs {
    /// AppImage, deb, archive, directory or binary to install, or the id
    /// of an installed program
    source: PathBuf,

    /// Caption for the shortcut (inferred from the name when omitted)
    caption: Option<String>,

    /// Use this version instead of reading it from the name
    #[arg(long)]
    version: Option<String>,

    /// Use this program name instead of reading it from the name
    #[arg(long)]
    name: Option<String>,

    /// Use this program id
    #[arg(long)]
    luid: Option<String>,

    /// Move a plain file or directory into the programs directory
    #[arg(long = "move")]
    move_files: bool,

    /// Keep a separate shortcut for each version
    #[arg(long)]
    multi_version: bool,

    /// Show what would be installed without changing anything
    #[arg(long)]
    dry_run: bool,
}

impl InstallArgs {
    fn into_request(self, reinstall: bool) -> InstallRequest {
        InstallRequest {
            source: self.source,
            caption: self.caption,
            version: self.version,
            name: self.name,
            luid: self.luid,
            move_files: self.move_files,
            multi_version: self.multi_version,
            dry_run: self.dry_run,
            reinstall,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Install a program and create its shortcut
    #[command(visible_alias = "i")]
    Install(InstallArgs),

    /// Replace an installed program
    Reinstall(InstallArgs),

    /// Remove an installed program and its shortcut
    #[command(visible_alias = "uninstall")]
    Remove {
        /// Source path or program id
        source: PathBuf,

        /// Remove the shortcut of this specific version
        #[arg(long)]
        multi_version: bool,
    },

    /// List programs in the registry
    #[command(visible_alias = "ls")]
    List {
        /// Output the registry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what nopackage reads from a file or directory name
    Info {
        /// File or directory name
        name: String,

        /// Treat the name as a directory (no extension is removed)
        #[arg(long)]
        dir: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Use this version instead of reading it from the name
        #[arg(long)]
        version: Option<String>,

        /// Use this program name instead of reading it from the name
        #[arg(long = "name")]
        cased_name: Option<String>,
    },
}

fn setup_logger(cli: &Cli) {
    logging::setup_logger(cli.verbose);
}

fn main() {
    let cli = Cli::parse();

    setup_logger(&cli);

    let config = match new_nopackage_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error_chain(&e));
            std::process::exit(get_exit_code(&e));
        }
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Install(args) => {
            let command = InstallCommand::new(&config)?;
            command.execute(&args.into_request(false))
        }
        Commands::Reinstall(args) => {
            let command = InstallCommand::new(&config)?;
            command.execute(&args.into_request(true))
        }
        Commands::Remove {
            source,
            multi_version,
        } => {
            let command = RemoveCommand::new(&config)?;
            command.execute(&source, multi_version)
        }
        Commands::List { json } => {
            let command = ListCommand::new(&config)?;
            command.execute(json)
        }
        Commands::Info {
            name,
            dir,
            json,
            version,
            cased_name,
        } => {
            let command = InfoCommand::new(&config)?;
            command.execute(&name, dir, json, version.as_deref(), cased_name.as_deref())
        }
    })();

    if let Err(e) = result {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }
}
