use anyhow::Result;
use clap::Parser;
use solpack::commands::{self, Config, ConfigOverrides, InstallOptions};
use solpack::runtime::RealRuntime;
use std::path::PathBuf;
use std::sync::Arc;

/// solpack - solution package manager
///
/// Installs packages from a feed into a folder shared by every project of a
/// solution. Each project records the packages it references in its own
/// packages.json; a shared package is deleted once no project references it.
///
/// Examples:
///   solpack install NUnit            # Latest stable NUnit and its dependencies
///   solpack install NUnit@2.5.10     # A specific version
///   solpack --project Tests list     # Packages referenced by ./Tests
#[derive(Parser, Debug)]
#[command(author, version = env!("SOLPACK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Solution directory (defaults to the current directory)
    #[arg(long, env = "SOLPACK_SOLUTION", value_name = "PATH", global = true)]
    pub solution: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long, short = 'p', value_name = "PATH", global = true)]
    pub project: Option<PathBuf>,

    /// Shared packages folder, relative to the solution
    #[arg(long = "packages-dir", env = "SOLPACK_PACKAGES_DIR", value_name = "DIR", global = true)]
    pub packages_dir: Option<String>,

    /// Package feed file
    #[arg(long, env = "SOLPACK_FEED", value_name = "FILE", global = true)]
    pub feed: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package and its dependencies
    Install(InstallArgs),

    /// Remove a package from the project
    Uninstall(UninstallArgs),

    /// Update packages to the newest version in the feed
    Update(UpdateArgs),

    /// List packages referenced by the project
    List,

    /// Search the feed
    Search(SearchArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Package in the format "Id" or "Id@Version"
    #[arg(value_name = "ID[@VERSION]")]
    pub package: String,

    /// Install the package without its dependencies
    #[arg(long)]
    pub ignore_dependencies: bool,

    /// Allow prerelease versions
    #[arg(long)]
    pub pre: bool,

    /// Print the operations without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct UninstallArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    /// Remove even if other installed packages depend on it
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Also remove dependencies nothing else needs
    #[arg(long)]
    pub remove_dependencies: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,

    /// Update only the named packages, not their dependencies
    #[arg(long)]
    pub no_dependencies: bool,

    /// Allow prerelease versions
    #[arg(long)]
    pub pre: bool,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Glob matched against package ids (defaults to all)
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            solution: self.solution.clone(),
            project: self.project.clone(),
            packages_dir: self.packages_dir.clone(),
            feed: self.feed.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = Arc::new(RealRuntime);
    let config = Config::load(runtime.as_ref(), cli.overrides())?;

    match cli.command {
        Commands::Install(args) => {
            let options = InstallOptions {
                ignore_dependencies: args.ignore_dependencies,
                pre: args.pre,
                dry_run: args.dry_run,
            };
            commands::install(runtime, &args.package, options, &config)?
        }
        Commands::Uninstall(args) => commands::uninstall(
            runtime,
            &args.id,
            args.force,
            args.remove_dependencies,
            &config,
        )?,
        Commands::Update(args) => {
            commands::update(runtime, &args.ids, args.no_dependencies, args.pre, &config)?
        }
        Commands::List => commands::list(RealRuntime, &config)?,
        Commands::Search(args) => commands::search(RealRuntime, args.pattern.as_deref(), &config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["solpack", "install", "NUnit@2.5.10", "--pre"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.package, "NUnit@2.5.10");
                assert!(args.pre);
                assert!(!args.ignore_dependencies);
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Install command"),
        }
        assert_eq!(cli.project, None);
    }

    #[test]
    fn test_cli_uninstall_parsing() {
        let cli = Cli::try_parse_from([
            "solpack",
            "uninstall",
            "NUnit",
            "-f",
            "--remove-dependencies",
        ])
        .unwrap();
        match cli.command {
            Commands::Uninstall(args) => {
                assert_eq!(args.id, "NUnit");
                assert!(args.force);
                assert!(args.remove_dependencies);
            }
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_update_requires_ids() {
        assert!(Cli::try_parse_from(["solpack", "update"]).is_err());

        let cli =
            Cli::try_parse_from(["solpack", "update", "A", "B", "--no-dependencies"]).unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.ids, vec!["A", "B"]);
                assert!(args.no_dependencies);
            }
            _ => panic!("Expected Update command"),
        }
    }

    #[test]
    fn test_cli_global_project_parsing() {
        let cli = Cli::try_parse_from(["solpack", "--project", "Tests", "list"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("Tests")));

        let cli = Cli::try_parse_from(["solpack", "list", "-p", "Tests"]).unwrap();
        assert_eq!(cli.overrides().project, Some(PathBuf::from("Tests")));
    }

    #[test]
    fn test_cli_search_pattern_optional() {
        let cli = Cli::try_parse_from(["solpack", "search"]).unwrap();
        match cli.command {
            Commands::Search(args) => assert_eq!(args.pattern, None),
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["solpack", "NUnit"]).is_err());
    }
}
