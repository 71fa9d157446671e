use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use ash::vk;
use clap::{Parser, Subcommand};

use icd_probe::library::DriverLibrary;
use icd_probe::report::{self, ScopeName};
use icd_probe::{logging, IcdManifest, Result};
use mock_icd_core::ApiVersion;

/// icd-probe: tooling for the mock Vulkan driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a loader manifest for a driver library
    Manifest {
        /// Path of the built driver library
        #[arg(long)]
        library: PathBuf,
        /// API version the manifest claims
        #[arg(long, default_value = "1.3")]
        api_version: ApiVersion,
        /// Mark the driver as a portability driver
        #[arg(long)]
        portability: bool,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run one interface-version negotiation against a driver library
    Negotiate {
        #[arg(long)]
        library: PathBuf,
        /// Version the loader offers
        #[arg(long, default_value_t = 6)]
        version: u32,
    },
    /// Resolve names through the driver's proc-address exports (null instance)
    Resolve {
        #[arg(long)]
        library: PathBuf,
        /// Use vk_icdGetPhysicalDeviceProcAddr instead of vk_icdGetInstanceProcAddr
        #[arg(long)]
        physical_device: bool,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the resolver tables compiled into this build
    Symbols {
        #[arg(long, value_enum, default_value_t = ScopeName::Global)]
        scope: ScopeName,
    },
    /// Parse a fixture file and describe the driver it builds
    CheckConfig {
        file: PathBuf,
    },
}

fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Commands::Manifest {
            library,
            api_version,
            portability,
            output,
        } => {
            let mut manifest = IcdManifest::new(library, api_version).with_host_arch();
            if portability {
                manifest = manifest.with_portability(true);
            }
            match output {
                Some(path) => {
                    manifest.write_to(&path)?;
                    println!("{}", path.display());
                }
                None => println!("{}", manifest.to_json()?),
            }
        }
        Commands::Negotiate { library, version } => {
            let library = unsafe { DriverLibrary::open(&library) }?;
            let negotiation = library.negotiate(version)?;
            println!("offered: {}", version);
            println!("result: {:?}", negotiation.result);
            println!("version: {}", negotiation.version);
        }
        Commands::Resolve {
            library,
            physical_device,
            names,
        } => {
            let library = unsafe { DriverLibrary::open(&library) }?;
            for name in &names {
                let function = if physical_device {
                    library.physical_device_proc_addr(vk::Instance::null(), name)?
                } else {
                    library.instance_proc_addr(vk::Instance::null(), name)?
                };
                match function {
                    Some(function) => println!("{} = {:p}", name, function as *const ()),
                    None => println!("{} = null", name),
                }
            }
        }
        Commands::Symbols { scope } => print!("{}", report::symbol_listing(scope)),
        Commands::CheckConfig { file } => print!("{}", report::config_summary(&file)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            log::debug!("icd-probe failed: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
