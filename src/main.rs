use cipherchain::cli::{create_chain, decrypt_file, encrypt_file, show_info, NewOptions};
use cipherchain::helpers::ScopePreset;
use cipherchain::models::SwapSetting;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("CIPHERCHAIN_VERSION");
const BUILD: &str = env!("CIPHERCHAIN_BUILD");
const PROFILE: &str = env!("CIPHERCHAIN_PROFILE");
const GIT_HASH: &str = env!("CIPHERCHAIN_GIT_HASH");

/// Environment variable holding the log filter
const LOG_ENV: &str = "CIPHERCHAIN_LOG";

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "cipherchain")]
#[command(author, about = "Composable chain of reversible byte transforms", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Directory chain documents are stored in
    #[arg(long, global = true, default_value = "saves")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a chain and store it under a name
    #[command(alias = "n")]
    New {
        /// Chain name
        name: String,

        /// Alphabet scope preset
        #[arg(long, default_value = "printable", value_parser = parse_preset)]
        preset: ScopePreset,

        /// Rotor count of the rotor bank (0 leaves it out)
        #[arg(long, default_value = "3")]
        rotors: usize,

        /// Shift amount
        #[arg(long, default_value = "5", allow_hyphen_values = true)]
        shift: i64,

        /// Leave the shift model out
        #[arg(long)]
        no_shift: bool,

        /// Swap setting
        #[arg(long, default_value = "random", value_parser = parse_swap)]
        swap: SwapSetting,

        /// Leave the swap model out
        #[arg(long)]
        no_swap: bool,

        /// Block size of the reverse swap
        #[arg(long, default_value = "1")]
        reverse_amount: usize,

        /// Section size of the section swaps
        #[arg(long, default_value = "1")]
        section_amount: usize,

        /// Master seed for the scramblers (clock seeded when absent)
        #[arg(long)]
        seed: Option<u64>,

        /// Replace an existing chain of the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Encrypt a file with a stored chain
    #[command(alias = "e")]
    Encrypt {
        /// Chain name
        name: String,

        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// Decrypt a file with a stored chain
    #[command(alias = "d")]
    Decrypt {
        /// Chain name
        name: String,

        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// Show information about a stored chain
    #[command(alias = "i")]
    Info {
        /// Chain name
        name: String,
    },
}

fn parse_preset(s: &str) -> Result<ScopePreset, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_swap(s: &str) -> Result<SwapSetting, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("cipherchain {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if Cli::command().print_help().is_err() {
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_logging();

    let result = match command {
        Commands::New {
            name,
            preset,
            rotors,
            shift,
            no_shift,
            swap,
            no_swap,
            reverse_amount,
            section_amount,
            seed,
            overwrite,
        } => {
            let options = NewOptions {
                dir: cli.dir.clone(),
                preset,
                rotors,
                shift: (!no_shift).then_some(shift),
                swap: (!no_swap).then_some(swap),
                reverse_amount,
                section_amount,
                seed,
                overwrite,
            };

            create_chain(&name, &options).map(|chain| {
                println!(
                    "Created chain {} with {} models in {}",
                    name,
                    chain.len(),
                    cli.dir.display()
                );
            })
        }

        Commands::Encrypt { name, input, output } => {
            encrypt_file(&name, &input, &output, &cli.dir).map(|bytes| {
                println!("Encrypted {} bytes to {}", bytes, output.display());
            })
        }

        Commands::Decrypt { name, input, output } => {
            decrypt_file(&name, &input, &output, &cli.dir).map(|bytes| {
                println!("Decrypted {} bytes to {}", bytes, output.display());
            })
        }

        Commands::Info { name } => show_info(&name, &cli.dir).map(|info| print!("{}", info)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
