use clap::Parser;
use fkpath::config::{Config, Overrides};
use fkpath::render;
use std::fs;
use std::io::{self, Read};
use std::process;

/// Use foreign keys to find join paths between two tables in a SQL schema dump.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema dump with CREATE TABLE / ALTER TABLE statements ("-" for stdin)
    schema_file: String,

    /// Begin with this table
    begin: String,

    /// End with this table
    end: String,

    /// SQL dialect: auto, generic, postgres, mysql
    #[arg(short, long)]
    dialect: Option<String>,

    /// Schema assumed for unqualified table names
    #[arg(short, long)]
    schema: Option<String>,

    /// Output format: trace or joins
    #[arg(short, long)]
    format: Option<String>,

    /// Longest path to explore, in foreign keys
    #[arg(long)]
    max_length: Option<usize>,

    /// Skip malformed foreign keys instead of failing
    #[arg(long)]
    skip_invalid: bool,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Overrides {
            dialect: cli.dialect.clone(),
            default_schema: cli.schema.clone(),
            format: cli.format.clone(),
            max_length: cli.max_length,
            skip_invalid: cli.skip_invalid,
        }
    }
}

const EXIT_NO_PATH: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn read_schema(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        fs::read_to_string(path)
    }
}

fn main() {
    // Warnings by default, overridable with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match Config::from_env().and_then(|c| c.merge(Overrides::from(&cli))) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(EXIT_ERROR);
        }
    };
    log::debug!("Using {:?}", config);

    let input = match read_schema(&cli.schema_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", cli.schema_file, e);
            process::exit(EXIT_ERROR);
        }
    };

    let paths = match fkpath::find_join_paths_in_sql(&input, &cli.begin, &cli.end, &config) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_ERROR);
        }
    };

    if paths.is_empty() {
        eprintln!("No join path between {} and {}", cli.begin, cli.end);
        process::exit(EXIT_NO_PATH);
    }

    println!("{}", render::render_all(&paths, config.format));
}
