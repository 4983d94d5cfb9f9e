use std::{path::PathBuf, process::exit, time::Instant};

use clap::Parser as ClapParser;

use entail::{Argument, Cadical, Error, Options, Verdict};

/// The command line interface for checking the validity of arguments
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Args {
    /// A premise of the argument. Can be given multiple times.
    #[arg(short, long = "premise")]
    premises: Vec<String>,

    /// The conclusion of the argument
    #[arg(short, long)]
    conclusion: Option<String>,

    /// Print the countermodel if the argument is invalid
    #[arg(long)]
    model: bool,

    /// Check that the countermodel satisfies the premises and falsifies the conclusion
    #[arg(long)]
    check_model: bool,

    /// Print the CNF of the validity formula
    #[arg(long)]
    print_cnf: bool,

    /// The smallest quantifier domain that is considered meaningful
    #[arg(long)]
    min_domain: Option<usize>,

    /// Do not expand quantifiers before converting to CNF
    #[arg(long)]
    no_expand: bool,

    /// A file containing the argument, one formula per line with the conclusion prefixed by `⊢` or `|-`.
    /// If not given, the argument is read from `--premise` and `--conclusion`.
    file: Option<PathBuf>,
}

/// The main function of the checker. Parses the command line arguments and checks the argument.
fn main() {
    env_logger::init();
    let ts = Instant::now();
    let cli = Args::parse();

    match run(&cli) {
        Ok(verdict) => {
            println!("{}", verdict);
            if cli.model {
                if let Some(asn) = verdict.counterexample() {
                    println!("{}", asn);
                }
            }
        }
        Err(err) => {
            log::error!("Error: {}", err);
            println!("unknown");
            exit(1);
        }
    };

    log::info!("Done ({}ms).", ts.elapsed().as_millis());
}

fn run(cli: &Args) -> Result<Verdict, Error> {
    let argument = read_argument(cli)?;
    log::info!("Checking {}", argument);
    let opts = convert_options(cli);
    if cli.print_cnf {
        println!("{}", argument.to_cnf_with(&opts)?);
    }
    argument.solve_with(&opts, &mut Cadical::new())
}

fn read_argument(cli: &Args) -> Result<Argument, Error> {
    match &cli.file {
        Some(file) => {
            let reader = std::io::BufReader::new(std::fs::File::open(file)?);
            Argument::from_reader(reader)
        }
        None => match &cli.conclusion {
            Some(c) => Argument::new(&cli.premises, c),
            None => Err(Error::InvalidArgumentFile(
                "no input file and no conclusion given".to_string(),
            )),
        },
    }
}

fn convert_options(options: &Args) -> Options {
    let mut opts = Options::default();
    if let Some(min) = options.min_domain {
        opts.min_domain_size = min;
    }
    if options.no_expand {
        opts.expand_quantifiers = false;
    }
    if options.check_model {
        opts.check_model = true;
    }
    opts
}
