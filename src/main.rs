use clap::{Args, Parser as ClapParser, Subcommand};
use mongo_url::cli::{self, CheckOptions, CheckResult, CliError, CompileTarget};
use mongo_url::{DEFAULT_MAX_DEPTH, ParseOptions, to_json, to_json_pretty};
use std::io::{self, Read};
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "mongo-url")]
#[command(about = "Compile URL query parameters into MongoDB filter, projection and sort documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct ParserArgs {
    /// Reject a space where "+" was meant
    #[arg(long)]
    strict_encoding: bool,

    /// Maximum nesting of calls and arrays
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

impl ParserArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_strict_encoding(self.strict_encoding)
            .with_max_depth(self.max_depth)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a URL-encoded parameter string into a find request
    #[command(alias = "parse")]
    Check {
        /// Parameters such as 'query=lt(id,5)&sort=-id' (reads from stdin if not provided)
        params: Option<String>,

        #[command(flatten)]
        parser: ParserArgs,

        /// Only validate, don't print the compiled request
        #[arg(long)]
        syntax_only: bool,
    },

    /// Compile a query expression such as 'and(gt(age,18),exists(email,true))'
    Query {
        expression: String,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// Compile a projection such as '+name,-_id'
    Fields {
        expression: String,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// Compile a sort such as '-created,+name'
    Sort {
        expression: String,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'mongo-url docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            params,
            parser,
            syntax_only,
        } => run_check(params, &parser, syntax_only),
        Commands::Query { expression, parser } => {
            run_compile(CompileTarget::Query, &expression, &parser)
        }
        Commands::Fields { expression, parser } => {
            run_compile(CompileTarget::Fields, &expression, &parser)
        }
        Commands::Sort { expression, parser } => {
            run_compile(CompileTarget::Sort, &expression, &parser)
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(params: Option<String>, parser: &ParserArgs, syntax_only: bool) -> Result<(), CliError> {
    let input = match params {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        input,
        parse: parser.options(),
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Parameters are valid"),
        CheckResult::Success(output) => print_document(&output, parser.pretty),
    }
    Ok(())
}

fn run_compile(target: CompileTarget, expression: &str, parser: &ParserArgs) -> Result<(), CliError> {
    let output = cli::execute_compile(target, expression, &parser.options())?;
    print_document(&output, parser.pretty);
    Ok(())
}

fn print_document(value: &serde_json::Value, pretty: bool) {
    let json = if pretty {
        to_json_pretty(value)
    } else {
        to_json(value)
    };
    println!("{}", json);
}
