use std::process;

use command_options_core::{
    ConfigurationError, DEFAULT_HELP_WIDTH, OptionSet, Parser, ParserConfig, ProgramInfo,
};

/// Environment variable naming an optional YAML/JSON parser config.
const CONFIG_ENV: &str = "OPTIONS_DEMO_CONFIG";

const EXIT_OK: i32 = 0;
const EXIT_HELP: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Debug, Default)]
struct AddOptions {
    name: String,
    company: String,
    quiet: bool,
}

#[derive(Debug, Default)]
struct RemoveOptions {
    name: String,
    quiet: bool,
}

fn build_parser() -> Result<Parser, ConfigurationError> {
    let add = OptionSet::builder::<AddOptions>()
        .verb("add")
        .description("Adds a person to the club")
        .option("name", |o| &mut o.name, |d| {
            d.position(0).mandatory().description("The name of a person.")
        })
        .option("company", |o| &mut o.company, |d| {
            d.position(1)
                .default_value("myCompany")
                .description("The company of a person.")
        })
        .option("quiet", |o| &mut o.quiet, |d| d.description("Turns off most of the output"))
        .build()?;

    let remove = OptionSet::builder::<RemoveOptions>()
        .verb("remove")
        .description("Removes a person from the club")
        .option("name", |o| &mut o.name, |d| {
            d.position(0).mandatory().description("The name of a person.")
        })
        .option("quiet", |o| &mut o.quiet, |d| d.description("Turns off most of the output"))
        .build()?;

    Parser::with_option_sets(vec![add, remove])
}

fn load_config() -> Result<ParserConfig, String> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => ParserConfig::load(&path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.to_string_lossy()))?,
        None => ParserConfig::default(),
    };
    if config.program == ProgramInfo::default() {
        config.program = ProgramInfo::new("Club", env!("CARGO_PKG_VERSION"), "options-demo")
            .with_description("Maintains the member list of a club.");
    }
    Ok(config)
}

fn main() {
    let parser = match build_parser() {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(EXIT_ERROR);
        }
    };
    let configured =
        load_config().and_then(|config| parser.with_config(config).map_err(|err| err.to_string()));
    let parser = match configured {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(EXIT_ERROR);
        }
    };

    let outcome = parser.parse(std::env::args().skip(1));
    let code = outcome
        .route::<i32>()
        .on::<AddOptions>(|o| {
            println!("Options [AddOptions]");
            println!("Name = '{}'", o.name);
            println!("Company = '{}'", o.company);
            println!("Quiet = '{}'", o.quiet);
            EXIT_OK
        })
        .on::<RemoveOptions>(|o| {
            println!("Options [RemoveOptions]");
            println!("Name = '{}'", o.name);
            println!("Quiet = '{}'", o.quiet);
            EXIT_OK
        })
        .on_help(|r| match parser.help_for(r, DEFAULT_HELP_WIDTH) {
            Ok(text) => {
                print!("{text}");
                EXIT_HELP
            }
            Err(err) => {
                eprintln!("error: {err}");
                EXIT_ERROR
            }
        })
        .on_error(|r| {
            println!("{}", r.message());
            EXIT_ERROR
        })
        .into_value();

    println!();
    println!("return = {code}");
    process::exit(code);
}
