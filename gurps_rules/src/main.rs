use gurps_rules::character::GurpsCharacter;
use gurps_rules::config::RuntimeConfig;
use gurps_rules::{logging, pipeline};
use std::env;
use std::fs;

struct Options {
    database_files: Vec<String>,
    character_file: Option<String>,
    purchases: Vec<(String, i64)>,
    json: bool,
    config_file: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <database files...> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1..].iter().any(|arg| arg == "--help") {
        print_help(&args[0]);
        return Ok(());
    }

    let options = match parse_options(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    let config = match &options.config_file {
        Some(path) => RuntimeConfig::from_toml_str(&fs::read_to_string(path)?)?,
        None => RuntimeConfig::default(),
    };

    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;

    let loaded = match pipeline::load_database_files(&options.database_files, &config) {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    let mut character = match &options.character_file {
        Some(path) => {
            pipeline::load_character_file(path, loaded.database.clone(), &config)?
        }
        None => GurpsCharacter::new(loaded.database.clone()),
    };

    for (name, levels) in &options.purchases {
        if let Err(error) = character.set_purchased_levels(name, *levels) {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    }

    if options.json {
        println!("{}", character.to_snapshot().to_json()?);
        return Ok(());
    }

    print_sheet(&character, loaded.files.len());
    Ok(())
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        database_files: Vec::new(),
        character_file: None,
        purchases: Vec::new(),
        json: false,
        config_file: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--character" => {
                i += 1;
                let path = args.get(i).ok_or("--character requires a file")?;
                options.character_file = Some(path.clone());
            }
            "--set" => {
                i += 1;
                let assignment = args.get(i).ok_or("--set requires NAME=LEVEL")?;
                options.purchases.push(parse_assignment(assignment)?);
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file")?;
                options.config_file = Some(path.clone());
            }
            "--json" => options.json = true,
            arg if arg.starts_with("--") => return Err(format!("unknown option '{}'", arg)),
            path => options.database_files.push(path.to_string()),
        }
        i += 1;
    }

    if options.database_files.is_empty() {
        return Err("at least one database file is required".to_string());
    }
    Ok(options)
}

fn parse_assignment(assignment: &str) -> Result<(String, i64), String> {
    let (name, level) = assignment
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=LEVEL, got '{}'", assignment))?;
    let level = level
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an integer level", level))?;
    Ok((name.trim().to_string(), level))
}

fn print_sheet(character: &GurpsCharacter, file_count: usize) {
    let name = if character.name().is_empty() {
        "(unnamed)"
    } else {
        character.name()
    };
    println!("Character: {}", name);
    println!(
        "Database: {} traits from {} file(s)",
        character.database().len(),
        file_count
    );
    println!();
    println!("{:<32} {:>9} {:>8} {:>8}", "TRAIT", "PURCHASED", "COST", "VALUE");

    for value in character.visible_values() {
        let cost = value
            .cost
            .map(|cost| cost.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:>9} {:>8} {:>8}",
            value.display_name, value.purchased_levels, cost, value.formatted
        );
    }

    println!();
    println!("Total points: {}", character.total_cost());
}

fn print_help(program_name: &str) {
    println!("GURPS Rules v{}", env!("CARGO_PKG_VERSION"));
    println!("Loads trait databases and evaluates a character against them");
    println!();
    println!("USAGE:");
    println!("    {} <database files...> [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help                Show this help message");
    println!("    --character FILE      Load purchases from a saved character (JSON)");
    println!("    --set NAME=LEVEL      Purchase levels of a trait (repeatable)");
    println!("    --json                Print the resulting character as JSON");
    println!("    --config FILE         Runtime preferences (TOML)");
    println!();
    println!("EXAMPLES:");
    println!("    {} core.gurpenator_data --set Human=1 --set ST=2", program_name);
    println!("    {} core.gurpenator_data --character conan.json --json", program_name);
    println!();
    println!("CONFIGURATION:");
    println!("    {}", gurps_rules::config::build_info::source_info());
}
