use std::time;

use colored::Colorize;
use env_logger;
use log::info;

use mazegen::config::GeneratorKind;
use mazegen::input_user::Input;
use mazegen::pipeline::generate;

fn display_mazegen_header() {
    let logo = r#"
           mazegen
     Maze Benchmark Generator
    "#;

    eprintln!("{}", logo.bright_cyan().bold());
    eprintln!("{}", "Welcome to mazegen".green().bold());
    eprintln!("{}", "══════════════════════════════════".green());
}

fn main() {
    display_mazegen_header();

    let result = start();
    if result.is_err() {
        eprintln!("{}", "previous errors were found".red());
        std::process::exit(1);
    } else {
        eprintln!("{}", "Everything went okay".green());
        std::process::exit(exitcode::OK);
    }
}

fn start() -> Result<(), ()> {
    let start_time = time::Instant::now();

    let user_input = Input::new()?;
    env_logger::init();

    if let Some(path) = &user_input.config_path {
        eprintln!("{} {}", "🧾 Loading Settings from", path.cyan());
    }
    info!("\n{}", user_input.config);

    eprintln!("{}", "🧩 Building Maze...".green());
    if user_input.config.generator == GeneratorKind::Constraint {
        eprintln!("{}", "⚙️ Compiling Formula...".green());
    }
    let request = user_input.into_request();
    let summary = generate(&request).map_err(|e| {
        eprintln!("{} {}", "error:".red().bold(), e);
    })?;

    eprintln!("{}", "══════════════════════════════════".green());
    eprintln!("{}", "📊 Generation Summary:".cyan().bold());
    eprintln!(" ├─ Benchmark         : {}", summary.base_name);
    eprintln!(
        " ├─ Back-edges        : {} removed of {}",
        summary.trim.removed, summary.trim.backedges
    );
    eprintln!(" ├─ Transactions      : {}", summary.steps);
    eprintln!(
        " ├─ Contract          : {}",
        summary.files.property.display().to_string().cyan()
    );
    eprintln!(
        " ├─ Foundry Contract  : {}",
        summary.files.foundry.display().to_string().cyan()
    );
    eprintln!(
        " ├─ Transaction File  : {}",
        summary.files.transactions.display().to_string().cyan()
    );
    eprintln!(" └─ Execution Time    : {:?}", start_time.elapsed());

    Result::Ok(())
}
