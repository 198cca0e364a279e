use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Write};

use bqlite_engine::{ConnectOptions, ExecOutcome, Session};
use env_logger::Env;
use log::info;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "bqlite", about = "Run BigQuery-dialect SQL scripts against an embedded database file.")]
struct Opt {
    /// Path to the database file. Omit to run against an in-memory database.
    #[structopt(long("db"))]
    db_path: Option<String>,
    /// Default project.dataset path unqualified names resolve against.
    #[structopt(long("catalog-base"))]
    catalog_base: Vec<String>,
    /// Script file to run non-interactively. Omit to start an interactive prompt.
    #[structopt(long("script"), short("s"))]
    script: Option<String>,
}

fn run_script(session: &mut Session, script: &str) {
    match session.execute_script(script, &[], &HashMap::new()) {
        Ok(outcomes) => {
            for outcome in outcomes {
                print_outcome(&outcome);
            }
        }
        Err(e) => eprintln!("error: {e}"),
    }
}

fn print_outcome(outcome: &ExecOutcome) {
    match outcome {
        ExecOutcome::Rows(rows) => {
            println!("{}", rows.columns.join("\t"));
            for row in &rows.rows {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:?}")).collect();
                println!("{}", cells.join("\t"));
            }
        }
        ExecOutcome::RowsAffected(n) => println!("({n} rows affected)"),
    }
}

fn run_interactive(session: &mut Session) {
    let stdin = io::stdin();
    print!("bqlite> ");
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            print!("bqlite> ");
            io::stdout().flush().ok();
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        run_script(session, trimmed);
        print!("bqlite> ");
        io::stdout().flush().ok();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("bqlite_engine=info,bqlite_cli=info")).init();

    let opt = Opt::from_args();
    let options = ConnectOptions::new().with_db_path(opt.db_path).with_catalog_base_path(opt.catalog_base);
    let mut session = Session::open(options)?;

    match &opt.script {
        Some(path) => {
            let script = fs::read_to_string(path)?;
            info!("running script {path}");
            run_script(&mut session, &script);
        }
        None => run_interactive(&mut session),
    }

    Ok(())
}
