use std::env;
use std::io::{self, BufRead, Write};

use log::info;

use infix_calc::{format_value, solve, CalcState, Mode};

fn usage() {
    println!("Usage: infix-calc [-d | --degree]");
    println!("Enter a math expression or 'exit' to exit.");
}

fn main() -> io::Result<()> {
    env_logger::init();

    let mut mode = Mode::Radian;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-d" | "--degree" => mode = Mode::Degree,
            "-h" | "--help" => {
                usage();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown option '{}'", arg);
                usage();
                return Ok(());
            }
        }
    }
    info!("starting in {:?} mode", mode);

    let mut state = CalcState::with_mode(mode);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Enter a math expression or 'exit' to exit.");
    let mut line = String::new();
    loop {
        print!("> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let expr = line.trim();
        if expr.is_empty() {
            continue;
        }
        if expr.eq_ignore_ascii_case("exit") {
            break;
        }

        match solve(expr, &mut state) {
            Ok(v) => println!("  {}", format_value(v)),
            Err(e) => println!("  {}", e),
        }
    }

    Ok(())
}
