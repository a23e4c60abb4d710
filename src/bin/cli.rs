//! Keyrack CLI Client
//!
//! Interactive prompt for talking to a Keyrack server.

use std::io::{self, BufRead, Write};

use clap::Parser;
use keyrack::protocol::Request;
use keyrack::Client;

const HELP: &str = "\
Usage:
    <command> [<args>]

Commands:
    help                 Print this help message
    exit                 Leave the prompt
    set <key> <value>    Set a key to a value
    get <key>            Get the value of a key
    delete <key>         Delete a key";

/// Keyrack CLI
#[derive(Parser, Debug)]
#[command(name = "keyrack-cli")]
#[command(about = "Interactive client for the Keyrack key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8765")]
    server: String,
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Help,
    Exit,
    Empty,
    Send(Request),
    Unknown,
}

fn parse_line(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, Some(rest)),
        None => (line, None),
    };

    match (command, rest) {
        ("", None) => Input::Empty,
        ("help", None) => Input::Help,
        ("exit", None) => Input::Exit,
        ("get", Some(key)) if !key.is_empty() => Input::Send(Request::get(key)),
        ("delete", Some(key)) if !key.is_empty() => Input::Send(Request::delete(key)),
        ("set", Some(rest)) => match rest.split_once(' ') {
            Some((key, value)) if !key.is_empty() => Input::Send(Request::set(key, value)),
            _ => Input::Unknown,
        },
        _ => Input::Unknown,
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    println!("Welcome to the Keyrack prompt\nType 'help' for more information");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };

        match parse_line(&line) {
            Input::Empty => {}
            Input::Help => println!("{}", HELP),
            Input::Exit => break,
            Input::Unknown => println!("Unknown command\nType help for more information"),
            Input::Send(request) => match client.send(&request) {
                Ok(response) => println!("< {}", response),
                Err(e) => {
                    eprintln!("Connection lost: {}", e);
                    std::process::exit(1);
                }
            },
        }
    }
}
