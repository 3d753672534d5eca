//! redwire CLI Client
//!
//! Runs one command, or a pipelined batch read from stdin, against a server.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use redwire::{Command, Config, Connection, ReplyRule, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// redwire CLI
#[derive(Parser, Debug)]
#[command(name = "redwire-cli")]
#[command(about = "Send commands to a RESP server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Unix socket path (overrides host and port)
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Connect/read/write timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout: u64,

    /// Password sent with AUTH after connecting
    #[arg(short = 'a', long)]
    password: Option<String>,

    /// Read one command per line from stdin, pipeline them and print every reply
    #[arg(long)]
    pipeline: bool,

    /// Command and arguments
    #[arg(trailing_var_arg = true, required_unless_present = "pipeline")]
    command: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,redwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> redwire::Result<()> {
    let builder = Config::builder()
        .connect_timeout_ms(args.timeout)
        .read_timeout_ms(args.timeout)
        .write_timeout_ms(args.timeout);
    let config = match &args.socket {
        Some(path) => builder.unix(path),
        None => builder.tcp(&args.host, args.port),
    }
    .build();

    let mut conn = Connection::connect(&config)?;
    tracing::debug!("redwire-cli v{} connected to {}", redwire::VERSION, config.endpoint);

    if let Some(password) = &args.password {
        conn.auth(password.as_str())?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.pipeline {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if let Some(command) = parse_line(&line) {
                conn.queue(&command)?;
            }
        }
        if conn.pending() == 0 {
            return Ok(());
        }
        for value in conn.drain_all()? {
            print_value(&mut out, &value, 0)?;
        }
    } else {
        let command = Command::new(args.command[0].as_str()).args(args.command[1..].iter());
        let value = conn.execute(&command, ReplyRule::DEFAULT.return_errors())?;
        print_value(&mut out, &value, 0)?;
    }

    out.flush()?;
    conn.close();
    Ok(())
}

/// Split a stdin line into a command; blank lines and `#` comments are skipped
fn parse_line(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let name = words.next().filter(|w| !w.starts_with('#'))?;
    Some(Command::new(name).args(words))
}

/// Print a value the way interactive clients usually do
fn print_value<W: Write>(out: &mut W, value: &Value, indent: usize) -> io::Result<()> {
    match value {
        Value::Nil => writeln!(out, "(nil)"),
        Value::Bool(b) => writeln!(out, "(integer) {}", *b as i64),
        Value::Int(n) => writeln!(out, "(integer) {}", n),
        Value::Float(f) => writeln!(out, "(float) {}", f),
        Value::Bytes(b) => writeln!(out, "\"{}\"", b.escape_ascii()),
        Value::Status(s) => writeln!(out, "{}", s),
        Value::Symbol(s) => writeln!(out, "{}", s),
        Value::Error(err) => writeln!(out, "(error) {}", err),
        Value::Array(items) if items.is_empty() => writeln!(out, "(empty array)"),
        Value::Array(items) => {
            let width = items.len().to_string().len();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, "{:indent$}", "", indent = indent)?;
                }
                write!(out, "{:>width$}) ", i + 1, width = width)?;
                print_value(out, item, indent + width + 2)?;
            }
            Ok(())
        }
    }
}
