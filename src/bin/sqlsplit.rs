//! sqlsplit CLI - inspect how statements tokenize and split into sections
//!
//! Usage: sqlsplit [OPTIONS] [FILE]
//!
//! Reads `;`-terminated statements from FILE, from `-cmd`, or from stdin,
//! and prints tokens, sections, or the derived count queries.

use sqlsplit::{
    classify, tokenize, ParseConfig, SectionParser, TraceCallback, TraceFlags, TraceInfo, Tracer,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Output mode for results
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputMode {
    Tokens,   // One token per line with its vocabulary classes
    Sections, // name|text per section
    Count,    // count_query()
    Limited,  // limited_count_query()
}

/// Shell state
struct Shell {
    mode: OutputMode,
    config: ParseConfig,
    bail: bool,
    echo: bool,
    trace: bool,
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "on" | "yes" | "1")
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl Shell {
    fn new() -> Self {
        Shell {
            mode: OutputMode::Sections,
            config: ParseConfig::default(),
            bail: false,
            echo: false,
            trace: false,
        }
    }

    fn parser(&self) -> SectionParser {
        let mut tracer = Tracer::new();
        if self.trace {
            let callback: TraceCallback = Arc::new(|info: &TraceInfo| eprintln!("{}", info.render()));
            tracer.set(Some(callback), TraceFlags::all());
        }
        SectionParser::with_config(self.config).with_tracer(tracer)
    }

    /// Process a dot command
    fn process_dot_command(&mut self, line: &str) -> Result<bool, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(true);
        }

        let cmd = parts[0].to_lowercase();
        match cmd.as_str() {
            ".quit" | ".exit" | ".q" => {
                return Ok(false);
            }
            ".help" => {
                self.print_help();
            }
            ".mode" => {
                if parts.len() > 1 {
                    self.mode = match parts[1].to_lowercase().as_str() {
                        "tokens" => OutputMode::Tokens,
                        "sections" => OutputMode::Sections,
                        "count" => OutputMode::Count,
                        "limited" => OutputMode::Limited,
                        _ => {
                            eprintln!("Error: unknown mode: {}", parts[1]);
                            return Ok(true);
                        }
                    };
                } else {
                    println!("current mode: {:?}", self.mode);
                }
            }
            ".collapse" => {
                if parts.len() > 1 {
                    self.config.collapse_whitespace = parse_flag(parts[1]);
                } else {
                    println!("collapse: {}", on_off(self.config.collapse_whitespace));
                }
            }
            ".depth" => {
                if parts.len() > 1 {
                    match parts[1].parse::<usize>() {
                        Ok(depth) => self.config = self.config.with_max_depth(depth),
                        Err(_) => eprintln!("Error: invalid depth: {}", parts[1]),
                    }
                } else {
                    println!("depth: {}", self.config.max_depth);
                }
            }
            ".bail" => {
                if parts.len() > 1 {
                    self.bail = parse_flag(parts[1]);
                } else {
                    println!("bail: {}", on_off(self.bail));
                }
            }
            ".echo" => {
                if parts.len() > 1 {
                    self.echo = parse_flag(parts[1]);
                } else {
                    println!("echo: {}", on_off(self.echo));
                }
            }
            ".trace" => {
                if parts.len() > 1 {
                    self.trace = parse_flag(parts[1]);
                } else {
                    println!("trace: {}", on_off(self.trace));
                }
            }
            ".read" => {
                if parts.len() > 1 {
                    self.read_file(parts[1])?;
                } else {
                    eprintln!("Error: .read requires a filename");
                }
            }
            ".version" => {
                println!("sqlsplit {}", env!("CARGO_PKG_VERSION"));
            }
            _ => {
                eprintln!("Error: unknown command: {}", cmd);
            }
        }
        Ok(true)
    }

    fn print_help(&self) {
        println!(
            r#".bail ON|OFF           Stop after hitting an error
.collapse ON|OFF       Collapse whitespace runs before scanning
.depth NUM             Maximum enclosure nesting depth
.echo ON|OFF           Turn command echo on or off
.exit                  Exit this program
.help                  Show this message
.mode MODE             Set output mode (tokens, sections, count, limited)
.quit                  Exit this program
.read FILENAME         Process statements in FILENAME
.trace ON|OFF          Print parse trace events on stderr
.version               Show version"#
        );
    }

    fn read_file(&mut self, path: &str) -> Result<(), String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        self.run_lines(content.lines().map(|l| Ok(l.to_string())))
    }

    /// Handle one statement; trailing `;` is a terminator, not a token
    fn execute_sql(&mut self, sql: &str) -> Result<(), String> {
        if self.echo {
            println!("{}", sql);
        }

        let statement = sql.trim_end().trim_end_matches(';');
        if statement.trim().is_empty() {
            return Ok(());
        }

        let outcome = match self.mode {
            OutputMode::Tokens => self.print_tokens(statement),
            mode => self.print_sections(statement, mode),
        };

        if let Err(msg) = outcome {
            eprintln!("Error: {}", msg);
            if self.bail {
                return Err(msg);
            }
        }
        Ok(())
    }

    fn print_tokens(&self, sql: &str) -> Result<(), String> {
        let stream = tokenize(sql, self.config.collapse_whitespace).map_err(|e| e.to_string())?;
        for text in stream.texts() {
            let classes: Vec<&str> = classify(text).iter_names().map(|(name, _)| name).collect();
            println!("{:?}|{}", text, classes.join(","));
        }
        Ok(())
    }

    fn print_sections(&self, sql: &str, mode: OutputMode) -> Result<(), String> {
        let map = self.parser().parse(sql).map_err(|e| e.to_string())?;
        match mode {
            OutputMode::Count => println!("{}", map.count_query()),
            OutputMode::Limited => println!("{}", map.limited_count_query()),
            _ => {
                for (name, text) in map.iter() {
                    println!("{}|{}", name, text);
                }
            }
        }
        Ok(())
    }

    /// Accumulate lines into statements, running dot commands between them
    fn run_lines<I>(&mut self, lines: I) -> Result<(), String>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut sql_buffer = String::new();

        for line in lines {
            let line = line.map_err(|e| e.to_string())?;
            let command = line.trim();

            if sql_buffer.is_empty() {
                if command.is_empty() {
                    continue;
                }
                if command.starts_with('.') {
                    if !self.process_dot_command(command)? {
                        return Ok(());
                    }
                    continue;
                }
            }

            // Statement text is kept verbatim; only dot commands are trimmed
            let line = line.as_str();

            if !sql_buffer.is_empty() {
                sql_buffer.push('\n');
            }
            sql_buffer.push_str(line);

            if sql_buffer.trim_end().ends_with(';') {
                self.execute_sql(&sql_buffer)?;
                sql_buffer.clear();
            }
        }

        if !sql_buffer.trim().is_empty() {
            self.execute_sql(&sql_buffer)?;
        }
        Ok(())
    }

    /// Run the shell in interactive mode
    fn run_interactive(&mut self) -> Result<(), String> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut sql_buffer = String::new();

        loop {
            let prompt = if sql_buffer.is_empty() {
                "sqlsplit> "
            } else {
                "     ...> "
            };
            print!("{}", prompt);
            stdout.flush().ok();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {}
                Err(e) => return Err(e.to_string()),
            }
            let line = line.trim_end_matches(['\r', '\n']);
            let command = line.trim();

            if sql_buffer.is_empty() {
                if command.is_empty() {
                    continue;
                }
                if command.starts_with('.') {
                    if !self.process_dot_command(command)? {
                        break;
                    }
                    continue;
                }
            }

            if !sql_buffer.is_empty() {
                sql_buffer.push('\n');
            }
            sql_buffer.push_str(line);

            if sql_buffer.trim_end().ends_with(';') {
                self.execute_sql(&sql_buffer)?;
                sql_buffer.clear();
            }
        }

        Ok(())
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut shell = Shell::new();
    let mut commands: Vec<String> = Vec::new();
    let mut file: Option<String> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-help" | "--help" | "-?" => {
                println!("Usage: sqlsplit [OPTIONS] [FILE]");
                println!();
                println!("Options:");
                println!("  -help              Show this help");
                println!("  -version           Show version");
                println!("  -cmd COMMAND       Run COMMAND (SQL or dot command) first");
                println!("  -bail              Stop after hitting an error");
                println!();
                println!("Statements are read from FILE, or from stdin when omitted.");
                return;
            }
            "-version" | "--version" => {
                println!("sqlsplit {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-bail" => {
                shell.bail = true;
            }
            "-cmd" => {
                i += 1;
                if let Some(cmd) = args.get(i) {
                    commands.push(cmd.clone());
                }
            }
            arg if !arg.starts_with('-') => {
                file = Some(arg.to_string());
            }
            arg => {
                eprintln!("Error: unknown option: {}", arg);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let ran_commands = !commands.is_empty();
    if let Err(e) = shell.run_lines(commands.into_iter().map(Ok)) {
        eprintln!("Error in -cmd: {}", e);
        std::process::exit(1);
    }

    let result = match file {
        Some(path) => shell.read_file(&path),
        None if ran_commands && atty::is(atty::Stream::Stdin) => Ok(()),
        None if atty::is(atty::Stream::Stdin) => shell.run_interactive(),
        None => {
            let stdin = io::stdin();
            let lines = stdin.lock().lines();
            shell.run_lines(lines)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
