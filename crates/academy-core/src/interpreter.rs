//! Scripted command interpreter
//!
//! A closed vocabulary of shell-like verbs with canned output. There is no
//! filesystem behind it: `mkdir` and `touch` only report success, and `cat`
//! knows exactly one file.

use chrono::{DateTime, Local};

/// Home directory reported by `pwd`
pub const HOME_DIR: &str = "/home/student";

/// User reported by `whoami`
pub const USER_NAME: &str = "student";

/// The one file `cat` can read
pub const HELLO_FILE: &str = "hello.txt";

const HELLO_CONTENT: &str = "Hello, Linux World!";

const LS_SHORT: &[&str] = &["Documents  hello.txt"];

const LS_LONG: &[&str] = &[
    "total 12",
    "drwxr-xr-x 3 student student 4096 Jan 15 10:30 .",
    "drwxr-xr-x 3 root    root    4096 Jan 15 10:00 ..",
    "-rw-r--r-- 1 student student  220 Jan 15 10:30 .bashrc",
    "drwxr-xr-x 2 student student 4096 Jan 15 10:30 Documents",
    "-rw-r--r-- 1 student student   18 Jan 15 10:30 hello.txt",
];

/// Flags that switch `ls` to long format (exact token match)
const LS_LONG_FLAGS: &[&str] = &["-l", "-la"];

/// Supported verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Ls,
    Pwd,
    Whoami,
    Date,
    Echo,
    Clear,
    Cat,
    Mkdir,
    Touch,
    Help,
}

impl Verb {
    /// All verbs, in the order `help` lists them
    pub const ALL: [Verb; 10] = [
        Verb::Ls,
        Verb::Pwd,
        Verb::Whoami,
        Verb::Date,
        Verb::Echo,
        Verb::Clear,
        Verb::Cat,
        Verb::Mkdir,
        Verb::Touch,
        Verb::Help,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Verb::Ls => "ls",
            Verb::Pwd => "pwd",
            Verb::Whoami => "whoami",
            Verb::Date => "date",
            Verb::Echo => "echo",
            Verb::Clear => "clear",
            Verb::Cat => "cat",
            Verb::Mkdir => "mkdir",
            Verb::Touch => "touch",
            Verb::Help => "help",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Verb::Ls => "list directory contents",
            Verb::Pwd => "print working directory",
            Verb::Whoami => "print current user",
            Verb::Date => "show current date and time",
            Verb::Echo => "display text",
            Verb::Clear => "clear terminal screen",
            Verb::Cat => "display file contents",
            Verb::Mkdir => "create directory",
            Verb::Touch => "create empty file",
            Verb::Help => "show this help message",
        }
    }

    /// Case-sensitive lookup
    pub fn parse(token: &str) -> Option<Verb> {
        Verb::ALL.into_iter().find(|verb| verb.name() == token)
    }
}

/// A tokenized input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Blank or whitespace-only input
    Empty,
    Known { verb: Verb, args: Vec<&'a str> },
    /// First token as typed
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            return Command::Empty;
        };

        match Verb::parse(first) {
            Some(verb) => Command::Known {
                verb,
                args: tokens.collect(),
            },
            None => Command::Unknown(first),
        }
    }
}

/// What the terminal should do with the result of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Append these lines (possibly none)
    Lines(Vec<String>),
    /// Wipe prior output
    Clear,
}

impl Output {
    fn line(text: impl Into<String>) -> Self {
        Output::Lines(vec![text.into()])
    }

    fn fixture(lines: &[&str]) -> Self {
        Output::Lines(lines.iter().map(|l| l.to_string()).collect())
    }
}

/// Interpret one input line against the wall clock
pub fn interpret(line: &str) -> Output {
    interpret_at(line, academy_util::now())
}

/// Interpret one input line; `now` is what `date` prints
pub fn interpret_at(line: &str, now: DateTime<Local>) -> Output {
    match Command::parse(line) {
        Command::Empty => Output::Lines(Vec::new()),
        Command::Unknown(verb) => Output::line(format!("{}: command not found", verb)),
        Command::Known { verb, args } => run(verb, &args, now),
    }
}

fn run(verb: Verb, args: &[&str], now: DateTime<Local>) -> Output {
    match verb {
        Verb::Help => {
            let mut lines = vec!["Available commands:".to_string()];
            lines.extend(
                Verb::ALL
                    .iter()
                    .map(|v| format!("  {:<12}- {}", v.name(), v.summary())),
            );
            Output::Lines(lines)
        }
        Verb::Ls => {
            if args.iter().any(|arg| LS_LONG_FLAGS.contains(arg)) {
                Output::fixture(LS_LONG)
            } else {
                Output::fixture(LS_SHORT)
            }
        }
        Verb::Pwd => Output::line(HOME_DIR),
        Verb::Whoami => Output::line(USER_NAME),
        Verb::Date => Output::line(academy_util::format_shell_date(&now)),
        Verb::Echo => Output::line(args.join(" ")),
        Verb::Clear => Output::Clear,
        Verb::Cat => match args.first() {
            Some(&HELLO_FILE) => Output::line(HELLO_CONTENT),
            Some(name) => Output::line(format!("cat: {}: No such file or directory", name)),
            None => Output::line("cat: missing file operand"),
        },
        Verb::Mkdir => match args.first() {
            Some(name) => Output::line(format!("Directory '{}' created successfully", name)),
            None => Output::line("mkdir: missing operand"),
        },
        Verb::Touch => match args.first() {
            Some(name) => Output::line(format!("File '{}' created successfully", name)),
            None => Output::line("touch: missing file operand"),
        },
    }
}
