//! Command-line flags as a configuration source.
//!
//! Each option has a long form (`--opt-x=value` or `--opt-x value`) and an
//! optional short form (`-x value`). Anything that is not a flag is collected
//! as a positional argument. The provenance of a value names the flag the user
//! actually typed.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use strata_core::{Key, Location, Misconfiguration, Provenance, Result};
use tracing::debug;

use crate::configuration::{Configuration, Listing, RawProperty};
use crate::overriding::Override;

static LOCATION: Location = Location {
    description: Cow::Borrowed("command-line parameters"),
    uri: None,
};

/// A flag bound to a configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineOption {
    key: String,
    long: String,
    short: Option<String>,
    description: String,
    metavar: Option<String>,
}

impl CommandLineOption {
    /// Long flag `--<key with '.' as '-'>`, described as `set <key words>`.
    pub fn new<T: 'static>(key: &Key<T>) -> Self {
        let name = key.name();
        Self {
            key: name.to_owned(),
            long: name.replace('.', "-"),
            short: None,
            description: format!("set {}", name.replace('.', " ")),
            metavar: None,
        }
    }

    /// Long flag name, without the leading `--`.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    /// Short flag name, without the leading `-`.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn long_flag(&self) -> String {
        format!("--{}", self.long)
    }

    pub fn short_flag(&self) -> Option<String> {
        self.short.as_ref().map(|s| format!("-{s}"))
    }

    /// Defaults to the long name upper-cased.
    pub fn metavar_name(&self) -> String {
        self.metavar.clone().unwrap_or_else(|| self.long.to_uppercase())
    }

    fn validate(&self) -> Result<()> {
        if self.long.starts_with('-') {
            return Err(Misconfiguration::new(format!(
                "long flag must not be specified with leading '-': {}",
                self.long
            )));
        }
        if let Some(short) = self.short.as_ref().filter(|s| s.starts_with('-')) {
            return Err(Misconfiguration::new(format!(
                "short flag must not be specified with leading '-': {short}"
            )));
        }
        Ok(())
    }

    fn usage(&self) -> String {
        let metavar = self.metavar_name();
        match self.short_flag() {
            Some(short) => format!("{short} {metavar}, {}={metavar}", self.long_flag()),
            None => format!("{}={metavar}", self.long_flag()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandLineProperty {
    flag_used: String,
    value: String,
}

/// The options given on one command line.
#[derive(Debug, Clone)]
pub struct CommandLineConfiguration {
    options: HashMap<String, CommandLineOption>,
    used: BTreeMap<String, CommandLineProperty>,
}

impl CommandLineConfiguration {
    pub fn location(&self) -> &Location {
        &LOCATION
    }
}

impl Configuration for CommandLineConfiguration {
    fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.used.get(name).map(|property| {
            RawProperty::new(
                Provenance::new(name, LOCATION.clone(), property.flag_used.as_str()),
                property.value.as_str(),
            )
        })
    }

    /// The short flag first, when the option has one.
    fn search_path_of(&self, name: &str) -> Vec<Provenance> {
        let Some(option) = self.options.get(name) else {
            return Vec::new();
        };
        option
            .short_flag()
            .into_iter()
            .chain(std::iter::once(option.long_flag()))
            .map(|flag| Provenance::new(name, LOCATION.clone(), flag))
            .collect()
    }

    fn list(&self) -> Listing {
        let given = self
            .used
            .values()
            .map(|p| (p.flag_used.clone(), p.value.clone()))
            .collect();
        vec![(LOCATION.clone(), given)]
    }
}

/// A successfully parsed command line.
#[derive(Debug, Clone)]
pub struct ParsedCommandLine {
    pub configuration: CommandLineConfiguration,
    pub arguments: Vec<String>,
}

impl ParsedCommandLine {
    /// Layer the command line over `fallback`, keeping the positional arguments.
    pub fn overriding<F: Configuration>(self, fallback: F) -> (Override<CommandLineConfiguration, F>, Vec<String>) {
        (Override::new(self.configuration, fallback), self.arguments)
    }
}

#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Parsed(ParsedCommandLine),
    /// `-h` or `--help` was given; holds the rendered usage text.
    Help(String),
}

/// Parses argument lists against a fixed set of options.
#[derive(Debug, Clone)]
pub struct CommandLineParser {
    options: Vec<CommandLineOption>,
    program_name: String,
    arg_metavar: String,
}

impl CommandLineParser {
    pub fn new(options: impl IntoIterator<Item = CommandLineOption>) -> Self {
        Self {
            options: options.into_iter().collect(),
            program_name: "<program>".into(),
            arg_metavar: "FILE".into(),
        }
    }

    pub fn program_name(mut self, program_name: impl Into<String>) -> Self {
        self.program_name = program_name.into();
        self
    }

    /// What the positional arguments are called in the usage line.
    pub fn arg_metavar(mut self, arg_metavar: impl Into<String>) -> Self {
        self.arg_metavar = arg_metavar.into();
        self
    }

    pub fn parse<I, S>(&self, args: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for option in &self.options {
            option.validate()?;
        }

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            return Ok(ParseOutcome::Help(self.help()));
        }

        let long_opts: HashMap<String, &CommandLineOption> =
            self.options.iter().map(|o| (o.long_flag(), o)).collect();
        let short_opts: HashMap<String, &CommandLineOption> = self
            .options
            .iter()
            .filter_map(|o| o.short_flag().map(|flag| (flag, o)))
            .collect();

        let mut used = BTreeMap::new();
        let mut arguments = Vec::new();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            let (option, flag, value) = if arg.starts_with("--") {
                match arg.split_once('=') {
                    Some((flag, value)) => {
                        let option = recognise(&long_opts, flag, &arg)?;
                        (option, flag.to_owned(), value.to_owned())
                    }
                    None => {
                        let option = recognise(&long_opts, &arg, &arg)?;
                        let value = iter.next().ok_or_else(|| missing_argument(&arg))?;
                        (option, arg, value)
                    }
                }
            } else if arg.starts_with('-') {
                let option = recognise(&short_opts, &arg, &arg)?;
                let value = iter.next().ok_or_else(|| missing_argument(&arg))?;
                (option, arg, value)
            } else {
                arguments.push(arg);
                continue;
            };

            debug!(key = option.key(), flag = %flag, "command-line option");
            used.insert(
                option.key.clone(),
                CommandLineProperty {
                    flag_used: flag,
                    value,
                },
            );
        }

        debug!(options = used.len(), arguments = arguments.len(), "parsed command line");
        Ok(ParseOutcome::Parsed(ParsedCommandLine {
            configuration: CommandLineConfiguration {
                options: self.options.iter().map(|o| (o.key.clone(), o.clone())).collect(),
                used,
            },
            arguments,
        }))
    }

    /// The usage text shown for `-h`/`--help`.
    pub fn help(&self) -> String {
        let mut lines: Vec<(String, &str)> = self
            .options
            .iter()
            .map(|o| (o.usage(), o.description.as_str()))
            .collect();
        lines.push(("-h, --help".into(), "show this help message and exit"));
        let width = lines.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);

        let mut help = format!(
            "Usage: {} [options] {} ...\n\nOptions:\n",
            self.program_name, self.arg_metavar
        );
        for (usage, description) in lines {
            help.push_str(&format!("  {usage:<width$}  {description}\n"));
        }
        help
    }
}

/// Parse `args` against `options` with the default program name.
pub fn parse_args<I, S>(args: I, options: impl IntoIterator<Item = CommandLineOption>) -> Result<ParseOutcome>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandLineParser::new(options).parse(args)
}

fn recognise<'a>(
    options: &HashMap<String, &'a CommandLineOption>,
    flag: &str,
    arg: &str,
) -> Result<&'a CommandLineOption> {
    options
        .get(flag)
        .copied()
        .ok_or_else(|| Misconfiguration::new(format!("unrecognised command-line option {arg}")))
}

fn missing_argument(arg: &str) -> Misconfiguration {
    Misconfiguration::new(format!("no argument for {arg} command-line option"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::string_type;

    #[test]
    fn test_option_defaults() {
        let option = CommandLineOption::new(&Key::new("opt.x", string_type()));
        assert_eq!(option.long_flag(), "--opt-x");
        assert_eq!(option.short_flag(), None);
        assert_eq!(option.metavar_name(), "OPT-X");
        assert_eq!(option.usage(), "--opt-x=OPT-X");
    }

    #[test]
    fn test_leading_dash_is_rejected() {
        let key = Key::new("opt.x", string_type());
        let long = parse_args(Vec::<String>::new(), [CommandLineOption::new(&key).long("--x")]);
        assert!(long.is_err());
        let short = parse_args(Vec::<String>::new(), [CommandLineOption::new(&key).short("-x")]);
        assert!(short.is_err());
    }

    #[test]
    fn test_metavar_follows_custom_long_name() {
        let option = CommandLineOption::new(&Key::new("opt.x", string_type())).long("the-x").short("x");
        assert_eq!(option.usage(), "-x THE-X, --the-x=THE-X");
    }
}
