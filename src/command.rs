//! Shell command templates
//!
//! A [CommandLine] is an ordered list of tokens that renders to the final shell invocation of a
//! job. Required parameters are checked when rendering, so a job that was configured without one
//! of them fails with a [JobError] naming the job and the parameter instead of producing a broken
//! command.

use std::fmt::Display;

use crate::job::JobError;

enum Token {
    Literal(String),
    Required { flag: String, parameter: &'static str, value: Option<String> },
    Optional { flag: String, value: Option<String> },
    Conditional { text: String, enabled: bool },
}

pub struct CommandLine {
    job: String,
    tokens: Vec<Token>,
}

impl CommandLine {
    /// Start a command for `job` with the program (and any fixed leading arguments)
    pub fn new(job: &str, program: &str) -> CommandLine {
        CommandLine { job: job.to_string(), tokens: vec![Token::Literal(program.to_string())] }
    }

    pub fn arg(mut self, text: impl Display) -> Self {
        self.tokens.push(Token::Literal(text.to_string()));
        self
    }

    /// `flag value`, failing at render time when `value` is unset
    ///
    /// An empty flag renders just the value (positional argument).
    pub fn required<T: Display>(mut self, flag: &str, parameter: &'static str, value: Option<T>) -> Self {
        self.tokens.push(Token::Required {
            flag: flag.to_string(),
            parameter,
            value: value.map(|v| v.to_string()),
        });
        self
    }

    /// `flag value`, omitted when `value` is unset
    pub fn optional<T: Display>(mut self, flag: &str, value: Option<T>) -> Self {
        self.tokens.push(Token::Optional { flag: flag.to_string(), value: value.map(|v| v.to_string()) });
        self
    }

    /// `text`, only when `enabled`
    pub fn conditional(mut self, enabled: bool, text: &str) -> Self {
        self.tokens.push(Token::Conditional { text: text.to_string(), enabled });
        self
    }

    pub fn render(&self) -> Result<String, JobError> {
        let mut words: Vec<String> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => words.push(text.clone()),
                Token::Required { flag, parameter, value } => match value {
                    Some(v) => words.push(join_flag(flag, v)),
                    None => {
                        return Err(JobError::MissingParameter {
                            job: self.job.clone(),
                            parameter: parameter.to_string(),
                        })
                    }
                },
                Token::Optional { flag, value } => {
                    if let Some(v) = value {
                        words.push(join_flag(flag, v))
                    }
                }
                Token::Conditional { text, enabled } => {
                    if *enabled {
                        words.push(text.clone())
                    }
                }
            }
        }
        Ok(words.into_iter().filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
    }
}

fn join_flag(flag: &str, value: &str) -> String {
    match flag.is_empty() {
        true => value.to_string(),
        false => format!("{flag} {value}"),
    }
}

/// Run rendered commands one after another, stopping at the first failure
pub fn chain(commands: &[CommandLine]) -> Result<String, JobError> {
    join_rendered(commands, " && ")
}

/// Stream rendered commands into each other
pub fn pipe(commands: &[CommandLine]) -> Result<String, JobError> {
    join_rendered(commands, " | ")
}

fn join_rendered(commands: &[CommandLine], separator: &str) -> Result<String, JobError> {
    let rendered = commands.iter().map(|c| c.render()).collect::<Result<Vec<String>, JobError>>()?;
    Ok(rendered.join(separator))
}

/// Shorthand for an `Option<String>` field as the `Option<&str>` a template expects
pub fn opt(value: &Option<String>) -> Option<&str> {
    value.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tokens_in_order() {
        let cmd = CommandLine::new("bwa", "bwa mem -M")
            .required("-R", "readgroup", Some("@RG"))
            .optional("-t", Some(4))
            .optional("-x", None::<&str>)
            .conditional(true, "--removeDups")
            .conditional(false, "--never")
            .required("", "reference", Some("/ref/genome.fa"));

        assert_eq!(cmd.render().unwrap(), "bwa mem -M -R @RG -t 4 --removeDups /ref/genome.fa");
    }

    #[test]
    fn missing_required_names_job_and_parameter() {
        let cmd = CommandLine::new("svcaller", "svcaller run").required("--bam", "input_bam", None::<String>);

        let err = cmd.render().unwrap_err();
        assert_eq!(
            err,
            JobError::MissingParameter { job: "svcaller".to_string(), parameter: "input_bam".to_string() }
        );
        assert!(err.to_string().contains("input_bam"));
    }

    #[test]
    fn chains_and_pipes() {
        let a = CommandLine::new("x", "echo a");
        let b = CommandLine::new("x", "cat");
        assert_eq!(pipe(&[a, b]).unwrap(), "echo a | cat");

        let a = CommandLine::new("x", "mkdir -p out");
        let b = CommandLine::new("x", "touch").required("", "file", None::<&str>);
        assert!(chain(&[a, b]).is_err());
    }

    #[test]
    fn rendering_is_repeatable() {
        let cmd = CommandLine::new("tabix", "tabix -p vcf").required("", "vcf", Some("a.vcf.gz"));
        assert_eq!(cmd.render().unwrap(), cmd.render().unwrap());
    }
}
