//! Parse input configuration file

use std::fmt;
use std::error::Error;
use std::path::Path;
use yaml_rust::{YamlLoader, yaml::Yaml};
use meval::Context;

use crate::particle::Profile;

pub enum InputError {
    InvalidInputFile(&'static str),
    CouldNotParse(String, String),
    MissingField(String, String),
    Inconsistent(String),
}

impl fmt::Debug for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InputError::*;
        let help_msg = "Usage: hypic input-file";
        match self {
            InvalidInputFile(s) => write!(f, "invalid input file: {}\n{}", s, help_msg),
            CouldNotParse(token,field) => write!(f, "unable to parse '{}' = '{}' in configuration file", token, field),
            MissingField(section,field) => write!(f, "unable to find '{}' in section '{}' with correct type in configuration file", field, section),
            Inconsistent(s) => write!(f, "inconsistent configuration: {}", s),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for InputError {}

/// Represents the input configuration, can be queried
/// for desired parameters
pub struct Configuration {
    input: Yaml,
    ctx: Context<'static>,
}

impl Configuration {
    pub fn from_file(path: &Path) -> Result<Configuration, InputError> {
        let contents = std::fs::read_to_string(path).map_err(|_e| InputError::InvalidInputFile("unable to read file"))?;
        Configuration::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Configuration, InputError> {
        let input = YamlLoader::load_from_str(contents).map_err(|_e| InputError::InvalidInputFile("yaml trouble"))?;
        let input = input.first().ok_or(InputError::InvalidInputFile("yaml trouble"))?;
        Ok(Configuration {
            input: input.clone(),
            ctx: Context::new(),
        })
    }

    /// Adds the default helper functions to the evaluation context, then
    /// every constant of `section`, if present.
    pub fn with_context(&mut self, section: &str) -> &mut Self {
        self.ctx
            .func3("step", |x, min, max| if x >= min && x < max {1.0} else {0.0})
            .func3("gauss", |x, mu, sigma| (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp());

        // constants may refer to those defined above them
        if let Some(hash) = self.input[section].as_hash() {
            for (a, b) in hash {
                match (a, b) {
                    (Yaml::String(s), Yaml::Real(v)) => {
                        if let Ok(num) = v.parse::<f64>() {self.ctx.var(s, num);}
                    },
                    (Yaml::String(s), Yaml::Integer(i)) => {
                        self.ctx.var(s, *i as f64);
                    },
                    (Yaml::String(s), Yaml::String(v)) => {
                        if let Ok(expr) = v.parse::<meval::Expr>() {
                            if let Ok(num) = expr.eval_with_context(&self.ctx) {self.ctx.var(s, num);}
                        }
                    },
                    _ => ()
                }
            }
        }

        self
    }

    pub fn has_section(&self, section: &str) -> bool {
        !self.input[section].is_badvalue()
    }

    pub fn real(&self, section: &str, field: &str) -> Result<f64, InputError> {
        let name = field.to_owned();
        match &self.input[section][field] {
            Yaml::Real(s) => s.parse::<f64>().map_err(|_| InputError::CouldNotParse(name.clone(), s.clone())),
            Yaml::Integer(i) => Ok(*i as f64),
            Yaml::String(s) => {
                let expr = s.parse::<meval::Expr>().map_err(|_| InputError::CouldNotParse(name.clone(), s.clone()))?;
                expr.eval_with_context(&self.ctx).map_err(|_| InputError::CouldNotParse(name.clone(), s.clone()))
            },
            _ => Err(InputError::MissingField(section.to_owned(), name)),
        }
    }

    /// Like `real`, but an absent field gives `default`.
    pub fn real_or(&self, section: &str, field: &str, default: f64) -> Result<f64, InputError> {
        match self.real(section, field) {
            Err(InputError::MissingField(_, _)) if self.input[section][field].is_badvalue() => Ok(default),
            result => result,
        }
    }

    /// A function of `arg`, which owns its copy of the evaluation context.
    pub fn func(&self, section: &str, field: &str, arg: &str) -> Result<Profile, InputError> {
        let text = match &self.input[section][field] {
            Yaml::String(s) | Yaml::Real(s) => s.clone(),
            Yaml::Integer(i) => i.to_string(),
            _ => return Err(InputError::MissingField(section.to_owned(), field.to_owned())),
        };
        let expr = text.parse::<meval::Expr>().map_err(|_| InputError::CouldNotParse(field.to_owned(), text.clone()))?;
        let func = expr.bind_with_context(self.ctx.clone(), arg).map_err(|_| InputError::CouldNotParse(field.to_owned(), text.clone()))?;
        Ok(Box::new(func))
    }

    /// Like `func`, but an absent field gives the constant `default`.
    pub fn func_or(&self, section: &str, field: &str, arg: &str, default: f64) -> Result<Profile, InputError> {
        if self.input[section][field].is_badvalue() {
            Ok(Box::new(move |_| default))
        } else {
            self.func(section, field, arg)
        }
    }

    pub fn integer(&self, section: &str, field: &str) -> Result<i64, InputError> {
        match &self.input[section][field] {
            Yaml::Integer(i) => Ok(*i),
            _ => Err(InputError::MissingField(section.to_owned(), field.to_owned())),
        }
    }

    pub fn integer_or(&self, section: &str, field: &str, default: i64) -> Result<i64, InputError> {
        if self.input[section][field].is_badvalue() {
            Ok(default)
        } else {
            self.integer(section, field)
        }
    }

    pub fn strings(&self, section: &str, field: &str) -> Result<Vec<String>, InputError> {
        let name = field.to_owned();
        match &self.input[section][field] {
            Yaml::String(s) => {
                Ok(vec![s.clone()])
            },
            Yaml::Array(array) => {
                let take_yaml_string = |y: &Yaml| -> Option<String> {
                    match y {
                        Yaml::String(s) => Some(s.clone()),
                        _ => None
                    }
                };
                let got: Vec<String> = array.iter().filter_map(take_yaml_string).collect();
                if got.is_empty() {
                    Err(InputError::CouldNotParse(section.to_owned(), name))
                } else {
                    Ok(got)
                }
            },
            _ => Err(InputError::MissingField(section.to_owned(), name))
        }
    }

    /// Like `string`, but an absent field gives `default`. A field that
    /// is present but not a single string is an error.
    pub fn string_or(&self, section: &str, field: &str, default: &str) -> Result<String, InputError> {
        match &self.input[section][field] {
            Yaml::BadValue => Ok(default.to_owned()),
            Yaml::String(s) => Ok(s.clone()),
            _ => Err(InputError::CouldNotParse(section.to_owned(), field.to_owned())),
        }
    }
}

#[rustversion::since(1.38)]
pub fn ettc (start: std::time::Instant, current: usize, total: usize) -> std::time::Duration {
    let rt = start.elapsed().as_secs_f64();
    let ettc = rt * ((total - current) as f64) / (current as f64);
    std::time::Duration::from_secs_f64(ettc)
}

#[rustversion::before(1.38)]
pub fn ettc (start: std::time::Instant, current: usize, total: usize) -> std::time::Duration {
    let rt = start.elapsed();
    let rt = (rt.as_secs() as f64) + (rt.subsec_nanos() as f64) * 1.0e-9;
    let ettc = rt * ((total - current) as f64) / (current as f64);
    std::time::Duration::from_secs(ettc as u64)
}

pub struct PrettyDuration {
    pub duration: std::time::Duration,
}

impl From<std::time::Duration> for PrettyDuration {
    fn from(duration: std::time::Duration) -> PrettyDuration {
        PrettyDuration {duration: duration}
    }
}

impl fmt::Display for PrettyDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut t = self.duration.as_secs();
        let s = t % 60;
        t /= 60;
        let min = t % 60;
        t /= 60;
        let hr = t % 24;
        let d = t / 24;
        if d > 0 {
            write!(f, "{}d {:02}:{:02}:{:02}", d, hr, min, s)
        } else {
            write!(f, "{:02}:{:02}:{:02}", hr, min, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEXT: &str = "
---
constants:
  L: 2.0
  n0: 1.5
  half: L / 2

box:
  n: 64
  width: L * 10
  profile: n0 * step(x, 0, half)
  flat: 3
  names: [protons, alphas]
";

    #[test]
    fn evaluates_with_constants() {
        let mut config = Configuration::from_str(TEXT).unwrap();
        config.with_context("constants");
        assert_eq!(config.integer("box", "n").unwrap(), 64);
        assert_eq!(config.real("box", "width").unwrap(), 20.0);
        assert_eq!(config.real("box", "n").unwrap(), 64.0);

        let profile = config.func("box", "profile", "x").unwrap();
        assert_eq!(profile(0.5), 1.5);
        assert_eq!(profile(1.5), 0.0);

        let flat = config.func("box", "flat", "x").unwrap();
        assert_eq!(flat(-10.0), 3.0);

        assert_eq!(config.strings("box", "names").unwrap(), vec!["protons".to_owned(), "alphas".to_owned()]);
    }

    #[test]
    fn defaults_and_missing_fields() {
        let mut config = Configuration::from_str(TEXT).unwrap();
        config.with_context("no_such_section");
        assert_eq!(config.real_or("box", "eta", 0.25).unwrap(), 0.25);
        assert_eq!(config.integer_or("box", "seed", 7).unwrap(), 7);
        assert_eq!(config.func_or("box", "vx", "x", 0.0).unwrap()(3.0), 0.0);
        assert!(matches!(config.real("box", "eta"), Err(InputError::MissingField(_, _))));
        // present but unparseable is not silently defaulted
        assert!(matches!(config.real_or("box", "names", 0.0), Err(InputError::MissingField(_, _))));
        // constants were not loaded, so L is unknown
        assert!(matches!(config.real("box", "width"), Err(InputError::CouldNotParse(_, _))));
        assert_eq!(config.string_or("box", "pusher", "modified_boris").unwrap(), "modified_boris");
        assert!(matches!(config.string_or("box", "n", "yee"), Err(InputError::CouldNotParse(_, _))));
        assert!(matches!(config.string_or("box", "names", "protons"), Err(InputError::CouldNotParse(_, _))));
        assert!(config.has_section("box"));
        assert!(!config.has_section("fields"));
    }

    #[test]
    fn durations_are_pretty() {
        let d = PrettyDuration::from(std::time::Duration::from_secs(3 * 86400 + 2 * 3600 + 5 * 60 + 9));
        assert_eq!(format!("{}", d), "3d 02:05:09");
        let d = PrettyDuration::from(std::time::Duration::from_secs(61));
        assert_eq!(format!("{}", d), "00:01:01");
    }
}
