use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

pub const DEFAULT_URL: &str = "https://fbref.com/en/comps/Big5/Big-5-European-Leagues-Stats";
pub const DEFAULT_TABLE_ID: &str = "big5_table";
pub const DEFAULT_OUTPUT: &str = "Top Leagues Scatter Plot analysis.png";
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const USAGE: &str = "\
Usage: xg_scatter [options]

  --url <url>          page holding the stats table
  --table-id <id>      id attribute of the table
  --out <path>         output image path
  --top-k <n>          over/under performers to annotate
  --summary <path>     also write a JSON summary of the performers
  --html <path>        read the page from a saved file instead of the network
  --timeout <secs>     request timeout
  --no-show            do not open the image after saving
  -h, --help           print this help";

/// Header names the deriver reads from the fetched table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub team: String,
    pub goals_for: String,
    pub expected_goals: String,
    pub competition: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            team: "Squad".to_string(),
            goals_for: "GF".to_string(),
            expected_goals: "xG".to_string(),
            competition: "Comp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterConfig {
    pub url: String,
    pub table_id: String,
    pub output_path: PathBuf,
    pub top_k: usize,
    pub columns: ColumnNames,
    pub show: bool,
    pub summary_path: Option<PathBuf>,
    pub html_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_id: DEFAULT_TABLE_ID.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            top_k: DEFAULT_TOP_K,
            columns: ColumnNames::default(),
            show: true,
            summary_path: None,
            html_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(ScatterConfig),
    Help,
}

impl ScatterConfig {
    /// Defaults, then `.env.local`/`.env`, then process env, then flags.
    pub fn load(args: &[String]) -> Result<Invocation> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let mut cfg = ScatterConfig::default();
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.apply_args(args)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("XG_SCATTER_URL") {
            self.url = url;
        }
        if let Some(id) = get("XG_SCATTER_TABLE_ID") {
            self.table_id = id;
        }
        if let Some(out) = get("XG_SCATTER_OUTPUT") {
            self.output_path = PathBuf::from(out);
        }
        if let Some(raw) = get("XG_SCATTER_TOP_K") {
            self.top_k = raw
                .parse()
                .with_context(|| format!("XG_SCATTER_TOP_K={raw:?} is not a count"))?;
        }
        if let Some(raw) = get("XG_SCATTER_SHOW") {
            self.show = parse_flag(&raw)
                .ok_or_else(|| anyhow!("XG_SCATTER_SHOW={raw:?} is not a boolean"))?;
        }
        if let Some(path) = get("XG_SCATTER_SUMMARY") {
            self.summary_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get("XG_SCATTER_HTML") {
            self.html_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = get("XG_SCATTER_TIMEOUT_SECS") {
            self.timeout_secs = parse_timeout(&raw)
                .with_context(|| format!("XG_SCATTER_TIMEOUT_SECS={raw:?}"))?;
        }
        Ok(())
    }

    /// Accepts `--flag value` and `--flag=value`.
    pub fn apply_args(mut self, args: &[String]) -> Result<Invocation> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((f, v)) if f.starts_with("--") => (f, Some(v.to_string())),
                _ => (arg.as_str(), None),
            };
            let mut value = |name: &str| -> Result<String> {
                match inline.clone() {
                    Some(v) => Ok(v),
                    None => iter
                        .next()
                        .cloned()
                        .ok_or_else(|| anyhow!("missing value for {name}")),
                }
            };

            match flag {
                "-h" | "--help" => return Ok(Invocation::Help),
                "--no-show" => self.show = false,
                "--url" => self.url = value(flag)?,
                "--table-id" => self.table_id = value(flag)?,
                "--out" | "-o" => self.output_path = PathBuf::from(value(flag)?),
                "--summary" => self.summary_path = Some(PathBuf::from(value(flag)?)),
                "--html" => self.html_path = Some(PathBuf::from(value(flag)?)),
                "--top-k" | "-k" => {
                    let raw = value(flag)?;
                    self.top_k = raw
                        .parse()
                        .with_context(|| format!("--top-k {raw:?} is not a count"))?;
                }
                "--timeout" => {
                    let raw = value(flag)?;
                    self.timeout_secs =
                        parse_timeout(&raw).with_context(|| format!("--timeout {raw:?}"))?;
                }
                other => return Err(anyhow!("unknown argument: {other}\n\n{USAGE}")),
            }
        }
        Ok(Invocation::Run(self))
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    let secs: u64 = raw.parse().context("not a number of seconds")?;
    if secs == 0 {
        return Err(anyhow!("timeout must be at least one second"));
    }
    Ok(secs)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn run_config(inv: Invocation) -> ScatterConfig {
        match inv {
            Invocation::Run(cfg) => cfg,
            Invocation::Help => panic!("expected a run config"),
        }
    }

    #[test]
    fn defaults_match_the_published_page() {
        let cfg = ScatterConfig::default();
        assert_eq!(cfg.table_id, "big5_table");
        assert_eq!(cfg.top_k, 10);
        assert_eq!(
            cfg.output_path,
            PathBuf::from("Top Leagues Scatter Plot analysis.png")
        );
        assert!(cfg.show);
    }

    #[test]
    fn flags_override_env() {
        let env = HashMap::from([
            ("XG_SCATTER_TOP_K", "5"),
            ("XG_SCATTER_OUTPUT", "env.png"),
            ("XG_SCATTER_SHOW", "off"),
        ]);
        let mut cfg = ScatterConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()))
            .expect("env should apply");
        assert_eq!(cfg.top_k, 5);
        assert!(!cfg.show);

        let cfg = run_config(
            cfg.apply_args(&args(&["--top-k=3", "--out", "flag.png"]))
                .expect("args should parse"),
        );
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.output_path, PathBuf::from("flag.png"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = ScatterConfig::default();
        cfg.apply_env(|k| (k == "XG_SCATTER_URL").then(|| "   ".to_string()))
            .expect("env should apply");
        assert_eq!(cfg.url, DEFAULT_URL);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut cfg = ScatterConfig::default();
        assert!(cfg
            .apply_env(|k| (k == "XG_SCATTER_TOP_K").then(|| "ten".to_string()))
            .is_err());
        assert!(ScatterConfig::default()
            .apply_args(&args(&["--timeout", "-1"]))
            .is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ScatterConfig::default()
            .apply_args(&args(&["--timeout=0"]))
            .expect_err("zero timeout");
        assert!(format!("{err:#}").contains("at least one second"));

        let mut cfg = ScatterConfig::default();
        assert!(cfg
            .apply_env(|k| (k == "XG_SCATTER_TIMEOUT_SECS").then(|| "0".to_string()))
            .is_err());
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let cfg = run_config(
            ScatterConfig::default()
                .apply_args(&args(&["--timeout", "5"]))
                .expect("positive timeout"),
        );
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn help_and_unknown_flags() {
        assert_eq!(
            ScatterConfig::default()
                .apply_args(&args(&["--help"]))
                .expect("help parses"),
            Invocation::Help
        );
        assert!(ScatterConfig::default()
            .apply_args(&args(&["--bogus"]))
            .is_err());
        assert!(ScatterConfig::default()
            .apply_args(&args(&["--url"]))
            .is_err());
    }
}
