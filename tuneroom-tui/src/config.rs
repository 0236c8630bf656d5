use std::{path::PathBuf, str::FromStr};

use thiserror::Error;
use tuneroom_core::{presence::Session, store::RepeatMode};

pub const PRESENCE_URL_ENV: &str = "TUNEROOM_PRESENCE_URL";
pub const USER_ID_ENV: &str = "TUNEROOM_USER_ID";

pub const USAGE: &str = "\
usage: tuneroom [OPTIONS] [FILE | DIR | SONGS.json]...

options:
  --presence-url <URL>   websocket for now-playing updates (env TUNEROOM_PRESENCE_URL)
  --user <ID>            user id to share activity as (env TUNEROOM_USER_ID)
  --play                 start playing right away
  --shuffle              start with shuffle on
  --repeat <MODE>        off, all or one";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("invalid repeat mode '{0}' (expected off, all or one)")]
    InvalidRepeat(String),
}

/// Startup options for the player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Audio files, directories and song lists to queue
    pub paths: Vec<PathBuf>,
    pub presence_url: Option<String>,
    pub user_id: Option<String>,
    pub play: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl Config {
    /// Command line first, environment for whatever it leaves out
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::from_args(std::env::args().skip(1))?;
        Ok(config.with_env_fallbacks(|key| std::env::var(key).ok()))
    }

    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--presence-url" => {
                    let url = args.next().ok_or(ConfigError::MissingValue("--presence-url"))?;
                    config.presence_url = Some(url);
                }
                "--user" => {
                    let user = args.next().ok_or(ConfigError::MissingValue("--user"))?;
                    config.user_id = Some(user);
                }
                "--play" => config.play = true,
                "--shuffle" => config.shuffle = true,
                "--repeat" => {
                    let mode = args.next().ok_or(ConfigError::MissingValue("--repeat"))?;
                    config.repeat =
                        RepeatMode::from_str(&mode).map_err(|_| ConfigError::InvalidRepeat(mode))?;
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownOption(flag.to_string()));
                }
                _ => config.paths.push(PathBuf::from(arg)),
            }
        }

        Ok(config)
    }

    pub fn with_env_fallbacks<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.presence_url.is_none() {
            self.presence_url = lookup(PRESENCE_URL_ENV).filter(|v| !v.is_empty());
        }
        if self.user_id.is_none() {
            self.user_id = lookup(USER_ID_ENV).filter(|v| !v.is_empty());
        }
        self
    }

    pub fn session(&self) -> Session {
        match &self.user_id {
            Some(user) => Session::authenticated(user.clone()),
            None => Session::anonymous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_paths() {
        let config = Config::from_args(args(&[
            "music/",
            "--presence-url",
            "ws://localhost:5000/presence",
            "--user",
            "user_42",
            "--play",
            "--repeat",
            "ALL",
            "top.json",
        ]))
        .unwrap();

        assert_eq!(config.paths, [PathBuf::from("music/"), PathBuf::from("top.json")]);
        assert_eq!(config.presence_url.as_deref(), Some("ws://localhost:5000/presence"));
        assert_eq!(config.session(), Session::authenticated("user_42"));
        assert!(config.play);
        assert!(!config.shuffle);
        assert_eq!(config.repeat, RepeatMode::All);
    }

    #[test]
    fn defaults_to_anonymous_and_paused() {
        let config = Config::from_args(Vec::new()).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.session().is_authenticated());
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(
            Config::from_args(args(&["--user"])),
            Err(ConfigError::MissingValue("--user"))
        );
        assert_eq!(
            Config::from_args(args(&["--loud"])),
            Err(ConfigError::UnknownOption("--loud".into()))
        );
        assert_eq!(
            Config::from_args(args(&["--repeat", "twice"])),
            Err(ConfigError::InvalidRepeat("twice".into()))
        );
    }

    #[test]
    fn environment_fills_gaps_only() {
        let env = |key: &str| match key {
            PRESENCE_URL_ENV => Some("ws://env/presence".to_string()),
            USER_ID_ENV => Some("env_user".to_string()),
            _ => None,
        };

        let config = Config::from_args(args(&["--user", "cli_user"]))
            .unwrap()
            .with_env_fallbacks(env);
        assert_eq!(config.presence_url.as_deref(), Some("ws://env/presence"));
        assert_eq!(config.user_id.as_deref(), Some("cli_user"));

        let blank = Config::default().with_env_fallbacks(|_| Some(String::new()));
        assert_eq!(blank.user_id, None);
    }
}
