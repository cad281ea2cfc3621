//! Console commands
//!
//! One command per line: a verb followed by its argument text. Generation
//! fields are separated by `|` as `address | specs | features [| tone]`.

use jinko_core::{GenerationRequest, Tone, View};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Verb not recognised
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    /// Verb needs an argument
    #[error("'{verb}' expects {expected}")]
    MissingArgument {
        /// Command verb
        verb: &'static str,
        /// Argument description
        expected: &'static str,
    },

    /// Argument did not parse
    #[error("{0}")]
    Invalid(String),
}

/// A console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign an agent in
    SignIn(String),
    /// Sign the agent out
    SignOut,
    /// Navigate to a view
    Open(View),
    /// Generate a draft
    Generate(GenerationRequest),
    /// Replace the draft text
    Edit(String),
    /// Audit the draft
    Audit,
    /// Apply the suggested rewrite
    Remediate,
    /// Move from a passed audit to the Studio
    Studio,
    /// Upload an identity image
    Upload(PathBuf),
    /// Submit a render
    Render,
    /// Narrate the draft into a file
    Narrate {
        /// Voice identifier
        voice_id: String,
        /// Output file
        output: PathBuf,
    },
    /// Refresh and list the vault
    Vault,
    /// Show the session
    Status,
    /// Check the service
    Health,
    /// List commands
    Help,
    /// Leave the console
    Quit,
}

/// Console help text
pub const HELP: &str = "\
commands:
  sign-in <agent>                      sign an agent in
  sign-out                             sign the agent out
  view <vault|origin|audit|studio>     navigate
  generate <address>|<specs>|<features>[|<tone>]
  edit <text>                          replace the draft
  audit                                audit the draft
  remediate                            apply the suggested rewrite
  studio                               proceed to the Studio after a pass
  upload <image path>                  upload an identity image
  render                               deploy the avatar render
  narrate <voice> <output path>        narrate the draft
  vault                                refresh and list assets
  status                               show the session
  health                               check the service
  quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(v, r)| (v, r.trim()));

        let command = match verb.to_ascii_lowercase().as_str() {
            "sign-in" | "login" => Command::SignIn(required(rest, "sign-in", "an agent name")?),
            "sign-out" | "logout" => Command::SignOut,
            "view" | "go" => {
                let view = required(rest, "view", "a view name")?;
                Command::Open(view.parse().map_err(CommandError::Invalid)?)
            }
            "generate" => Command::Generate(parse_request(rest)?),
            "edit" => Command::Edit(rest.to_string()),
            "audit" => Command::Audit,
            "remediate" | "fix" => Command::Remediate,
            "studio" => Command::Studio,
            "upload" => Command::Upload(PathBuf::from(required(rest, "upload", "a file path")?)),
            "render" | "deploy" => Command::Render,
            "narrate" => {
                let (voice_id, output) = rest
                    .split_once(char::is_whitespace)
                    .map(|(v, o)| (v.to_string(), o.trim()))
                    .filter(|(_, o)| !o.is_empty())
                    .ok_or(CommandError::MissingArgument {
                        verb: "narrate",
                        expected: "a voice and an output path",
                    })?;
                Command::Narrate {
                    voice_id,
                    output: PathBuf::from(output),
                }
            }
            "vault" | "ls" => Command::Vault,
            "status" => Command::Status,
            "health" => Command::Health,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required(
    rest: &str,
    verb: &'static str,
    expected: &'static str,
) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { verb, expected })
    } else {
        Ok(rest.to_string())
    }
}

/// Fields are forwarded as typed, empty ones included
fn parse_request(rest: &str) -> Result<GenerationRequest, CommandError> {
    let mut fields = rest.split('|').map(str::trim);
    let address = fields.next().unwrap_or_default();
    let specs = fields.next().unwrap_or_default();
    let features = fields.next().unwrap_or_default();
    let tone = match fields.next() {
        Some(t) if !t.is_empty() => Tone::from_str(t).map_err(CommandError::Invalid)?,
        _ => Tone::default(),
    };
    if fields.next().is_some() {
        return Err(CommandError::Invalid(
            "generate takes at most four '|'-separated fields".to_string(),
        ));
    }
    Ok(GenerationRequest::new(address, specs, features).with_tone(tone))
}

/// MIME type implied by an image file's extension
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
