//! Agent console
//!
//! Reads commands line by line, drives the workflow controller and prints
//! each outcome followed by the notices it queued.

use crate::command::{content_type_for, Command, HELP};
use crate::config::ShellConfig;
use jinko_core::{
    AuditResult, ControllerError, IdentityFile, RenderResponse, SessionState, StaticAuth,
    StudioView, VaultApi, WorkflowController,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Whether the console keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop reading
    Quit,
}

/// Console over a workflow controller
pub struct Console<A> {
    auth: Arc<StaticAuth>,
    controller: WorkflowController<A, Arc<StaticAuth>>,
}

impl<A: VaultApi> Console<A> {
    /// Create console; the configured agent, if any, is signed in
    pub async fn new(api: A, config: &ShellConfig) -> Self {
        let auth = Arc::new(match &config.agent_name {
            Some(agent) => StaticAuth::signed_in(agent.clone()),
            None => StaticAuth::new(),
        });
        let controller = WorkflowController::new(api, Arc::clone(&auth), config.controller_config());
        controller.refresh_session().await;
        Self { auth, controller }
    }

    /// Underlying controller
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &WorkflowController<A, Arc<StaticAuth>> {
        &self.controller
    }

    /// Run commands until input ends or `quit`
    ///
    /// Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    /// Reading input or writing output failed
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let flow = match line.parse::<Command>() {
                Ok(command) => self.execute(command, out).await?,
                Err(e) => {
                    writeln!(out, "error: {e}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        out.flush()
    }

    /// Execute one command, then print queued notices
    ///
    /// # Errors
    /// Writing output failed
    pub async fn execute<W: Write>(&self, command: Command, out: &mut W) -> std::io::Result<Flow> {
        tracing::debug!(?command, "executing");
        let flow = self.dispatch(command, out).await?;
        for notice in self.controller.drain_notices() {
            writeln!(out, "{notice}")?;
        }
        Ok(flow)
    }

    async fn dispatch<W: Write>(&self, command: Command, out: &mut W) -> std::io::Result<Flow> {
        let c = &self.controller;
        match command {
            Command::SignIn(agent) => {
                self.auth.sign_in(agent);
                let session = c.refresh_session().await;
                if let Some(name) = session.agent_name {
                    writeln!(out, "signed in as {name}")?;
                }
            }
            Command::SignOut => {
                self.auth.sign_out();
                c.refresh_session().await;
                writeln!(out, "signed out")?;
            }
            Command::Open(view) => {
                if report(out, c.navigate(view).await)?.is_some() {
                    writeln!(out, "view: {}", c.snapshot().view())?;
                }
            }
            Command::Generate(request) => {
                if let Some(draft) = report(out, c.generate(request).await)? {
                    writeln!(out, "draft:\n{draft}")?;
                }
            }
            Command::Edit(text) => {
                if let Some(changed) = report(out, c.edit_draft(text))? {
                    writeln!(out, "{}", if changed { "draft updated" } else { "draft unchanged" })?;
                }
            }
            Command::Audit => {
                if let Some(result) = report(out, c.audit().await)? {
                    print_audit(out, &result)?;
                }
            }
            Command::Remediate => match report(out, c.apply_remediation())? {
                Some(true) => writeln!(out, "rewrite applied; audit again to certify")?,
                Some(false) => writeln!(out, "no rewrite to apply")?,
                None => {}
            },
            Command::Studio => match report(out, c.proceed_to_studio())? {
                Some(true) => writeln!(out, "view: studio")?,
                Some(false) => writeln!(out, "studio opens after a passed audit")?,
                None => {}
            },
            Command::Upload(path) => self.upload(&path, out).await?,
            Command::Render => match report(out, c.render().await)? {
                Some(RenderResponse::Started(job)) => writeln!(out, "render job: {job}")?,
                Some(RenderResponse::Rejected(msg)) => writeln!(out, "render rejected: {msg}")?,
                None => {}
            },
            Command::Narrate { voice_id, output } => {
                if let Some(narration) = report(out, c.narrate(&voice_id).await)? {
                    match tokio::fs::write(&output, &narration.audio).await {
                        Ok(()) => writeln!(
                            out,
                            "wrote {} bytes to {}",
                            narration.audio.len(),
                            output.display()
                        )?,
                        Err(e) => writeln!(out, "error: cannot write {}: {e}", output.display())?,
                    }
                }
            }
            Command::Vault => {
                if report(out, c.refresh_vault().await)?.is_some() {
                    print_vault(out, &c.snapshot())?;
                }
            }
            Command::Status => {
                let agent = c.session().agent_name.unwrap_or_else(|| "-".to_string());
                print_status(out, &agent, &c.snapshot())?;
            }
            Command::Health => match c.health().await {
                Ok(health) => writeln!(out, "{} (v{})", health.status, health.version)?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn upload<W: Write>(&self, path: &Path, out: &mut W) -> std::io::Result<()> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return writeln!(out, "error: cannot read {}: {e}", path.display()),
        };
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let file = IdentityFile {
            filename,
            content_type: content_type_for(path).to_string(),
            bytes,
        };
        if let Some(asset) = report(out, self.controller.upload_identity(file).await)? {
            writeln!(out, "identity: {}", asset.file_key)?;
        }
        Ok(())
    }
}

/// Print refusals that queue no notice; every other failure has one
fn report<T, W: Write>(
    out: &mut W,
    result: Result<T, ControllerError>,
) -> std::io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ControllerError::Unauthenticated) => {
            writeln!(out, "sign in first")?;
            Ok(None)
        }
        Err(ControllerError::Busy) => {
            writeln!(out, "busy: another operation is in progress")?;
            Ok(None)
        }
        Err(_) => Ok(None),
    }
}

fn print_audit<W: Write>(out: &mut W, result: &AuditResult) -> std::io::Result<()> {
    if result.is_pass() {
        return writeln!(out, "PASS");
    }
    writeln!(out, "FAIL ({} violations)", result.violations.len())?;
    for violation in &result.violations {
        match &violation.citation {
            Some(citation) => writeln!(
                out,
                "  - \"{}\": {} [{citation}]",
                violation.phrase, violation.reason
            )?,
            None => writeln!(out, "  - \"{}\": {}", violation.phrase, violation.reason)?,
        }
    }
    if let Some(rewrite) = result.remediation() {
        writeln!(out, "suggested rewrite:\n{rewrite}")?;
    }
    Ok(())
}

fn print_vault<W: Write>(out: &mut W, state: &SessionState) -> std::io::Result<()> {
    if state.vault().is_empty() {
        return writeln!(out, "vault is empty");
    }
    for entry in state.vault() {
        writeln!(
            out,
            "{:<8} {:<32} {}",
            format!("{:?}", entry.kind).to_lowercase(),
            entry.display_name(),
            entry.created_at
        )?;
    }
    Ok(())
}

fn print_status<W: Write>(out: &mut W, agent: &str, state: &SessionState) -> std::io::Result<()> {
    let studio = match state.studio_view() {
        StudioView::Locked => "locked".to_string(),
        StudioView::AwaitingIdentity => "awaiting identity".to_string(),
        StudioView::ReadyToDeploy(key) => format!("ready to deploy ({key})"),
        StudioView::Rendering(job) => format!("rendering ({job})"),
    };
    writeln!(out, "agent: {agent}")?;
    writeln!(out, "view: {}", state.view())?;
    writeln!(out, "certified: {}", if state.is_certified() { "yes" } else { "no" })?;
    writeln!(out, "studio: {studio}")?;
    writeln!(out, "draft: {} chars", state.draft().text.chars().count())?;
    writeln!(out, "actions: {:?}", state.available_actions())
}
