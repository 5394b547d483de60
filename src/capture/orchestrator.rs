//! Single-export state machine.
//!
//! A [`CaptureOrchestrator`] runs one [`CaptureJob`] from renderer launch to
//! written PDF and always tears the renderer down afterwards.
//!
//! # Flow
//!
//! | State | Work |
//! |-------|------|
//! | `Starting` | validate job, pick port, create profile, spawn renderer |
//! | `WaitingReady` | poll `GET /json` until a page has loaded, then settle |
//! | `Connecting` | select target, WebSocket handshake |
//! | `Capturing` | `Page.printToPDF`, decode, write output |
//! | `Done` / `Failed` | terminate renderer, report |

// ============================================================================
// Imports
// ============================================================================

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::browser::{TargetDiscovery, ready_page_target, select_page_target};
use crate::error::{Error, Result};
use crate::protocol::{Command, PrintToPdfParams, ProtocolClient, decode_pdf_data};

use super::job::CaptureJob;
use super::process::ProcessGuard;
use super::profile::RendererProfile;
use super::settings::CaptureSettings;
use super::state::CaptureState;

// ============================================================================
// CaptureReport
// ============================================================================

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    /// Where the PDF was written.
    pub output_path: PathBuf,
    /// Size of the PDF in bytes.
    pub bytes: usize,
    /// Wall-clock time from launch to written file.
    pub elapsed: Duration,
}

// ============================================================================
// CaptureOrchestrator
// ============================================================================

/// Drives one export through its states.
#[derive(Debug)]
pub struct CaptureOrchestrator<'a> {
    settings: &'a CaptureSettings,
    state: CaptureState,
    started: Instant,
    /// Last URL seen while polling, for diagnostics.
    last_url: Option<String>,
}

impl<'a> CaptureOrchestrator<'a> {
    /// Creates an orchestrator in the `Starting` state.
    #[must_use]
    pub fn new(settings: &'a CaptureSettings) -> Self {
        Self {
            settings,
            state: CaptureState::Starting,
            started: Instant::now(),
            last_url: None,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Runs `job` to completion.
    ///
    /// The renderer is terminated before this returns, whatever the outcome.
    /// If the returned future is dropped early the renderer is killed.
    ///
    /// # Errors
    ///
    /// Any error from validation, launch, discovery, connection, the capture
    /// command, decoding or writing the output.
    pub async fn run(&mut self, job: &CaptureJob) -> Result<CaptureReport> {
        self.started = Instant::now();
        info!(page_url = %job.page_url, output = %job.output_path.display(), "Capture started");

        if let Err(e) = job.validate() {
            self.fail(&e);
            return Err(e);
        }

        let launched = self.launch(job);
        let (mut process, profile, port) = match launched {
            Ok(parts) => parts,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        let outcome = self.drive(job, port, &mut process).await;

        process.terminate(self.settings.terminate_grace).await;
        drop(profile);

        match outcome {
            Ok(bytes) => {
                self.advance(CaptureState::Done);
                let report = CaptureReport {
                    output_path: job.output_path.clone(),
                    bytes,
                    elapsed: self.started.elapsed(),
                };
                info!(
                    output = %report.output_path.display(),
                    bytes,
                    elapsed_ms = elapsed_ms(report.elapsed),
                    "Capture finished"
                );
                Ok(report)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }
}

// ============================================================================
// CaptureOrchestrator - Stages
// ============================================================================

impl CaptureOrchestrator<'_> {
    /// `Starting`: port, profile and process.
    fn launch(&self, job: &CaptureJob) -> Result<(ProcessGuard, RendererProfile, u16)> {
        let port = match self.settings.debug_port {
            Some(port) => port,
            None => allocate_port(&self.settings.debug_host)?,
        };

        let profile = match &self.settings.profile_dir {
            Some(path) => RendererProfile::from_path(path)?,
            None => RendererProfile::new_temp()?,
        };

        let args = launch_args(self.settings, port, &profile, &job.page_url);
        debug!(binary = %self.settings.binary.display(), ?args, "Launching renderer");

        let process = ProcessGuard::spawn(&self.settings.binary, &args)?;
        info!(pid = process.pid(), port, "Renderer launched");

        Ok((process, profile, port))
    }

    /// Everything after launch; returns the PDF size.
    async fn drive(
        &mut self,
        job: &CaptureJob,
        port: u16,
        process: &mut ProcessGuard,
    ) -> Result<usize> {
        self.advance(CaptureState::WaitingReady);
        let discovery = TargetDiscovery::new(
            &self.settings.debug_host,
            port,
            self.settings.discovery_timeout,
        )?;
        self.wait_ready(&discovery, process).await?;

        if !self.settings.settle_delay.is_zero() {
            trace!(settle_ms = elapsed_ms(self.settings.settle_delay), "Letting page settle");
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        self.advance(CaptureState::Connecting);
        let target = select_page_target(discovery.list_targets().await?)?;
        let ws_url = target.websocket_url()?;
        debug!(target_id = %target.id, url = %target.url, ws_url, "Target selected");
        let mut client = ProtocolClient::connect(ws_url, self.settings.connect_timeout).await?;

        self.advance(CaptureState::Capturing);
        let command = Command::PrintToPdf(PrintToPdfParams::from(job));
        let result = client.execute(&command, job.timeout).await;
        client.close().await;

        let pdf = decode_pdf_data(&result?)?;
        tokio::fs::write(&job.output_path, &pdf).await?;
        debug!(bytes = pdf.len(), output = %job.output_path.display(), "PDF written");

        Ok(pdf.len())
    }

    /// `WaitingReady`: poll until a page target has loaded.
    async fn wait_ready(
        &mut self,
        discovery: &TargetDiscovery,
        process: &mut ProcessGuard,
    ) -> Result<()> {
        let ready_timeout = self.settings.ready_timeout;
        let deadline = Instant::now() + ready_timeout;

        loop {
            if let Some(status) = process.try_wait()? {
                return Err(Error::ProcessExited {
                    status: status.to_string(),
                });
            }

            match discovery.list_targets().await {
                Ok(targets) => {
                    if let Some(target) = ready_page_target(&targets) {
                        debug!(url = %target.url, "Page ready");
                        self.last_url = Some(target.url.clone());
                        return Ok(());
                    }
                    let seen = targets
                        .iter()
                        .find(|t| t.is_page())
                        .or_else(|| targets.first());
                    if let Some(target) = seen {
                        self.last_url = Some(target.url.clone());
                    }
                    trace!(count = targets.len(), "No loaded page yet");
                }
                Err(e) => trace!(error = %e, "Debug endpoint not ready"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::ReadinessTimeout {
                    last_url: self.last_url.clone(),
                    timeout_ms: elapsed_ms(ready_timeout),
                });
            }
            tokio::time::sleep(self.settings.poll_interval.min(deadline - now)).await;
        }
    }
}

// ============================================================================
// CaptureOrchestrator - Internal
// ============================================================================

impl CaptureOrchestrator<'_> {
    fn advance(&mut self, next: CaptureState) {
        if !self.state.can_advance_to(next) {
            warn!(from = %self.state, to = %next, "Unexpected state transition");
        }
        debug!(
            from = %self.state,
            to = %next,
            elapsed_ms = elapsed_ms(self.started.elapsed()),
            "Capture state changed"
        );
        self.state = next;
    }

    fn fail(&mut self, err: &Error) {
        let stage = self.state;
        self.advance(CaptureState::Failed);
        error!(
            stage = %stage,
            error = %err,
            elapsed_ms = elapsed_ms(self.started.elapsed()),
            last_url = self.last_url.as_deref().unwrap_or("none"),
            "Capture failed"
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Asks the OS for a free port on `host`.
///
/// The port is released before returning; the renderer binds it shortly
/// after, which leaves a small window for another process to take it.
///
/// # Errors
///
/// Returns [`Error::Io`] if binding fails.
pub fn allocate_port(host: &str) -> Result<u16> {
    let listener = TcpListener::bind((host, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Builds the renderer command line.
#[must_use]
pub fn launch_args(
    settings: &CaptureSettings,
    port: u16,
    profile: &RendererProfile,
    page_url: &str,
) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={port}"),
        profile.user_data_dir_arg(),
    ];
    args.extend(settings.options.to_args());
    args.push(page_url.to_string());
    args
}

fn elapsed_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
