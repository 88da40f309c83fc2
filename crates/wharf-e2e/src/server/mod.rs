//! Harness-side lifecycle of the local web server.
//!
//! [`ManagedServer::start`] reuses a server already answering on the
//! readiness URL (when allowed) or spawns the configured command and polls
//! the URL until it answers, the process exits, or the startup timeout
//! elapses. With reuse disabled, a URL that already answers is an error:
//! the spawned process could not be told apart from the one in the way.
mod probe;
pub use probe::{is_ready_status, probe, probe_client};

use std::{
    process::Stdio,
    time::{Duration, Instant},
};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::{HarnessError, HarnessResult, WebServerConfig};

/// Delay between readiness probes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A running web server, either spawned by us or found already running.
///
/// A spawned process is killed by [`ManagedServer::stop`], or when the
/// value is dropped.
#[derive(Debug)]
pub struct ManagedServer {
    url: String,
    child: Option<Child>,
}

impl ManagedServer {
    pub async fn start(cfg: &WebServerConfig) -> HarnessResult<Self> {
        cfg.validate()?;
        let client = probe_client()?;

        if probe(&client, &cfg.url).await {
            if !cfg.reuse_existing_server {
                return Err(HarnessError::AlreadyInUse {
                    url: cfg.url.clone(),
                });
            }
            info!(url = %cfg.url, "reusing running web server");
            return Ok(Self {
                url: cfg.url.clone(),
                child: None,
            });
        }

        let mut cmd = Command::new(&cfg.command.program);
        cmd.args(&cfg.command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for (key, value) in cfg.env.iter() {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn()?;
        info!(
            command = %cfg.command,
            pid = ?child.id(),
            url = %cfg.url,
            "web server spawned",
        );

        let deadline = Instant::now() + Duration::from_millis(cfg.startup_timeout_ms);
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(HarnessError::ServerExited(status.to_string()));
            }
            if probe(&client, &cfg.url).await {
                info!(url = %cfg.url, "web server ready");
                return Ok(Self {
                    url: cfg.url.clone(),
                    child: Some(child),
                });
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill web server after startup timeout");
                }
                return Err(HarnessError::ServerNotReady {
                    url: cfg.url.clone(),
                    timeout_ms: cfg.startup_timeout_ms,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// `true` when an already-running server was reused.
    pub fn is_reused(&self) -> bool {
        self.child.is_none()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Kill the spawned process. No-op for a reused server.
    pub async fn stop(mut self) -> HarnessResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if child.try_wait()?.is_none() {
            debug!(url = %self.url, "stopping web server");
            child.kill().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;
    use crate::ServerCommand;

    /// Serve `status_line` to every connection on a random loopback port.
    async fn fake_server(status_line: &'static str) -> String {
        fake_server_sequence(vec![status_line]).await
    }

    /// Answer the n-th connection with `statuses[n]`, repeating the last one.
    async fn fake_server_sequence(statuses: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for n in 0.. {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let status_line = statuses[n.min(statuses.len() - 1)];
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    /// A loopback URL nothing listens on.
    async fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn config(url: String, command: ServerCommand) -> WebServerConfig {
        WebServerConfig {
            command,
            reuse_existing_server: true,
            startup_timeout_ms: 5_000,
            ..WebServerConfig::for_url(url)
        }
    }

    #[tokio::test]
    async fn probe_follows_status() {
        let client = probe_client().unwrap();

        let ok = fake_server("200 OK").await;
        assert!(probe(&client, &ok).await);

        let forbidden = fake_server("403 Forbidden").await;
        assert!(probe(&client, &forbidden).await);

        let unavailable = fake_server("503 Service Unavailable").await;
        assert!(!probe(&client, &unavailable).await);

        assert!(!probe(&client, &closed_url().await).await);
    }

    #[tokio::test]
    async fn reuses_running_server_without_spawning() {
        let url = fake_server("200 OK").await;
        let cfg = config(url.clone(), ServerCommand::from_line("wharf-no-such-binary --serve"));

        let server = ManagedServer::start(&cfg).await.unwrap();

        assert!(server.is_reused());
        assert_eq!(server.url(), url);
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn spawns_when_nothing_answers() {
        let mut cfg = config(
            closed_url().await,
            ServerCommand::from_line("wharf-no-such-binary --serve"),
        );
        cfg.reuse_existing_server = false;

        let err = ManagedServer::start(&cfg).await.unwrap_err();
        assert!(matches!(err, HarnessError::Io(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn refuses_busy_url_when_reuse_disabled() {
        let url = fake_server("200 OK").await;
        let mut cfg = config(url.clone(), ServerCommand::new("sleep", ["30"]));
        cfg.reuse_existing_server = false;

        let err = ManagedServer::start(&cfg).await.unwrap_err();
        assert!(
            matches!(&err, HarnessError::AlreadyInUse { url: u } if *u == url),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn rejects_invalid_config_before_spawning() {
        let cfg = config(
            "not a url".to_string(),
            ServerCommand::from_line("wharf-no-such-binary"),
        );

        let err = ManagedServer::start(&cfg).await.unwrap_err();
        assert!(matches!(err, HarnessError::InvalidUrl { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reports_process_exiting_before_ready() {
        let cfg = config(closed_url().await, ServerCommand::new("sh", ["-c", "exit 3"]));

        let err = ManagedServer::start(&cfg).await.unwrap_err();
        assert!(matches!(err, HarnessError::ServerExited(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn times_out_when_never_ready() {
        let mut cfg = config(closed_url().await, ServerCommand::new("sleep", ["5"]));
        cfg.startup_timeout_ms = 300;

        let started = Instant::now();
        let err = ManagedServer::start(&cfg).await.unwrap_err();

        assert!(
            matches!(err, HarnessError::ServerNotReady { timeout_ms: 300, .. }),
            "got {err:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    // The first request (made before spawning) sees 503, later ones 200,
    // standing in for a server that comes up after the command starts.
    #[cfg(unix)]
    #[tokio::test]
    async fn spawned_server_is_stopped() {
        let url = fake_server_sequence(vec!["503 Service Unavailable", "200 OK"]).await;
        let mut cfg = config(url, ServerCommand::new("sleep", ["30"]));
        cfg.reuse_existing_server = false;

        let server = ManagedServer::start(&cfg).await.unwrap();

        assert!(!server.is_reused());
        server.stop().await.unwrap();
    }
}
