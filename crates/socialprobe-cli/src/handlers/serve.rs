//! Serve command handler

use crate::commands::ServeArgs;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use socialprobe::MockAppServer;
use std::net::{IpAddr, SocketAddr};

/// Parse the bind address
pub fn socket_addr(host: &str, port: u16) -> CliResult<SocketAddr> {
    let ip: IpAddr = host
        .parse()
        .map_err(|_| CliError::invalid_argument(format!("not an IP address: {host}")))?;
    Ok(SocketAddr::new(ip, port))
}

/// Public URL for a bind address, using `localhost` for loopback and wildcard binds
#[must_use]
pub fn format_server_url(addr: SocketAddr) -> String {
    if addr.ip().is_loopback() || addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

/// Mock app server for `origin` that keeps no request log
#[must_use]
pub fn server_for(origin: &str) -> MockAppServer {
    MockAppServer::new(origin).without_capture()
}

/// Execute the serve command, running until interrupted
pub async fn execute_serve(output: &ProgressReporter, args: &ServeArgs) -> CliResult<()> {
    let addr = socket_addr(&args.host, args.port)?;
    let origin = format_server_url(addr);
    output.info(&format!("Mock social app at {origin}/demo and {origin}/api-demo"));
    output.info("Press Ctrl+C to stop");

    let server = server_for(&origin);
    tokio::select! {
        result = server.serve(addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }
    Ok(())
}
