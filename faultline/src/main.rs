#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod render;

use std::time::Duration;

use anyhow::bail;
use args::{Args, Command, RenderArgs};
use clap::Parser;
use faultline_config::Config;
use faultline_core::{AuthChallenge, Challenge};
use faultline_fault::Fault;
use render::format_response;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_filter);

    match args.command {
        Command::Render(render) => {
            let config = match &render.config {
                Some(path) => Config::load(path)?,
                None => Config::default(),
            };

            let mut policy = config.render;
            policy.debug |= render.debug;

            let fault = build_fault(&render)?;
            tracing::debug!(status = fault.status().as_u16(), "rendering fault");

            println!("{}", format_response(&fault.to_response_with(&policy)));
        }
        Command::Classify { status } => {
            let class = if status.is_server() { "server error" } else { "client error" };
            println!("{} {}: {class}", status.as_u16(), status.reason());
        }
    }

    Ok(())
}

fn init_logging(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reject flags the chosen status would ignore
fn check_flags(args: &RenderArgs) -> anyhow::Result<()> {
    let status = args.status.as_u16();

    if !args.schemes.is_empty() && !matches!(status, 401 | 407) {
        bail!("--scheme only applies to 401 and 407, not {status}");
    }
    if (args.token.is_some() || !args.params.is_empty()) && args.schemes.len() != 1 {
        bail!("--token and --param need exactly one --scheme");
    }
    if !args.allow.is_empty() && status != 405 {
        bail!("--allow only applies to 405, not {status}");
    }
    if args.retry_after.is_some() && !matches!(status, 429 | 503) {
        bail!("--retry-after only applies to 429 and 503, not {status}");
    }

    Ok(())
}

fn build_fault(args: &RenderArgs) -> anyhow::Result<Fault> {
    check_flags(args)?;

    let message = args.message.as_deref();

    let retry_after = args.retry_after.map(Duration::from_secs);

    let mut fault = match args.status.as_u16() {
        401 if !args.schemes.is_empty() => Fault::unauthorized_challenge(message, challenge(args))?,
        407 if !args.schemes.is_empty() => Fault::proxy_authentication_required(message, challenge(args))?,
        405 if !args.allow.is_empty() => Fault::method_not_allowed(message, &args.allow)?,
        429 => Fault::too_many_requests(message, retry_after),
        503 => Fault::service_unavailable(message, retry_after),
        _ => {
            let mut builder = Fault::builder(args.status);
            if let Some(message) = message {
                builder = builder.message(message);
            }
            builder.build()
        }
    };

    if let Some(raw) = &args.data {
        let data: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--data is not valid JSON: {e}"))?;
        fault = fault.with_data(data);
    }

    Ok(fault)
}

fn challenge(args: &RenderArgs) -> AuthChallenge {
    if let [scheme] = args.schemes.as_slice() {
        let mut challenge = Challenge::new(scheme);
        if let Some(token) = &args.token {
            challenge = challenge.token68(token);
        }
        for (name, value) in &args.params {
            challenge = challenge.param(name, value);
        }
        challenge.into()
    } else {
        AuthChallenge::schemes(&args.schemes)
    }
}
