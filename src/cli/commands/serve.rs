//! lexicon serve - Run the HTTP API

use std::sync::Arc;

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::server::{self, ServerState};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides server.port)
    #[arg(long, short)]
    pub port: Option<u16>,
}

pub fn run(ctx: &AppContext, args: &ServeArgs) -> Result<()> {
    let mut server_config = ctx.config.server.clone();
    if let Some(host) = &args.host {
        server_config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let state = ServerState::new(Arc::clone(&ctx.service), ctx.config.database.version.clone())
        .with_prefix(server_config.url_prefix.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(&server_config, state))
}
