use std::io::{self, Write};

use anyhow::Result;
use clap::Args;

use super::Context;
use crate::enumerate::enumerate;
use crate::output::{Format, render};

/// Arguments for the `get` subcommand.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Subscription names; `*`, `?` and `[...]` wildcards allowed. Defaults to all
    pub names: Vec<String>,

    /// Show every property instead of a table
    #[arg(short, long)]
    pub list: bool,
}

pub fn run(ctx: &Context<'_>, args: &GetArgs) -> Result<()> {
    let subscriptions = enumerate(ctx.shell, ctx.wecutil_path(), &args.names)?;
    let format = if ctx.json {
        Format::Json
    } else if args.list {
        Format::List
    } else {
        Format::Table
    };
    let mut out = io::stdout();
    write!(out, "{}", render(&subscriptions, format)?)?;
    if format == Format::Json {
        writeln!(out)?;
    }
    Ok(())
}
