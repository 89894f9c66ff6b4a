/*
Copyright (c) 2022 VMware, Inc.
SPDX-License-Identifier: MIT
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! `p4bridge` accepts P4Runtime connections from a controller programming
//! the logical pipeline and rewrites them against the physical pipeline of a
//! single configured target.

use std::fs::{self, OpenOptions};
use std::io::{stderr, IsTerminal};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use p4bridge::{wire, FabricProcessor, PipelineBundle, Shim, Translator};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Listening port for the controller connection
    #[clap(long, default_value = "28001")]
    port: u16,

    /// The target address, host:port
    #[clap(long, default_value = "127.0.0.1:28000")]
    target_addr: String,

    /// Change processor to use: `dummy` or `fabric`
    #[clap(long, default_value = "dummy")]
    processor: String,

    /// Path to the logical P4Info blob the controller must present
    #[clap(long)]
    logical_p4info: PathBuf,

    /// Comma-separated pair of target config paths, e.g. `p4info.bin,bmv2.json`
    #[clap(long)]
    target_p4_config: String,

    /// File to write logs to
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn load_bundle(args: &Args) -> Result<PipelineBundle> {
    let logical_p4info = fs::read(&args.logical_p4info)
        .with_context(|| format!("{}: read failed", args.logical_p4info.display()))?;
    let (p4info_path, device_config_path) = args
        .target_p4_config
        .split_once(',')
        .context("--target_p4_config wants `p4info path,device config path`")?;
    let target_p4info =
        fs::read(p4info_path).with_context(|| format!("{}: read failed", p4info_path))?;
    let target_device_config = fs::read(device_config_path)
        .with_context(|| format!("{}: read failed", device_config_path))?;
    Ok(PipelineBundle {
        logical_p4info,
        target_p4info,
        target_device_config,
    })
}

fn main() -> Result<()> {
    log_panics::init();
    let args = Args::parse();
    if let Some(ref log_file) = args.log_file {
        let writer = OpenOptions::new().create(true).append(true).open(log_file)?;
        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(stderr)
            .with_ansi(stderr().is_terminal())
            .init();
    }

    let bundle = load_bundle(&args)?;
    let translator = match args.processor.as_str() {
        "dummy" => Translator::Dummy,
        "fabric" => Translator::Processor(Box::new(FabricProcessor)),
        other => bail!("unknown processor {}", other),
    };
    let target = wire::Client::connect(args.target_addr.clone());
    let shim = Arc::new(Shim::new(target, translator, bundle));

    let listener = TcpListener::bind(("127.0.0.1", args.port))
        .with_context(|| format!("failed to listen on port {}", args.port))?;
    info!(
        "listening for controller on port {}, talking to target on {}",
        args.port, args.target_addr
    );
    wire::serve(listener, shim)?;
    Ok(())
}
