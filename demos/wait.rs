// Demos are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Vela Wait Example
//!
//! Waits for the creation policies declared in a TOML file against a running
//! VirtualBox VM, then prints the readiness report as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example wait -- web-1 vela.toml
//!
//! # Use a VBoxManage outside PATH, with engine debug logs
//! RUST_LOG=vela_core=debug cargo run --example wait -- \
//!     --vboxmanage /usr/lib/virtualbox/VBoxManage web-1 vela.toml
//! ```
//!
//! # Config
//!
//! ```toml
//! safety_buffer = "2s"
//!
//! [[creation_policy]]
//! type = "cloud_init_done_by_vm_guestproperty"
//! timeout = "PT5M"
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vela::prelude::*;

fn usage() {
    println!("Vela Wait Example");
    println!();
    println!("Usage: wait [OPTIONS] <VM> <CONFIG>");
    println!();
    println!("Options:");
    println!("  --vboxmanage <PATH>  VBoxManage program (default: VBoxManage from PATH)");
    println!("  --help               Show this help");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut probe = VBoxManageProbe::new();
    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                usage();
                return ExitCode::SUCCESS;
            }
            "--vboxmanage" => {
                let Some(program) = args.next() else {
                    eprintln!("--vboxmanage needs a path");
                    return ExitCode::from(2);
                };
                probe = probe.with_program(program);
            }
            _ => positional.push(arg),
        }
    }
    let [vm, config_path] = positional.as_slice() else {
        usage();
        return ExitCode::from(2);
    };

    let config = match WaitConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    let registry = builtin_registry().expect("built-in policy types register on a fresh registry");
    let target = Target::new(vm.clone(), Arc::new(probe));

    let report = match ReadinessWaiter::new(&registry)
        .with_config(&config)
        .wait_with_report(&config.creation_policy, &target)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    println!("{}", serde_json::to_string_pretty(&report).expect("report serializes"));

    match report.into_result() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
