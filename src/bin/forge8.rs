//! Thin CLI front-end: assemble a source file, or load and run a binary
//! or TAPE until halt. Everything here delegates to the `forge8` library;
//! this binary owns process exit codes, file I/O, and log setup only.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};

use forge8::prelude::*;
use forge8::tape;

#[derive(ClapParser)]
#[command(name = "forge8", about = "Assembler and emulator for an 8-bit machine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a source file to split-bin or TAPE output.
    Asm {
        source: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        tape: bool,
        #[arg(long, default_value = "untitled")]
        name: String,
    },
    /// Load a binary or TAPE file and run the CPU until halt.
    Run {
        program: PathBuf,
        #[arg(long)]
        tape: bool,
        #[arg(long, default_value_t = forge8::DEFAULT_LOAD_ADDRESS)]
        load_address: u16,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("forge8: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Asm {
            source,
            out,
            tape: as_tape,
            name,
        } => cmd_asm(&source, &out, as_tape, &name),
        Command::Run {
            program,
            tape: is_tape,
            load_address,
            config,
        } => cmd_run(&program, is_tape, load_address, config.as_deref()),
    }
}

fn cmd_asm(source: &PathBuf, out: &PathBuf, as_tape: bool, name: &str) -> Result<(), String> {
    let text = fs::read_to_string(source).map_err(|e| format!("reading {source:?}: {e}"))?;
    let bytes = Assembler::assemble(&text).map_err(|e| format!("assembly failed: {e}"))?;

    if as_tape {
        let meta = TapeMetadata {
            name: name.to_string(),
            ..TapeMetadata::default()
        };
        let tape_bytes = Assembler::to_tape(&bytes, &meta).map_err(|e| e.to_string())?;
        fs::write(out, tape_bytes).map_err(|e| format!("writing {out:?}: {e}"))?;
        log::info!("wrote {} bytes to {:?}", tape_bytes.len(), out);
    } else {
        let (first, second) = Assembler::to_split_bin(&bytes).map_err(|e| e.to_string())?;
        fs::create_dir_all(out).map_err(|e| format!("creating {out:?}: {e}"))?;
        fs::write(out.join("0.bin"), &first).map_err(|e| e.to_string())?;
        if let Some(rest) = second {
            fs::write(out.join("1.bin"), &rest).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

fn cmd_run(
    program: &PathBuf,
    is_tape: bool,
    load_address: u16,
    config_path: Option<&std::path::Path>,
) -> Result<(), String> {
    let raw = fs::read(program).map_err(|e| format!("reading {program:?}: {e}"))?;

    let payload = if is_tape {
        let (meta, payload) = tape::decode(&raw).map_err(|e| e.to_string())?;
        log::info!("loaded tape {:?} by {:?}", meta.name, meta.author);
        payload
    } else {
        raw
    };

    let machine_config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("reading {path:?}: {e}"))?;
            toml::from_str::<MachineConfig>(&text).map_err(|e| format!("parsing {path:?}: {e}"))?
        }
        None => MachineConfig::default(),
    };

    let ram_size = machine_config.ram_size.unwrap_or(Ram::default().size());
    let mut ram = Ram::new(ram_size);
    ram.load(load_address, &payload).map_err(|e| e.to_string())?;

    let mut cpu = Cpu::new();
    cpu.reset(load_address);

    // An empty registry still exercises the real DeviceBus dispatch path
    // instead of hardcoding NullBus.
    let mut bus = DeviceRegistry::new();
    for assignment in &machine_config.ports {
        log::warn!(
            "port {} configured for device {:?}, but no peripheral implementations are bundled",
            assignment.port,
            assignment.device
        );
    }
    run_to_halt(&mut cpu, &mut ram, &mut bus)?;

    println!(
        "halted: a={:#04x} b={:#04x} c={:#04x} d={:#04x} ip={:#06x} z={} c={}",
        cpu.a, cpu.b, cpu.c, cpu.d, cpu.ip, cpu.flags.z, cpu.flags.c
    );
    Ok(())
}

fn run_to_halt<B: DeviceBus>(cpu: &mut Cpu, ram: &mut Ram, bus: &mut B) -> Result<(), String> {
    while cpu.is_running() {
        cpu.step(ram, bus).map_err(|e| e.to_string())?;
    }
    Ok(())
}
