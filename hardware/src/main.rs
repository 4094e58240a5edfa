//! Ruby Memory System CLI.
//!
//! Loads a configuration, builds the memory system it describes, and prints
//! a summary. Exits with status 1 if the system cannot be assembled.

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

extern crate ruby_memsys;

use ruby_memsys::config::Config;
use ruby_memsys::protocol::ProtocolRegistry;
use ruby_memsys::system::{create_system, RubySystem};

/// Command-line arguments for the memory system builder.
///
/// Every option except `--config` and `--json` overrides the matching
/// `[ruby]` entry of the configuration file.
#[derive(Parser, Debug)]
#[command(author, version, about = "Ruby Memory System Builder")]
struct Args {
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    protocol: Option<String>,

    #[arg(long)]
    topology: Option<String>,

    #[arg(long)]
    mesh_rows: Option<usize>,

    #[arg(long)]
    garnet_network: Option<String>,

    #[arg(long)]
    num_cpus: Option<usize>,

    #[arg(long)]
    num_dirs: Option<usize>,

    /// Print the assembled system as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(ref p) = self.protocol {
            config.ruby.protocol = p.clone();
        }
        if let Some(ref t) = self.topology {
            config.ruby.topology = t.clone();
        }
        if let Some(rows) = self.mesh_rows {
            config.ruby.mesh_rows = rows;
        }
        if let Some(ref g) = self.garnet_network {
            config.ruby.garnet_network = Some(g.clone());
        }
        if let Some(n) = self.num_cpus {
            config.ruby.num_cpus = n;
        }
        if let Some(n) = self.num_dirs {
            config.ruby.num_dirs = n;
        }
    }
}

fn print_config(config: &Config) {
    println!("Global Configuration");
    println!("--------------------");
    println!("Ruby:");
    println!("  Protocol:           {}", config.ruby.protocol);
    println!("  Clock:              {}", config.ruby.clock);
    println!("  CPUs:               {}", config.ruby.num_cpus);
    println!("  Directories:        {}", config.ruby.num_dirs);
    println!("  DMA Devices:        {}", config.ruby.dma_devices);
    println!("Interconnect:");
    println!("  Topology:           {}", config.ruby.topology);
    println!("  Mesh Rows:          {}", config.ruby.mesh_rows);
    println!("  Wraparound:         {}", config.ruby.wraparound);
    println!(
        "  Garnet:             {}",
        config.ruby.garnet_network.as_deref().unwrap_or("none")
    );
    println!("Physical Memory:");
    println!("  Base:               {}", config.physmem.base);
    println!("  Size:               {}", config.physmem.size);
    println!("--------------------");
}

fn print_system(system: &RubySystem) {
    let summary = system.summary();
    println!("[*] Ruby system assembled");
    println!("    Topology:    {}", summary.topology);
    println!("    Network:     {}", summary.network);
    println!(
        "    Graph:       {} nodes, {} routers, {} links",
        summary.nodes, summary.routers, summary.links
    );
    println!("    Memory:      {}", summary.mem_size);
    println!("    Ports:       {}", summary.ports.join(", "));
    println!("    Controllers: {}", summary.controllers);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    args.apply(&mut config);

    if !args.json {
        print_config(&config);
    }

    let registry = ProtocolRegistry::with_builtin();
    let system = match create_system(&config, &registry, &config.dma_devices()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&system.summary()) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_system(&system);
    }
}
