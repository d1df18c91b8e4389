use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use kcreport_core::{
    MasterTables, build_equip_table, dump_value, export_master_tables, load_document,
    write_fleet_report, write_slot_item_report,
};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LoadMode {
    Port,
    Slotitem,
    Master,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    dump: bool,
    #[arg(long, value_enum, default_value = "port")]
    load: LoadMode,
    #[arg(long, value_name = "PATH", default_value = "api_start2.json")]
    master: PathBuf,
    #[arg(long, value_name = "PATH", default_value = "port.json")]
    port: PathBuf,
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if cli.load == LoadMode::Master {
        let tables = load_master_tables(&cli.master);
        export_master_tables(&tables, Path::new(".")).unwrap_or_else(|e| {
            eprintln!("Error writing master tables: {e}");
            process::exit(1);
        });
        return;
    }

    let (Some(input), Some(output)) = (cli.input.as_deref(), cli.output.as_deref()) else {
        eprintln!("Usage: kcreport [--dump] [--load <port|slotitem|master>] <INPUT> <OUTPUT>");
        eprintln!("INPUT and OUTPUT are required unless --load master is used.");
        process::exit(2);
    };

    let out_file = File::create(output).unwrap_or_else(|e| {
        eprintln!("Error creating {}: {e}", output.display());
        process::exit(1);
    });

    if cli.dump {
        let document = load_input(input);
        let mut writer = BufWriter::new(out_file);
        dump_value(&mut writer, "home", &JsonValue::Object(document)).unwrap_or_else(|e| {
            eprintln!("Error dumping {}: {e}", input.display());
            process::exit(1);
        });
        writer.flush().unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", output.display());
            process::exit(1);
        });
        return;
    }

    let tables = load_master_tables(&cli.master);

    if cli.load == LoadMode::Slotitem {
        let port_document = load_input(&cli.port);
        let equip = build_equip_table(&port_document, &tables).unwrap_or_else(|e| {
            eprintln!("Error building equipment table from {}: {e}", cli.port.display());
            process::exit(1);
        });
        let document = load_input(input);
        write_slot_item_report(out_file, &document, &tables, &equip).unwrap_or_else(|e| {
            eprintln!("Error building slot item report: {e}");
            process::exit(1);
        });
        return;
    }

    let document = load_input(input);
    write_fleet_report(out_file, &document, &tables).unwrap_or_else(|e| {
        eprintln!("Error building fleet report: {e}");
        process::exit(1);
    });
}

fn load_input(path: &Path) -> JsonMap<String, JsonValue> {
    load_document(path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {e}", path.display());
        process::exit(1);
    })
}

fn load_master_tables(path: &Path) -> MasterTables {
    let document = load_input(path);
    MasterTables::from_master_document(&document).unwrap_or_else(|e| {
        eprintln!("Error building master tables from {}: {e}", path.display());
        process::exit(1);
    })
}
