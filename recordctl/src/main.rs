use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use recstore::{
    FileDevice, Mirror, RecordHandle, RecordList, RecordListConfig, SlotBackend, SlotIndex,
    Single, Split,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

type DynRecordList = RecordList<Box<dyn SlotBackend>>;

#[derive(Parser)]
#[command(name = "recordctl")]
#[command(about = "Inspect and edit fixed-slot record lists")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Device file. Repeat for mirror and split modes.
    #[arg(short, long = "device")]
    devices: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Mode::Plain)]
    mode: Mode,

    /// Payload bytes per record.
    #[arg(long, default_value_t = 16)]
    data_size: usize,

    /// Checksum seed, decimal or 0x-prefixed hex.
    #[arg(long, default_value = "0x1234", value_parser = parse_list_id)]
    list_id: u16,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Plain,
    Mirror,
    Split,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the device files, erased, and start an empty list
    Format {
        /// Size of each device file in bytes
        #[arg(long)]
        size: u64,
    },
    /// Add a record; payloads are hex, zero-padded to the data size
    Add {
        payload: String,
        /// Add behind every existing record instead of in front
        #[arg(long)]
        last: bool,
    },
    /// Replace the payload of the record at a list position
    Update { position: usize, payload: String },
    /// Remove the record at a list position
    Remove { position: usize },
    /// Remove the oldest record
    RemoveOldest,
    /// Show records, newest first
    List,
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Erase cleared slots so they can be reused
    Reclaim,
    /// Read one slot straight from the devices
    Read { slot: usize },
    Shell,
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut devices = cli.devices;
    if devices.is_empty() {
        devices.extend(std::env::var_os("RECORDCTL_DEVICE").map(PathBuf::from));
    }
    if devices.is_empty() {
        bail!("no device given; pass --device or set RECORDCTL_DEVICE");
    }
    let config = RecordListConfig::new(cli.data_size, cli.list_id);

    match cli.command {
        Some(Commands::Format { size }) => {
            let files = devices
                .iter()
                .map(|path| FileDevice::create(path, size))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let list = RecordList::format(backend(files, cli.mode)?, &config)?;
            println!(
                "Formatted {} device(s): {} slots of {} bytes",
                devices.len(),
                list.max_entries(),
                list.codec().entry_size()
            );
        }
        Some(Commands::Shell) | None => {
            let mut list = open_list(&devices, cli.mode, &config)?;
            start_interactive_shell(&mut list, &devices)?;
        }
        Some(command) => {
            let mut list = open_list(&devices, cli.mode, &config)?;
            execute(&mut list, command)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_list_id(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid list id {:?}: {}", s, e))
}

fn backend(mut files: Vec<FileDevice>, mode: Mode) -> anyhow::Result<Box<dyn SlotBackend>> {
    Ok(match mode {
        Mode::Plain => {
            if files.len() != 1 {
                bail!("plain mode takes exactly one device, got {}", files.len());
            }
            Box::new(Single::new(files.remove(0)))
        }
        Mode::Mirror => Box::new(Mirror::new(files)?),
        Mode::Split => Box::new(Split::new(files)?),
    })
}

fn open_list(
    devices: &[PathBuf],
    mode: Mode,
    config: &RecordListConfig,
) -> anyhow::Result<DynRecordList> {
    let files = devices
        .iter()
        .map(FileDevice::open)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let list = RecordList::open(backend(files, mode)?, config)
        .context("opening record list")?;
    info!(?mode, devices = devices.len(), live = list.len(), "opened record list");
    Ok(list)
}

fn execute(list: &mut DynRecordList, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add { payload, last } => {
            let payload = parse_payload(&payload, list.codec().data_size())?;
            let handle = if last {
                list.add_last(&payload)?
            } else {
                list.add_first(&payload)?
            };
            match list.get(handle).and_then(|r| r.slot()) {
                Some(slot) => println!("Added record in {:?}", slot),
                None => println!("Added record"),
            }
        }
        Commands::Update { position, payload } => {
            let payload = parse_payload(&payload, list.codec().data_size())?;
            let handle = handle_at(list, position)?;
            list.update(handle, &payload)?;
            println!("Updated record {}", position);
        }
        Commands::Remove { position } => {
            let handle = handle_at(list, position)?;
            let record = list.remove(handle)?;
            println!("Removed {:?}", record);
        }
        Commands::RemoveOldest => match list.remove_oldest()? {
            Some(record) => println!("Removed {:?}", record),
            None => println!("(empty list)"),
        },
        Commands::List => display_records(list),
        Commands::Stats { json } => {
            let stats = list.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("max entries: {}", stats.max_entries);
                println!("live:        {}", stats.live);
                println!("available:   {}", stats.available);
                println!("deleted:     {}", stats.deleted);
                println!("errors:      {}", stats.errors);
                println!("evicted:     {}", stats.evicted);
                println!("cached:      {}", stats.cached);
            }
        }
        Commands::Reclaim => {
            let free = list.reclaim_deleted();
            println!("{} free slots", free);
        }
        Commands::Read { slot } => {
            let payload = list.read(SlotIndex(slot))?;
            println!("{}", hex::encode(&payload));
        }
        Commands::Format { .. } | Commands::Shell => {
            bail!("not available on an open list");
        }
    }
    Ok(())
}

fn handle_at(list: &DynRecordList, position: usize) -> anyhow::Result<RecordHandle> {
    list.iter()
        .nth(position)
        .map(|(handle, _)| handle)
        .ok_or_else(|| anyhow!("no record at position {} (list has {})", position, list.len()))
}

fn parse_payload(input: &str, data_size: usize) -> anyhow::Result<Vec<u8>> {
    let mut payload =
        hex::decode(input.trim_start_matches("0x")).context("payload must be hex")?;
    if payload.len() > data_size {
        bail!(
            "payload is {} bytes, records hold {}",
            payload.len(),
            data_size
        );
    }
    payload.resize(data_size, 0);
    Ok(payload)
}

fn display_records(list: &DynRecordList) {
    if list.is_empty() {
        println!("(no records)");
        return;
    }

    let rows: Vec<(String, String, String)> = list
        .iter()
        .enumerate()
        .map(|(position, (_, record))| {
            let slot = match record.slot() {
                Some(slot) => slot.get().to_string(),
                None => "-".to_string(),
            };
            (position.to_string(), slot, hex::encode(record.data()))
        })
        .collect();

    let pos_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(3);
    let slot_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(4);

    println!("{:<pos_width$} | {:<slot_width$} | payload", "pos", "slot");
    println!("{}-|-{}-|-{}", "-".repeat(pos_width), "-".repeat(slot_width), "-".repeat(7));
    for (position, slot, payload) in &rows {
        println!("{:<pos_width$} | {:<slot_width$} | {}", position, slot, payload);
    }

    println!("\n({} records)", rows.len());
}

fn start_interactive_shell(list: &mut DynRecordList, devices: &[PathBuf]) -> anyhow::Result<()> {
    println!("recordctl interactive shell");
    println!("Type 'help' for help, 'exit' or 'quit' to quit");
    println!("Devices: {:?}\n", devices);

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("records> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match line {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    _ => {
                        let result = ShellLine::try_parse_from(line.split_whitespace())
                            .map_err(anyhow::Error::from)
                            .and_then(|parsed| execute(list, parsed.command));
                        if let Err(e) = result {
                            println!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("recordctl shell commands:");
    println!("  add <hex> [--last]        add a record (newest, or oldest with --last)");
    println!("  update <pos> <hex>        replace the payload at a list position");
    println!("  remove <pos>              remove the record at a list position");
    println!("  remove-oldest             remove the oldest record");
    println!("  list                      show records, newest first");
    println!("  stats [--json]            show slot counters");
    println!("  reclaim                   erase cleared slots for reuse");
    println!("  read <slot>               read one slot from the devices");
    println!("  help                      show this help");
    println!("  exit | quit               leave the shell");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_ids_parse_as_hex_or_decimal() {
        assert_eq!(parse_list_id("0x1234"), Ok(0x1234));
        assert_eq!(parse_list_id("4660"), Ok(0x1234));
        assert!(parse_list_id("0x10000").is_err());
        assert!(parse_list_id("seed").is_err());
    }

    #[test]
    fn payloads_are_zero_padded() {
        assert_eq!(parse_payload("0102", 4).unwrap(), vec![1, 2, 0, 0]);
        assert_eq!(parse_payload("0x01020304", 4).unwrap(), vec![1, 2, 3, 4]);
        assert!(parse_payload("0102030405", 4).is_err());
        assert!(parse_payload("zz", 4).is_err());
    }

    #[test]
    fn shell_lines_parse_as_commands() {
        let line = ShellLine::try_parse_from("update 2 abcd".split_whitespace()).unwrap();
        assert!(matches!(
            line.command,
            Commands::Update { position: 2, ref payload } if payload == "abcd"
        ));
        let line = ShellLine::try_parse_from("stats --json".split_whitespace()).unwrap();
        assert!(matches!(line.command, Commands::Stats { json: true }));
    }

    #[test]
    fn file_backed_commands_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let devices = vec![dir.path().join("a.dev"), dir.path().join("b.dev")];
        let config = RecordListConfig::new(4, 0x1234);
        let files = devices
            .iter()
            .map(|p| FileDevice::create(p, 60))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let _ = RecordList::format(backend(files, Mode::Mirror)?, &config)?;

        {
            let mut list = open_list(&devices, Mode::Mirror, &config)?;
            execute(&mut list, Commands::Add { payload: "01020304".into(), last: false })?;
            execute(&mut list, Commands::Add { payload: "05".into(), last: false })?;
            execute(&mut list, Commands::Remove { position: 1 })?;
        }

        let list = open_list(&devices, Mode::Mirror, &config)?;
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().1.data(), &[5, 0, 0, 0]);
        // cleared on both replicas, so recovery erases it back to free
        assert_eq!(list.stats().deleted, 0);
        assert_eq!(list.stats().available, 9);
        Ok(())
    }

    #[test]
    fn plain_mode_takes_one_device() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let files = vec![
            FileDevice::create(dir.path().join("a.dev"), 12)?,
            FileDevice::create(dir.path().join("b.dev"), 12)?,
        ];
        assert!(backend(files, Mode::Plain).is_err());
        Ok(())
    }
}
