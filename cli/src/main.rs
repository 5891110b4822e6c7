use anyhow::{Context, Result};
use clap::Parser;
use hubspace_devices::{
    extract_functions, get_features_for_device, load_snapshot, save_snapshot, set_function,
    ControlStyle, Device, FeatureSpec, FunctionDescriptor,
};
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(name = "hubspace-cli", version, about = "Browse and toggle devices in a snapshot")]
struct Args {
    /// Device snapshot to open
    #[arg(env = "HUBSPACE_DEVICES")]
    devices: Option<PathBuf>,

    #[arg(long, env = "HUBSPACE_DEBUG")]
    debug: bool,
}

/// `None` on EOF or a read error.
fn read_input(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    if let Err(e) = io::stdout().flush() {
        log::warn!("Failed to flush prompt: {}", e);
    }
    let mut buffer = String::new();
    match io::stdin().read_line(&mut buffer) {
        Ok(0) => None,
        Ok(_) => Some(buffer.trim().to_string()),
        Err(e) => {
            log::error!("Failed to read stdin: {}", e);
            None
        }
    }
}

// Menus treat EOF like "0" (back / exit).
fn get_input(prompt: &str) -> String {
    read_input(prompt).unwrap_or_else(|| "0".to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "warn" }),
    )
    .init();

    println!("--- Hubspace Device CLI ---");

    let path = match args.devices {
        Some(p) => p,
        None => PathBuf::from(get_input("Snapshot path: ")),
    };
    let mut devices =
        load_snapshot(&path).with_context(|| format!("opening {}", path.display()))?;
    log::debug!("{} devices ready", devices.len());

    device_selection_loop(&mut devices);

    if get_input("\nSave changes? (y/N): ").to_lowercase() == "y" {
        save_snapshot(&path, &devices)
            .with_context(|| format!("saving {}", path.display()))?;
        println!("Saved to {}", path.display());
    } else {
        log::info!("Leaving {} unchanged", path.display());
    }

    Ok(())
}

fn device_selection_loop(devices: &mut [Device]) {
    loop {
        if devices.is_empty() {
            println!("No devices in snapshot.");
            return;
        }

        println!("\nDevices:");
        for (i, d) in devices.iter().enumerate() {
            println!(
                "{}. {} {} ({} functions)",
                i + 1,
                if d.is_any_on() {
                    "(\x1b[32m●\x1b[0m)"
                } else {
                    "(○)"
                },
                d.display_name(),
                extract_functions(d).len()
            );
        }
        println!("0. Exit");

        let choice = get_input("\nSelect device > ");
        if choice == "0" {
            return;
        }

        match choice.parse::<usize>() {
            Ok(idx) if idx > 0 && idx <= devices.len() => device_control_loop(&mut devices[idx - 1]),
            _ => println!("Invalid index."),
        }
    }
}

fn device_control_loop(dev: &mut Device) {
    loop {
        println!("\n--- {} ({}) ---", dev.display_name(), dev.device_id);
        println!("1. Functions");
        println!("2. Set feature");
        println!("0. Back");

        match get_input("Action > ").as_str() {
            "1" => print_functions(&extract_functions(&*dev)),
            "2" => set_feature_loop(dev),
            "0" => break,
            _ => println!("Invalid option."),
        }
    }
}

fn print_functions(functions: &[FunctionDescriptor]) {
    if functions.is_empty() {
        println!("(No supported functions)");
        return;
    }
    match serde_json::to_string_pretty(functions) {
        Ok(j) => println!("{}", j),
        Err(_) => println!("{:#?}", functions),
    }
}

fn set_feature_loop(dev: &mut Device) {
    let features = get_features_for_device(&*dev);
    if features.is_empty() {
        println!("(No controllable features on this device)");
        return;
    }

    let feat = if features.len() == 1 {
        features[0]
    } else {
        for (i, f) in features.iter().enumerate() {
            println!("{}. {}", i + 1, f.label);
        }
        let choice = get_input("Feature > ");
        match choice.parse::<usize>().ok().and_then(|i| features.get(i.wrapping_sub(1))) {
            Some(f) => *f,
            None => return,
        }
    };

    let instances = (feat.extract_handler)(&*dev);
    if instances.is_empty() {
        println!("({} has no instances)", feat.label);
        return;
    }

    println!("\n--- {} ---", feat.label);
    for (i, f) in instances.iter().enumerate() {
        let state = f.state().map_or("?", |s| s.as_key());
        println!("{:<4} | {:<20} {}", i + 1, f.function_instance, state);
    }

    let choice = get_input("Instance (empty to back) > ");
    let Ok(idx) = choice.parse::<usize>() else {
        return;
    };
    let Some(target) = instances.get(idx.wrapping_sub(1)) else {
        println!("Invalid index.");
        return;
    };

    let Some(val) = get_feature_input(feat) else {
        println!("Cancelled.");
        return;
    };
    match set_function(&mut *dev, feat.func_class, &target.function_instance, &val) {
        Ok(d) => {
            log::info!(
                "{} '{}' set to {:?} on {}",
                d.function_class,
                d.function_instance,
                d.state(),
                dev.device_id
            );
            println!("Payload:");
            print_functions(&[d]);
        }
        Err(e) => log::error!("Failed to set {} on {}: {}", feat.label, dev.device_id, e),
    }
}

#[derive(Debug, PartialEq)]
enum Reply {
    Set(&'static str),
    Cancel,
    Invalid,
}

fn toggle_reply(raw: Option<&str>, on: &'static str, off: &'static str) -> Reply {
    let Some(raw) = raw else {
        return Reply::Cancel;
    };
    match raw.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" | "" => Reply::Set(on),
        "n" | "no" | "false" | "0" | "off" => Reply::Set(off),
        "cancel" | "q" => Reply::Cancel,
        _ => Reply::Invalid,
    }
}

fn get_feature_input(feat: &FeatureSpec) -> Option<String> {
    loop {
        match feat.style {
            ControlStyle::Toggle { on, off } => {
                let raw = read_input("Turn on? [Y/n/cancel]: ");
                match toggle_reply(raw.as_deref(), on, off) {
                    Reply::Set(v) => return Some(v.to_string()),
                    Reply::Cancel => return None,
                    Reply::Invalid => println!("Please enter 'y' or 'n'."),
                }
            }
        }
    }
}
