use bpmsyncrs::{
    cli::{validate_device, Args},
    handle_device_list, logging,
    midi::{run_external_clock, DefaultMidiEngine},
    tempo::MicrosecondTimebase,
    ui::ConsoleObserver,
    ChannelScheduler, ClockCore, EngineConfig,
};
use clap::Parser;
use dialoguer::Select;
use std::sync::Arc;
use std::thread;

fn main() {
    initialize_logging();
    let args = parse_command_line_arguments();
    let devices = handle_device_list();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    let device_name = match resolve_device(&args, &devices) {
        Some(name) => name,
        None => exit_with_error("No MIDI input device selected".to_string()),
    };

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => exit_with_error(format!("Invalid configuration: {}", e)),
    };

    run_clock_follower(device_name, config);
}

fn initialize_logging() {
    if let Err(e) = logging::init_logger() {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI input devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn exit_with_error(error_msg: String) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}

fn resolve_device(args: &Args, devices: &[String]) -> Option<String> {
    if let Some(device_name) = &args.bind_to_device {
        if let Err(error_msg) = validate_device(device_name, devices) {
            exit_with_error(error_msg);
        }
        return Some(device_name.clone());
    }

    if devices.is_empty() {
        return None;
    }

    match Select::new()
        .with_prompt("Select a MIDI clock source")
        .items(devices)
        .default(0)
        .interact_opt()
    {
        Ok(Some(index)) => devices.get(index).cloned(),
        Ok(None) => None,
        Err(e) => {
            log::error!("Device prompt failed: {}", e);
            None
        }
    }
}

fn build_config(args: &Args) -> Result<EngineConfig, bpmsyncrs::ConfigError> {
    let mut config = EngineConfig::load(args.config.as_deref())?;
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout_secs(secs)?;
    }
    if let Some(history) = args.history {
        config = config.with_history_capacity(history);
    }
    config.validate()?;
    Ok(config)
}

fn run_clock_follower(device_name: String, config: EngineConfig) {
    // Notifications are drained on the main thread, the MIDI thread only queues them
    let (scheduler, dispatch_queue) = ChannelScheduler::new();

    let core = match ClockCore::new(config, Arc::new(MicrosecondTimebase), Arc::new(scheduler)) {
        Ok(core) => Arc::new(core),
        Err(e) => exit_with_error(format!("Invalid configuration: {}", e)),
    };
    core.register_observer(Arc::new(ConsoleObserver::new()));

    let engine = match DefaultMidiEngine::connect(&device_name) {
        Ok(engine) => engine,
        Err(e) => exit_with_error(format!("Error connecting to MIDI device: {}", e)),
    };
    println!("Listening for MIDI clock on: {}", device_name);

    thread::spawn(move || {
        run_external_clock(engine, core);
    });

    log::info!("Application running. Press Ctrl+C to exit...");
    dispatch_queue.run();
    log::info!("MIDI input closed, exiting");
}
