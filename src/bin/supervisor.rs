use clap::{App, Arg};
use colored::*;
use coolant_supervisor::hardware::NullRegisterBus;
use coolant_supervisor::{
    FixedOutputController, Parameters, PlcHardware, StatusFormat, StatusReport, Supervisor,
    SupervisorState,
};
use std::time::Duration;
use tokio::time;
use tracing::{info, warn, Level};

const DEFAULT_PERIOD_MS: &str = "100";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("coolant-supervisor")
        .version("0.1.0")
        .author("Thermal Systems Engineering Team")
        .about("Pump, fan and display supervisor for the liquid-cooling appliance")
        .arg(
            Arg::with_name("MIN_VOLTAGE")
                .help("Minimum tolerated supply voltage (V)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("TEMP_SETPOINT")
                .help("Target coolant temperature handed to the feedback controller")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("period")
                .short("p")
                .long("period")
                .value_name("MS")
                .help("Control cycle period in milliseconds")
                .takes_value(true)
                .default_value(DEFAULT_PERIOD_MS)
                .validator(|v| match v.parse::<u64>() {
                    Ok(ms) if ms > 0 => Ok(()),
                    _ => Err("Period must be a positive number of milliseconds".into()),
                }),
        )
        .arg(
            Arg::with_name("cycles")
                .long("cycles")
                .value_name("N")
                .help("Stop after N cycles instead of running until interrupted")
                .takes_value(true)
                .validator(|v| match v.parse::<u64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Cycle count must be a valid number".into()),
                }),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Status output format")
                .takes_value(true)
                .possible_values(&["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every cycle"),
        )
        .get_matches();

    let level = if matches.is_present("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let params = match Parameters::parse(
        matches.value_of("MIN_VOLTAGE").unwrap_or_default(),
        matches.value_of("TEMP_SETPOINT").unwrap_or_default(),
    ) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{} {}\n\n{}", "error:".red().bold(), e, matches.usage());
            std::process::exit(1);
        }
    };
    let period_ms = matches.value_of("period").unwrap_or(DEFAULT_PERIOD_MS).parse::<u64>()?;
    let max_cycles = matches.value_of("cycles").map(str::parse::<u64>).transpose()?;
    let format = matches
        .value_of("format")
        .and_then(StatusFormat::from_name)
        .unwrap_or(StatusFormat::Text);

    println!("{}", "Coolant Supervisor".bold());
    println!("   Minimum Voltage:      {}", params.min_voltage());
    println!("   Temperature Setpoint: {}", params.temperature_setpoint());

    let mut supervisor = Supervisor::new(params, PlcHardware::new(NullRegisterBus), FixedOutputController::default());
    supervisor.initialize()?;
    print_status(&supervisor.status(), format);

    let mut interval = time::interval(Duration::from_millis(period_ms));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                warn!("interrupted, stopping driver loop");
                break;
            }
        }

        let previous = supervisor.state();
        let state = supervisor.step();
        if state != previous {
            print_status(&supervisor.status(), format);
        }

        if max_cycles.map_or(false, |n| supervisor.cycle() >= n) {
            break;
        }
    }

    info!(cycles = supervisor.cycle(), state = %supervisor.state(), "driver loop stopped");
    Ok(())
}

fn print_status(report: &StatusReport, format: StatusFormat) {
    match format {
        StatusFormat::Json => match report.render(StatusFormat::Json) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("failed to render status: {}", e),
        },
        StatusFormat::Text => {
            let state = match report.state {
                SupervisorState::Active => report.state.name().green(),
                SupervisorState::Ignition => report.state.name().yellow(),
                SupervisorState::FatalError => report.state.name().red().bold(),
                SupervisorState::Boot | SupervisorState::Idle => report.state.name().cyan(),
            };
            println!("[{}] {}", state, report);
        }
    }
}
