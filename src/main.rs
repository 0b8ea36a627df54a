use log::{debug, error, info, LevelFilter};
use rbsched::{
    config::{Command, SimConfig, USAGE},
    rand::TaskGenerator,
    sched, RbTree,
};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::{env, process::ExitCode};

fn initialize_logging(level: LevelFilter) {
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("rbsched: could not install logger: {e}");
    }
}

fn main() -> ExitCode {
    let config = match SimConfig::from_args(env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("rbsched: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    initialize_logging(config.log_level());

    let mut generator = match TaskGenerator::new(config.generator.clone()) {
        Ok(generator) => generator,
        Err(e) => {
            error!("cannot build task generator: {e}");
            return ExitCode::from(2);
        }
    };
    let tasks = generator.generate();
    info!("generated {} tasks", tasks.len());

    let by_runtime: RbTree<(u64, u32)> = tasks.iter().map(|t| (t.total_runtime, t.id)).collect();
    if let Some(shortest) = by_runtime.minimum() {
        let (runtime, id) = shortest.key();
        info!(
            "shortest job is task {id} ({runtime} ticks), runtime index height {}",
            by_runtime.height()
        );
    }
    for (i, (key, color, left, right)) in by_runtime.traverse_levels().enumerate() {
        debug!("{}: {key:?} {color:?} left={left:?} right={right:?}", i + 1);
    }

    let mut policies = config.policies();
    for summary in sched::simulate(&tasks, &mut policies) {
        println!("{summary}\n");
    }
    ExitCode::SUCCESS
}
