//! Operator console for the oven control core.
//!
//! A dedicated thread owns the rustyline editor and feeds lines into the
//! async event loop, which multiplexes operator input, monitor reports and
//! shutdown. Menu codes follow the appliance front panel: 1-7, with
//! follow-up prompts for the cycle index and the schedule delay.

use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use magnetron_core::dispatch::{Command, CommandDispatcher};
use magnetron_core::report::ReportReceiver;
use magnetron_core::{OvenCfg, Runtime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (runtime, report_rx) = Runtime::new(OvenCfg::default());
    runtime.spawn_signal_listener();
    runtime.spawn_monitors();

    let dispatcher = runtime.dispatcher();
    let token = runtime.token();
    run_console(dispatcher, report_rx, token).await
}

const MENU: &str = "\nMenu:\n\
    1. Open door\n\
    2. Close door\n\
    3. Select cycle\n\
    4. Start\n\
    5. Schedule future start\n\
    6. Trigger emergency stop\n\
    7. Exit\n";

/// What the next operator line means.
enum Pending {
    MenuCode,
    CycleIndex,
    ScheduleDelay,
}

enum InputEvent {
    Line(String),
    Interrupted,
    Eof,
    Error(String),
}

async fn run_console(
    dispatcher: CommandDispatcher,
    mut report_rx: ReportReceiver,
    token: CancellationToken,
) -> anyhow::Result<()> {
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<InputEvent>();
    let (prompt_tx, prompt_rx) = std::sync::mpsc::channel::<String>();
    spawn_input_thread(line_tx, prompt_rx);

    let mut pending = Pending::MenuCode;
    println!("{MENU}");
    let _ = prompt_tx.send("> ".into());

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            line = line_rx.recv() => {
                let Some(event) = line else { break };
                match event {
                    InputEvent::Line(line) => {
                        pending = handle_line(line.trim(), pending, &dispatcher).await;
                        if token.is_cancelled() {
                            break;
                        }
                        let prompt = match pending {
                            Pending::MenuCode => {
                                println!("{MENU}");
                                "> "
                            }
                            Pending::CycleIndex => {
                                "Cycle (0-Meats, 1-Fish, 2-Chicken, 3-Lasagna, 4-Popcorn): "
                            }
                            Pending::ScheduleDelay => "Delay in seconds: ",
                        };
                        let _ = prompt_tx.send(prompt.into());
                    }
                    InputEvent::Interrupted | InputEvent::Eof => {
                        token.cancel();
                        break;
                    }
                    InputEvent::Error(err) => {
                        eprintln!("input error: {err}");
                        token.cancel();
                        break;
                    }
                }
            }
            msg = report_rx.recv() => {
                let Some(event) = msg else { break };
                println!("{event}");
            }
        }
    }

    println!("Shutting down oven...");
    Ok(())
}

/// Interpret one operator line. Unrecognized menu codes are dropped
/// silently; dispatch errors are printed and leave the state untouched.
async fn handle_line(line: &str, pending: Pending, dispatcher: &CommandDispatcher) -> Pending {
    let Ok(value) = line.parse::<i64>() else {
        return pending;
    };

    let command = match pending {
        Pending::MenuCode => match value {
            3 => return Pending::CycleIndex,
            5 => return Pending::ScheduleDelay,
            code => Command::from_code(code, None),
        },
        Pending::CycleIndex => Some(Command::SelectCycle(value)),
        Pending::ScheduleDelay => Some(Command::Schedule(value)),
    };

    if let Some(command) = command {
        match dispatcher.dispatch(command).await {
            Ok(()) => confirm(command),
            Err(e) => println!("{e}"),
        }
    }
    Pending::MenuCode
}

fn confirm(command: Command) {
    match command {
        Command::OpenDoor => println!("Door opened."),
        Command::CloseDoor => println!("Door closed."),
        Command::SelectCycle(i) => println!("Cycle {i} selected."),
        Command::Start => println!("Cycle started."),
        Command::Schedule(secs) => println!("Start scheduled in {secs} seconds."),
        Command::Emergency => println!("Emergency stop pressed."),
        Command::Exit => {}
    }
}

fn spawn_input_thread(
    line_tx: mpsc::UnboundedSender<InputEvent>,
    prompt_rx: std::sync::mpsc::Receiver<String>,
) {
    std::thread::spawn(move || {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                let _ = line_tx.send(InputEvent::Error(e.to_string()));
                return;
            }
        };

        while let Ok(prompt) = prompt_rx.recv() {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if line_tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let _ = line_tx.send(InputEvent::Interrupted);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    let _ = line_tx.send(InputEvent::Eof);
                    break;
                }
                Err(e) => {
                    let _ = line_tx.send(InputEvent::Error(e.to_string()));
                    break;
                }
            }
        }
    });
}
