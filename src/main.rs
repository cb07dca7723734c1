use log::{error, info, LevelFilter};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use tilepanel::destroyable::Destroyable;
use tilepanel::events::{Channel, EventEmitter};
use tilepanel::game::{EngineSettings, ManualScheduler, NotificationEngine};
use tilepanel::model::{Direction, GameEvent, NotificationId, SidebarEvent};
use tilepanel::store::FileStore;
use tilepanel::ui::{ConsoleSidebar, SidebarPanel, SidebarPresenter, SidebarTab};

const HELP: &str = "commands: move <up|right|down|left> <0|1>, tile <n>, end <won 0|1> <score> <tile>, \
tick <secs>, dismiss <id>, clear, tab <notifications|stats|achievements>, toggle, help, quit";

fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    if EngineSettings::is_debug_mode() {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

#[derive(Debug, PartialEq)]
enum Command {
    Game(GameEvent),
    Tick(Duration),
    Dismiss(NotificationId),
    Clear,
    Tab(SidebarTab),
    Toggle,
    Help,
    Quit,
}

fn parse_flag(value: Option<&str>) -> Result<bool, String> {
    match value {
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        other => Err(format!("expected 0 or 1, got {:?}", other)),
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Result<T, String> {
    let value = value.ok_or_else(|| "missing number".to_string())?;
    value
        .parse()
        .map_err(|_| format!("not a number: {}", value))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err("empty command".to_string());
    };
    let command = match name {
        "move" => {
            let direction: Direction = words
                .next()
                .ok_or_else(|| "missing direction".to_string())?
                .parse()?;
            Command::Game(GameEvent::MoveMade {
                direction,
                resulted_in_change: parse_flag(words.next())?,
            })
        }
        "tile" => Command::Game(GameEvent::TileCreated {
            value: parse_number(words.next())?,
        }),
        "end" => Command::Game(GameEvent::GameEnded {
            won: parse_flag(words.next())?,
            final_score: parse_number(words.next())?,
            final_highest_tile: parse_number(words.next())?,
        }),
        "tick" => Command::Tick(Duration::from_secs(parse_number(words.next())?)),
        "dismiss" => Command::Dismiss(NotificationId(parse_number(words.next())?)),
        "clear" => Command::Clear,
        "tab" => Command::Tab(
            words
                .next()
                .ok_or_else(|| "missing tab".to_string())?
                .parse()?,
        ),
        "toggle" => Command::Toggle,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(command)
}

fn run(
    game_emitter: &EventEmitter<GameEvent>,
    scheduler: &ManualScheduler,
    panel: &mut SidebarPanel,
) -> io::Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Game(event)) => game_emitter.emit(event),
            Ok(Command::Tick(by)) => {
                let fired = scheduler.advance(by);
                info!("Advanced clock by {:?}, {} timers fired", by, fired);
            }
            Ok(Command::Dismiss(id)) => {
                if !panel.close_notification_clicked(id) {
                    println!("no notification #{}", id);
                }
            }
            Ok(Command::Clear) => panel.clear_all_clicked(),
            Ok(Command::Tab(tab)) => panel.switch_tab(tab),
            Ok(Command::Toggle) => {
                let state = if panel.toggle() { "open" } else { "closed" };
                println!("sidebar {}", state);
            }
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => break,
            Err(err) => println!("{} ({})", err, HELP),
        }
        io::stdout().flush()?;
    }
    Ok(())
}

fn main() {
    init_logging();

    let data_dir = EngineSettings::data_dir();
    let settings = EngineSettings::load(&data_dir);
    info!("Using data directory {:?}", data_dir);

    let scheduler = Rc::new(ManualScheduler::new());
    let (sidebar_emitter, sidebar_observer) = Channel::<SidebarEvent>::new();
    let (game_emitter, game_observer) = Channel::<GameEvent>::new();

    let display = Rc::new(RefCell::new(ConsoleSidebar::new(io::stdout())));
    let mut presenter = SidebarPresenter::new(display, &sidebar_observer);

    let mut engine = NotificationEngine::new(
        settings,
        Rc::new(FileStore::new(data_dir)),
        scheduler.clone(),
        sidebar_emitter,
    );
    engine.start();
    engine.connect(&game_observer);
    let mut panel = SidebarPanel::new(engine.clone());

    println!("{}", HELP);
    if let Err(err) = run(&game_emitter, &scheduler, &mut panel) {
        error!("Input failed: {}", err);
    }

    engine.destroy();
    presenter.destroy();
    if presenter.skipped_updates() > 0 {
        info!("{} display updates were skipped", presenter.skipped_updates());
    }
}
