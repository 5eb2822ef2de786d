// memscope: live call stack and heap diagram in the terminal

use std::fs::File;
use std::io;
use std::sync::Mutex;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use memscope::config::{SceneConfig, StackOrder, TerminalConfig};
use memscope::ui::demo::{self, DEFAULT_SCENARIO, SCENARIOS};
use memscope::ui::App;

/// The terminal belongs to the UI, so logs go to the file named by
/// `MEMSCOPE_LOG`, or nowhere.
fn init_logging() -> io::Result<()> {
    let Some(path) = std::env::var_os("MEMSCOPE_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [--newest-first] [--cell WxH] [scenario]", program_name);
    eprintln!();
    eprintln!("Scenarios: {}", SCENARIOS.join(", "));
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {}                      # Step through the linked list demo", program_name);
    eprintln!("  {} --cell 7x15 threads  # Multi-thread banner demo", program_name);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("memscope");

    let mut scene_config = SceneConfig::default();
    let mut terminal_config = TerminalConfig::default();
    let mut scenario_name = DEFAULT_SCENARIO.to_string();
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--newest-first" => scene_config.stack_order = StackOrder::NewestFirst,
            "--cell" => {
                let Some(size) = rest.next() else {
                    eprintln!("Error: --cell needs a value such as 8x16");
                    std::process::exit(1);
                };
                terminal_config = match terminal_config.with_cell_size(size) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                };
            }
            "-h" | "--help" => {
                print_usage(program_name);
                return Ok(());
            }
            name if !name.starts_with('-') => scenario_name = name.to_string(),
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                eprintln!();
                print_usage(program_name);
                std::process::exit(1);
            }
        }
    }

    let Some(steps) = demo::scenario(&scenario_name) else {
        eprintln!("Error: Unknown scenario '{}'", scenario_name);
        eprintln!();
        print_usage(program_name);
        std::process::exit(1);
    };

    init_logging()?;
    tracing::info!(scenario = %scenario_name, steps = steps.len(), "starting");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(steps, scene_config, terminal_config);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
