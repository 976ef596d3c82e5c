use crossterm::style::Stylize;
use std::sync::Arc;
use table_columns::config::Config;
use table_columns::data::datatable::DataRow;
use table_columns::data::datatable_loaders::{load_file, table_name};
use table_columns::services::{LabelCatalog, SystemClipboard, Translator};
use table_columns::table_display::display_results;
use table_columns::ui::result_table::ResultTable;
use table_columns::ui::tui_app::{run_tui_app, TuiApp};
use table_columns::utils::app_paths::AppPaths;
use table_columns::utils::logging::init_tracing;

fn print_help() {
    println!("{}", "table-columns - Interactive results table".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  table-columns [OPTIONS] FILE.csv|FILE.json");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}             - Print the table and exit", "--print".green());
    println!(
        "  {} - Treat columns as epoch-millisecond timestamps",
        "--temporal a,b".green()
    );
    println!(
        "  {}         - Data source id for saved column preferences",
        "--source ID".green()
    );
    println!("  {}           - Show HTML as plain text", "--no-html".green());
    println!(
        "  {}   - Generate config file with defaults",
        "--generate-config".green()
    );
    println!("  {}              - Show this help", "--help".green());
    println!();
    println!("{}", "Keys:".yellow());
    println!("  {}  - Filter rows", "/".green());
    println!("  {}  - Copy visible rows as TSV", "y".green());
    println!("  {}  - Column formatting (temporal columns)", "f".green());
    println!("  {}  - Sort by selected column", "s".green());
    println!("  {}  - Quit", "q".green());
    println!();
}

fn option_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn generate_config() -> anyhow::Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--generate-config") {
        if let Err(e) = generate_config() {
            eprintln!("Error writing config file: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Warning: using default config ({})", e).yellow());
            Config::default()
        }
    };

    // Logging is best-effort; the table still works without a log file
    match AppPaths::log_dir().and_then(|dir| init_tracing(&dir)) {
        Ok(path) => eprintln!("Logs: {}", path.display()),
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let value_options = ["--temporal", "--source"];
    let file = args
        .iter()
        .enumerate()
        .filter(|(i, arg)| {
            !arg.starts_with("--")
                && !(*i > 0 && value_options.contains(&args[*i - 1].as_str()))
        })
        .map(|(_, arg)| arg.clone())
        .next();

    let Some(file) = file else {
        print_help();
        std::process::exit(1);
    };

    let mut loaded = load_file(&file)?;
    if let Some(temporal) = option_value(&args, "--temporal") {
        let names: Vec<String> = temporal
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        loaded.mark_temporal(&names);
    }

    let data_source = option_value(&args, "--source").unwrap_or_else(|| table_name(&file));
    let translator: Arc<dyn Translator> = Arc::new(LabelCatalog::new(config.labels.clone()));
    let store = config.preferences.open_store()?;

    let mut table = ResultTable::from_config(&config, store, translator.as_ref());
    if args.iter().any(|arg| arg == "--no-html") {
        table.set_allow_html(false);
    }
    let title = loaded.name.clone();
    table.set_data(loaded.columns, loaded.column_types, loaded.rows);
    table.set_data_source(Some(data_source));

    if args.iter().any(|arg| arg == "--print") {
        table.set_visible(true);
        let descriptors = table.columns().to_vec();
        let rows: Vec<&DataRow> = table.filtered_rows();
        display_results(&descriptors, &rows);
        return Ok(());
    }

    let app = TuiApp::new(
        table,
        translator,
        Box::new(SystemClipboard::new()),
        config.filter.debounce_ms,
        title,
    )
    .with_row_numbers(config.display.show_row_numbers);

    if let Err(e) = run_tui_app(app) {
        eprintln!("TUI Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
