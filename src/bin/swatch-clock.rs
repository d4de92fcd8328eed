use chrono::Utc;
use std::env;
use std::fs;
use std::process;
use swatch_clocks::{embed_snippet, Beats, Catalog, ClockError, Page, Settings};

fn usage() -> ! {
    eprintln!("Usage: swatch-clock <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  now                              Current Internet Time");
    eprintln!("  presets                          List built-in preset names");
    eprintln!("  preset <name>                    Normalized preset as YAML");
    eprintln!("  embed <name>                     Embed markup for a preset");
    eprintln!("  render <page.xhtml> [settings]   Initialize clocks in a page and print it");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let result = match (args[1].as_str(), args.get(2)) {
        ("now", None) => {
            println!("{}", Beats::now());
            Ok(())
        }
        ("presets", None) => {
            for name in Catalog::builtin().names() {
                println!("{}", name);
            }
            Ok(())
        }
        ("preset", Some(name)) => print_preset(name),
        ("embed", Some(name)) => print_embed(name),
        ("render", Some(path)) => render(path, args.get(3).map(String::as_str)),
        _ => usage(),
    };

    if let Err(e) = result {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn print_preset(name: &str) -> Result<(), ClockError> {
    let config = Catalog::builtin()
        .normalized(name)
        .ok_or_else(|| ClockError::UnknownPreset {
            name: name.to_string(),
        })?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

fn print_embed(name: &str) -> Result<(), ClockError> {
    if !Catalog::builtin().contains(name) {
        return Err(ClockError::UnknownPreset {
            name: name.to_string(),
        });
    }
    println!("{}", embed_snippet(name));
    Ok(())
}

fn render(path: &str, settings_path: Option<&str>) -> Result<(), ClockError> {
    let settings = match settings_path {
        Some(p) => Settings::from_yaml(&fs::read_to_string(p)?)?,
        None => Settings::default(),
    };
    let mut page = Page::parse(&fs::read_to_string(path)?, settings)?;
    let created = page.initialize_all(Utc::now().timestamp_millis())?;
    for warning in page.take_warnings() {
        eprintln!("! {}", warning);
    }
    eprintln!("✓ {} clock(s) initialized", created.len());
    println!("{}", page.to_html());
    Ok(())
}
