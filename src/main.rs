use anyhow::{anyhow, bail, Result};
use tokio::runtime::Handle;

use skycast_dashboard::{Dashboard, DisplayState, IntoAppError};
use skycast_weather::display::{format_temperature, format_wind_speed, icon_url};
use skycast_weather::{UnitSystem, WeatherReport};

const USAGE: &str = "usage: skycast [--imperial] [--toggle-theme] [city query]";

struct Args {
    units: UnitSystem,
    toggle_theme: bool,
    query: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut units = UnitSystem::Metric;
    let mut toggle_theme = false;
    let mut words = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--imperial" => units = UnitSystem::Imperial,
            "--toggle-theme" => toggle_theme = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => words.push(arg),
        }
    }

    let query = Some(words.join(" ")).filter(|q| !q.trim().is_empty());
    Ok(Args {
        units,
        toggle_theme,
        query,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize core
    skycast_core::init()?;

    let args = parse_args()?;
    let mut app = skycast_core::App::new()?;

    tracing::info!("SkyCast started");

    if args.toggle_theme {
        let theme = app
            .toggle_theme()
            .map_err(|e| anyhow!(skycast_core::AppError::from(e).user_message().to_string()))?;
        println!("Theme set to {}", theme.as_str());
    }

    let mut dashboard = Dashboard::from_config(app.config(), Handle::current())
        .map_err(|e| anyhow!(e.user_message().to_string()))?;

    // Units first so the selection below fetches once
    dashboard.set_units(args.units);

    match &args.query {
        Some(query) => {
            if !dashboard.select_by_name(query).await {
                println!("No city found for \"{}\".", query);
                println!("Try one of: {}", dashboard.quick_picks().join(", "));
                app.shutdown()?;
                return Ok(());
            }
        }
        None => {
            if let Err(e) = dashboard.use_current_location() {
                println!("{}", e.into_app_error().user_message());
                println!("{}", USAGE);
                app.shutdown()?;
                return Ok(());
            }
        }
    }

    dashboard.wait_until_settled().await;

    match dashboard.display() {
        DisplayState::Ready(report) => print_report(report),
        DisplayState::Failed { message } => println!("{}", message),
        DisplayState::Empty => println!("Nothing to show."),
    }
    println!("\nTheme: {}", app.theme().as_str());

    // Graceful shutdown
    app.shutdown()?;

    Ok(())
}

fn print_report(report: &WeatherReport) {
    let current = &report.current;
    let units = report.units;

    println!("{}", current.location_label);
    println!("{}", current.observed_label());
    println!(
        "{}  {} ({})",
        format_temperature(current.temperature, units),
        current.condition_main,
        current.condition_description
    );
    println!("  Feels like  {}", format_temperature(current.feels_like, units));
    println!(
        "  High / Low  {} / {}",
        format_temperature(current.temp_max, units),
        format_temperature(current.temp_min, units)
    );
    println!("  Humidity    {}%", current.humidity);
    println!("  Wind        {}", format_wind_speed(current.wind_speed, units));
    println!("  Sunrise     {}", current.sunrise_label());
    println!("  Sunset      {}", current.sunset_label());
    println!("  Icon        {}", icon_url(&current.icon_id));

    if report.forecast.is_empty() {
        return;
    }

    println!("\nForecast");
    for entry in &report.forecast {
        println!(
            "  {:<12} {:>8}  {:>5}  {}",
            entry.day_label,
            entry.time_label,
            format_temperature(entry.temperature, units),
            entry.condition_description
        );
    }
}
