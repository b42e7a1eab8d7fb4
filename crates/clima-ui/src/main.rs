use std::time::Duration;

use anyhow::{bail, Context, Result};

use clima_core::Config;
use clima_ui::{AppServices, ForecastModel};

const USAGE: &str = "usage: clima <place name...>\n       clima --coords <lat> <lon>";

enum Request {
    Place(String),
    Point(f64, f64),
}

fn parse_args(args: &[String]) -> Result<Request> {
    match args {
        [] => bail!("{}", USAGE),
        [flag, lat, lon] if flag == "--coords" => {
            let lat = lat.parse().context("latitude is not a number")?;
            let lon = lon.parse().context("longitude is not a number")?;
            Ok(Request::Point(lat, lon))
        }
        [flag, ..] if flag == "--coords" => bail!("{}", USAGE),
        words => Ok(Request::Place(words.join(" "))),
    }
}

fn render(model: &ForecastModel) {
    println!("{}", model.location_name());
    println!();

    for index in 0..model.day_count() {
        if let Some(day) = model.day(index) {
            println!(
                "{}  {:>5.1}° / {:>5.1}°  {} [{}]",
                day.date.format("%a %d %b"),
                day.min_temp,
                day.max_temp,
                day.description,
                day.icon
            );
        }
    }

    println!();
    for row in model.hourly() {
        println!(
            "  {}  {:>5.1}° (feels {:>5.1}°)  {:>3}%  {:>4.1} m/s  {}",
            row.time, row.temperature, row.feels_like, row.humidity, row.wind_speed, row.description
        );
    }
}

fn main() -> Result<()> {
    clima_core::init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_args(&args)?;

    let config = Config::load_validated()?;
    let services = AppServices::from_config(&config)?;
    let mut model = ForecastModel::new(services.clone());

    let dispatched = match request {
        Request::Place(name) => model.search(&name),
        Request::Point(lat, lon) => model.select_point(lat, lon),
    };

    // Request timeout plus a margin for decoding and channel hand-off
    let wait_for = Duration::from_secs(config.weather.timeout_secs + 5);
    if dispatched && !model.wait(wait_for) {
        tracing::warn!("Gave up waiting for the forecast after {:?}", wait_for);
    }

    let outcome = if model.has_data() {
        render(&model);
        Ok(())
    } else {
        eprintln!("{}", model.error_message());
        if !model.error_hint().is_empty() {
            eprintln!("{}", model.error_hint());
        }
        Err(anyhow::anyhow!("no forecast available"))
    };

    services.shutdown();
    outcome
}
