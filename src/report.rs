use std::fmt::Write;

use chrono::FixedOffset;

use crate::buoy::SwellSource;
use crate::daylight::{sun_times, SunTimes};
use crate::models::{DaySummary, SwellComponent, Window};
use crate::summary::{CurrentConditions, Forecast};

fn score_text(score: Option<f64>) -> String {
    score
        .map(|s| format!("{s:.0}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn component_text(name: &str, component: &Option<SwellComponent>) -> Option<String> {
    let component = component.as_ref()?;
    let height = component.height_ft?;
    let mut text = format!("{name} {height:.1}ft");
    if let Some(period) = component.period_s {
        let _ = write!(text, " @ {period:.0}s");
    }
    if let Some(direction) = component.direction_deg {
        let _ = write!(text, " from {direction:.0}°");
    }
    Some(text)
}

fn write_current(output: &mut String, current: &CurrentConditions, tz: &FixedOffset) {
    let source = match current.swell.source {
        SwellSource::Model => "model",
        SwellSource::Buoy => "buoy",
        SwellSource::None => "no swell data",
    };
    let _ = writeln!(
        output,
        "- {} at {}: {} ({}), score {}",
        current.rating.height_label,
        current.timestamp.with_timezone(tz).format("%-I%P"),
        current.rating.label,
        source,
        score_text(current.rating.score)
    );

    let swell = &current.swell.components;
    for line in [
        component_text("Primary", &swell.primary),
        component_text("Secondary", &swell.secondary),
        component_text("Wind swell", &swell.wind_swell),
    ]
    .into_iter()
    .flatten()
    {
        let _ = writeln!(output, "  - {line}");
    }
}

fn write_windows(output: &mut String, heading: &str, windows: &[Window]) {
    if windows.is_empty() {
        return;
    }
    let _ = writeln!(output, "- {heading}:");
    for window in windows {
        let detail = window
            .reason
            .clone()
            .or_else(|| window.tide_description.clone())
            .unwrap_or_else(|| window.wind_description.clone());
        let _ = writeln!(
            output,
            "  - {} avg {:.0}, {}, {}",
            window.time_label, window.avg_score, window.height_label, detail
        );
    }
}

fn write_day(output: &mut String, day: &DaySummary, forecast: &Forecast, tz: &FixedOffset) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {} ({})", day.day_key, day.date.format("%A"));
    let _ = writeln!(
        output,
        "- Verdict: {} ({}), avg {} / best {}",
        day.verdict_label,
        day.display_height,
        score_text(day.avg_score),
        score_text(day.best_score)
    );
    let _ = writeln!(
        output,
        "- Confidence: {:?} ({}%)",
        day.confidence_band, day.confidence_percentage
    );
    if day.extended_forecast {
        let _ = writeln!(
            output,
            "- Extended forecast: model skill drops sharply past five days"
        );
    }
    if let SunTimes::Regular { sunrise, sunset } =
        sun_times(day.date, forecast.geo.latitude, forecast.geo.longitude)
    {
        let _ = writeln!(
            output,
            "- Daylight: {} to {}",
            sunrise.with_timezone(tz).format("%-I:%M%P"),
            sunset.with_timezone(tz).format("%-I:%M%P")
        );
    }

    if day.best_windows.is_empty() && day.avoid_windows.is_empty() {
        let _ = writeln!(output, "- No windows stand out.");
    }
    write_windows(output, "Best windows", &day.best_windows);
    write_windows(output, "Avoid", &day.avoid_windows);
}

pub fn build_report(spot_name: &str, forecast: &Forecast) -> String {
    let tz = forecast.geo.timezone();
    let mut output = String::new();

    let _ = writeln!(output, "# Surf Verdict: {spot_name}");
    let _ = writeln!(
        output,
        "Generated {} using {:?} scores",
        forecast.generated_at.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        forecast.model
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Right Now");

    match &forecast.current {
        Some(current) => write_current(&mut output, current, &tz),
        None => {
            let _ = writeln!(output, "No current observation for this spot.");
        }
    }

    if forecast.days.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No forecast hours for this window.");
    }
    for day in &forecast.days {
        write_day(&mut output, day, forecast, &tz);
    }

    output
}
