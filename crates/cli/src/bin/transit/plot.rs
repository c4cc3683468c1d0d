//! Altitude chart for the night around one transit.

use anyhow::anyhow;
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use transit_planner::engine::{Event, JulianDate, Observer, Target};
use transit_planner::sky::Horizon;

const STEP_MINUTES: f64 = 5.0;
const MINUTES_PER_DAY: f64 = 1_440.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct AltitudeSample {
    pub t: JulianDate,
    pub target_deg: f64,
    pub moon_deg: f64,
}

/// Sunset before ingress to sunrise after egress. Falls back to half a day
/// around the event when the Sun does not cross the horizon within a day.
pub(super) fn night_bounds(observer: &Observer, event: &Event) -> (JulianDate, JulianDate) {
    let start = observer
        .previous_sun_set_time(event.ingress, Horizon::Geometric)
        .filter(|t| event.ingress - *t < 1.0)
        .unwrap_or(event.ingress - 0.5);
    let end = observer
        .sun_rise_time(event.egress, Horizon::Geometric)
        .filter(|t| *t - event.egress < 1.0)
        .unwrap_or(event.egress + 0.5);
    (start, end)
}

/// Target and Moon altitudes every five minutes across `[start, end]`.
pub(super) fn sample_altitudes(
    observer: &Observer,
    target: &Target,
    start: JulianDate,
    end: JulianDate,
) -> Vec<AltitudeSample> {
    let steps = ((end - start) * MINUTES_PER_DAY / STEP_MINUTES).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| {
            let t = start + (i as f64 * STEP_MINUTES / MINUTES_PER_DAY).min(end - start);
            AltitudeSample {
                t,
                target_deg: observer.altitude(target, t),
                moon_deg: observer.moon_horizontal(t).altitude_deg,
            }
        })
        .collect()
}

/// Render the chart for `event` to a PNG at `output`.
pub(super) fn render_altitude_chart(
    output: &Path,
    observer: &Observer,
    target: &Target,
    event: &Event,
    altitude_limit_deg: Option<f64>,
    size: (u32, u32),
) -> anyhow::Result<()> {
    let (start, end) = night_bounds(observer, event);
    let samples = sample_altitudes(observer, target, start, end);
    let hours = |t: JulianDate| (t - start) * 24.0;
    let span_hours = hours(end);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = output
        .to_str()
        .ok_or_else(|| anyhow!("Plot path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, size).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);
    let caption = format!(
        "{} from {}: transit on {}",
        target.name(),
        observer.name(),
        event.midpoint.format_iso()
    );

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, caption_font)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..span_hours, 0.0..90.0)?;

    let clock_label = |h: &f64| {
        observer
            .local_datetime(start + *h / 24.0)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_desc(format!("Local time ({})", observer.timezone()))
        .y_desc("Altitude [deg]")
        .label_style(label_font.clone())
        .x_labels(8)
        .y_labels(10)
        .x_label_formatter(&clock_label)
        .draw()?;

    let target_color = RGBColor(30, 90, 200);
    let moon_color = RGBColor(120, 120, 120);
    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (hours(s.t), s.target_deg.max(0.0))),
            ShapeStyle::from(&target_color).stroke_width(2),
        ))?
        .label(target.name().to_string())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &target_color));
    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (hours(s.t), s.moon_deg.max(0.0))),
            ShapeStyle::from(&moon_color).stroke_width(1),
        ))?
        .label("Moon")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &moon_color));

    if let Some(limit) = altitude_limit_deg.filter(|l| *l > 0.0) {
        let limit_color = RGBColor(200, 40, 40);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, limit), (span_hours, limit)],
                ShapeStyle::from(&limit_color.mix(0.7)).stroke_width(1),
            )))?
            .label(format!("altitude limit {limit:.0}°"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &limit_color));
    }

    for (t, width) in [(event.ingress, 1), (event.midpoint, 2), (event.egress, 1)] {
        let x = hours(t);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, 0.0), (x, 90.0)],
            ShapeStyle::from(&BLACK.mix(0.6)).stroke_width(width),
        )))?;
    }

    chart
        .configure_series_labels()
        .label_font(label_font)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_planner::engine::Ephemeris;

    fn oao() -> Observer {
        Observer::new("OAO", 34.5761, 133.5941, 343.0, "Asia/Tokyo").unwrap()
    }

    #[test]
    fn night_brackets_a_midnight_transit() {
        // 2020-01-01 15:00 UTC is local midnight in Japan.
        let ephemeris = Ephemeris::new("b", 2_458_850.125, 3.0, 0.1).unwrap();
        let event = ephemeris.event(0);
        let (start, end) = night_bounds(&oao(), &event);
        assert!(start < event.ingress && event.ingress - start < 0.5);
        assert!(end > event.egress && end - event.egress < 0.5);
    }

    #[test]
    fn samples_cover_the_range_in_five_minute_steps() {
        let observer = oao();
        let target = Target::new("t", 83.6, 22.0).unwrap();
        let start = JulianDate::new(2_458_850.0);
        let end = start + 0.5;
        let samples = sample_altitudes(&observer, &target, start, end);
        assert_eq!(samples.len(), 145);
        assert_eq!(samples[0].t, start);
        assert!((samples[samples.len() - 1].t - end).abs() < 1e-9);
        assert!(samples.iter().all(|s| (-90.0..=90.0).contains(&s.target_deg)));
    }
}
