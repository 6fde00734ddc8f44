use super::icons::draw_icon;
use super::plane::{Plane, Scaled};
use super::RenderSurface;
use crate::components::google_calendar::Day;
use crate::components::weather::{Forecast, WeatherIcon};
use crate::utils::time::{clock, month_layout};
use chrono::{Datelike, NaiveDateTime};
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_6X10, FONT_7X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use std::convert::Infallible;

const INK: BinaryColor = BinaryColor::On;
const PAPER: BinaryColor = BinaryColor::Off;

/// Top of the weather strip
pub const BOTTOM_GUTTER: i32 = 400;
/// Right edge of the black date panel
pub const DATE_PANEL_WIDTH: i32 = 200;

const AGENDA_X: i32 = 230;
const AGENDA_TOP: i32 = 20;
const LINE_HEIGHT: i32 = 22;
const DAY_GAP: i32 = 6;

const HOURLY_SLOTS: usize = 7;
const DAILY_SLOTS: usize = 3;
const SLOT_WIDTH: i32 = 80;
const FIRST_SLOT_X: i32 = 50;

const BIG_DATE_SCALE: u32 = 4;

const MINI_CAL_X: i32 = 25;
const MINI_CAL_Y: i32 = 270;
const MINI_CAL_DX: i32 = 25;
const MINI_CAL_DY: i32 = 20;
const WEEKDAY_INITIALS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

fn text<D>(
    target: &mut D,
    content: &str,
    position: Point,
    font: &MonoFont<'_>,
    color: BinaryColor,
    alignment: Alignment,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(font, color);
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(content, position, style, text_style).draw(target)?;
    Ok(())
}

/// Shorten `content` to at most `max_chars` characters, marking the cut with "..."
pub fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = content.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Render one frame. Pure in its inputs: the same data always gives the same planes.
pub fn render_frame(
    width: u32,
    height: u32,
    days: &[Day],
    forecast: Option<&Forecast>,
    now: NaiveDateTime,
) -> RenderSurface {
    let mut surface = RenderSurface::new(width, height);
    draw_frame(&mut surface.black, &mut surface.red, days, forecast, now)
        .unwrap_or_else(|never| match never {});
    surface
}

fn draw_frame(
    black: &mut Plane,
    red: &mut Plane,
    days: &[Day],
    forecast: Option<&Forecast>,
    now: NaiveDateTime,
) -> Result<(), Infallible> {
    draw_date_panel(black, red, now)?;
    draw_agenda(black, red, days)?;

    // Weather gutter
    let width = black.width() as i32;
    black.fill_rect((0, BOTTOM_GUTTER - 1), (width, BOTTOM_GUTTER + 1), INK);
    if let Some(forecast) = forecast {
        draw_forecast(black, red, forecast, now)?;
    }

    draw_mini_calendar(black, red, now)
}

fn draw_date_panel(black: &mut Plane, red: &mut Plane, now: NaiveDateTime) -> Result<(), Infallible> {
    black.fill_rect((0, 0), (DATE_PANEL_WIDTH, BOTTOM_GUTTER), INK);

    let center = DATE_PANEL_WIDTH / 2;
    text(
        black,
        &now.format("%A").to_string(),
        Point::new(center, 40),
        &FONT_10X20,
        PAPER,
        Alignment::Center,
    )?;

    // Day of the month knocked out of the black panel and filled in red
    let day = now.day().to_string();
    let origin = Point::new(center, 70);
    text(
        &mut Scaled::new(black, origin, BIG_DATE_SCALE),
        &day,
        Point::zero(),
        &FONT_10X20,
        PAPER,
        Alignment::Center,
    )?;
    text(
        &mut Scaled::new(red, origin, BIG_DATE_SCALE),
        &day,
        Point::zero(),
        &FONT_10X20,
        INK,
        Alignment::Center,
    )?;

    text(
        black,
        &now.format("%B").to_string(),
        Point::new(center, 155),
        &FONT_10X20,
        PAPER,
        Alignment::Center,
    )
}

fn draw_agenda(black: &mut Plane, red: &mut Plane, days: &[Day]) -> Result<(), Infallible> {
    let char_width = FONT_10X20.character_size.width as i32;
    let max_chars = ((black.width() as i32 - AGENDA_X - 10) / char_width).max(4) as usize;
    let last_line = BOTTOM_GUTTER - LINE_HEIGHT;

    let mut y = AGENDA_TOP;
    for day in days {
        if y >= last_line {
            break;
        }
        text(
            red,
            &truncate(&day.label, max_chars),
            Point::new(AGENDA_X, y),
            &FONT_10X20,
            INK,
            Alignment::Left,
        )?;
        y += LINE_HEIGHT;

        for event in &day.events {
            if y >= last_line {
                break;
            }
            let line = if event.all_day {
                format!("  {}", event.title)
            } else {
                format!("  {} - {}", clock(&event.start), event.title)
            };
            text(
                black,
                &truncate(&line, max_chars),
                Point::new(AGENDA_X, y),
                &FONT_10X20,
                INK,
                Alignment::Left,
            )?;
            y += LINE_HEIGHT;
        }

        y += DAY_GAP;
    }
    Ok(())
}

fn draw_forecast(
    black: &mut Plane,
    red: &mut Plane,
    forecast: &Forecast,
    now: NaiveDateTime,
) -> Result<(), Infallible> {
    let time_y = BOTTOM_GUTTER + 20;
    let icon_y = BOTTOM_GUTTER + 65;
    let temp_y = BOTTOM_GUTTER + 100;

    // Hourly forecasts, but only the ones still in the future
    let mut x = FIRST_SLOT_X;
    for slot in forecast
        .hourly
        .iter()
        .filter(|slot| slot.time > now)
        .take(HOURLY_SLOTS)
    {
        text(
            red,
            &slot.time.format("%H:%M").to_string(),
            Point::new(x, time_y),
            &FONT_10X20,
            INK,
            Alignment::Center,
        )?;
        draw_icon(black, WeatherIcon::from_code(slot.weather_code), Point::new(x, icon_y))?;
        if let Some(chance) = slot.precipitation_probability {
            text(
                black,
                &format!("{}%", chance),
                Point::new(x + 24, icon_y - 18),
                &FONT_6X10,
                INK,
                Alignment::Left,
            )?;
        }
        text(
            black,
            &format!("{:.0}°C", slot.feels_like_temp),
            Point::new(x, temp_y),
            &FONT_10X20,
            INK,
            Alignment::Center,
        )?;
        x += SLOT_WIDTH;
    }

    // Daily forecasts, always placed after the full hourly strip
    let divider_x = FIRST_SLOT_X + SLOT_WIDTH * HOURLY_SLOTS as i32 - 20;
    let bottom = black.height() as i32;
    black.fill_rect((divider_x - 1, BOTTOM_GUTTER), (divider_x + 1, bottom), INK);

    let mut x = divider_x + 60;
    for day in forecast
        .daily
        .iter()
        .filter(|day| day.time.date() > now.date())
        .take(DAILY_SLOTS)
    {
        text(
            red,
            &day.time.format("%a").to_string(),
            Point::new(x, time_y),
            &FONT_10X20,
            INK,
            Alignment::Center,
        )?;
        draw_icon(black, WeatherIcon::from_code(day.weather_code), Point::new(x, icon_y))?;
        text(
            black,
            &format!("{:.0}°", day.max_feels_like_temp),
            Point::new(x - 15, temp_y),
            &FONT_10X20,
            INK,
            Alignment::Center,
        )?;
        text(
            black,
            &format!("{:.0}°", day.min_feels_like_temp),
            Point::new(x + 15, temp_y + 4),
            &FONT_7X13,
            INK,
            Alignment::Center,
        )?;
        x += SLOT_WIDTH;
    }
    Ok(())
}

fn draw_mini_calendar(black: &mut Plane, red: &mut Plane, now: NaiveDateTime) -> Result<(), Infallible> {
    for (i, initial) in WEEKDAY_INITIALS.iter().enumerate() {
        text(
            black,
            initial,
            Point::new(MINI_CAL_X + i as i32 * MINI_CAL_DX, MINI_CAL_Y - 1),
            &FONT_7X13,
            PAPER,
            Alignment::Center,
        )?;
    }
    black.fill_rect(
        (MINI_CAL_X - 12, MINI_CAL_Y + MINI_CAL_DY - 6),
        (MINI_CAL_X + 7 * MINI_CAL_DX - 14, MINI_CAL_Y + MINI_CAL_DY - 5),
        PAPER,
    );

    let (mut column, days_in_month) = month_layout(now.date());
    let mut y = MINI_CAL_Y + MINI_CAL_DY;
    for day in 1..=days_in_month {
        let position = Point::new(MINI_CAL_X + column as i32 * MINI_CAL_DX, y);
        let label = day.to_string();
        text(black, &label, position, &FONT_7X13, PAPER, Alignment::Center)?;
        if day == now.day() {
            text(red, &label, position, &FONT_7X13, INK, Alignment::Center)?;
        }

        column += 1;
        if column == 7 {
            column = 0;
            y += MINI_CAL_DY;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("much longer than that", 10), "much lo...");
    }

    #[test]
    fn test_empty_frame_has_panel_and_gutter() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let surface = render_frame(880, 528, &[], None, now);

        // Corner of the date panel and the gutter line
        assert!(surface.black.is_ink(1, 1));
        assert!(surface.black.is_ink(700, BOTTOM_GUTTER as u32));
        // Right half above the gutter stays blank without events
        assert!(!surface.black.is_ink(700, 100));
        // Big day number is inked in red
        assert!(surface.red.ink_count() > 0);
    }
}
