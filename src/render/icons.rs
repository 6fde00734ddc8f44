use crate::components::weather::WeatherIcon;
use embedded_graphics::mono_font::iso_8859_1::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

const INK: BinaryColor = BinaryColor::On;
const PAPER: BinaryColor = BinaryColor::Off;

/// Unit direction vectors (scaled by 10) for the eight sun rays
const RAYS: [(i32, i32); 8] = [
    (10, 0),
    (7, 7),
    (0, 10),
    (-7, 7),
    (-10, 0),
    (-7, -7),
    (0, -10),
    (7, -7),
];

/// Draw a roughly 44×44 icon centred on `center`
pub fn draw_icon<D>(target: &mut D, icon: WeatherIcon, center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    match icon {
        WeatherIcon::Sunny => sun(target, center, 9),
        WeatherIcon::ClearNight => moon(target, center, 24),
        WeatherIcon::PartlyCloudyDay => {
            sun(target, center + Point::new(-8, -8), 6)?;
            cloud(target, center + Point::new(4, 6))
        }
        WeatherIcon::PartlyCloudyNight => {
            moon(target, center + Point::new(-8, -8), 18)?;
            cloud(target, center + Point::new(4, 6))
        }
        WeatherIcon::Cloudy => cloud(target, center),
        WeatherIcon::Overcast => {
            cloud(target, center + Point::new(-6, -7))?;
            cloud(target, center + Point::new(4, 4))
        }
        WeatherIcon::Mist => mist(target, center),
        WeatherIcon::LightRain => {
            cloud(target, center + Point::new(0, -6))?;
            drops(target, center + Point::new(0, 10), 2)
        }
        WeatherIcon::HeavyRain => {
            cloud(target, center + Point::new(0, -6))?;
            drops(target, center + Point::new(0, 10), 4)
        }
        WeatherIcon::Sleet => {
            cloud(target, center + Point::new(0, -6))?;
            drops(target, center + Point::new(-6, 10), 1)?;
            flakes(target, center + Point::new(6, 13), 1)
        }
        WeatherIcon::LightSnow => {
            cloud(target, center + Point::new(0, -6))?;
            flakes(target, center + Point::new(0, 13), 2)
        }
        WeatherIcon::HeavySnow => {
            cloud(target, center + Point::new(0, -6))?;
            flakes(target, center + Point::new(0, 13), 3)
        }
        WeatherIcon::Thunder => {
            cloud(target, center + Point::new(0, -6))?;
            bolt(target, center + Point::new(0, 8))
        }
        WeatherIcon::NotAvailable => {
            let style = MonoTextStyle::new(&FONT_10X20, INK);
            let text_style = TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build();
            Text::with_text_style("?", center, style, text_style).draw(target)?;
            Ok(())
        }
    }
}

fn sun<D>(target: &mut D, center: Point, radius: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::with_center(center, radius * 2)
        .into_styled(PrimitiveStyle::with_stroke(INK, 2))
        .draw(target)?;

    let r = radius as i32;
    for (dx, dy) in RAYS {
        let inner = center + Point::new(dx * (r + 3) / 10, dy * (r + 3) / 10);
        let outer = center + Point::new(dx * (r + 8) / 10, dy * (r + 8) / 10);
        Line::new(inner, outer)
            .into_styled(PrimitiveStyle::with_stroke(INK, 2))
            .draw(target)?;
    }
    Ok(())
}

/// Crescent: a full disc with a paper disc bitten out of its upper right
fn moon<D>(target: &mut D, center: Point, diameter: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let bite = diameter as i32 / 3;
    Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(INK))
        .draw(target)?;
    Circle::with_center(center + Point::new(bite, -bite / 2), diameter - 2)
        .into_styled(PrimitiveStyle::with_fill(PAPER))
        .draw(target)?;
    Ok(())
}

/// Filled cloud with a paper outline so it reads on top of other shapes
fn cloud<D>(target: &mut D, center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = PrimitiveStyleBuilder::new()
        .fill_color(INK)
        .stroke_color(PAPER)
        .stroke_width(1)
        .build();

    Circle::with_center(center + Point::new(-9, 2), 16)
        .into_styled(style)
        .draw(target)?;
    Circle::with_center(center + Point::new(9, 2), 16)
        .into_styled(style)
        .draw(target)?;
    Circle::with_center(center + Point::new(0, -4), 20)
        .into_styled(style)
        .draw(target)?;
    Rectangle::new(center + Point::new(-9, 2), Size::new(19, 8))
        .into_styled(PrimitiveStyle::with_fill(INK))
        .draw(target)?;
    Ok(())
}

fn drops<D>(target: &mut D, top: Point, count: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let spacing = 7;
    let first = top.x - (count - 1) * spacing / 2;
    for i in 0..count {
        let start = Point::new(first + i * spacing, top.y);
        Line::new(start, start + Point::new(-3, 8))
            .into_styled(PrimitiveStyle::with_stroke(INK, 2))
            .draw(target)?;
    }
    Ok(())
}

fn flakes<D>(target: &mut D, center: Point, count: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let spacing = 10;
    let first = center.x - (count - 1) * spacing / 2;
    for i in 0..count {
        let c = Point::new(first + i * spacing, center.y);
        for (a, b) in [
            (Point::new(-3, 0), Point::new(3, 0)),
            (Point::new(0, -3), Point::new(0, 3)),
            (Point::new(-2, -2), Point::new(2, 2)),
            (Point::new(-2, 2), Point::new(2, -2)),
        ] {
            Line::new(c + a, c + b)
                .into_styled(PrimitiveStyle::with_stroke(INK, 1))
                .draw(target)?;
        }
    }
    Ok(())
}

fn mist<D>(target: &mut D, center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    for (i, half) in [14, 18, 12, 16].into_iter().enumerate() {
        let y = center.y - 12 + i as i32 * 8;
        let shift = if i % 2 == 0 { -2 } else { 2 };
        Line::new(
            Point::new(center.x - half + shift, y),
            Point::new(center.x + half + shift, y),
        )
        .into_styled(PrimitiveStyle::with_stroke(INK, 3))
        .draw(target)?;
    }
    Ok(())
}

fn bolt<D>(target: &mut D, top: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let points = [
        top + Point::new(3, 0),
        top + Point::new(-3, 7),
        top + Point::new(2, 7),
        top + Point::new(-2, 14),
    ];
    Polyline::new(&points)
        .into_styled(PrimitiveStyle::with_stroke(INK, 2))
        .draw(target)?;
    Ok(())
}
