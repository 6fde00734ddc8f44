//! Waveshare 7.5" HD (B) black/white/red panel on a Raspberry Pi

use super::Panel;
use crate::error::{display_error, InkResult};
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Reset, active low
const PIN_RST: u8 = 17;
/// Data/command select (high = data, low = command)
const PIN_DC: u8 = 25;
/// High while the controller is busy
const PIN_BUSY: u8 = 24;

const SPI_CLOCK_HZ: u32 = 4_000_000;
const SPI_CHUNK: usize = 4096;

pub const WIDTH: u32 = 880;
pub const HEIGHT: u32 = 528;

pub struct Epd7in5bHd {
    spi: Spi,
    rst: OutputPin,
    dc: OutputPin,
    busy: InputPin,
}

fn hw_error(what: &str, e: impl std::fmt::Display) -> crate::error::Error {
    display_error(&format!("{}: {}", what, e))
}

impl Epd7in5bHd {
    /// Acquire SPI0 CE0 and the control pins
    pub fn open() -> InkResult<Self> {
        let gpio = Gpio::new().map_err(|e| hw_error("Unable to open GPIO", e))?;
        let pin = |number: u8| {
            gpio.get(number)
                .map_err(|e| hw_error(&format!("Unable to acquire GPIO {}", number), e))
        };

        Ok(Self {
            spi: Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
                .map_err(|e| hw_error("Unable to open SPI", e))?,
            rst: pin(PIN_RST)?.into_output(),
            dc: pin(PIN_DC)?.into_output(),
            busy: pin(PIN_BUSY)?.into_input(),
        })
    }

    fn buffer_len() -> usize {
        (WIDTH.div_ceil(8) * HEIGHT) as usize
    }

    fn reset(&mut self) {
        self.rst.set_high();
        thread::sleep(Duration::from_millis(200));
        self.rst.set_low();
        thread::sleep(Duration::from_millis(4));
        self.rst.set_high();
        thread::sleep(Duration::from_millis(200));
    }

    fn wait_until_idle(&mut self) {
        if self.busy.read() == Level::High {
            debug!("Waiting for e-ink");
            while self.busy.read() == Level::High {
                thread::sleep(Duration::from_millis(10));
            }
        }
        thread::sleep(Duration::from_millis(200));
    }

    fn write_spi(&mut self, bytes: &[u8]) -> InkResult<()> {
        for chunk in bytes.chunks(SPI_CHUNK) {
            self.spi
                .write(chunk)
                .map_err(|e| hw_error("SPI write failed", e))?;
        }
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> InkResult<()> {
        self.dc.set_low();
        self.write_spi(&[command])
    }

    fn send_data(&mut self, data: &[u8]) -> InkResult<()> {
        self.dc.set_high();
        self.write_spi(data)
    }

    fn send(&mut self, command: u8, data: &[u8]) -> InkResult<()> {
        self.send_command(command)?;
        if !data.is_empty() {
            self.send_data(data)?;
        }
        Ok(())
    }

    fn refresh(&mut self, mode: u8) -> InkResult<()> {
        self.send(0x22, &[mode])?;
        self.send_command(0x20)?;
        self.wait_until_idle();
        Ok(())
    }
}

impl Panel for Epd7in5bHd {
    fn dimensions(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn init(&mut self) -> InkResult<()> {
        self.reset();

        // Software reset
        self.send_command(0x12)?;
        self.wait_until_idle();

        // Auto write RAM patterns
        self.send(0x46, &[0xF7])?;
        self.wait_until_idle();
        self.send(0x47, &[0xF7])?;
        self.wait_until_idle();

        // Booster soft start
        self.send(0x0C, &[0xAE, 0xC7, 0xC3, 0xC0, 0x40])?;
        // Gate count 528
        self.send(0x01, &[0xAF, 0x02, 0x01])?;
        // Data entry mode
        self.send(0x11, &[0x01])?;
        // RAM window
        self.send(0x44, &[0x00, 0x00, 0x6F, 0x03])?;
        self.send(0x45, &[0xAF, 0x02, 0x00, 0x00])?;
        // Border
        self.send(0x3C, &[0x01])?;
        // Internal temperature sensor
        self.send(0x18, &[0x80])?;
        // Load waveform
        self.refresh(0xB1)?;
        // RAM cursor
        self.send(0x4E, &[0x00, 0x00])?;
        self.send(0x4F, &[0xAF, 0x02])
    }

    fn clear(&mut self) -> InkResult<()> {
        let len = Self::buffer_len();
        self.send(0x4F, &[0xAF, 0x02])?;
        self.send(0x24, &vec![0xFF; len])?;
        self.send(0x26, &vec![0x00; len])?;
        self.refresh(0xF7)
    }

    fn display(&mut self, black: &[u8], red: &[u8]) -> InkResult<()> {
        let len = Self::buffer_len();
        if black.len() != len || red.len() != len {
            return Err(display_error(&format!(
                "Frame buffers must be {} bytes, got {} and {}",
                len,
                black.len(),
                red.len()
            )));
        }

        // Red RAM treats 1 as red
        let red: Vec<u8> = red.iter().map(|b| !b).collect();

        self.send(0x4F, &[0xAF, 0x02])?;
        self.send(0x24, black)?;
        self.send(0x26, &red)?;
        self.refresh(0xC7)
    }

    fn sleep(&mut self) -> InkResult<()> {
        // Deep sleep
        self.send(0x10, &[0x01])
    }
}
