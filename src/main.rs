#![no_std]
#![no_main]

use bme680::{Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder};
use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use embedded_hal_0_2::adc::{Channel, OneShot};
use heapless::Vec;
use panic_probe as _;
use rp_pico::hal::Timer;

// Provide an alias for our BSP so we can switch targets quickly.
use rp_pico as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    pac,
    watchdog::Watchdog,
};
use greenhouse_ctl::config::{
    DISPLAY_ADDRESS, LOOP_DELAY_MS, SERIAL_BATCH, SERIAL_BAUD, SPLASH_MS,
};
use greenhouse_ctl::console::MenuConsole;
use greenhouse_ctl::greenhouse::{Greenhouse, Tick};
use greenhouse_ctl::rendering::{compose_page, draw_frame, splash_frame};
use greenhouse_ctl::sensors::{ClimateSensor, Reading, SampleOutcome, SetpointKnob};
use greenhouse_ctl::setpoints::Setpoints;
use greenhouse_ctl::Error;
use i2c_pio::I2C;
use rp_pico::hal;
use rp_pico::hal::adc::{Adc, AdcPin};
use rp_pico::hal::fugit::RateExtU32;
use rp_pico::hal::gpio::bank0::{Gpio0, Gpio1, Gpio8, Gpio9};
use rp_pico::hal::gpio::{FunctionI2C, FunctionNull, FunctionUart, Pin, PullDown, PullUp};
use rp_pico::hal::pio::{PIOExt, SM0};
use rp_pico::hal::rosc::RingOscillator;
use rp_pico::hal::uart::{DataBits, Enabled, StopBits, UartConfig, UartPeripheral};
use rp_pico::pac::{PIO0, UART0};
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use ufmt::{uWrite, uwriteln};

type Bme<'a> = Bme680<
    I2C<'a, PIO0, SM0, Pin<Gpio8, FunctionNull, PullDown>, Pin<Gpio9, FunctionNull, PullDown>>,
    Timer,
>;

type Uart = UartPeripheral<
    Enabled,
    UART0,
    (
        Pin<Gpio0, FunctionUart, PullDown>,
        Pin<Gpio1, FunctionUart, PullDown>,
    ),
>;

#[entry]
fn main() -> ! {
    info!("Greenhouse controller starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut delay = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Set up the serial console first so a display failure can be reported
    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(SERIAL_BAUD.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();
    let mut serial = Serial(uart);

    // Set up SSD1306 on the hardware I2C0
    let sda_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
    let scl_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
    let i2c = hal::I2C::i2c0(
        pac.I2C0,
        sda_pin,
        scl_pin,
        400.kHz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );
    let interface = I2CDisplayInterface::new_custom_address(i2c, DISPLAY_ADDRESS);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if display.init().is_err() {
        error!("SSD1306 display init failed, halting");
        let _ = uwriteln!(serial, "Display error (SSD1306)");
        halt();
    }

    // Set up BME680 on a PIO I2C bus
    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let i2c_pio = I2C::new(
        &mut pio,
        pins.gpio8,
        pins.gpio9,
        sm0,
        100.kHz(),
        clocks.system_clock.freq(),
    );
    let mut climate = Climate {
        bme: init_bme(i2c_pio, &mut delay),
        delay,
    };

    // Set up the reference knob
    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let knob_pin = AdcPin::new(pins.gpio26.into_floating_input()).unwrap();
    let mut knob = Knob {
        adc,
        pin: knob_pin,
        last: 0,
    };

    // Set up page button
    let mut page_button = pins.gpio15.into_pull_up_input();

    // Set up ventilation and irrigation indicators
    let ventilation = pins.gpio14.into_push_pull_output();
    let irrigation = pins.gpio13.into_push_pull_output();

    // Humidity threshold comes from ring oscillator noise
    let rosc = RingOscillator::new(pac.ROSC).initialize();
    let seed = (0..32).fold(0u32, |seed, _| (seed << 1) | rosc.get_random_bit() as u32);

    let mut greenhouse = Greenhouse::new(ventilation, irrigation, Setpoints::from_seed(seed));
    let threshold = greenhouse.setpoints.humidity_threshold();

    let splash = draw_frame(&mut display, &splash_frame(threshold))
        .and_then(|_| display.flush().map_err(|_| Error::Display));
    if let Err(e) = splash {
        warn!("Splash screen failed: {}", e);
    }
    delay.delay_ms(SPLASH_MS);

    let mut console = MenuConsole::new();
    if let Err(e) = console.start(threshold, &mut serial) {
        warn!("Console banner failed: {}", e);
    }

    info!("Greenhouse controller ready, humidity threshold {}%", threshold);

    loop {
        let now = now_ms(&delay);

        match greenhouse.tick(now, &mut climate, &mut knob, &mut page_button) {
            Ok(tick) => log_tick(&tick),
            Err(e) => warn!("Control step failed: {}", e),
        }

        // Repaint every pass, whether or not anything changed
        match compose_page(greenhouse.page(), &mut greenhouse) {
            Ok(frame) => {
                let drawn = draw_frame(&mut display, &frame)
                    .and_then(|_| display.flush().map_err(|_| Error::Display));
                if let Err(e) = drawn {
                    warn!("Display refresh failed: {}", e);
                }
            }
            Err(e) => warn!("Page composition failed: {}", e),
        }

        let pending = serial.drain();
        match console.feed(&pending, &mut greenhouse, &mut serial) {
            Ok(Some(event)) => info!("Console: {}", event),
            Ok(None) => {}
            Err(e) => warn!("Console failed: {}", e),
        }

        delay.delay_ms(LOOP_DELAY_MS);
    }
}

/// Parks the core forever; only a power cycle recovers
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

/// Milliseconds since boot, wrapping like the controller's clock expects
fn now_ms(timer: &Timer) -> u32 {
    (timer.get_counter().ticks() / 1000) as u32
}

fn log_tick(tick: &Tick) {
    match tick.sample {
        Some(SampleOutcome::Updated(reading)) => debug!("Sample: {}", reading),
        Some(SampleOutcome::Invalid) => warn!("Climate sensor returned NaN, keeping last reading"),
        None => {}
    }
    if let Some(page) = tick.page {
        debug!("Next page: {}", page);
    }
}

/// Brings up the BME680 for temperature and humidity only
/// A missing sensor is not fatal; every sample just reads as invalid
fn init_bme<'a>(
    i2c: I2C<'a, PIO0, SM0, Pin<Gpio8, FunctionNull, PullDown>, Pin<Gpio9, FunctionNull, PullDown>>,
    delay: &mut Timer,
) -> Option<Bme<'a>> {
    let mut bme = match Bme680::init(i2c, delay, I2CAddress::Secondary) {
        Ok(bme) => bme,
        Err(_) => {
            warn!("BME680 not found, climate readings will be invalid");
            return None;
        }
    };
    let settings = SettingsBuilder::new()
        .with_humidity_oversampling(OversamplingSetting::OS2x)
        .with_pressure_oversampling(OversamplingSetting::OS4x)
        .with_temperature_oversampling(OversamplingSetting::OS8x)
        .with_temperature_filter(IIRFilterSize::Size3)
        .with_run_gas(false)
        .build();
    if bme.set_sensor_settings(delay, settings).is_err() {
        warn!("BME680 rejected its settings");
    }
    Some(bme)
}

struct Climate<'a> {
    bme: Option<Bme<'a>>,
    delay: Timer,
}

impl ClimateSensor for Climate<'_> {
    fn read(&mut self) -> Reading {
        let Some(bme) = self.bme.as_mut() else {
            return Reading::INVALID;
        };
        // Forced mode runs a single conversion
        if bme.set_sensor_mode(&mut self.delay, PowerMode::ForcedMode).is_err() {
            return Reading::INVALID;
        }
        match bme.get_sensor_data(&mut self.delay) {
            Ok((data, _)) => Reading {
                temperature: data.temperature_celsius(),
                humidity: data.humidity_percent(),
            },
            Err(_) => Reading::INVALID,
        }
    }
}

struct Knob<P> {
    adc: Adc,
    pin: P,
    last: u16,
}

impl<P> SetpointKnob for Knob<P>
where
    P: Channel<Adc>,
    Adc: OneShot<Adc, u16, P>,
{
    fn read_raw(&mut self) -> u16 {
        // A failed conversion repeats the previous position
        if let Ok(raw) = nb::block!(self.adc.read(&mut self.pin)) {
            self.last = raw;
        }
        self.last
    }
}

/// UART0 as the console's text sink and byte source
struct Serial(Uart);

impl Serial {
    /// Takes every byte waiting in the receive FIFO
    fn drain(&mut self) -> Vec<u8, SERIAL_BATCH> {
        let mut pending = Vec::new();
        while !pending.is_full() {
            match embedded_hal_nb::serial::Read::read(&mut self.0) {
                Ok(byte) => {
                    let _ = pending.push(byte);
                }
                Err(_) => break,
            }
        }
        pending
    }
}

impl uWrite for Serial {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.0.write_full_blocking(s.as_bytes());
        Ok(())
    }
}
