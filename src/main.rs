//! MSF Radio Clock Main Application
//!
//! Entry point for the STM32G474-based radio clock firmware.
//! Initializes hardware, spawns the edge and decoder tasks, then waits for
//! the stop button.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{OutputType, Pull};
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::channel::Channel;
use {defmt_rtt as _, panic_probe as _};

use msf_clock::hal::edge;
use msf_clock::prelude::*;

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    I2C1_EV => embassy_stm32::i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => embassy_stm32::i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

type Rtc = Ds3231<I2c<'static, Async>>;
type Dials = PwmDials<'static, peripherals::TIM3>;

static EDGES: EdgeChannel = Channel::new();
static CANCEL: CancelToken = CancelToken::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MSF Radio Clock v{}", env!("CARGO_PKG_VERSION"));

    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // I2C1 for the DS3231
    // PB8 = SCL, PB9 = SDA for I2C1 on STM32G474
    let i2c = I2c::new(
        p.I2C1,
        p.PB8, // SCL
        p.PB9, // SDA
        Irqs,
        p.DMA1_CH1,
        p.DMA1_CH2,
        Hertz(I2C_FREQUENCY_HZ),
        Default::default(),
    );
    let mut rtc = Ds3231::new(i2c);
    if let Err(e) = rtc.init().await {
        warn!("RTC init failed: {}", e);
    }

    info!("I2C1 initialized, RTC at 0x{:02X}", RTC_I2C_ADDR);

    // TIM3 CH1..CH3 drive the hour, minute and second dials
    let pwm = SimplePwm::new(
        p.TIM3,
        Some(PwmPin::new_ch1(p.PA6, OutputType::PushPull)),
        Some(PwmPin::new_ch2(p.PA4, OutputType::PushPull)),
        Some(PwmPin::new_ch3(p.PB0, OutputType::PushPull)),
        None,
        Hertz(DIAL_PWM_FREQUENCY_HZ),
        CountingMode::EdgeAlignedUp,
    );
    let channels = pwm.split();
    let dials = PwmDials::new(channels.ch1, channels.ch2, channels.ch3);

    // Receiver output idles high with the carrier off
    let radio = RadioInput::new(ExtiInput::new(p.PA1, p.EXTI1, Pull::None));
    let mut stop_button = ExtiInput::new(p.PC13, p.EXTI13, Pull::Down);

    let mut driver = ClockDriver::new(rtc, dials);
    driver.start();

    // Spawn background tasks
    spawner.spawn(decoder_task(driver)).unwrap();
    spawner.spawn(edge_task(radio)).unwrap();

    info!("Tasks spawned, waiting for stop button");

    stop_button.wait_for_rising_edge().await;
    info!("Stop button pressed");
    CANCEL.cancel();
}

/// Edge task - timestamps receiver transitions into the edge queue
#[embassy_executor::task]
async fn edge_task(radio: RadioInput<'static>) {
    edge::monitor(radio, EDGES.sender(), &CANCEL).await;
}

/// Decoder task - sole owner of the decoder and clock controller
#[embassy_executor::task]
async fn decoder_task(mut driver: ClockDriver<Rtc, Dials>) {
    let Some(mut cancelled) = CANCEL.subscribe() else {
        warn!("no cancellation slot left for the decoder");
        return;
    };

    loop {
        let outcome = select(cancelled.wait(), EDGES.receive()).await;
        match outcome {
            Either::First(()) => break,
            Either::Second(event) => {
                driver.handle(event).await;
            }
        }
    }

    driver.stop();
    info!("Decoder stopped, dials parked");
}
