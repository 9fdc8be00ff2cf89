#![no_main]
#![no_std]

mod logger;

use cortex_m_rt::entry;

use rtt_target::{rprintln, rtt_init_print};

use nrf52832_hal::delay::Delay;
use nrf52832_hal::gpio::{p0, Level};
use nrf52832_hal::pac::{self, UARTE0};
use nrf52832_hal::uarte::{self, Parity, Uarte, UarteRx, UarteTx};

use log::{info, warn, LevelFilter};

use core::panic::PanicInfo;

use hc06::{Config, Hc06, NbSerial};

pub type ConnectedUarte = UARTE0;
pub type BluetoothSerial = NbSerial<UarteTx<ConnectedUarte>, UarteRx<ConnectedUarte>, RX_QUEUE>;

// Received bytes buffered between polls of the one-byte DMA receiver
const RX_QUEUE: usize = 64;

const DEVICE_NAME: &str = "hc06-rs";
const DEVICE_PIN: &str = "1234";

// Module and UARTE both start at the factory rate
const CONFIG: Config = Config::new(2, 3, 9600);

#[entry]
fn main() -> ! {
    rtt_init_print!();
    logger::init(LevelFilter::Debug);

    rprintln!("Hello, HC-06!");

    let core = pac::CorePeripherals::take().unwrap();
    let device = pac::Peripherals::take().unwrap();

    let gpio = p0::Parts::new(device.P0);

    // Set up UARTE, RX on P0.02 and TX on P0.03 like CONFIG says
    let uarte_pins = uarte::Pins {
        rxd: gpio.p0_02.into_floating_input().degrade(),
        txd: gpio.p0_03.into_push_pull_output(Level::High).degrade(),
        cts: None,
        rts: None,
    };
    let uarte = Uarte::new(
        device.UARTE0,
        uarte_pins,
        Parity::EXCLUDED,
        uarte::Baudrate::BAUD9600,
    );

    // DMA buffers have to live in RAM forever
    let tx_buf = cortex_m::singleton!(: [u8; 64] = [0; 64]).unwrap();
    let rx_buf = cortex_m::singleton!(: [u8; 1] = [0; 1]).unwrap();
    let (tx, rx) = uarte.split(tx_buf, rx_buf).unwrap();

    let serial: BluetoothSerial = NbSerial::new(tx, rx);
    let mut bluetooth = Hc06::new(serial, Delay::new(core.SYST), CONFIG);

    bluetooth.begin().unwrap();
    info!(
        "HC-06 on RX {} / TX {} at {} baud",
        bluetooth.rx_pin(),
        bluetooth.tx_pin(),
        bluetooth.baudrate()
    );

    if let Err(e) = bluetooth.set_device_name(DEVICE_NAME) {
        warn!("Could not set name: {}", e);
    }
    if let Err(e) = bluetooth.set_device_pin(DEVICE_PIN) {
        warn!("Could not set pin: {}", e);
    }

    let mut version = [0u8; 32];
    match bluetooth.version(&mut version) {
        Ok(len) => info!(
            "Version: {}",
            core::str::from_utf8(&version[..len]).unwrap_or("<binary>")
        ),
        Err(e) => warn!("Version query failed: {}", e),
    }

    // Data mode: echo whatever the paired host sends
    let mut buffer = [0u8; 64];
    loop {
        match bluetooth.read(&mut buffer) {
            Ok(0) => {}
            Ok(len) => {
                if let Err(e) = bluetooth.write(&buffer[..len]) {
                    warn!("Echo failed: {}", e);
                }
            }
            Err(e) => warn!("Read failed: {}", e),
        }
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    rprintln!("----- PANIC -----");
    rprintln!("{:#?}", info);
    loop {
        cortex_m::asm::bkpt();
    }
}
