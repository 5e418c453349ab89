//! RustNecTx - Main entry point
//!
//! On ESP-IDF: brings up the MCPWM transmitter and UART logger, then sends
//! a demo command every two seconds, holding it as repeat frames once in
//! a while.
//!
//! On host: runs the same scheduler against the simulated timer and prints
//! the generated pulse train.

#[cfg(target_os = "espidf")]
fn main() {
    use esp_idf_svc::hal::peripherals::Peripherals;
    use rust_nec_tx::hal;
    use rust_nec_tx::uart_logger::{init_uart_logger, uart_logger_task, UartLoggerConfig};
    use rust_nec_tx::NecConfig;

    esp_idf_svc::sys::link_patches();

    let peripherals = Peripherals::take().expect("peripherals already taken");

    hal::init(&NecConfig::default()).expect("MCPWM init failed");

    let log_config = UartLoggerConfig::default();
    let mut uart = init_uart_logger(peripherals.uart1, peripherals.pins.gpio6, &log_config)
        .expect("UART logger init failed");
    std::thread::Builder::new()
        .stack_size(4096)
        .spawn(move || uart_logger_task(&mut uart, hal::transmitter().log()))
        .expect("logger thread spawn failed");

    let mut round: u32 = 0;
    loop {
        let hold = round % 5 == 4;
        if hal::send(0x10, 0x34, hold).is_ok() && hold {
            // ~1s of repeat frames, then release
            std::thread::sleep(std::time::Duration::from_millis(1000));
            hal::abort();
        }
        round = round.wrapping_add(1);
        std::thread::sleep(std::time::Duration::from_millis(2000));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use rust_nec_tx::sim::SimTimer;
    use rust_nec_tx::{NecTransmitter, PulseTimer, TIMER_CLOCK};

    let tx = NecTransmitter::new(SimTimer::new(), TIMER_CLOCK);
    tx.prime();

    let repeats = 2;
    tx.send(0x10, 0x34, true).expect("idle transmitter rejected send");
    println!(
        "{} code=0x{:08X} tick={}ns",
        env!("VERSION_STRING"),
        tx.pending_code(),
        TIMER_CLOCK.tick_ns()
    );

    let mut cycle = 0u32;
    while tx.is_busy() {
        let (period, pulse) = tx.timer().next_cycle();
        let period_us = period as u32 * TIMER_CLOCK.tick_ns() / 1000;

        tx.on_compare_match();
        println!(
            "{:3} mark {:6}us space {:6}us  {:?}",
            cycle,
            pulse as u32 * TIMER_CLOCK.tick_ns() / 1000,
            (period - pulse) as u32 * TIMER_CLOCK.tick_ns() / 1000,
            tx.phase()
        );
        tx.timer().advance_us(period_us);

        if tx.stats().snapshot().repeats == repeats {
            tx.abort();
        }
        cycle += 1;
    }

    while let Some(entry) = tx.log().drain() {
        let mut buf = [0u8; 128];
        let len = rust_nec_tx::uart_logger::format_log_entry(&entry, &mut buf);
        print!("{}", String::from_utf8_lossy(&buf[..len]));
    }

    let stats = tx.stats().snapshot();
    println!("{:?} now={}us", stats, tx.timer().now_us());
}
