//! UART log output.
//!
//! Drains the transmitter's event log and writes formatted lines to a
//! TX-only UART. Formatting runs on host; the driver side is ESP-IDF only.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32 GPIO6 (TX) ──────▶ USB-UART RX
//!                           └─▶ PC Serial Monitor
//! ```

use crate::logging::{LogEntry, LogStream};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// UART configuration for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 6,
        }
    }
}

/// Format log entry to text.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    crate::logging::format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.event
        ),
    )
}

/// Format the "entries dropped" notice, or nothing if none were dropped.
///
/// Resets the stream's dropped counter when it reports.
pub fn format_dropped_notice<const N: usize>(stream: &LogStream<N>, buf: &mut [u8]) -> usize {
    let dropped = stream.dropped();
    if dropped == 0 {
        return 0;
    }
    stream.reset_dropped();
    crate::logging::format_to_buffer(buf, format_args!("[WARN] Dropped: {}\n", dropped))
}

/// Initialize a TX-only UART for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// UART log consumer loop.
///
/// Drains `stream`, writes to UART, reports drops every 10 seconds.
#[cfg(target_os = "espidf")]
pub fn uart_logger_task<const N: usize>(uart: &mut UartTxDriver<'_>, stream: &LogStream<N>) -> ! {
    let mut format_buf = [0u8; 128];
    let mut last_dropped_report = 0i64;

    loop {
        let mut work_done = false;

        while let Some(entry) = stream.drain() {
            let len = format_log_entry(&entry, &mut format_buf);
            let _ = uart.write(&format_buf[..len]);
            work_done = true;
        }

        let now = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        if now - last_dropped_report > 10_000_000 {
            let len = format_dropped_notice(stream, &mut format_buf);
            if len > 0 {
                let _ = uart.write(&format_buf[..len]);
            }
            last_dropped_report = now;
        }

        // If no work, wait before checking again
        if !work_done {
            unsafe {
                esp_idf_svc::sys::vTaskDelay(10);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, TxEvent};

    #[test]
    fn test_format_log_entry() {
        let entry = LogEntry {
            timestamp_us: 1234567,
            level: LogLevel::Info,
            event: TxEvent::Accepted {
                code: 0xEF10_CB34,
                repeat: true,
            },
        };

        let mut buf = [0u8; 128];
        let len = format_log_entry(&entry, &mut buf);

        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert_eq!(
            formatted,
            "[   1234567] INFO: tx start code=0xEF10CB34 repeat=true\n"
        );
    }

    #[test]
    fn test_format_truncated_entry() {
        let entry = LogEntry {
            timestamp_us: 999,
            level: LogLevel::Warn,
            event: TxEvent::Rejected { code: 1 },
        };

        let mut buf = [0u8; 20];
        let len = format_log_entry(&entry, &mut buf);

        assert_eq!(len, 20);
        let formatted = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(formatted.starts_with("[       999] WARN"));
    }

    #[test]
    fn test_dropped_notice() {
        let stream = LogStream::<2>::new();
        let mut buf = [0u8; 64];

        assert_eq!(format_dropped_notice(&stream, &mut buf), 0);

        for t in 0..5 {
            stream.record(t, TxEvent::FrameSent);
        }
        let len = format_dropped_notice(&stream, &mut buf);
        assert_eq!(&buf[..len], b"[WARN] Dropped: 3\n");
        assert_eq!(stream.dropped(), 0);
    }
}
