//! MCPWM pulse timer and board transmitter.
//!
//! # Wiring
//!
//! ```text
//! timer (count up, period) ──▶ operator ──▶ comparator (pulse)
//!                                 │              │
//!                                 ▼              ▼ on_reach
//!                             generator       ISR ──▶ TRANSMITTER.on_compare_match()
//!                                 │
//!                                 ▼
//!                               GPIO
//! ```
//!
//! - Generator: HIGH on timer empty, LOW on compare
//! - Period and compare values are shadowed and load on timer empty
//! - Halt stops the timer when it reaches full, so the output stays low
//!   and the next start begins with a fresh cycle
//!
//! The period/compare setters are called from the ISR; build with
//! `CONFIG_MCPWM_CTRL_FUNC_IN_IRAM=y` if the flash cache may be disabled
//! while transmitting.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use esp_idf_svc::sys::{self, esp, EspError};

use crate::config::{NecConfig, TIMER_CLOCK};
use crate::error::NecError;
use crate::scheduler::NecTransmitter;
use crate::timer::PulseTimer;
use crate::timing::LEADER;

/// MCPWM timer + comparator pair.
///
/// Handles are attached once by [`init`] and never released.
pub struct McpwmTimer {
    timer: AtomicPtr<sys::mcpwm_timer_t>,
    comparator: AtomicPtr<sys::mcpwm_cmpr_t>,
    running: AtomicBool,
}

impl McpwmTimer {
    pub const fn new() -> Self {
        Self {
            timer: AtomicPtr::new(ptr::null_mut()),
            comparator: AtomicPtr::new(ptr::null_mut()),
            running: AtomicBool::new(false),
        }
    }

    fn attach(&self, timer: sys::mcpwm_timer_handle_t, comparator: sys::mcpwm_cmpr_handle_t) {
        self.comparator.store(comparator, Ordering::Release);
        self.timer.store(timer, Ordering::Release);
    }

    fn is_attached(&self) -> bool {
        !self.timer.load(Ordering::Acquire).is_null()
    }

    /// Issue a start/stop command. False if not attached or rejected.
    fn command(&self, cmd: sys::mcpwm_timer_start_stop_cmd_t) -> bool {
        let timer = self.timer.load(Ordering::Acquire);
        if timer.is_null() {
            return false;
        }
        // SAFETY: handle created by init() and never deleted.
        let err = unsafe { sys::mcpwm_timer_start_stop(timer, cmd) };
        err == sys::ESP_OK as sys::esp_err_t
    }
}

impl Default for McpwmTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseTimer for McpwmTimer {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run(&self) -> bool {
        if !self.command(sys::mcpwm_timer_start_stop_cmd_t_MCPWM_TIMER_START_NO_STOP) {
            return false;
        }
        self.running.store(true, Ordering::Release);
        true
    }

    fn halt(&self) {
        self.running.store(false, Ordering::Release);
        self.command(sys::mcpwm_timer_start_stop_cmd_t_MCPWM_TIMER_STOP_FULL);
    }

    fn load_next(&self, period_ticks: u16, pulse_ticks: u16) {
        let timer = self.timer.load(Ordering::Acquire);
        let comparator = self.comparator.load(Ordering::Acquire);
        if timer.is_null() || comparator.is_null() {
            return;
        }
        // SAFETY: handles created by init() and never deleted. Both setters
        // write shadow registers only.
        unsafe {
            sys::mcpwm_timer_set_period(timer, period_ticks as u32);
            sys::mcpwm_comparator_set_compare_value(comparator, pulse_ticks as u32);
        }
    }

    fn now_us(&self) -> i64 {
        // SAFETY: esp_timer is started by the IDF before app_main.
        unsafe { sys::esp_timer_get_time() }
    }
}

static TRANSMITTER: NecTransmitter<McpwmTimer> = NecTransmitter::new(McpwmTimer::new(), TIMER_CLOCK);

unsafe extern "C" fn on_compare_reach(
    _comparator: sys::mcpwm_cmpr_handle_t,
    _edata: *const sys::mcpwm_compare_event_data_t,
    _user_ctx: *mut c_void,
) -> bool {
    TRANSMITTER.on_compare_match();
    false
}

/// Configure the MCPWM chain and route it to `config.output_pin`.
///
/// Must run once before any send. Later calls return `Ok(())` without
/// touching the hardware.
pub fn init(config: &NecConfig) -> Result<(), EspError> {
    if TRANSMITTER.timer().is_attached() {
        return Ok(());
    }

    let (period, pulse) = TIMER_CLOCK.shape_ticks(LEADER);

    let mut timer_config = sys::mcpwm_timer_config_t {
        group_id: config.group_id,
        clk_src: sys::soc_periph_mcpwm_timer_clk_src_t_MCPWM_TIMER_CLK_SRC_DEFAULT,
        resolution_hz: TIMER_CLOCK.tick_hz(),
        count_mode: sys::mcpwm_timer_count_mode_t_MCPWM_TIMER_COUNT_MODE_UP,
        period_ticks: period as u32,
        intr_priority: config.intr_priority,
        ..Default::default()
    };
    timer_config.flags.set_update_period_on_empty(1);

    let mut timer: sys::mcpwm_timer_handle_t = ptr::null_mut();
    esp!(unsafe { sys::mcpwm_new_timer(&timer_config, &mut timer) })?;

    let mut operator_config = sys::mcpwm_operator_config_t {
        group_id: config.group_id,
        intr_priority: config.intr_priority,
        ..Default::default()
    };
    operator_config.flags.set_update_gen_action_on_tez(1);

    let mut operator: sys::mcpwm_oper_handle_t = ptr::null_mut();
    esp!(unsafe { sys::mcpwm_new_operator(&operator_config, &mut operator) })?;
    esp!(unsafe { sys::mcpwm_operator_connect_timer(operator, timer) })?;

    let mut comparator_config = sys::mcpwm_comparator_config_t {
        intr_priority: config.intr_priority,
        ..Default::default()
    };
    comparator_config.flags.set_update_cmp_on_tez(1);

    let mut comparator: sys::mcpwm_cmpr_handle_t = ptr::null_mut();
    esp!(unsafe { sys::mcpwm_new_comparator(operator, &comparator_config, &mut comparator) })?;
    esp!(unsafe { sys::mcpwm_comparator_set_compare_value(comparator, pulse as u32) })?;

    let generator_config = sys::mcpwm_generator_config_t {
        gen_gpio_num: config.output_pin,
        ..Default::default()
    };
    let mut generator: sys::mcpwm_gen_handle_t = ptr::null_mut();
    esp!(unsafe { sys::mcpwm_new_generator(operator, &generator_config, &mut generator) })?;

    esp!(unsafe {
        sys::mcpwm_generator_set_action_on_timer_event(
            generator,
            sys::mcpwm_gen_timer_event_action_t {
                direction: sys::mcpwm_timer_direction_t_MCPWM_TIMER_DIRECTION_UP,
                event: sys::mcpwm_timer_event_t_MCPWM_TIMER_EVENT_EMPTY,
                action: sys::mcpwm_generator_action_t_MCPWM_GEN_ACTION_HIGH,
            },
        )
    })?;
    esp!(unsafe {
        sys::mcpwm_generator_set_action_on_compare_event(
            generator,
            sys::mcpwm_gen_compare_event_action_t {
                direction: sys::mcpwm_timer_direction_t_MCPWM_TIMER_DIRECTION_UP,
                comparator,
                action: sys::mcpwm_generator_action_t_MCPWM_GEN_ACTION_LOW,
            },
        )
    })?;

    let callbacks = sys::mcpwm_comparator_event_callbacks_t {
        on_reach: Some(on_compare_reach),
    };
    esp!(unsafe {
        sys::mcpwm_comparator_register_event_callbacks(comparator, &callbacks, ptr::null_mut())
    })?;

    esp!(unsafe { sys::mcpwm_timer_enable(timer) })?;

    TRANSMITTER.timer().attach(timer, comparator);
    TRANSMITTER.prime();
    Ok(())
}

/// The board transmitter (stats, event log, phase).
pub fn transmitter() -> &'static NecTransmitter<McpwmTimer> {
    &TRANSMITTER
}

pub fn send(command: u8, address: u8, repeat: bool) -> Result<(), NecError> {
    TRANSMITTER.send(command, address, repeat)
}

pub fn send_extended(command: u8, address: u16, repeat: bool) -> Result<(), NecError> {
    TRANSMITTER.send_extended(command, address, repeat)
}

pub fn send_raw(code: u32, repeat: bool) -> Result<(), NecError> {
    TRANSMITTER.send_raw(code, repeat)
}

pub fn abort() {
    TRANSMITTER.abort()
}

pub fn is_busy() -> bool {
    TRANSMITTER.is_busy()
}
