//! RustSerialConsole - Main entry point
//!
//! Firmware wiring only: static state, the two RX pumps, the profiler
//! tick, then the foreground REPL. All logic lives in the library and is
//! reached through its capability traits.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]
#![cfg_attr(target_arch = "xtensa", feature(asm_experimental_arch))]

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::sys as esp_idf_sys;

    use core::cell::UnsafeCell;
    use core::fmt::Write;

    use rust_serial_console::console::{self, CommandContext, Shell};
    use rust_serial_console::diag::DiagCounters;
    use rust_serial_console::framer::{encode_frame, Frame, MessageFramer};
    use rust_serial_console::fw_warn;
    use rust_serial_console::io::ByteSource;
    use rust_serial_console::logging::LogRing;
    use rust_serial_console::profiler::{NoSymbols, Profiler, SampleClock};
    use rust_serial_console::ring::ByteRing;

    /// Local console on UART0, remote link on UART1.
    const CONSOLE_UART: i32 = 0;
    const LINK_UART: i32 = 1;

    /// Profiler sampling period in microseconds.
    const SAMPLE_PERIOD_US: u64 = 500;

    // Wrapper to make UnsafeCell Sync for static state.
    // SAFETY: every cell has exactly one interrupt-context writer; the
    // foreground touches it only after that writer's completion signal
    // (finished frame, stopped timer).
    #[repr(transparent)]
    struct SyncCell<T>(UnsafeCell<T>);
    unsafe impl<T> Sync for SyncCell<T> {}

    impl<T> SyncCell<T> {
        const fn new(value: T) -> Self {
            Self(UnsafeCell::new(value))
        }

        fn get(&self) -> *mut T {
            self.0.get()
        }
    }

    // Static allocations.
    // Writers: CONSOLE_RX <- console RX pump; FRAMER <- link RX pump;
    // PROFILER <- tick handler while enabled.
    static CONSOLE_RX: ByteRing = ByteRing::new();
    static LOG: LogRing = LogRing::new();
    static DIAG: DiagCounters = DiagCounters::new();
    static FRAMER: SyncCell<MessageFramer> = SyncCell::new(MessageFramer::new());
    static PROFILER: SyncCell<Profiler> = SyncCell::new(Profiler::new());
    static SAMPLE_CLOCK: SyncCell<EspSampleClock> = SyncCell::new(EspSampleClock {
        handle: core::ptr::null_mut(),
    });

    /// Blocking UART TX as a formatted sink.
    ///
    /// Only the foreground writes here; interrupt-context code goes
    /// through [`LOG`] instead.
    struct UartOut(i32);

    impl Write for UartOut {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            // SAFETY: driver installed at startup; TX blocks until queued.
            unsafe {
                esp_idf_sys::uart_write_bytes(self.0, s.as_ptr().cast(), s.len() as _);
            }
            Ok(())
        }
    }

    /// Periodic esp_timer in ISR dispatch mode, as the profiler's tick
    /// capability.
    struct EspSampleClock {
        handle: esp_idf_sys::esp_timer_handle_t,
    }

    impl SampleClock for EspSampleClock {
        fn start(&mut self) {
            unsafe {
                esp_idf_sys::esp_timer_start_periodic(self.handle, SAMPLE_PERIOD_US);
            }
        }

        fn stop(&mut self) {
            unsafe {
                esp_idf_sys::esp_timer_stop(self.handle);
            }
        }
    }

    /// Program counter of the interrupted foreground context.
    #[cfg(target_arch = "xtensa")]
    fn sampled_pc() -> usize {
        let pc: usize;
        // EPC1 holds the pre-interrupt PC at interrupt level 1
        unsafe { core::arch::asm!("rsr.epc1 {0}", out(reg) pc) };
        pc
    }

    #[cfg(not(target_arch = "xtensa"))]
    fn sampled_pc() -> usize {
        0
    }

    /// Profiler tick (ISR context). One sample per tick; the periodic
    /// timer re-arms itself, which acknowledges this source.
    extern "C" fn profiler_tick(_arg: *mut core::ffi::c_void) {
        // SAFETY: single writer; foreground reads the tables only after
        // the timer is stopped.
        let profiler = unsafe { &mut *PROFILER.get() };
        if profiler.record(sampled_pc()) {
            DiagCounters::count(&DIAG.samples_recorded);
        } else {
            DiagCounters::count(&DIAG.samples_dropped);
        }
    }

    /// Link RX context: drain every queued byte, echo each completed frame
    /// back onto the link, dispatch it before the next byte is examined.
    fn link_rx_pump() {
        struct LinkRx;

        impl ByteSource for LinkRx {
            fn poll_byte(&mut self) -> Option<u8> {
                let mut byte = 0u8;
                let n = unsafe {
                    esp_idf_sys::uart_read_bytes(
                        LINK_UART,
                        (&mut byte as *mut u8).cast(),
                        1,
                        0,
                    )
                };
                (n == 1).then_some(byte)
            }
        }

        // SAFETY: this pump is the only framer/profiler writer in this
        // context; dispatch completes before the next byte is read.
        let framer = unsafe { &mut *FRAMER.get() };
        let profiler = unsafe { &mut *PROFILER.get() };
        let clock = unsafe { &mut *SAMPLE_CLOCK.get() };

        framer.drain(&mut LinkRx, &mut |frame: Frame<'_>| {
            DiagCounters::count(&DIAG.frames_rx);
            if frame.truncated {
                DiagCounters::count(&DIAG.frames_truncated);
                fw_warn!(LOG, "link frame truncated at capacity");
            }

            let mut link = UartOut(LINK_UART);
            let _ = encode_frame(&mut link, frame.payload);

            let mut ctx = CommandContext {
                profiler: &mut *profiler,
                clock: &mut *clock,
                symbols: &NoSymbols,
                link: &mut link,
                diag: &DIAG,
            };
            // Handlers on this path must stay short and non-blocking
            let _ = console::execute(frame.payload, &mut ctx, &mut UartOut(CONSOLE_UART));
        });
    }

    extern "C" fn link_rx_task(_arg: *mut core::ffi::c_void) {
        // TODO: replace delay-polling with UART event queue wakeups
        loop {
            link_rx_pump();
            unsafe { esp_idf_sys::vTaskDelay(1) };
        }
    }

    extern "C" fn console_rx_task(_arg: *mut core::ffi::c_void) {
        loop {
            let mut byte = 0u8;
            let n = unsafe {
                esp_idf_sys::uart_read_bytes(CONSOLE_UART, (&mut byte as *mut u8).cast(), 1, 1)
            };
            if n == 1 && !CONSOLE_RX.push(byte) {
                DiagCounters::count(&DIAG.rx_dropped);
            }
        }
    }

    fn init_uart(port: i32) {
        let config = esp_idf_sys::uart_config_t {
            baud_rate: 115200,
            data_bits: esp_idf_sys::uart_word_length_t_UART_DATA_8_BITS,
            parity: esp_idf_sys::uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: esp_idf_sys::uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: esp_idf_sys::uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };
        unsafe {
            esp_idf_sys::uart_param_config(port, &config);
            esp_idf_sys::uart_driver_install(port, 1024, 0, 0, core::ptr::null_mut(), 0);
        }
    }

    fn init_sample_timer() {
        let mut args = esp_idf_sys::esp_timer_create_args_t::default();
        args.callback = Some(profiler_tick);
        args.arg = core::ptr::null_mut();
        args.dispatch_method = esp_idf_sys::esp_timer_dispatch_t_ESP_TIMER_ISR;
        args.name = b"profiler\0".as_ptr().cast();

        unsafe {
            let clock = &mut *SAMPLE_CLOCK.get();
            esp_idf_sys::esp_timer_create(&args, &mut clock.handle);
        }
    }

    fn spawn(name: &'static [u8], task: extern "C" fn(*mut core::ffi::c_void)) {
        unsafe {
            esp_idf_sys::xTaskCreatePinnedToCore(
                Some(task),
                name.as_ptr().cast(),
                4096,
                core::ptr::null_mut(),
                10,
                core::ptr::null_mut(),
                0,
            );
        }
    }

    #[no_mangle]
    fn main() {
        esp_idf_sys::link_patches();

        init_uart(CONSOLE_UART);
        init_uart(LINK_UART);
        init_sample_timer();

        spawn(b"console_rx\0", console_rx_task);
        spawn(b"link_rx\0", link_rx_task);

        let mut shell = Shell::new();
        let mut out = UartOut(CONSOLE_UART);
        let mut link = UartOut(LINK_UART);
        let mut src = &CONSOLE_RX;

        // SAFETY: the foreground borrows stand for the whole REPL; the
        // interrupt-context writers above respect the temporal contract.
        let profiler = unsafe { &mut *PROFILER.get() };
        let clock = unsafe { &mut *SAMPLE_CLOCK.get() };

        let mut ctx = CommandContext {
            profiler,
            clock,
            symbols: &NoSymbols,
            link: &mut link,
            diag: &DIAG,
        };

        shell.run(&mut src, &mut ctx, &LOG, &mut out);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // Host build: the firmware entry lives in the cfg-gated module above;
    // everything testable is in the library.
}
