#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Instant, Timer};
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Pull},
    timer::timg::TimerGroup,
};
use log::{LevelFilter, info, warn};
use microbyte_core::{
    app::{ShellApp, ShellConfig, TickResult},
    catalog::StaticCatalog,
    dispatch::{
        CommandDispatcher, MODE_QUEUE_DEPTH, ModeMessage, SendOutcome, TELEMETRY_QUEUE_DEPTH,
        TelemetrySample,
    },
    input::Button,
    settings::MemoryConfig,
    toolkit::arena::WidgetArena,
};
use microbyte_hal_esp32s3::input::buttons::{ButtonConfig, GpioButtons};

use executor::ExecutionHandle;

#[path = "main/battery.rs"]
mod battery;
#[path = "main/executor.rs"]
mod executor;

/// Widget slots for the headless toolkit: root tiles plus the deepest
/// list/options/dialog chain.
const WIDGET_SLOTS: usize = 160;

static MODE_CHANNEL: Channel<CriticalSectionRawMutex, ModeMessage, MODE_QUEUE_DEPTH> =
    Channel::new();
static TELEMETRY_CHANNEL: Channel<CriticalSectionRawMutex, TelemetrySample, TELEMETRY_QUEUE_DEPTH> =
    Channel::new();
static EXECUTION: ExecutionHandle = ExecutionHandle::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: microbyte shell starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let shell_config = ShellConfig::default();

    // Button wiring used by this build (all active-low, internal pull-up):
    // DOWN=GPIO4 LEFT=GPIO5 UP=GPIO6 RIGHT=GPIO7 B=GPIO15 A=GPIO16 MENU=GPIO17
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let lines = [
        (Button::Down, Input::new(peripherals.GPIO4, input_cfg)),
        (Button::Left, Input::new(peripherals.GPIO5, input_cfg)),
        (Button::Up, Input::new(peripherals.GPIO6, input_cfg)),
        (Button::Right, Input::new(peripherals.GPIO7, input_cfg)),
        (Button::B, Input::new(peripherals.GPIO15, input_cfg)),
        (Button::A, Input::new(peripherals.GPIO16, input_cfg)),
        (Button::Menu, Input::new(peripherals.GPIO17, input_cfg)),
    ];
    let mut buttons =
        GpioButtons::new(ButtonConfig::default().with_active_low(shell_config.active_low));
    for (button, pin) in lines {
        if let Err(err) = buttons.register(button, pin) {
            warn!("input: button register failed: {:?}", err);
        }
    }
    esp_println::println!("input: {} buttons registered", buttons.registered());

    // No SD driver on this board revision yet: every listing reports the
    // card as unavailable.
    let storage = StaticCatalog::new().unmounted();

    let mut app = match ShellApp::new(
        storage,
        MemoryConfig::new(),
        WidgetArena::<WIDGET_SLOTS>::new(),
        buttons,
        shell_config,
    ) {
        Ok(app) => app,
        Err(err) => {
            esp_println::println!("shell: root scope build failed");
            info!("shell build failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let tick_ms = shell_config.tick_period_ms.max(1) as u64;
    info!(
        "shell: tick={}ms debounce={} ticks telemetry={} ticks send_wait={}ms",
        tick_ms,
        shell_config.debounce_window_ticks,
        shell_config.telemetry_period_ticks,
        shell_config.send_wait().as_millis()
    );

    let battery_future = battery::battery_loop(TELEMETRY_CHANNEL.sender());
    let executor_future = executor::execution_loop(MODE_CHANNEL.receiver(), &EXECUTION);
    let ui_future = async {
        let mut dispatcher = CommandDispatcher::new(MODE_CHANNEL.sender(), shell_config.send_wait());
        let mut telemetry = TELEMETRY_CHANNEL.receiver();

        loop {
            let now_ticks = (Instant::now().as_millis() / tick_ms) as u32;

            if EXECUTION.take_complete() {
                app.on_execution_complete();
            }

            let tick = app.tick(now_ticks);
            app.poll_telemetry(&mut telemetry, now_ticks);

            while let Some(message) = app.take_command() {
                if dispatcher.send(message).await == SendOutcome::Dropped {
                    warn!(
                        "shell: command lost delivered={} dropped={}",
                        dispatcher.delivered(),
                        dispatcher.dropped()
                    );
                }
            }

            if tick == TickResult::RenderRequested {
                app.with_view(|view| {
                    info!(
                        "view: nav={:?} scope={:?} depth={} tab={} title={} focus={:?} label={:?} items={} slider={:?} battery={:?} theme={:?}",
                        view.nav,
                        view.scope,
                        view.depth,
                        view.tab,
                        view.title,
                        view.focused_index,
                        view.focused_label,
                        view.item_count,
                        view.slider_value,
                        view.battery,
                        view.theme
                    );
                    if let Some(body) = view.body {
                        info!("view: body={}", body);
                    }
                });
            }

            Timer::after_millis(tick_ms).await;
        }
    };

    let _ = embassy_futures::join::join3(battery_future, executor_future, ui_future).await;
    unreachable!()
}
