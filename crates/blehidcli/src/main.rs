use blehid::gatt::constants::{CCCD_NOTIFICATIONS_ENABLED, GATT_SUCCESS};
use blehid::sim::Notification;
use blehid::{
    event_channel, AdvertisingState, BdAddr, ConnectionState, DeviceIdentity, Event, HidProfile, KeyboardProfile,
    MouseButtons, MouseProfile, PeripheralConfig, PeripheralEngine, PeripheralHandle, SimulatedStack, WriteRequest,
};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::error::Error;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Runs a HID peripheral against a simulated host and prints every report
/// the host receives.
#[derive(Parser)]
#[command(name = "blehid", version, about)]
struct Cli {
    /// Name advertised while waiting for a host
    #[arg(long, default_value = "BLE HID")]
    name: String,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type text as a keyboard
    Keyboard {
        #[arg(long)]
        text: String,
    },
    /// Move the pointer as a mouse
    Mouse {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dx: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dy: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        wheel: i32,
        /// Button bits held during the movement (1 left, 2 right, 4 middle)
        #[arg(long, default_value_t = 0)]
        buttons: u8,
        /// Click the buttons after moving
        #[arg(long)]
        click: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = PeripheralConfig::default();
    config.identity = DeviceIdentity {
        device_name: cli.name.clone(),
        ..DeviceIdentity::default()
    };
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Keyboard { text } => run(config, KeyboardProfile::new(), timeout, |handle| {
            handle.keyboard().send_keys(&text)
        }),
        Commands::Mouse {
            dx,
            dy,
            wheel,
            buttons,
            click,
        } => run(config, MouseProfile::new(), timeout, |handle| {
            let mouse = handle.mouse();
            let buttons = MouseButtons::from_bits_truncate(buttons);
            let mut sent = usize::from(mouse.send_movement(dx, dy, wheel, buttons));
            if click && mouse.send_click(buttons) {
                sent += 2;
            }
            sent
        }),
    }
}

/// Brings the peripheral up, connects a simulated host, queues reports with
/// `send` and waits until the host has received all of them.
fn run<P, F>(config: PeripheralConfig, profile: P, timeout: Duration, send: F) -> Result<(), Box<dyn Error>>
where
    P: HidProfile,
    F: FnOnce(&PeripheralHandle) -> usize,
{
    let host = BdAddr::random_static();
    let (events, rx) = event_channel();
    let (sink, notifications) = mpsc::channel::<Notification>();
    let mut stack = SimulatedStack::new()
        .with_events(events.clone())
        .with_notification_sink(sink);
    stack.set_name("blehid-host");

    let mut engine = PeripheralEngine::new(config, stack, profile, events);
    engine.set_connection_callback(Box::new(|change| {
        info!("Connection {:?}: {:?} (status 0x{:02x})", change.device, change.state, change.status)
    }));

    engine.start()?;
    engine.dispatch_pending(&rx);
    if engine.advertising_state() != AdvertisingState::Advertising {
        engine.stop();
        return Err("peripheral did not start advertising".into());
    }
    println!("Advertising as {}", engine.config().identity.device_name);

    let Some(cccd) = engine.handles().and_then(|h| h.input_report_cccd) else {
        engine.stop();
        return Err("profile has no input report".into());
    };
    engine.handle_event(Event::ConnectionStateChanged {
        device: host,
        status: GATT_SUCCESS,
        state: ConnectionState::Connected,
    });
    engine.handle_event(Event::DescriptorWrite(WriteRequest {
        device: host,
        request_id: 1,
        handle: cccd,
        prepared: false,
        response_needed: true,
        offset: 0,
        value: CCCD_NOTIFICATIONS_ENABLED.to_vec(),
    }));
    println!("Host {} connected and subscribed", host);

    let expected = send(&engine.handle());
    debug!("{} reports queued", expected);

    let deadline = Instant::now() + timeout;
    let mut received = 0;
    while received < expected {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            warn!("Timed out with {} of {} reports delivered", received, expected);
            break;
        };
        match rx.recv_timeout(remaining) {
            Ok(event) => {
                if !engine.handle_event(event) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
        while let Ok(notification) = notifications.try_recv() {
            received += 1;
            println!(
                "{:>3}: handle 0x{:04x} <- {}",
                received,
                notification.handle,
                hex::encode(&notification.value)
            );
        }
    }

    engine.stop();
    println!("Delivered {} of {} reports", received, expected);
    Ok(())
}
